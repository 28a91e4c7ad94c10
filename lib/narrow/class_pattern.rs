/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use ruff_python_ast::name::Name;
use starlark_map::small_map::SmallMap;

use crate::binding::pattern::PatternClass;
use crate::dunder;
use crate::error::kind::ErrorKind;
use crate::narrow::PatternSolver;
use crate::narrow::Resolver;
use crate::types::class::Class;
use crate::types::class::ClassType;
use crate::types::class::TArgs;
use crate::types::literal::Lit;
use crate::types::quantified::Quantified;
use crate::types::tuple::Tuple;
use crate::types::types::Type;

/// The builtins whose class patterns treat the first positional argument as
/// the matched instance itself rather than an attribute.
const SELF_MATCHING_BUILTINS: &[&str] = &[
    "bool",
    "bytearray",
    "bytes",
    "dict",
    "float",
    "frozenset",
    "int",
    "list",
    "set",
    "str",
    "tuple",
];

impl<'a, Ans: Resolver> PatternSolver<'a, Ans> {
    pub(crate) fn narrow_class(&self, subject: &Type, x: &PatternClass, positive: bool) -> Type {
        let cls_ty = self.resolver().type_of_expression(&x.cls);
        let cls = match &cls_ty {
            Type::ClassDef(c) => c.clone(),
            Type::Type(inner) => match &**inner {
                Type::ClassType(ct) => ct.class_object().clone(),
                _ => return self.invalid_class_pattern(subject, &cls_ty, x, positive),
            },
            Type::TypeAlias(ta) => {
                if ta.specialized {
                    self.errors().add(
                        x.range,
                        format!(
                            "Class pattern may not use type alias `{}` with type arguments",
                            ta.name
                        ),
                        ErrorKind::ClassPatternTypeAlias,
                    );
                }
                match ta.as_value() {
                    Type::ClassType(ct) => ct.class_object().clone(),
                    Type::ClassDef(c) => c,
                    _ => return self.invalid_class_pattern(subject, &cls_ty, x, positive),
                }
            }
            // A Never class reference matches nothing, silently.
            Type::Never(_) => {
                return if positive {
                    Type::never()
                } else {
                    subject.clone()
                };
            }
            // A gradual class reference proves nothing either way.
            Type::Any(_) => return subject.clone(),
            _ => return self.invalid_class_pattern(subject, &cls_ty, x, positive),
        };
        // Explicit type arguments are erased: the pattern sees the class
        // under its default parameterization with gradual arguments.
        let instance = self.type_order().promote_silently(&cls);
        if positive {
            self.narrow_class_positive(subject, &cls, &instance, x)
        } else {
            self.narrow_class_negative(subject, &cls, &instance, x)
        }
    }

    fn invalid_class_pattern(
        &self,
        subject: &Type,
        cls_ty: &Type,
        x: &PatternClass,
        positive: bool,
    ) -> Type {
        self.errors().add(
            x.range,
            format!("Class pattern requires a class, got `{cls_ty}`"),
            ErrorKind::ClassPatternNotAClass,
        );
        if positive {
            Type::any_implicit()
        } else {
            subject.clone()
        }
    }

    fn narrow_class_positive(
        &self,
        subject: &Type,
        cls: &Class,
        instance: &Type,
        x: &PatternClass,
    ) -> Type {
        self.map_subtypes(subject, |expanded, unexpanded| match expanded {
            Type::Any(_) => {
                // A gradual subject narrows to the matched class.
                self.check_class_pattern_args(instance.clone(), cls, x, true)
            }
            Type::ClassDef(_) | Type::Type(_) => {
                self.narrow_instantiable_member(expanded, unexpanded, cls, x)
            }
            Type::None => {
                if cls == self.stdlib().none_type().class_object() {
                    self.check_class_pattern_args(unexpanded.clone(), cls, x, true)
                } else {
                    None
                }
            }
            _ => {
                let subject_ct = self.as_instance_class(expanded)?;
                if self.is_assignable(instance, expanded) {
                    // The subject member is already narrower than the
                    // pattern class; it survives whole.
                    self.check_class_pattern_args(unexpanded.clone(), cls, x, true)
                } else if self.is_assignable(expanded, instance) {
                    // The pattern class is narrower; move to it, carrying
                    // over whatever type arguments the subject pins down.
                    let transferred = self.transfer_targs(cls, &subject_ct);
                    self.check_class_pattern_args(transferred, cls, x, true)
                } else {
                    None
                }
            }
        })
    }

    /// An instantiable subject member can only match a pattern over `type`
    /// (or a metaclass): the subject's effective metaclass is matched
    /// against the pattern class.
    fn narrow_instantiable_member(
        &self,
        expanded: &Type,
        unexpanded: &Type,
        cls: &Class,
        x: &PatternClass,
    ) -> Option<Type> {
        let type_class = self.stdlib().builtins_type().class_object();
        if cls != type_class && !self.type_order().has_superclass(cls, type_class) {
            return None;
        }
        let subject_cls = match expanded {
            Type::ClassDef(c) => c.clone(),
            Type::Type(inner) => match &**inner {
                Type::ClassType(ct) => ct.class_object().clone(),
                Type::Any(_) => return Some(unexpanded.clone()),
                _ => return None,
            },
            _ => return None,
        };
        let metaclass = self.type_order().metaclass_of(&subject_cls);
        let related = cls == type_class
            || self
                .type_order()
                .has_superclass(metaclass.class_object(), cls)
            || self
                .type_order()
                .has_superclass(cls, metaclass.class_object());
        if related {
            self.check_class_pattern_args(unexpanded.clone(), metaclass.class_object(), x, true)
        } else {
            None
        }
    }

    fn narrow_class_negative(
        &self,
        subject: &Type,
        cls: &Class,
        instance: &Type,
        x: &PatternClass,
    ) -> Type {
        self.map_subtypes(subject, |expanded, unexpanded| match expanded {
            Type::None => {
                if cls == self.stdlib().none_type().class_object() && x.args.is_empty() {
                    None
                } else {
                    Some(unexpanded.clone())
                }
            }
            Type::Any(_) | Type::ClassDef(_) | Type::Type(_) => Some(unexpanded.clone()),
            _ => {
                let Some(subject_ct) = self.as_instance_class(expanded) else {
                    return Some(unexpanded.clone());
                };
                if x.args.is_empty() {
                    // Definite match: same generic class, or a final
                    // subject class all of whose instances match.
                    if subject_ct.class_object() == cls
                        || (self.type_order().is_final(subject_ct.class_object())
                            && self.is_assignable(instance, expanded))
                    {
                        return None;
                    }
                    Some(unexpanded.clone())
                } else {
                    // With arguments, only a final subject class whose
                    // every argument narrows losslessly definitely matches.
                    if self.type_order().is_final(subject_ct.class_object())
                        && self.is_assignable(instance, expanded)
                        && self.class_pattern_args_definitely_match(expanded, cls, x)
                    {
                        None
                    } else {
                        Some(unexpanded.clone())
                    }
                }
            }
        })
    }

    /// Build the pattern class's instance form, binding type arguments that
    /// can be read off the subject by upcasting the pattern class (with its
    /// own parameters as placeholders) to the subject's class.
    fn transfer_targs(&self, cls: &Class, subject_ct: &ClassType) -> Type {
        if cls.tparams().is_empty() {
            return self.type_order().promote_silently(cls);
        }
        let placeholders = cls.as_class_type();
        let mut bindings: SmallMap<Quantified, Type> = SmallMap::new();
        if let Some(ancestor) = self
            .type_order()
            .as_superclass(&placeholders, subject_ct.class_object())
        {
            for (ancestor_targ, subject_targ) in ancestor
                .targs()
                .as_slice()
                .iter()
                .zip(subject_ct.targs().as_slice())
            {
                if let Type::Quantified(q) = ancestor_targ {
                    bindings.insert(q.clone(), subject_targ.clone());
                }
            }
        }
        let targs = TArgs::new(
            cls.tparams()
                .quantified()
                .map(|q| {
                    bindings
                        .get(q)
                        .cloned()
                        .unwrap_or_else(Type::any_implicit)
                })
                .collect(),
        );
        self.type_order().instance_of(cls, targs)
    }

    /// Validate and narrow the pattern's arguments against `result`, the
    /// already-chosen narrowed form of one subject member. `None` when some
    /// argument cannot match.
    fn check_class_pattern_args(
        &self,
        result: Type,
        cls: &Class,
        x: &PatternClass,
        report: bool,
    ) -> Option<Type> {
        if x.args.is_empty() {
            return Some(result);
        }
        let arg_types = self.class_pattern_arg_types(&result, cls, x, report);
        for (attr_ty, arg) in arg_types.iter().zip(&x.args) {
            if self.narrow(attr_ty, &arg.pattern, true).is_never() {
                return None;
            }
        }
        Some(result)
    }

    /// Would every argument's positive narrowing keep its attribute type
    /// exactly as it is?
    fn class_pattern_args_definitely_match(
        &self,
        result: &Type,
        cls: &Class,
        x: &PatternClass,
    ) -> bool {
        let arg_types = self.class_pattern_arg_types(result, cls, x, false);
        arg_types
            .iter()
            .zip(&x.args)
            .all(|(attr_ty, arg)| self.narrow(attr_ty, &arg.pattern, true).same(attr_ty))
    }

    /// Like [`Self::class_pattern_arg_types`], without diagnostics. Used by
    /// the binding pass, which runs after narrowing already reported.
    pub(crate) fn class_pattern_arg_types_quiet(
        &self,
        result: &Type,
        cls: &Class,
        x: &PatternClass,
    ) -> Vec<Type> {
        self.class_pattern_arg_types(result, cls, x, false)
    }

    /// Resolve each pattern argument to the type it is matched against:
    /// keyword arguments name attributes directly, positional arguments go
    /// through `__match_args__`, and the self-matching builtins expose the
    /// instance itself in the first positional slot.
    fn class_pattern_arg_types(
        &self,
        result: &Type,
        cls: &Class,
        x: &PatternClass,
        report: bool,
    ) -> Vec<Type> {
        let match_args = self.class_match_args(cls);
        let special = match_args.is_none() && self.is_self_matching_builtin(cls);
        let mut positional_index = 0;
        let mut arg_types = Vec::with_capacity(x.args.len());
        for arg in &x.args {
            let attr_ty = match &arg.name {
                Some(name) => {
                    if special {
                        if report {
                            self.errors().add(
                                x.range,
                                format!(
                                    "Keyword patterns are not allowed for `{}`",
                                    cls.name()
                                ),
                                ErrorKind::ClassPatternBuiltinKeyword,
                            );
                        }
                        Type::any_implicit()
                    } else {
                        self.class_pattern_attr_type(result, cls, &name.id)
                    }
                }
                None => {
                    let index = positional_index;
                    positional_index += 1;
                    if special {
                        if index == 0 {
                            result.clone()
                        } else {
                            if report {
                                self.report_positional_count(cls, x, 1);
                            }
                            Type::any_implicit()
                        }
                    } else {
                        match &match_args {
                            Some(names) if index < names.len() => {
                                self.class_pattern_attr_type(result, cls, &names[index])
                            }
                            Some(names) => {
                                if report {
                                    self.report_positional_count(cls, x, names.len());
                                }
                                Type::any_implicit()
                            }
                            None => {
                                if report {
                                    self.report_positional_count(cls, x, 0);
                                }
                                Type::any_implicit()
                            }
                        }
                    }
                }
            };
            arg_types.push(attr_ty);
        }
        arg_types
    }

    fn report_positional_count(&self, cls: &Class, x: &PatternClass, expected: usize) {
        self.errors().add(
            x.range,
            format!(
                "Too many positional patterns for `{}`; expected at most {expected}",
                cls.name()
            ),
            ErrorKind::ClassPatternPositionalArgCount,
        );
    }

    /// The declared type of the attribute a pattern argument matches. A
    /// missing attribute is `Never` on a final class (nothing can match)
    /// and unknown otherwise (a subclass could add it).
    fn class_pattern_attr_type(&self, result: &Type, cls: &Class, name: &Name) -> Type {
        let attr = match self.as_instance_class(result) {
            Some(ct) => self.type_order().instance_attribute(&ct, name),
            None => self.type_order().get_class_member(cls, name),
        };
        match attr {
            Some(ty) => ty,
            None => {
                if self.type_order().is_final(cls) {
                    Type::never()
                } else {
                    Type::any_implicit()
                }
            }
        }
    }

    /// The ordered attribute names from the class's `__match_args__`, found
    /// via the MRO. `None` when absent or not a tuple of string literals.
    fn class_match_args(&self, cls: &Class) -> Option<Vec<Name>> {
        let member = self.type_order().get_class_member(cls, &dunder::MATCH_ARGS)?;
        match member {
            Type::Tuple(Tuple::Concrete(elts)) => {
                let mut names = Vec::with_capacity(elts.len());
                for elt in elts {
                    match elt {
                        Type::Literal(Lit::Str(s)) => names.push(Name::new(&*s)),
                        _ => return None,
                    }
                }
                Some(names)
            }
            _ => None,
        }
    }

    fn is_self_matching_builtin(&self, cls: &Class) -> bool {
        let is_special =
            |c: &Class| SELF_MATCHING_BUILTINS.iter().any(|name| c.is_builtin(name));
        if is_special(cls) {
            return true;
        }
        self.resolver()
            .get_metadata_for_class(cls)
            .ancestors_no_object()
            .iter()
            .any(|ancestor| is_special(ancestor.class_object()))
    }
}
