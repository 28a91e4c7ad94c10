/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A small hand-built universe for exercising the narrowing engine: the
//! builtins the engine knows about, plus helpers for defining classes,
//! enums, TypedDicts and patterns on top of them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use dupe::Dupe;
use ruff_python_ast::name::Name;
use ruff_python_ast::Expr;
use ruff_python_ast::ExprContext;
use ruff_python_ast::ExprName;
use ruff_python_ast::Identifier;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;
use ruff_text_size::TextSize;
use starlark_map::small_map::SmallMap;
use starlark_map::small_set::SmallSet;
use vec1::Vec1;

use crate::binding::pattern::LiteralValue;
use crate::binding::pattern::MappingEntry;
use crate::binding::pattern::Pattern;
use crate::binding::pattern::PatternAs;
use crate::binding::pattern::PatternCapture;
use crate::binding::pattern::PatternClass;
use crate::binding::pattern::PatternClassArg;
use crate::binding::pattern::PatternLiteral;
use crate::binding::pattern::PatternMapping;
use crate::binding::pattern::PatternSequence;
use crate::binding::pattern::PatternValue;
use crate::dunder;
use crate::error::collector::ErrorCollector;
use crate::error::style::ErrorStyle;
use crate::module::module_info::ModuleInfo;
use crate::module::module_name::ModuleName;
use crate::narrow::PatternSolver;
use crate::narrow::Resolver;
use crate::solver::type_order::TypeOrder;
use crate::types::class::Class;
use crate::types::class::ClassIndex;
use crate::types::class::ClassType;
use crate::types::class::TArgs;
use crate::types::class_metadata::ClassMetadata;
use crate::types::class_metadata::EnumMetadata;
use crate::types::class_metadata::TypedDictMetadata;
use crate::types::literal::Lit;
use crate::types::quantified::Quantified;
use crate::types::stdlib::Stdlib;
use crate::types::tuple::Tuple;
use crate::types::type_var::Variance;
use crate::types::typed_dict::TypedDict;
use crate::types::typed_dict::TypedDictField;
use crate::types::types::TParam;
use crate::types::types::TParams;
use crate::types::types::Type;
use crate::util::uniques::UniqueFactory;

pub struct TestEnv {
    uniques: UniqueFactory,
    modules: HashMap<String, ModuleInfo>,
    class_map: HashMap<(String, String), Class>,
    metadata: HashMap<Class, Arc<ClassMetadata>>,
    exprs: HashMap<u32, Type>,
    no_eq: SmallSet<Class>,
    unreachable: SmallSet<u32>,
    next_offset: u32,
    next_class_index: u32,
    stdlib: Option<Stdlib>,
    errors: ErrorCollector,
}

impl Resolver for TestEnv {
    fn get_metadata_for_class(&self, cls: &Class) -> Arc<ClassMetadata> {
        self.metadata
            .get(cls)
            .cloned()
            .unwrap_or_else(|| Arc::new(ClassMetadata::recursive()))
    }

    fn type_of_expression(&self, x: &Expr) -> Type {
        self.exprs
            .get(&x.range().start().to_u32())
            .cloned()
            .unwrap_or_else(Type::any_error)
    }

    fn magic_method_call(
        &self,
        receiver: &Type,
        method: &Name,
        _arg: &Type,
        _range: TextRange,
    ) -> Option<Type> {
        if method != &dunder::EQ {
            return None;
        }
        // Everything that descends from `object` has `__eq__`; classes the
        // test explicitly stripped it from do not.
        let cls = match receiver {
            Type::ClassType(ct) => ct.class_object().dupe(),
            Type::Literal(lit) => lit.general_class_type(self.stdlib()).class_object().dupe(),
            Type::TypedDict(td) => td.class_object().dupe(),
            Type::Tuple(_) => self.stdlib().tuple_class_object().dupe(),
            Type::None => self.stdlib().none_type().class_object().dupe(),
            _ => return None,
        };
        if self.no_eq.contains(&cls) {
            return None;
        }
        Some(self.stdlib().bool().clone().to_type())
    }

    fn is_code_unreachable(&self, range: TextRange) -> bool {
        self.unreachable.contains(&range.start().to_u32())
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let main = ModuleInfo::new(
            ModuleName::from_str("main"),
            PathBuf::from("main.py"),
            Arc::new(" ".repeat(65536)),
        );
        let errors = ErrorCollector::new(main.dupe(), ErrorStyle::Delayed);
        let mut modules = HashMap::new();
        modules.insert("main".to_owned(), main);
        let mut env = TestEnv {
            uniques: UniqueFactory::new(),
            modules,
            class_map: HashMap::new(),
            metadata: HashMap::new(),
            exprs: HashMap::new(),
            no_eq: SmallSet::new(),
            unreachable: SmallSet::new(),
            next_offset: 0,
            next_class_index: 0,
            stdlib: None,
            errors,
        };
        env.register_builtins();
        let stdlib = Stdlib::new(|module, name| env.lookup_class(module, name));
        env.stdlib = Some(stdlib);
        env
    }

    fn register_builtins(&mut self) {
        let object = self.add_class("builtins", "object", TParams::default(), Vec::new());
        self.set_simple_metadata(&object, Vec::new(), false);
        for name in ["type", "int", "float", "complex", "NoneType"] {
            let cls = self.add_class("builtins", name, TParams::default(), Vec::new());
            self.set_simple_metadata(&cls, Vec::new(), false);
        }
        let int_ct = self.class_type("builtins", "int", Vec::new());
        let bool_cls = self.add_class("builtins", "bool", TParams::default(), Vec::new());
        self.set_simple_metadata(&bool_cls, vec![int_ct.clone()], false);

        let (seq_tparams, _) = self.tparams1("T", Variance::Covariant);
        let sequence = self.add_class("collections.abc", "Sequence", seq_tparams, Vec::new());
        self.set_simple_metadata(&sequence, Vec::new(), false);

        let (map_tparams, _, _) = self.tparams2("K", "V", Variance::Covariant);
        let mapping = self.add_class("collections.abc", "Mapping", map_tparams, Vec::new());
        self.set_simple_metadata(&mapping, Vec::new(), false);

        let seq_of = |env: &Self, elt: Type| {
            ClassType::new(
                env.lookup_class("collections.abc", "Sequence"),
                TArgs::new(vec![elt]),
            )
        };

        let str_cls = self.add_class("builtins", "str", TParams::default(), Vec::new());
        let str_ct = ClassType::new(str_cls.dupe(), TArgs::default());
        let str_ancestors = vec![seq_of(self, str_ct.clone().to_type())];
        self.set_simple_metadata(&str_cls, str_ancestors, false);
        for name in ["bytes", "bytearray"] {
            let cls = self.add_class("builtins", name, TParams::default(), Vec::new());
            let ancestors = vec![seq_of(self, int_ct.clone().to_type())];
            self.set_simple_metadata(&cls, ancestors, false);
        }

        for name in ["tuple", "list"] {
            let (tparams, t) = self.tparams1("T", Variance::Covariant);
            let cls = self.add_class("builtins", name, tparams, Vec::new());
            let ancestors = vec![seq_of(self, t.to_type())];
            self.set_simple_metadata(&cls, ancestors, false);
        }
        for name in ["set", "frozenset"] {
            let (tparams, _) = self.tparams1("T", Variance::Invariant);
            let cls = self.add_class("builtins", name, tparams, Vec::new());
            self.set_simple_metadata(&cls, Vec::new(), false);
        }
        let (dict_tparams, k, v) = self.tparams2("K", "V", Variance::Invariant);
        let dict = self.add_class("builtins", "dict", dict_tparams, Vec::new());
        let dict_ancestors = vec![ClassType::new(
            self.lookup_class("collections.abc", "Mapping"),
            TArgs::new(vec![k.to_type(), v.to_type()]),
        )];
        self.set_simple_metadata(&dict, dict_ancestors, false);
    }

    fn tparams1(&mut self, name: &str, variance: Variance) -> (TParams, Quantified) {
        let q = Quantified::type_var(&self.uniques, Name::new(name));
        let tparams = TParams::new(vec![TParam {
            quantified: q.clone(),
            name: Name::new(name),
            variance,
            default: None,
        }]);
        (tparams, q)
    }

    fn tparams2(
        &mut self,
        first: &str,
        second: &str,
        variance: Variance,
    ) -> (TParams, Quantified, Quantified) {
        let q1 = Quantified::type_var(&self.uniques, Name::new(first));
        let q2 = Quantified::type_var(&self.uniques, Name::new(second));
        let tparams = TParams::new(vec![
            TParam {
                quantified: q1.clone(),
                name: Name::new(first),
                variance,
                default: None,
            },
            TParam {
                quantified: q2.clone(),
                name: Name::new(second),
                variance,
                default: None,
            },
        ]);
        (tparams, q1, q2)
    }

    fn module(&mut self, name: &str) -> ModuleInfo {
        if let Some(m) = self.modules.get(name) {
            return m.dupe();
        }
        let info = ModuleInfo::new(
            ModuleName::from_str(name),
            PathBuf::from(format!("{}.py", name.replace('.', "/"))),
            Arc::new(" ".repeat(65536)),
        );
        self.modules.insert(name.to_owned(), info.dupe());
        info
    }

    fn fresh_range(&mut self) -> TextRange {
        let start = self.next_offset;
        self.next_offset += 2;
        TextRange::new(TextSize::new(start), TextSize::new(start + 1))
    }

    pub fn ident(&mut self, name: &str) -> Identifier {
        Identifier {
            id: Name::new(name),
            range: self.fresh_range(),
        }
    }

    pub fn add_class(
        &mut self,
        module: &str,
        name: &str,
        tparams: TParams,
        fields: Vec<(&str, Type)>,
    ) -> Class {
        let index = ClassIndex(self.next_class_index);
        self.next_class_index += 1;
        let name = self.ident(name);
        let module = self.module(module);
        let fields: SmallMap<Name, Type> = fields
            .into_iter()
            .map(|(k, v)| (Name::new(k), v))
            .collect();
        let cls = Class::new(index, name, module, tparams, fields);
        self.class_map.insert(
            (cls.module_name().as_str().to_owned(), cls.name().to_string()),
            cls.dupe(),
        );
        cls
    }

    fn set_simple_metadata(&mut self, cls: &Class, ancestors: Vec<ClassType>, is_final: bool) {
        self.set_metadata(
            cls,
            ClassMetadata::new(ancestors, None, is_final, None, None),
        );
    }

    pub fn set_metadata(&mut self, cls: &Class, metadata: ClassMetadata) {
        self.metadata.insert(cls.dupe(), Arc::new(metadata));
    }

    pub fn lookup_class(&self, module: &str, name: &str) -> Class {
        self.class_map
            .get(&(module.to_owned(), name.to_owned()))
            .unwrap_or_else(|| panic!("test universe is missing `{module}.{name}`"))
            .dupe()
    }

    pub fn stdlib(&self) -> &Stdlib {
        self.stdlib.as_ref().unwrap()
    }

    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    pub fn solver(&self) -> PatternSolver<'_, TestEnv> {
        PatternSolver::new(self, self.stdlib(), &self.errors)
    }

    pub fn type_order(&self) -> TypeOrder<'_, TestEnv> {
        TypeOrder::new(self, self.stdlib())
    }

    // Commonly used instance types.

    pub fn int_ty(&self) -> Type {
        self.stdlib().int().clone().to_type()
    }

    pub fn str_ty(&self) -> Type {
        self.stdlib().str().clone().to_type()
    }

    pub fn bool_ty(&self) -> Type {
        self.stdlib().bool().clone().to_type()
    }

    pub fn list_ty(&self, elt: Type) -> Type {
        self.stdlib().list(elt).to_type()
    }

    // Class/enum/TypedDict definition helpers.

    pub fn simple_class(
        &mut self,
        name: &str,
        ancestors: Vec<ClassType>,
        fields: Vec<(&str, Type)>,
    ) -> Class {
        let cls = self.add_class("main", name, TParams::default(), fields);
        self.set_simple_metadata(&cls, ancestors, false);
        cls
    }

    pub fn final_class(
        &mut self,
        name: &str,
        ancestors: Vec<ClassType>,
        fields: Vec<(&str, Type)>,
    ) -> Class {
        let cls = self.add_class("main", name, TParams::default(), fields);
        self.set_simple_metadata(&cls, ancestors, true);
        cls
    }

    pub fn enum_class(&mut self, name: &str, members: &[&str]) -> ClassType {
        let cls = self.add_class("main", name, TParams::default(), Vec::new());
        let ct = ClassType::new(cls.dupe(), TArgs::default());
        let members: SmallSet<Name> = members.iter().map(|m| Name::new(*m)).collect();
        self.set_metadata(
            &cls,
            ClassMetadata::new(
                Vec::new(),
                None,
                false,
                None,
                Some(EnumMetadata {
                    cls: ct.clone(),
                    members,
                }),
            ),
        );
        ct
    }

    /// Fields are (name, value type, required).
    pub fn typed_dict(&mut self, name: &str, fields: Vec<(&str, Type, bool)>) -> TypedDict {
        let cls = self.add_class("main", name, TParams::default(), Vec::new());
        let field_map: SmallMap<Name, TypedDictField> = fields
            .into_iter()
            .map(|(field_name, ty, required)| {
                (
                    Name::new(field_name),
                    TypedDictField {
                        ty,
                        required,
                        read_only: false,
                        provided: required,
                    },
                )
            })
            .collect();
        self.set_metadata(
            &cls,
            ClassMetadata::new(
                Vec::new(),
                None,
                false,
                Some(TypedDictMetadata {
                    fields: field_map.clone(),
                }),
                None,
            ),
        );
        TypedDict::new(cls, TArgs::default(), field_map)
    }

    pub fn remove_eq(&mut self, cls: &Class) {
        self.no_eq.insert(cls.dupe());
    }

    pub fn mark_unreachable(&mut self, pattern: &Pattern) {
        self.unreachable.insert(pattern.range().start().to_u32());
    }

    pub fn class_type(&self, module: &str, name: &str, targs: Vec<Type>) -> ClassType {
        ClassType::new(self.lookup_class(module, name), TArgs::new(targs))
    }

    /// The class-level `__match_args__` value for the given names.
    pub fn match_args(names: &[&str]) -> Type {
        Type::Tuple(Tuple::Concrete(
            names
                .iter()
                .map(|n| Lit::Str((*n).into()).to_type())
                .collect(),
        ))
    }

    // Expression and pattern construction. Each expression gets a fresh
    // range; the fixture evaluator answers by range.

    pub fn expr(&mut self, ty: Type) -> Expr {
        let range = self.fresh_range();
        self.exprs.insert(range.start().to_u32(), ty);
        Expr::Name(ExprName {
            range,
            id: Name::new("x"),
            ctx: ExprContext::Load,
        })
    }

    pub fn wildcard(&mut self) -> Pattern {
        Pattern::Capture(PatternCapture {
            range: self.fresh_range(),
            target: None,
        })
    }

    pub fn capture(&mut self, name: &str) -> Pattern {
        let target = self.ident(name);
        Pattern::Capture(PatternCapture {
            range: target.range,
            target: Some(target),
        })
    }

    pub fn lit_pat(&mut self, ty: Type) -> Pattern {
        let e = self.expr(ty);
        Pattern::Literal(PatternLiteral {
            range: e.range(),
            value: LiteralValue::Expr(Box::new(e)),
        })
    }

    pub fn lit_none_pat(&mut self) -> Pattern {
        Pattern::Literal(PatternLiteral {
            range: self.fresh_range(),
            value: LiteralValue::None,
        })
    }

    pub fn lit_bool_pat(&mut self, value: bool) -> Pattern {
        Pattern::Literal(PatternLiteral {
            range: self.fresh_range(),
            value: LiteralValue::Bool(value),
        })
    }

    pub fn value_pat(&mut self, ty: Type) -> Pattern {
        let e = self.expr(ty);
        Pattern::Value(PatternValue {
            range: e.range(),
            value: Box::new(e),
        })
    }

    pub fn seq_pat(&mut self, entries: Vec<Pattern>, star_index: Option<usize>) -> Pattern {
        Pattern::Sequence(PatternSequence {
            range: self.fresh_range(),
            entries,
            star_index,
        })
    }

    pub fn map_pat(&mut self, entries: Vec<MappingEntry>) -> Pattern {
        Pattern::Mapping(PatternMapping {
            range: self.fresh_range(),
            entries,
        })
    }

    pub fn class_pat(&mut self, cls: &Class, args: Vec<PatternClassArg>) -> Pattern {
        let e = self.expr(Type::ClassDef(cls.dupe()));
        Pattern::Class(PatternClass {
            range: e.range(),
            cls: Box::new(e),
            args,
        })
    }

    pub fn pos_arg(pattern: Pattern) -> PatternClassArg {
        PatternClassArg {
            name: None,
            pattern,
        }
    }

    pub fn kw_arg(&mut self, name: &str, pattern: Pattern) -> PatternClassArg {
        PatternClassArg {
            name: Some(self.ident(name)),
            pattern,
        }
    }

    pub fn or_pat(&mut self, patterns: Vec<Pattern>, target: Option<&str>) -> Pattern {
        let target = target.map(|t| self.ident(t));
        match Vec1::try_from_vec(patterns) {
            Ok(patterns) => Pattern::As(PatternAs {
                range: self.fresh_range(),
                patterns,
                target,
            }),
            Err(_) => panic!("or-pattern needs at least one alternative"),
        }
    }
}

/// A union built member by member, preserving insertion order.
pub fn union(xs: Vec<Type>) -> Type {
    crate::types::simplify::unions(xs)
}
