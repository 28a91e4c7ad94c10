/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::sync::Arc;

use dupe::Clone_;
use dupe::Copy_;
use dupe::Dupe;
use dupe::Dupe_;
use ruff_python_ast::name::Name;
use starlark_map::small_map::SmallMap;

use crate::narrow::Resolver;
use crate::types::class::Class;
use crate::types::class::ClassType;
use crate::types::class::Substitution;
use crate::types::class::TArgs;
use crate::types::class_metadata::ClassMetadata;
use crate::types::stdlib::Stdlib;
use crate::types::typed_dict::TypedDict;
use crate::types::typed_dict::TypedDictField;
use crate::types::types::Type;

/// A view over the class graph, as the resolver reported it. This is what
/// the assignability oracle and the pattern engine use to answer nominal
/// questions: ancestry, metaclasses, member types.
///
/// All queries are read-only, and an MRO is walked at most once per query.
#[derive(Debug, Clone_, Copy_, Dupe_)]
pub struct TypeOrder<'a, Ans: Resolver> {
    resolver: &'a Ans,
    stdlib: &'a Stdlib,
}

impl<'a, Ans: Resolver> TypeOrder<'a, Ans> {
    pub fn new(resolver: &'a Ans, stdlib: &'a Stdlib) -> Self {
        Self { resolver, stdlib }
    }

    pub fn stdlib(self) -> &'a Stdlib {
        self.stdlib
    }

    pub fn get_metadata_for_class(self, cls: &Class) -> Arc<ClassMetadata> {
        self.resolver.get_metadata_for_class(cls)
    }

    pub fn is_final(self, cls: &Class) -> bool {
        self.get_metadata_for_class(cls).is_final()
    }

    /// Get an ancestor `ClassType`, in terms of the type parameters of `class`.
    fn get_ancestor(self, class: &Class, want: &Class) -> Option<ClassType> {
        self.get_metadata_for_class(class)
            .ancestors(self.stdlib)
            .find(|ancestor| ancestor.class_object() == want)
            .cloned()
    }

    /// Is `want` a superclass of `class` in the class hierarchy?
    pub fn has_superclass(self, class: &Class, want: &Class) -> bool {
        class == want || self.get_ancestor(class, want).is_some()
    }

    /// Return the type representing `class` upcast to `want`, if `want` is a
    /// supertype of `class` in the class hierarchy.
    pub fn as_superclass(self, class: &ClassType, want: &Class) -> Option<ClassType> {
        if class.class_object() == want {
            Some(class.clone())
        } else {
            self.get_ancestor(class.class_object(), want)
                .map(|ancestor| ancestor.substitute(&class.substitution()))
        }
    }

    /// Is the class object `got` an instance of the metaclass `want`?
    pub fn has_metaclass(self, got: &Class, want: &ClassType) -> bool {
        let metadata = self.get_metadata_for_class(got);
        let builtins_type = self.stdlib.builtins_type();
        let metaclass = metadata.metaclass().unwrap_or(builtins_type);
        metaclass == want
            || self.has_superclass(metaclass.class_object(), want.class_object())
            || want == builtins_type
    }

    /// The effective metaclass of a class object: the declared one, or `type`.
    pub fn metaclass_of(self, got: &Class) -> ClassType {
        self.get_metadata_for_class(got)
            .metaclass()
            .unwrap_or(self.stdlib.builtins_type())
            .clone()
    }

    /// The declared type of a member, found by walking the MRO, in terms of
    /// the type parameters of `cls`. Each ancestor is visited once.
    pub fn get_class_member(self, cls: &Class, name: &Name) -> Option<Type> {
        if let Some(field) = cls.get_field(name) {
            return Some(field.clone());
        }
        let metadata = self.get_metadata_for_class(cls);
        let result = metadata.ancestors(self.stdlib).find_map(|ancestor| {
            ancestor
                .class_object()
                .get_field(name)
                .map(|field| ancestor.substitution().substitute(field.clone()))
        });
        result
    }

    /// The type of a member accessed on an instance of `cls`, with the
    /// instance's type arguments substituted in.
    pub fn instance_attribute(self, cls: &ClassType, name: &Name) -> Option<Type> {
        self.get_class_member(cls.class_object(), name)
            .map(|member| cls.substitution().substitute(member))
    }

    /// Default type arguments for a bare class reference: declared defaults
    /// where present, gradual types otherwise.
    pub fn create_default_targs(self, cls: &Class) -> TArgs {
        let tparams = cls.tparams();
        if tparams.is_empty() {
            TArgs::default()
        } else {
            TArgs::new(
                tparams
                    .iter()
                    .map(|x| match &x.default {
                        Some(default) => default.clone(),
                        None => Type::any_implicit(),
                    })
                    .collect(),
            )
        }
    }

    /// The instance form of a class with the given arguments: a `TypedDict`
    /// for typed-dict classes, a `ClassType` for everything else.
    pub fn instance_of(self, cls: &Class, targs: TArgs) -> Type {
        match self.typed_dict_fields(cls, &targs) {
            Some(fields) => {
                Type::TypedDict(Box::new(TypedDict::new(cls.dupe(), targs, fields)))
            }
            None => ClassType::new(cls.dupe(), targs).to_type(),
        }
    }

    /// The instance form of a bare class reference, with gradual arguments
    /// where the class is generic. Never raises errors.
    pub fn promote_silently(self, cls: &Class) -> Type {
        let targs = self.create_default_targs(cls);
        self.instance_of(cls, targs)
    }

    /// The field map of a typed-dict class, substituted for `targs`.
    /// `None` when the class is not a TypedDict.
    pub fn typed_dict_fields(
        self,
        cls: &Class,
        targs: &TArgs,
    ) -> Option<SmallMap<Name, TypedDictField>> {
        let metadata = self.get_metadata_for_class(cls);
        let td = metadata.typed_dict_metadata()?;
        let substitution = Substitution::new(cls, targs);
        Some(
            td.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.clone().substitute(&substitution)))
                .collect(),
        )
    }
}
