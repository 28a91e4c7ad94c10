/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The pattern narrowing engine.
//!
//! `narrow` refines a subject type by a pattern, positively (the pattern
//! matched) or negatively (it did not). `bind_targets` is a second pass
//! that walks the pattern in lockstep with the narrowed subject and
//! produces the capture bindings. Everything the engine needs from the
//! rest of the checker comes through the [`Resolver`] trait.

pub mod bind;
pub mod class_pattern;
pub mod mapping;
pub mod pattern;
pub mod sequence;

use std::sync::Arc;

use ruff_python_ast::name::Name;
use ruff_python_ast::Expr;
use ruff_python_ast::Identifier;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;
use tracing::debug;

use crate::binding::pattern::Pattern;
use crate::error::collector::ErrorCollector;
use crate::error::kind::ErrorKind;
use crate::solver::subset::Subset;
use crate::solver::type_order::TypeOrder;
use crate::types::class::Class;
use crate::types::class::ClassType;
use crate::types::class_metadata::ClassMetadata;
use crate::types::literal::Lit;
use crate::types::simplify::unions;
use crate::types::stdlib::Stdlib;
use crate::types::type_var::Restriction;
use crate::types::types::Type;

/// What the narrowing engine needs from the surrounding checker. All of it
/// is synchronous and pure; the engine never writes through this trait.
pub trait Resolver {
    /// Derived facts about a class: MRO, metaclass, finality, whether it is
    /// a TypedDict or an enum.
    fn get_metadata_for_class(&self, cls: &Class) -> Arc<ClassMetadata>;

    /// The type of an expression, as the outer evaluator computed it.
    fn type_of_expression(&self, x: &Expr) -> Type;

    /// The return type of `receiver.method(arg)`, or `None` when the
    /// receiver has no such method. Used to probe `__eq__` for value
    /// patterns.
    fn magic_method_call(
        &self,
        receiver: &Type,
        method: &Name,
        arg: &Type,
        range: TextRange,
    ) -> Option<Type>;

    /// Whether this code was already proven unreachable. Unreachable
    /// patterns produce no bindings.
    fn is_code_unreachable(&self, range: TextRange) -> bool {
        let _ = range;
        false
    }
}

/// The outcome of checking one `case`: the positively narrowed subject and
/// the capture bindings, in source order.
#[derive(Debug)]
pub struct CaseOutcome {
    pub narrowed: Type,
    pub bindings: Vec<(Identifier, Type)>,
}

pub struct PatternSolver<'a, Ans: Resolver> {
    resolver: &'a Ans,
    stdlib: &'a Stdlib,
    errors: &'a ErrorCollector,
}

impl<'a, Ans: Resolver> PatternSolver<'a, Ans> {
    pub fn new(resolver: &'a Ans, stdlib: &'a Stdlib, errors: &'a ErrorCollector) -> Self {
        Self {
            resolver,
            stdlib,
            errors,
        }
    }

    pub fn resolver(&self) -> &'a Ans {
        self.resolver
    }

    pub fn stdlib(&self) -> &'a Stdlib {
        self.stdlib
    }

    pub fn errors(&self) -> &'a ErrorCollector {
        self.errors
    }

    pub fn type_order(&self) -> TypeOrder<'a, Ans> {
        TypeOrder::new(self.resolver, self.stdlib)
    }

    /// Is `src` usable where `dest` is expected?
    pub fn is_assignable(&self, dest: &Type, src: &Type) -> bool {
        Subset::new(self.type_order()).is_subset_eq(src, dest)
    }

    /// Narrow a full case pattern, report a case that can never match, and
    /// produce the bindings from the narrowed subject.
    pub fn solve_case(&self, subject: &Type, pattern: &Pattern) -> CaseOutcome {
        debug!("narrowing case pattern against `{subject}`");
        let narrowed = self.narrow(subject, pattern, true);
        if narrowed.is_never() && !subject.is_never() {
            self.errors.add(
                pattern.range(),
                format!("Pattern can never match subject of type `{subject}`"),
                ErrorKind::PatternNeverMatches,
            );
        }
        let bindings = self.bind_targets(&narrowed, pattern);
        CaseOutcome { narrowed, bindings }
    }

    /// The members of a union, paired up as (expanded, unexpanded): a type
    /// variable is classified through its bound or constraints, but kept
    /// unexpanded in results it survives into whole.
    pub(crate) fn expanded_members(&self, ty: &Type) -> Vec<(Type, Type)> {
        let members: &[Type] = match ty {
            Type::Union(xs) => xs,
            t => std::slice::from_ref(t),
        };
        let mut res = Vec::new();
        for m in members {
            let expanded = self.expand_type_var(m);
            match expanded {
                Type::Union(xs) if !m.is_union() => {
                    for x in xs {
                        res.push((x, m.clone()));
                    }
                }
                _ => res.push((expanded, m.clone())),
            }
        }
        res
    }

    /// Visit each union member in insertion order, replacing it by what `f`
    /// returns and dropping it on `None`.
    pub(crate) fn map_subtypes(
        &self,
        ty: &Type,
        mut f: impl FnMut(&Type, &Type) -> Option<Type>,
    ) -> Type {
        let mut res = Vec::new();
        for (expanded, unexpanded) in self.expanded_members(ty) {
            if let Some(t) = f(&expanded, &unexpanded) {
                res.push(t);
            }
        }
        unions(res)
    }

    fn expand_type_var(&self, ty: &Type) -> Type {
        match ty {
            Type::TypeVar(tv) => match tv.restriction() {
                Restriction::Bound(bound) => bound.clone(),
                Restriction::Constraints(constraints) => unions(constraints.clone()),
                Restriction::Unrestricted => self.stdlib.object_class_type().clone().to_type(),
            },
            Type::Quantified(_) => self.stdlib.object_class_type().clone().to_type(),
            _ => ty.clone(),
        }
    }

    /// The class form a pattern sees a subject member as, with literals
    /// forgotten and structural instances mapped to their classes.
    pub(crate) fn as_instance_class(&self, ty: &Type) -> Option<ClassType> {
        match ty {
            Type::ClassType(c) => Some(c.clone()),
            Type::Literal(lit) => Some(lit.general_class_type(self.stdlib).clone()),
            Type::Tuple(tuple) => {
                let mut elements = Vec::new();
                tuple.visit(&mut |t| elements.push(t.clone()));
                Some(self.stdlib.tuple(unions(elements)))
            }
            Type::TypedDict(td) => Some(td.as_class_type()),
            _ => None,
        }
    }

    /// The literal members of an enum class, in declaration order, or
    /// `None` if the class is not an enum.
    pub fn enum_member_literals(&self, cls: &ClassType) -> Option<Vec<Lit>> {
        let metadata = self.resolver.get_metadata_for_class(cls.class_object());
        let enum_metadata = metadata.enum_metadata()?;
        Some(
            enum_metadata
                .members
                .iter()
                .map(|name| Lit::enum_member(cls.clone(), name.clone()))
                .collect(),
        )
    }
}
