/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::binding::pattern::LiteralValue;
use crate::binding::pattern::Pattern;
use crate::binding::pattern::PatternAs;
use crate::binding::pattern::PatternLiteral;
use crate::binding::pattern::PatternValue;
use crate::dunder;
use crate::narrow::PatternSolver;
use crate::narrow::Resolver;
use crate::types::literal::Lit;
use crate::types::simplify::unions;
use crate::types::types::Type;

impl<'a, Ans: Resolver> PatternSolver<'a, Ans> {
    /// Refine `subject` by `pattern`. Positive polarity refines to what can
    /// still be there once the pattern matched; negative polarity to what
    /// can still be there once it did not.
    pub fn narrow(&self, subject: &Type, pattern: &Pattern, positive: bool) -> Type {
        match pattern {
            Pattern::Capture(_) => {
                if positive {
                    subject.clone()
                } else {
                    Type::never()
                }
            }
            Pattern::As(x) => self.narrow_as(subject, x, positive),
            Pattern::Literal(x) => self.narrow_literal(subject, x, positive),
            Pattern::Value(x) => self.narrow_value(subject, x, positive),
            Pattern::Sequence(x) => self.narrow_sequence(subject, x, positive),
            Pattern::Mapping(x) => self.narrow_mapping(subject, x, positive),
            Pattern::Class(x) => self.narrow_class(subject, x, positive),
            Pattern::Error(_) => subject.clone(),
        }
    }

    /// Or-patterns distribute left to right: each alternative sees only
    /// what the previous alternatives failed to match, and the positive
    /// results are unioned back together.
    fn narrow_as(&self, subject: &Type, x: &PatternAs, positive: bool) -> Type {
        if positive {
            let mut remainder = subject.clone();
            let mut narrowed = Vec::new();
            for p in &x.patterns {
                narrowed.push(self.narrow(&remainder, p, true));
                remainder = self.narrow(&remainder, p, false);
            }
            unions(narrowed)
        } else {
            let mut remainder = subject.clone();
            for p in &x.patterns {
                remainder = self.narrow(&remainder, p, false);
            }
            remainder
        }
    }

    pub(crate) fn literal_type(&self, x: &PatternLiteral) -> Type {
        match &x.value {
            LiteralValue::Expr(e) => self.resolver().type_of_expression(e),
            LiteralValue::None => Type::None,
            LiteralValue::Bool(b) => Lit::Bool(*b).to_type(),
        }
    }

    fn narrow_literal(&self, subject: &Type, x: &PatternLiteral, positive: bool) -> Type {
        let lit_ty = self.literal_type(x);
        if positive {
            self.map_subtypes(subject, |expanded, unexpanded| {
                if self.is_assignable(&lit_ty, expanded) {
                    // The member is already at least as precise as the literal.
                    Some(unexpanded.clone())
                } else if self.is_assignable(expanded, &lit_ty) {
                    Some(lit_ty.clone())
                } else {
                    None
                }
            })
        } else {
            self.map_subtypes(subject, |expanded, unexpanded| {
                match (expanded, &lit_ty) {
                    // The same literal definitely matches, so it is gone.
                    (Type::Literal(a), Type::Literal(b)) if a == b => None,
                    (Type::None, Type::None) => None,
                    // A bool that is not one literal is the other literal.
                    (Type::ClassType(c), Type::Literal(Lit::Bool(b)))
                        if c == self.stdlib().bool() =>
                    {
                        Some(Lit::Bool(!*b).to_type())
                    }
                    _ => Some(unexpanded.clone()),
                }
            })
        }
    }

    /// Value patterns compare via `__eq__`, so a subject member survives a
    /// positive test iff the equality method exists for the pairing. Only
    /// matching enum literals are precise enough to eliminate negatively.
    fn narrow_value(&self, subject: &Type, x: &PatternValue, positive: bool) -> Type {
        let value_ty = self.resolver().type_of_expression(&x.value);
        let mut results = Vec::new();
        for (value_expanded, value_unexpanded) in self.expanded_members(&value_ty) {
            let narrowed = self.map_subtypes(subject, |subject_expanded, subject_unexpanded| {
                if positive {
                    if subject_expanded.is_never() || value_expanded.is_never() {
                        return None;
                    }
                    if subject_expanded.is_gradual() || value_unexpanded.is_gradual() {
                        // Unknown wins over Any when the two mix.
                        return Some(
                            if subject_expanded.is_unknown() || value_unexpanded.is_unknown() {
                                Type::any_implicit()
                            } else {
                                Type::any_explicit()
                            },
                        );
                    }
                    let ret = self.resolver().magic_method_call(
                        subject_expanded,
                        &dunder::EQ,
                        &value_unexpanded,
                        x.range,
                    );
                    if ret.is_some() {
                        Some(subject_unexpanded.clone())
                    } else {
                        None
                    }
                } else {
                    match (subject_expanded, &value_expanded) {
                        (Type::Literal(a @ Lit::Enum(_)), Type::Literal(b @ Lit::Enum(_)))
                            if a == b =>
                        {
                            None
                        }
                        _ => Some(subject_unexpanded.clone()),
                    }
                }
            });
            results.push(narrowed);
        }
        unions(results)
    }
}
