/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The second pass over a matched pattern: walk it in lockstep with the
//! narrowed subject and assign every capture target. Projections are
//! recomputed with the narrowing helpers so bindings reflect the matched
//! subset, not the original subject.

use ruff_python_ast::Identifier;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;

use crate::binding::pattern::MappingEntry;
use crate::binding::pattern::Pattern;
use crate::binding::pattern::PatternClass;
use crate::binding::pattern::PatternMapping;
use crate::binding::pattern::PatternSequence;
use crate::error::kind::ErrorKind;
use crate::narrow::mapping::literal_str_members;
use crate::narrow::mapping::typed_dict_key_universe;
use crate::narrow::mapping::MappingShape;
use crate::narrow::sequence::SequenceShape;
use crate::narrow::PatternSolver;
use crate::narrow::Resolver;
use crate::types::class::Class;
use crate::types::literal::Lit;
use crate::types::simplify::unions;
use crate::types::types::Type;

impl<'a, Ans: Resolver> PatternSolver<'a, Ans> {
    /// Assign every capture target, mapping expand target and as-target in
    /// `pattern`, against the (already narrowed) `subject`. Bindings come
    /// back in source order.
    pub fn bind_targets(&self, subject: &Type, pattern: &Pattern) -> Vec<(Identifier, Type)> {
        let mut bindings = Vec::new();
        self.bind_pattern(subject, pattern, &mut bindings);
        bindings
    }

    fn bind_pattern(
        &self,
        subject: &Type,
        pattern: &Pattern,
        out: &mut Vec<(Identifier, Type)>,
    ) {
        if self.resolver().is_code_unreachable(pattern.range()) {
            return;
        }
        match pattern {
            Pattern::Capture(x) => match &x.target {
                Some(target) => out.push((target.clone(), subject.clone())),
                None => self.report_wildcard_unknown(subject, x.range),
            },
            Pattern::As(x) => {
                let mut remainder = subject.clone();
                for p in &x.patterns {
                    let matched = self.narrow(&remainder, p, true);
                    if matched.is_never() && !remainder.is_never() {
                        self.errors().add(
                            p.range(),
                            format!(
                                "Pattern can never match subject of type `{remainder}`"
                            ),
                            ErrorKind::PatternNeverMatches,
                        );
                    }
                    self.bind_pattern(&matched, p, out);
                    remainder = self.narrow(&remainder, p, false);
                }
                if let Some(target) = &x.target {
                    out.push((target.clone(), subject.clone()));
                }
            }
            Pattern::Sequence(x) => self.bind_sequence(subject, x, out),
            Pattern::Mapping(x) => self.bind_mapping(subject, x, out),
            Pattern::Class(x) => self.bind_class(subject, x, out),
            Pattern::Literal(_) | Pattern::Value(_) | Pattern::Error(_) => {}
        }
    }

    fn report_wildcard_unknown(&self, subject: &Type, range: TextRange) {
        if subject.is_unknown() {
            self.errors().add(
                range,
                "Wildcard pattern captures a value of unknown type".to_owned(),
                ErrorKind::WildcardPatternTypeUnknown,
            );
        } else if subject.contains_unknown() {
            self.errors().add(
                range,
                format!("Wildcard pattern captures a value of partially unknown type `{subject}`"),
                ErrorKind::WildcardPatternTypePartiallyUnknown,
            );
        }
    }

    fn bind_sequence(
        &self,
        subject: &Type,
        x: &PatternSequence,
        out: &mut Vec<(Identifier, Type)>,
    ) {
        let n = x.entries.len();
        for (i, sub) in x.entries.iter().enumerate() {
            let mut projections = Vec::new();
            for (expanded, _) in self.expanded_members(subject) {
                match self.sequence_shape(&expanded) {
                    SequenceShape::Tuple(elts) => {
                        let k = elts.len();
                        match x.star_index {
                            Some(s) if i == s => {
                                if k + 1 >= n {
                                    projections
                                        .push(self.star_binding_type(&elts[s..s + (k - (n - 1))]));
                                }
                            }
                            star => {
                                let idx = match star {
                                    Some(s) if i > s => (i + k).checked_sub(n),
                                    _ => Some(i),
                                };
                                if let Some(entry) = idx.and_then(|idx| elts.get(idx)) {
                                    projections.push(entry.clone());
                                }
                            }
                        }
                    }
                    SequenceShape::SequenceLike(element) => {
                        if x.star_index == Some(i) {
                            projections
                                .push(self.star_binding_type(std::slice::from_ref(&element)));
                        } else {
                            projections.push(element);
                        }
                    }
                    SequenceShape::Gradual => projections.push(expanded.clone()),
                    SequenceShape::NotASequence => {}
                }
            }
            let entry_ty = if projections.is_empty() {
                Type::any_implicit()
            } else {
                unions(projections)
            };
            let entry_narrowed = self.narrow(&entry_ty, sub, true);
            self.bind_pattern(&entry_narrowed, sub, out);
        }
    }

    fn bind_mapping(
        &self,
        subject: &Type,
        x: &PatternMapping,
        out: &mut Vec<(Identifier, Type)>,
    ) {
        for entry in &x.entries {
            match entry {
                MappingEntry::Item(key_pat, value_pat) => {
                    let mut key_projections = Vec::new();
                    let mut value_projections = Vec::new();
                    for (expanded, _) in self.expanded_members(subject) {
                        match self.mapping_shape(&expanded) {
                            MappingShape::TypedDict(td) => {
                                let universe = typed_dict_key_universe(&td);
                                let narrowed_keys = self.narrow(&universe, key_pat, true);
                                for key in literal_str_members(&narrowed_keys) {
                                    if let Some(field) = td.fields().get(&key) {
                                        key_projections
                                            .push(Lit::Str(key.as_str().into()).to_type());
                                        value_projections.push(field.ty.clone());
                                    }
                                }
                            }
                            MappingShape::MappingOf(key_ty, value_ty) => {
                                key_projections.push(key_ty);
                                value_projections.push(value_ty);
                            }
                            MappingShape::Gradual | MappingShape::MappingSupertype => {
                                key_projections.push(Type::any_implicit());
                                value_projections.push(Type::any_implicit());
                            }
                            MappingShape::NotAMapping => {}
                        }
                    }
                    let key_ty = if key_projections.is_empty() {
                        Type::any_implicit()
                    } else {
                        unions(key_projections)
                    };
                    self.bind_pattern(&self.narrow(&key_ty, key_pat, true), key_pat, out);
                    let value_ty = if value_projections.is_empty() {
                        Type::any_implicit()
                    } else {
                        unions(value_projections)
                    };
                    self.bind_pattern(&self.narrow(&value_ty, value_pat, true), value_pat, out);
                }
                MappingEntry::Expand(target) => {
                    out.push((target.clone(), self.expand_binding_type(subject)));
                }
            }
        }
    }

    fn bind_class(&self, subject: &Type, x: &PatternClass, out: &mut Vec<(Identifier, Type)>) {
        let Some(cls) = self.pattern_class_of(x) else {
            // Already reported during narrowing; still visit the
            // subpatterns so their captures exist.
            for arg in &x.args {
                self.bind_pattern(&Type::any_implicit(), &arg.pattern, out);
            }
            return;
        };
        let member_results: Vec<Type> = self
            .expanded_members(subject)
            .into_iter()
            .map(|(_, unexpanded)| unexpanded)
            .collect();
        for (arg_index, arg) in x.args.iter().enumerate() {
            let mut projections = Vec::new();
            for member in &member_results {
                let arg_types = self.class_pattern_arg_types_quiet(member, &cls, x);
                if let Some(ty) = arg_types.into_iter().nth(arg_index) {
                    projections.push(ty);
                }
            }
            let attr_ty = if projections.is_empty() {
                Type::any_implicit()
            } else {
                unions(projections)
            };
            self.bind_pattern(&self.narrow(&attr_ty, &arg.pattern, true), &arg.pattern, out);
        }
    }

    /// The class a class pattern refers to, without diagnostics (those were
    /// produced when the pattern was narrowed).
    pub(crate) fn pattern_class_of(&self, x: &PatternClass) -> Option<Class> {
        match self.resolver().type_of_expression(&x.cls) {
            Type::ClassDef(c) => Some(c),
            Type::Type(inner) => match &*inner {
                Type::ClassType(ct) => Some(ct.class_object().clone()),
                _ => None,
            },
            Type::TypeAlias(ta) => match ta.as_value() {
                Type::ClassType(ct) => Some(ct.class_object().clone()),
                Type::ClassDef(c) => Some(c),
                _ => None,
            },
            _ => None,
        }
    }
}
