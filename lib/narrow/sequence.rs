/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::binding::pattern::PatternSequence;
use crate::narrow::PatternSolver;
use crate::narrow::Resolver;
use crate::solver::subset::unbounded_element;
use crate::types::literal::Lit;
use crate::types::simplify::unions;
use crate::types::tuple::Tuple;
use crate::types::types::AnyStyle;
use crate::types::types::Type;

/// How one union member looks to a sequence pattern.
pub(crate) enum SequenceShape {
    /// A tuple with a definite entry list.
    Tuple(Vec<Type>),
    /// An unbounded tuple or an ordered-sequence protocol subtype: the
    /// length is unknown, all we have is the element type.
    SequenceLike(Type),
    /// A gradual member; matches, and stays gradual.
    Gradual,
    NotASequence,
}

impl<'a, Ans: Resolver> PatternSolver<'a, Ans> {
    pub(crate) fn sequence_shape(&self, ty: &Type) -> SequenceShape {
        match ty {
            Type::Any(_) => SequenceShape::Gradual,
            Type::Tuple(Tuple::Concrete(elts)) => SequenceShape::Tuple(elts.clone()),
            Type::Tuple(Tuple::Unbounded(elt)) => SequenceShape::SequenceLike((**elt).clone()),
            Type::Tuple(Tuple::Unpacked(box_tup)) => {
                let (prefix, middle, suffix) = &**box_tup;
                let mut elements = prefix.clone();
                elements.push(unbounded_element(middle));
                elements.extend(suffix.iter().cloned());
                SequenceShape::SequenceLike(unions(elements))
            }
            // Strings satisfy the sequence protocol, but a string is not
            // taken apart by a sequence pattern.
            Type::Literal(Lit::Str(_) | Lit::Bytes(_)) => SequenceShape::NotASequence,
            Type::ClassType(ct) => {
                let stdlib = self.stdlib();
                if ct == stdlib.str() || ct == stdlib.bytes() || ct == stdlib.bytearray() {
                    return SequenceShape::NotASequence;
                }
                if ct.class_object() == stdlib.tuple_class_object() {
                    let element = ct
                        .targs()
                        .as_slice()
                        .first()
                        .cloned()
                        .unwrap_or_else(Type::any_implicit);
                    return SequenceShape::SequenceLike(element);
                }
                match self
                    .type_order()
                    .as_superclass(ct, stdlib.sequence_class_object())
                {
                    Some(seq) => {
                        let element = seq
                            .targs()
                            .as_slice()
                            .first()
                            .cloned()
                            .unwrap_or_else(Type::any_implicit);
                        SequenceShape::SequenceLike(element)
                    }
                    None => SequenceShape::NotASequence,
                }
            }
            _ => SequenceShape::NotASequence,
        }
    }

    pub(crate) fn narrow_sequence(
        &self,
        subject: &Type,
        x: &PatternSequence,
        positive: bool,
    ) -> Type {
        let entry_count = x.entries.len();
        let star = x.star_index;
        let min_entries = if star.is_some() {
            entry_count - 1
        } else {
            entry_count
        };
        self.map_subtypes(subject, |expanded, unexpanded| {
            match self.sequence_shape(expanded) {
                SequenceShape::NotASequence => {
                    if positive {
                        None
                    } else {
                        Some(unexpanded.clone())
                    }
                }
                SequenceShape::Gradual => Some(unexpanded.clone()),
                SequenceShape::Tuple(elts) => {
                    let len = elts.len();
                    let len_matches = match star {
                        Some(_) => len >= min_entries,
                        None => len == entry_count,
                    };
                    if positive {
                        if !len_matches {
                            return None;
                        }
                        self.narrow_tuple_entries(&elts, x)
                    } else {
                        // Eliminate only when the match is definite: the
                        // length is pinned down (or a lone star matches any
                        // length), and no entry narrowing loses anything.
                        let definite_len = match star {
                            None => len == entry_count,
                            Some(_) => entry_count == 1,
                        };
                        if definite_len && self.tuple_entries_definitely_match(&elts, x) {
                            None
                        } else {
                            Some(unexpanded.clone())
                        }
                    }
                }
                SequenceShape::SequenceLike(element) => {
                    if positive {
                        for (i, sub) in x.entries.iter().enumerate() {
                            let entry_ty = if star == Some(i) {
                                self.star_binding_type(std::slice::from_ref(&element))
                            } else {
                                element.clone()
                            };
                            if self.narrow(&entry_ty, sub, true).is_never() {
                                return None;
                            }
                        }
                        // The container is not proven immutable, so its
                        // shape is not refined.
                        Some(unexpanded.clone())
                    } else {
                        // The length is unknown, so the match is never
                        // definite.
                        Some(unexpanded.clone())
                    }
                }
            }
        })
    }

    /// Narrow every pattern position against its tuple entry and rebuild a
    /// refined tuple. `None` when some entry cannot match.
    fn narrow_tuple_entries(&self, elts: &[Type], x: &PatternSequence) -> Option<Type> {
        let n = x.entries.len();
        let k = elts.len();
        let mut rebuilt: Vec<Type> = Vec::with_capacity(k);
        for (i, sub) in x.entries.iter().enumerate() {
            match x.star_index {
                Some(s) if i == s => {
                    let span = &elts[s..s + (k - (n - 1))];
                    let star_ty = self.star_binding_type(span);
                    if self.narrow(&star_ty, sub, true).is_never() {
                        return None;
                    }
                    // The span keeps its original entries; only the fixed
                    // positions are refined.
                    rebuilt.extend(span.iter().cloned());
                }
                star => {
                    let idx = match star {
                        Some(s) if i > s => i + k - n,
                        _ => i,
                    };
                    let narrowed = self.narrow(&elts[idx], sub, true);
                    if narrowed.is_never() {
                        return None;
                    }
                    rebuilt.push(narrowed);
                }
            }
        }
        Some(Type::Tuple(Tuple::Concrete(rebuilt)))
    }

    /// Would positive narrowing keep every entry exactly as it is?
    fn tuple_entries_definitely_match(&self, elts: &[Type], x: &PatternSequence) -> bool {
        let n = x.entries.len();
        let k = elts.len();
        for (i, sub) in x.entries.iter().enumerate() {
            match x.star_index {
                Some(s) if i == s => {}
                star => {
                    let idx = match star {
                        Some(s) if i > s => i + k - n,
                        _ => i,
                    };
                    match elts.get(idx) {
                        Some(entry) => {
                            if !self.narrow(entry, sub, true).same(entry) {
                                return false;
                            }
                        }
                        // Star elimination only applies to the lone-star
                        // pattern, which has no fixed positions.
                        None => return false,
                    }
                }
            }
        }
        true
    }

    /// The type a star entry binds: an ordered list of the spanned element
    /// types, with literals forgotten. A gradual element absorbs the rest
    /// of the span.
    pub(crate) fn star_binding_type(&self, span: &[Type]) -> Type {
        let stdlib = self.stdlib();
        let mut gradual: Option<AnyStyle> = None;
        for t in span {
            if let Type::Any(style) = t {
                gradual = Some(match gradual {
                    None => *style,
                    Some(acc) => acc.join(*style),
                });
            }
        }
        let element = match gradual {
            Some(style) => Type::Any(style),
            None if span.is_empty() => Type::any_implicit(),
            None => unions(
                span.iter()
                    .map(|t| t.clone().promote_literals(stdlib))
                    .collect(),
            ),
        };
        stdlib.list(element).to_type()
    }
}
