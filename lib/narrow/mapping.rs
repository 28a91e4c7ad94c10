/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use ruff_python_ast::name::Name;

use crate::binding::pattern::MappingEntry;
use crate::binding::pattern::Pattern;
use crate::binding::pattern::PatternMapping;
use crate::narrow::PatternSolver;
use crate::narrow::Resolver;
use crate::types::literal::Lit;
use crate::types::simplify::unions;
use crate::types::typed_dict::TypedDict;
use crate::types::types::Type;

/// How one union member looks to a mapping pattern.
pub(crate) enum MappingShape {
    TypedDict(TypedDict),
    /// A mapping-protocol subtype, reduced to its key and value types.
    MappingOf(Type, Type),
    /// A supertype of the mapping protocol: could hold a mapping, but we
    /// know nothing about keys or values.
    MappingSupertype,
    Gradual,
    NotAMapping,
}

impl<'a, Ans: Resolver> PatternSolver<'a, Ans> {
    pub(crate) fn mapping_shape(&self, ty: &Type) -> MappingShape {
        match ty {
            Type::Any(_) => MappingShape::Gradual,
            Type::TypedDict(td) => MappingShape::TypedDict((**td).clone()),
            Type::ClassType(ct) => {
                let stdlib = self.stdlib();
                match self
                    .type_order()
                    .as_superclass(ct, stdlib.mapping_class_object())
                {
                    Some(mapping) => {
                        let targs = mapping.targs().as_slice();
                        MappingShape::MappingOf(
                            targs.first().cloned().unwrap_or_else(Type::any_implicit),
                            targs.get(1).cloned().unwrap_or_else(Type::any_implicit),
                        )
                    }
                    None => {
                        let mapping_of_unknown = stdlib
                            .mapping(Type::any_implicit(), Type::any_implicit())
                            .to_type();
                        if self.is_assignable(&ct.clone().to_type(), &mapping_of_unknown) {
                            MappingShape::MappingSupertype
                        } else {
                            MappingShape::NotAMapping
                        }
                    }
                }
            }
            _ => MappingShape::NotAMapping,
        }
    }

    pub(crate) fn narrow_mapping(
        &self,
        subject: &Type,
        x: &PatternMapping,
        positive: bool,
    ) -> Type {
        // A mapping pattern with no entries proves nothing either way.
        if x.entries.is_empty() {
            return subject.clone();
        }
        if positive {
            self.map_subtypes(subject, |expanded, unexpanded| {
                match self.mapping_shape(expanded) {
                    MappingShape::NotAMapping => None,
                    MappingShape::Gradual => Some(unexpanded.clone()),
                    MappingShape::TypedDict(td) => self.narrow_typed_dict(td, x),
                    MappingShape::MappingOf(key_ty, value_ty) => {
                        for entry in &x.entries {
                            if let MappingEntry::Item(key_pat, value_pat) = entry {
                                if self.narrow(&key_ty, key_pat, true).is_never()
                                    || self.narrow(&value_ty, value_pat, true).is_never()
                                {
                                    return None;
                                }
                            }
                        }
                        Some(unexpanded.clone())
                    }
                    MappingShape::MappingSupertype => {
                        // Treated as a mapping of unknowns: entry patterns
                        // are checked against Unknown and so never fail.
                        Some(unexpanded.clone())
                    }
                }
            })
        } else {
            self.narrow_mapping_negative(subject, x)
        }
    }

    /// Positive narrowing of one TypedDict member: resolve the key pattern
    /// against the literal key universe, narrow the matched fields' value
    /// types, and record presence proofs for NotRequired keys.
    fn narrow_typed_dict(&self, td: TypedDict, x: &PatternMapping) -> Option<Type> {
        let mut td = td;
        for entry in &x.entries {
            let MappingEntry::Item(key_pat, value_pat) = entry else {
                // Expand entries bind; they never narrow.
                continue;
            };
            let universe = typed_dict_key_universe(&td);
            let narrowed_keys = self.narrow(&universe, key_pat, true);
            if narrowed_keys.is_never() {
                return None;
            }
            for key in literal_str_members(&narrowed_keys) {
                let field = td.fields().get(&key)?.clone();
                if self.narrow(&field.ty, value_pat, true).is_never() {
                    return None;
                }
                if !field.required && !field.provided {
                    // The pattern just proved the key is present. The proof
                    // goes on a clone; the declared TypedDict is shared.
                    td = td.with_provided(&key);
                }
            }
        }
        Some(Type::TypedDict(Box::new(td)))
    }

    /// Negative narrowing is deliberately conservative: only the classic
    /// tagged-union discriminator - a single literal-string key whose value
    /// pattern is a disjunction of literals - eliminates anything.
    fn narrow_mapping_negative(&self, subject: &Type, x: &PatternMapping) -> Type {
        let discriminator = match x.entries.as_slice() {
            [MappingEntry::Item(Pattern::Literal(key_pat), value_pat)] => {
                match (self.literal_type(key_pat), self.literal_disjunction(value_pat)) {
                    (Type::Literal(Lit::Str(key)), Some(value_lits)) => {
                        Some((Name::new(&*key), value_lits))
                    }
                    _ => None,
                }
            }
            _ => None,
        };
        let Some((key, value_lits)) = discriminator else {
            return subject.clone();
        };
        self.map_subtypes(subject, |expanded, unexpanded| {
            if let Type::TypedDict(td) = expanded {
                if let Some(field) = td.fields().get(&key) {
                    if matches!(&field.ty, Type::Literal(_))
                        && value_lits.iter().any(|lit| lit == &field.ty)
                    {
                        // The discriminant pins this member down; a failed
                        // match rules it out entirely.
                        return None;
                    }
                }
            }
            Some(unexpanded.clone())
        })
    }

    /// The literal alternatives of a value pattern, if it consists of
    /// nothing else.
    fn literal_disjunction(&self, p: &Pattern) -> Option<Vec<Type>> {
        match p {
            Pattern::Literal(x) => Some(vec![self.literal_type(x)]),
            Pattern::As(x) if x.target.is_none() => {
                let mut res = Vec::new();
                for sub in &x.patterns {
                    match sub {
                        Pattern::Literal(l) => res.push(self.literal_type(l)),
                        _ => return None,
                    }
                }
                Some(res)
            }
            _ => None,
        }
    }

    /// The type an `**rest` target binds: a dict over the combined key and
    /// value types of the member mappings. TypedDict members contribute
    /// string keys and unknown values.
    pub(crate) fn expand_binding_type(&self, subject: &Type) -> Type {
        let stdlib = self.stdlib();
        let mut res = Vec::new();
        for (expanded, _) in self.expanded_members(subject) {
            match self.mapping_shape(&expanded) {
                MappingShape::TypedDict(_) => res.push(
                    stdlib
                        .dict(stdlib.str().clone().to_type(), Type::any_implicit())
                        .to_type(),
                ),
                MappingShape::MappingOf(key_ty, value_ty) => {
                    res.push(stdlib.dict(key_ty, value_ty).to_type())
                }
                MappingShape::Gradual | MappingShape::MappingSupertype => res.push(
                    stdlib
                        .dict(Type::any_implicit(), Type::any_implicit())
                        .to_type(),
                ),
                MappingShape::NotAMapping => {}
            }
        }
        if res.is_empty() {
            stdlib
                .dict(Type::any_implicit(), Type::any_implicit())
                .to_type()
        } else {
            unions(res)
        }
    }
}

/// The set of keys a TypedDict is known to have, as a union of string
/// literals. Key patterns are narrowed against this universe.
pub(crate) fn typed_dict_key_universe(td: &TypedDict) -> Type {
    unions(
        td.fields()
            .keys()
            .map(|k| Lit::Str(k.as_str().into()).to_type())
            .collect(),
    )
}

pub(crate) fn literal_str_members(keys: &Type) -> Vec<Name> {
    let members: &[Type] = match keys {
        Type::Union(xs) => xs,
        t => std::slice::from_ref(t),
    };
    members
        .iter()
        .filter_map(|t| match t {
            Type::Literal(Lit::Str(s)) => Some(Name::new(&**s)),
            _ => None,
        })
        .collect()
}
