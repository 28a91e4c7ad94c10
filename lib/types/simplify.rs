/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use starlark_map::small_set::SmallSet;

use crate::types::types::AnyStyle;
use crate::types::types::Type;

/// Combine a list of types into a union.
///
/// Empty input is `Never`, a single member is returned as-is, and anything
/// else becomes a `Union` that is flattened, freed of `Never` members, and
/// deduplicated while preserving first-occurrence order. The order matters:
/// everything downstream iterates unions deterministically.
pub fn unions(xs: Vec<Type>) -> Type {
    if xs.is_empty() {
        return Type::never();
    }
    fn flatten(xs: Vec<Type>, res: &mut Vec<Type>) {
        for x in xs {
            match x {
                Type::Union(members) => flatten(members, res),
                Type::Never(_) => {}
                _ => res.push(x),
            }
        }
    }
    let mut res = Vec::with_capacity(xs.len());
    flatten(xs, &mut res);

    let mut seen = SmallSet::new();
    res.retain(|x| seen.insert(x.clone()));

    if res.is_empty() {
        Type::never()
    } else if res.len() == 1 {
        res.pop().unwrap()
    } else {
        Type::Union(res)
    }
}

/// Like [`unions`], but a gradual member swallows the whole union. Callers
/// ask for this explicitly; ordinary union construction keeps `Any`
/// alongside the other members.
pub fn unions_with_any_collapse(xs: Vec<Type>) -> Type {
    let mut style: Option<AnyStyle> = None;
    for x in &xs {
        if let Type::Any(s) = x {
            style = Some(match style {
                None => *s,
                Some(t) => t.join(*s),
            });
        }
    }
    match style {
        Some(s) => Type::Any(s),
        None => unions(xs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unions_flatten() {
        let u = unions(vec![
            Type::None,
            Type::Union(vec![Type::any_explicit(), Type::None]),
        ]);
        assert_eq!(u, Type::Union(vec![Type::None, Type::any_explicit()]));
    }

    #[test]
    fn test_unions_drop_never() {
        assert_eq!(unions(vec![Type::never(), Type::None]), Type::None);
        assert_eq!(unions(Vec::new()), Type::never());
        assert_eq!(unions(vec![Type::never()]), Type::never());
    }

    #[test]
    fn test_any_collapse_is_explicit() {
        let xs = vec![Type::None, Type::any_explicit()];
        assert!(unions(xs.clone()).is_union());
        assert_eq!(unions_with_any_collapse(xs), Type::any_explicit());
    }
}
