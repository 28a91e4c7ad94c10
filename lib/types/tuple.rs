/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use crate::types::types::Type;
use crate::util::display::commas_iter;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tuple {
    /// An ordered, finite list of entry types, e.g. `tuple[int, str]`.
    Concrete(Vec<Type>),
    /// An arbitrary number of entries of a single type, e.g. `tuple[int, ...]`.
    Unbounded(Box<Type>),
    /// A fixed prefix and suffix around an unbounded (or variadic) middle,
    /// e.g. `tuple[int, *tuple[str, ...], bool]`. The prefix and suffix may
    /// be empty, but not both: that would just be the middle.
    Unpacked(Box<(Vec<Type>, Type, Vec<Type>)>),
}

impl Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tuple::Concrete(elts) => {
                if elts.is_empty() {
                    write!(f, "tuple[()]")
                } else {
                    write!(f, "tuple[{}]", commas_iter(|| elts.iter()))
                }
            }
            Tuple::Unbounded(elt) => write!(f, "tuple[{elt}, ...]"),
            Tuple::Unpacked(box_tup) => {
                let (prefix, middle, suffix) = &**box_tup;
                write!(f, "tuple[")?;
                for p in prefix {
                    write!(f, "{p}, ")?;
                }
                write!(f, "*{middle}")?;
                for s in suffix {
                    write!(f, ", {s}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl Tuple {
    pub fn concrete(elts: Vec<Type>) -> Self {
        Tuple::Concrete(elts)
    }

    pub fn unbounded(elt: Type) -> Self {
        Tuple::Unbounded(Box::new(elt))
    }

    pub fn unpacked(prefix: Vec<Type>, middle: Type, suffix: Vec<Type>) -> Self {
        if prefix.is_empty() && suffix.is_empty() {
            if let Type::Tuple(middle) = middle {
                return middle;
            }
        }
        Tuple::Unpacked(Box::new((prefix, middle, suffix)))
    }

    /// Build a tuple from specialization entries, each optionally flagged
    /// unbounded. At most one entry may be unbounded; a second one makes
    /// the specialization invalid and yields `None`.
    pub fn from_entries(entries: Vec<(Type, bool)>) -> Option<Self> {
        let mut prefix = Vec::new();
        let mut middle: Option<Type> = None;
        let mut suffix = Vec::new();
        for (ty, unbounded) in entries {
            if unbounded {
                if middle.is_some() {
                    return None;
                }
                middle = Some(ty);
            } else if middle.is_none() {
                prefix.push(ty);
            } else {
                suffix.push(ty);
            }
        }
        Some(match middle {
            None => Tuple::Concrete(prefix),
            Some(elt) => Tuple::unpacked(prefix, Type::Tuple(Tuple::unbounded(elt)), suffix),
        })
    }

    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        match self {
            Tuple::Concrete(elts) => elts.iter().for_each(f),
            Tuple::Unbounded(elt) => f(elt),
            Tuple::Unpacked(box_tup) => {
                let (prefix, middle, suffix) = &**box_tup;
                prefix.iter().for_each(&mut *f);
                f(middle);
                suffix.iter().for_each(f);
            }
        }
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        match self {
            Tuple::Concrete(elts) => elts.iter_mut().for_each(f),
            Tuple::Unbounded(elt) => f(elt),
            Tuple::Unpacked(box_tup) => {
                let (prefix, middle, suffix) = &mut **box_tup;
                prefix.iter_mut().for_each(&mut *f);
                f(middle);
                suffix.iter_mut().for_each(f);
            }
        }
    }
}
