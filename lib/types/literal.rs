/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use ruff_python_ast::name::Name;

use crate::types::class::ClassType;
use crate::types::stdlib::Stdlib;
use crate::types::types::Type;

/// A literal value carried by an instance type. The value domain is fixed by
/// the carrying class: bool, int, str, bytes, or an enum member identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lit {
    Str(Box<str>),
    Int(i64),
    Bool(bool),
    Bytes(Box<[u8]>),
    /// The enum class along with the identity of the member.
    Enum(Box<(ClassType, Name)>),
}

impl Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Str(x) => write!(f, "'{x}'"),
            Lit::Int(x) => write!(f, "{x}"),
            Lit::Bool(true) => write!(f, "True"),
            Lit::Bool(false) => write!(f, "False"),
            Lit::Bytes(xs) => {
                write!(f, "b'")?;
                for x in xs {
                    match std::char::from_u32(*x as u32) {
                        Some(c) if x.is_ascii_graphic() || *x == b' ' => write!(f, "{c}")?,
                        _ => write!(f, "\\x{x:02x}")?,
                    }
                }
                write!(f, "'")
            }
            Lit::Enum(box_pair) => {
                let (cls, member) = &**box_pair;
                write!(f, "{}.{}", cls.name(), member)
            }
        }
    }
}

impl Lit {
    pub fn enum_member(cls: ClassType, member: Name) -> Self {
        Lit::Enum(Box::new((cls, member)))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Lit::Str(_))
    }

    pub fn to_type(self) -> Type {
        Type::Literal(self)
    }

    /// The class of a runtime value with this literal, with the literal
    /// forgotten. E.g. the general class of `Literal['foo']` is `str`.
    pub fn general_class_type<'a>(&'a self, stdlib: &'a Stdlib) -> &'a ClassType {
        match self {
            Lit::Str(_) => stdlib.str(),
            Lit::Int(_) => stdlib.int(),
            Lit::Bool(_) => stdlib.bool(),
            Lit::Bytes(_) => stdlib.bytes(),
            Lit::Enum(box_pair) => &box_pair.0,
        }
    }

    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        if let Lit::Enum(box_pair) = self {
            box_pair.0.visit(f)
        }
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        if let Lit::Enum(box_pair) = self {
            box_pair.0.visit_mut(f)
        }
    }
}
