/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use dupe::Dupe;
use ruff_python_ast::name::Name;

use crate::types::types::Type;
use crate::util::uniques::Unique;
use crate::util::uniques::UniqueFactory;

/// An in-scope occurrence of a type parameter. Unlike a `TypeVar`, which is
/// the declaration, a `Quantified` is the placeholder that type arguments
/// get substituted for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantified {
    /// Unique identifier
    unique: Unique,
    name: Name,
    kind: QuantifiedKind,
}

impl Dupe for Quantified {}

#[derive(Debug, Clone, Copy, Dupe, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuantifiedKind {
    TypeVar,
    ParamSpec,
    TypeVarTuple,
}

impl Display for Quantified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Quantified {
    pub fn new(uniques: &UniqueFactory, name: Name, kind: QuantifiedKind) -> Self {
        Quantified {
            unique: uniques.fresh(),
            name,
            kind,
        }
    }

    pub fn type_var(uniques: &UniqueFactory, name: Name) -> Self {
        Quantified::new(uniques, name, QuantifiedKind::TypeVar)
    }

    pub fn param_spec(uniques: &UniqueFactory, name: Name) -> Self {
        Quantified::new(uniques, name, QuantifiedKind::ParamSpec)
    }

    pub fn type_var_tuple(uniques: &UniqueFactory, name: Name) -> Self {
        Quantified::new(uniques, name, QuantifiedKind::TypeVarTuple)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn kind(&self) -> QuantifiedKind {
        self.kind
    }

    pub fn is_type_var_tuple(&self) -> bool {
        self.kind == QuantifiedKind::TypeVarTuple
    }

    pub fn to_type(self) -> Type {
        Type::Quantified(self)
    }
}
