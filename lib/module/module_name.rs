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

/// The dotted name of a module, e.g. `foo.bar.baz`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleName(Name);

impl Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ModuleName {
    pub fn from_str(x: &str) -> Self {
        Self(Name::new(x))
    }

    pub fn from_name(x: &Name) -> Self {
        Self(x.clone())
    }

    pub fn builtins() -> Self {
        Self(Name::new_static("builtins"))
    }

    pub fn enum_() -> Self {
        Self(Name::new_static("enum"))
    }

    pub fn collections_abc() -> Self {
        Self(Name::new_static("collections.abc"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn components(&self) -> Vec<Name> {
        self.0.split('.').map(Name::new).collect()
    }
}

impl Dupe for ModuleName {}
