/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The dunder names the narrowing engine cares about.

use ruff_python_ast::name::Name;

pub const EQ: Name = Name::new_static("__eq__");
pub const MATCH_ARGS: Name = Name::new_static("__match_args__");
