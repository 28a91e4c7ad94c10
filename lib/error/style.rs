/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use dupe::Dupe;

/// What to do with errors that get raised.
#[derive(Debug, Clone, Copy, Dupe, PartialEq, Eq)]
pub enum ErrorStyle {
    /// Record the errors, so they can be fetched later.
    Delayed,
    /// Throw the errors away.
    Never,
}
