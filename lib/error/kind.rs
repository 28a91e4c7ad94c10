/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use convert_case::Case;
use convert_case::Casing;
use dupe::Dupe;
use parse_display::Display;

// Keep ErrorKind sorted lexographically, except for InternalError at the end.
#[derive(
    Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Copy, Dupe, Display
)]
pub enum ErrorKind {
    /// A keyword argument was given to a class pattern over one of the
    /// special-cased builtins, which only destructure positionally.
    ClassPatternBuiltinKeyword,
    /// A class pattern references something that is not a class.
    ClassPatternNotAClass,
    /// A class pattern has more positional arguments than the matched class's
    /// `__match_args__` provides names for.
    ClassPatternPositionalArgCount,
    /// A class pattern references a type alias carrying explicit type arguments.
    ClassPatternTypeAlias,
    /// A pattern (or one alternative of an or-pattern) can never match the
    /// subject, so the case body is unreachable.
    PatternNeverMatches,
    /// A wildcard capture receives a type that is partially unknown.
    WildcardPatternTypePartiallyUnknown,
    /// A wildcard capture receives a fully unknown type.
    WildcardPatternTypeUnknown,
    /// Internal error in the narrowing engine itself.
    #[allow(dead_code)]
    InternalError,
}

/// How bad an error is. Warnings never make a check fail outright.
#[derive(
    Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Copy, Dupe, Display
)]
pub enum Severity {
    Warn,
    Error,
}

impl ErrorKind {
    pub fn to_name(self) -> String {
        self.to_string().to_case(Case::Kebab)
    }

    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::PatternNeverMatches
            | ErrorKind::WildcardPatternTypePartiallyUnknown
            | ErrorKind::WildcardPatternTypeUnknown => Severity::Warn,
            _ => Severity::Error,
        }
    }
}
