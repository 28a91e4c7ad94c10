/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Utilities for formatting output.
//!
//! Implementation note: functions rather than types, because generic display
//! types turn mistakes into impossible-to-debug instantiation overflows.

use std::fmt;
use std::fmt::Display;

pub fn commas_iter<F, A>(a: F) -> impl Display
where
    F: Fn() -> A,
    A: IntoIterator<Item: Display>,
{
    intersperse_iter(a, ", ")
}

pub fn intersperse_iter<F, A, S>(a: F, separator: S) -> impl Display
where
    F: Fn() -> A,
    A: IntoIterator<Item: Display>,
    S: Display,
{
    struct Intersperse<F, S>(F, S);
    impl<F, A, S> Display for Intersperse<F, S>
    where
        F: Fn() -> A,
        A: IntoIterator<Item: Display>,
        S: Display,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for (i, item) in (self.0)().into_iter().enumerate() {
                if i != 0 {
                    Display::fmt(&self.1, f)?;
                }
                Display::fmt(&item, f)?;
            }
            Ok(())
        }
    }
    Intersperse(a, separator)
}

/// Format the number and descriptor word with the right pluralization.
/// E.g., count(2, "cat") -> "2 cats". Pluralizes by tacking on an "s".
pub fn count(n: usize, descriptor: &str) -> String {
    format!("{n} {descriptor}{}", if n == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commas() {
        assert_eq!(commas_iter(|| [1, 2, 3]).to_string(), "1, 2, 3");
        assert_eq!(
            commas_iter(|| [1, 2].iter().map(|x: &i32| -x)).to_string(),
            "-1, -2"
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(count(1, "pattern"), "1 pattern");
        assert_eq!(count(3, "pattern"), "3 patterns");
    }
}
