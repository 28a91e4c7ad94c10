/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use dupe::Dupe;
use ruff_text_size::TextRange;
use tracing::error;

use crate::error::error::Error;
use crate::error::kind::ErrorKind;
use crate::error::style::ErrorStyle;
use crate::module::module_info::ModuleInfo;
use crate::util::lock::Mutex;

#[derive(Debug, Default, Clone)]
struct ModuleErrors {
    /// Set to `true` when we have no duplicates and are sorted.
    clean: bool,
    items: Vec<Error>,
}

impl ModuleErrors {
    fn push(&mut self, err: Error) {
        self.clean = false;
        self.items.push(err);
    }

    fn cleanup(&mut self) {
        if self.clean {
            return;
        }
        self.clean = true;
        self.items.sort();
        self.items.dedup();
    }

    fn is_empty(&self) -> bool {
        // No need to do cleanup if it's empty.
        self.items.is_empty()
    }

    fn len(&mut self) -> usize {
        self.cleanup();
        self.items.len()
    }

    fn iter(&mut self) -> impl Iterator<Item = &Error> {
        self.cleanup();
        self.items.iter()
    }
}

/// Collects the diagnostics produced while checking a module.
// Deliberately don't implement Clone,
#[derive(Debug)]
pub struct ErrorCollector {
    module_info: ModuleInfo,
    style: ErrorStyle,
    errors: Mutex<ModuleErrors>,
}

impl Display for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for err in self.errors.lock().iter() {
            writeln!(f, "ERROR: {err}")?;
        }
        Ok(())
    }
}

impl ErrorCollector {
    pub fn new(module_info: ModuleInfo, style: ErrorStyle) -> Self {
        Self {
            module_info,
            style,
            errors: Mutex::new(Default::default()),
        }
    }

    pub fn module_info(&self) -> &ModuleInfo {
        &self.module_info
    }

    pub fn add(&self, range: TextRange, msg: String, kind: ErrorKind) {
        if self.style == ErrorStyle::Never {
            return;
        }
        let source_range = self.module_info.source_range(range);
        let err = Error::new(
            self.module_info.path().to_owned(),
            source_range,
            msg,
            kind,
        );
        self.errors.lock().push(err);
    }

    pub fn style(&self) -> ErrorStyle {
        self.style.dupe()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    pub fn collect(&self) -> Vec<Error> {
        self.errors.lock().iter().cloned().collect()
    }

    pub fn print(&self) {
        for err in self.errors.lock().iter() {
            error!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use ruff_text_size::TextSize;

    use super::*;
    use crate::module::module_name::ModuleName;

    #[test]
    fn test_error_collector() {
        let mi = ModuleInfo::new(
            ModuleName::from_str("main"),
            Path::new("main.py").to_owned(),
            Arc::new("contents".to_owned()),
        );
        let errors = ErrorCollector::new(mi.dupe(), ErrorStyle::Delayed);
        let range = TextRange::new(TextSize::new(1), TextSize::new(3));
        errors.add(range, "b".to_owned(), ErrorKind::InternalError);
        errors.add(range, "a".to_owned(), ErrorKind::InternalError);
        errors.add(range, "a".to_owned(), ErrorKind::InternalError);
        errors.add(range, "b".to_owned(), ErrorKind::InternalError);
        assert_eq!(
            errors
                .collect()
                .iter()
                .map(|x| x.msg().to_owned())
                .collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_error_style_never() {
        let mi = ModuleInfo::new(
            ModuleName::from_str("main"),
            Path::new("main.py").to_owned(),
            Arc::new("contents".to_owned()),
        );
        let errors = ErrorCollector::new(mi, ErrorStyle::Never);
        errors.add(
            TextRange::new(TextSize::new(0), TextSize::new(1)),
            "ignored".to_owned(),
            ErrorKind::InternalError,
        );
        assert!(errors.is_empty());
    }
}
