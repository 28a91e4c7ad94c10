/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use dupe::Dupe;
use ruff_source_file::LineIndex;
use ruff_source_file::OneIndexed;
use ruff_text_size::TextRange;
use ruff_text_size::TextSize;

use crate::module::module_name::ModuleName;
use crate::util::arc_id::ArcId;

/// Information about a module the checker is working on. Cheap to clone.
///
/// The narrowing engine only ever reads from this; the contents are fixed
/// for the lifetime of a module evaluation.
#[derive(Debug, Clone, Dupe, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleInfo(ArcId<ModuleInfoInner>);

#[derive(Debug)]
struct ModuleInfoInner {
    name: ModuleName,
    path: PathBuf,
    index: LineIndex,
    contents: Arc<String>,
}

impl PartialEq for ModuleInfoInner {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path
    }
}

impl Eq for ModuleInfoInner {}

impl PartialOrd for ModuleInfoInner {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleInfoInner {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.name, &self.path).cmp(&(&other.name, &other.path))
    }
}

impl ModuleInfo {
    /// The contents are kept around for the life of the module, so errors can
    /// be reported with line and column information.
    pub fn new(name: ModuleName, path: PathBuf, contents: Arc<String>) -> Self {
        let index = LineIndex::from_source_text(&contents);
        Self(ArcId::new(ModuleInfoInner {
            name,
            path,
            index,
            contents,
        }))
    }

    pub fn name(&self) -> ModuleName {
        self.0.name.dupe()
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }

    pub fn contents(&self) -> &str {
        &self.0.contents
    }

    pub fn source_range(&self, range: TextRange) -> SourceRange {
        SourceRange {
            start: self.source_location(range.start()),
            end: self.source_location(range.end()),
        }
    }

    fn source_location(&self, offset: TextSize) -> SourceLocation {
        let loc = self.0.index.source_location(offset, &self.0.contents);
        SourceLocation {
            row: loc.row,
            column: loc.column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub row: OneIndexed,
    pub column: OneIndexed,
}

/// A range in terms of lines and columns, suitable for showing to people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.row == self.end.row {
            if self.start.column == self.end.column {
                write!(f, "{}:{}", self.start.row, self.start.column)
            } else {
                write!(
                    f,
                    "{}:{}-{}",
                    self.start.row, self.start.column, self.end.column
                )
            }
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start.row, self.start.column, self.end.row, self.end.column
            )
        }
    }
}
