//! Path-to-source-position index over a parsed spec document.
//!
//! Paths are the dotted/bracketed logical paths the rules and resolver use
//! in diagnostics: `power.battery.voltage_v`, `motors[2].count`. The index
//! is best-effort; [`LocationIndex::find`] falls back to the nearest
//! enclosing path so every diagnostic can carry a usable position.

use std::collections::HashMap;

use serde::Serialize;

use crate::document::{DocNode, Mark};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    entries: HashMap<String, Location>,
}

impl LocationIndex {
    /// An index with no entries; `find` always misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walk `doc` and record a position for every reachable logical path.
    ///
    /// For a mapping entry the key's position is recorded, overwritten by
    /// the value's position when the value is a scalar (a diagnostic about
    /// `voltage_v` should point at `12`, not at the key). Sequence elements
    /// record their own position under `parent[index]`.
    pub fn build(doc: &DocNode, file: &str) -> Self {
        let mut index = Self::default();
        index.walk(doc, "", file);
        tracing::debug!(entries = index.entries.len(), file, "built location index");
        index
    }

    fn walk(&mut self, node: &DocNode, prefix: &str, file: &str) {
        match node {
            DocNode::Scalar { .. } => {}
            DocNode::Mapping { entries, .. } => {
                for entry in entries {
                    let path = if prefix.is_empty() {
                        entry.key.clone()
                    } else {
                        format!("{}.{}", prefix, entry.key)
                    };
                    let mark = if entry.value.is_scalar() {
                        entry.value.mark()
                    } else {
                        entry.key_mark
                    };
                    self.insert(&path, file, mark);
                    self.walk(&entry.value, &path, file);
                }
            }
            DocNode::Sequence { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    let path = format!("{}[{}]", prefix, i);
                    self.insert(&path, file, item.mark());
                    self.walk(item, &path, file);
                }
            }
        }
    }

    fn insert(&mut self, path: &str, file: &str, mark: Mark) {
        self.entries.insert(
            path.to_string(),
            Location {
                file: file.to_string(),
                line: mark.line,
                column: mark.column,
            },
        );
    }

    /// Exact lookup, then nearest enclosing path: strip the last `.key`
    /// (or, failing that, the last `[index]`) and retry until the path is
    /// exhausted.
    pub fn find(&self, path: &str) -> Option<&Location> {
        if let Some(loc) = self.entries.get(path) {
            return Some(loc);
        }
        let mut current = path;
        while !current.is_empty() {
            current = match current.rfind('.') {
                Some(i) => &current[..i],
                None => match current.rfind('[') {
                    Some(i) => &current[..i],
                    None => "",
                },
            };
            if let Some(loc) = self.entries.get(current) {
                return Some(loc);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
