//! File-name allow-list shared by both pipelines

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Allow-list of file names keyed by substring containment
///
/// A name passes when it contains, or is contained by, at least one entry.
/// An empty filter is inactive and lets everything through, including items
/// with no associated file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FileFilter {
    entries: BTreeSet<String>,
}

impl FileFilter {
    /// Build a filter from raw entries, dropping blank ones
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(Into::into)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self { entries }
    }

    /// Whether any entry is set
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Iterate over the entries in lexicographic order
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Test a single file name against the filter
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| name.contains(entry.as_str()) || entry.contains(name))
    }

    /// Decide whether an item with an optional file name is retained
    ///
    /// Items without a file name are dropped whenever the filter is active.
    #[must_use]
    pub fn retains(&self, name: Option<&str>) -> bool {
        if !self.is_active() {
            return true;
        }
        name.is_some_and(|n| !n.is_empty() && self.matches(n))
    }
}

impl From<Vec<String>> for FileFilter {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}

impl From<FileFilter> for Vec<String> {
    fn from(filter: FileFilter) -> Self {
        filter.entries.into_iter().collect()
    }
}
