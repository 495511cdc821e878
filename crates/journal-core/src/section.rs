use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entry::{Entry, NumberedEntry};
use crate::path;

/// A named node in the journal tree: an overview, an append-only entry log,
/// and child sections keyed by name in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Fully-qualified path, equal to the ancestor names joined by `/`.
    pub path: String,
    /// Current synthesis of the section. Empty until first set.
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub subsections: IndexMap<String, Section>,
}

impl Section {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        path::last_segment(&self.path)
    }

    /// Append an entry and return its 1-based number.
    pub fn push_entry(&mut self, entry: Entry) -> usize {
        self.entries.push(entry);
        self.entries.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Immediate child names in insertion order.
    pub fn subsection_names(&self) -> impl Iterator<Item = &str> {
        self.subsections.keys().map(String::as_str)
    }

    /// Total entries in this section and all descendants.
    pub fn total_entries(&self) -> usize {
        self.entries.len()
            + self
                .subsections
                .values()
                .map(Section::total_entries)
                .sum::<usize>()
    }

    /// A window of the log ordered most-recent-first.
    ///
    /// `offset` counts back from the newest entry; the window covers
    /// `entries[max(0, total - offset - limit) .. total - offset]`.
    pub fn recent_entries(&self, limit: usize, offset: usize) -> Vec<NumberedEntry> {
        let end = self.entries.len().saturating_sub(offset);
        let start = end.saturating_sub(limit);
        self.entries[start..end]
            .iter()
            .enumerate()
            .rev()
            .map(|(i, entry)| NumberedEntry {
                number: start + i + 1,
                entry: entry.clone(),
            })
            .collect()
    }
}
