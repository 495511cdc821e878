//! Read-only views backing the read, table-of-contents and list operations.
//! Every view owns its data; none borrow from the live tree.

use serde::Serialize;

use crate::entry::NumberedEntry;
use crate::journal::Journal;
use crate::path;
use crate::section::Section;

/// Overview, optional recent entries, and child names of one section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionView {
    pub path: String,
    pub overview: String,
    pub total_entries: usize,
    /// Most-recent-first. Empty unless entries were requested.
    pub recent_entries: Vec<NumberedEntry>,
    pub subsections: Vec<String>,
}

impl SectionView {
    pub fn of(section: &Section, include_entries: bool, max_entries: usize) -> Self {
        let recent_entries = if include_entries {
            section.recent_entries(max_entries, 0)
        } else {
            Vec::new()
        };
        Self {
            path: section.path.clone(),
            overview: section.overview.clone(),
            total_entries: section.entry_count(),
            recent_entries,
            subsections: section.subsection_names().map(str::to_string).collect(),
        }
    }
}

/// One line of the table of contents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TocNode {
    pub name: String,
    pub path: String,
    pub entry_count: usize,
    /// Empty when the depth limit was reached, even if the section has children.
    pub children: Vec<TocNode>,
}

/// Table of contents for the whole journal, `max_depth` levels deep.
pub fn toc(journal: &Journal, max_depth: usize) -> Vec<TocNode> {
    if max_depth == 0 {
        return Vec::new();
    }
    journal
        .sections
        .iter()
        .map(|(name, section)| toc_node(name, section, 0, max_depth))
        .collect()
}

/// Table of contents rooted at a single section, which counts as depth 0.
pub fn toc_from(section: &Section, max_depth: usize) -> Vec<TocNode> {
    if max_depth == 0 {
        return Vec::new();
    }
    vec![toc_node(
        path::last_segment(&section.path),
        section,
        0,
        max_depth,
    )]
}

fn toc_node(name: &str, section: &Section, depth: usize, max_depth: usize) -> TocNode {
    let children = if depth + 1 >= max_depth {
        Vec::new()
    } else {
        section
            .subsections
            .iter()
            .map(|(child_name, child)| toc_node(child_name, child, depth + 1, max_depth))
            .collect()
    };
    TocNode {
        name: name.to_string(),
        path: section.path.clone(),
        entry_count: section.entry_count(),
        children,
    }
}

/// A page of a section's log, newest first.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryPage {
    Entries {
        total: usize,
        entries: Vec<NumberedEntry>,
    },
    /// The section exists but has never been written to.
    NoEntries,
    /// The offset is at or past the oldest entry.
    PastEnd { total: usize },
}

impl EntryPage {
    pub fn of(section: &Section, limit: usize, offset: usize) -> Self {
        let total = section.entry_count();
        if total == 0 {
            return EntryPage::NoEntries;
        }
        let entries = section.recent_entries(limit, offset);
        if entries.is_empty() {
            EntryPage::PastEnd { total }
        } else {
            EntryPage::Entries { total, entries }
        }
    }
}
