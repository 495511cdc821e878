use journal_core::path;
use journal_core::{
    Embedder, Entry, EntryPage, JournalSearcher, SearchParams, SearchResult, SectionView,
    TocNode, toc, toc_from,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::storage::JsonStorage;

/// What a write did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Normalized path of the section written to.
    pub path: String,
    pub overview_updated: bool,
    /// 1-based number of the new entry within its section.
    pub entry_number: usize,
}

/// The five journal operations over a file-backed store. Missing sections
/// come back as `None`, never as an error.
pub struct JournalService {
    storage: JsonStorage,
    searcher: JournalSearcher<Arc<dyn Embedder>>,
}

impl JournalService {
    pub fn new(storage: JsonStorage, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            storage,
            searcher: JournalSearcher::new(embedder),
        }
    }

    pub fn from_config(config: &Config, storage: JsonStorage) -> Self {
        Self::new(storage, config.build_embedder())
    }

    pub fn storage(&self) -> &JsonStorage {
        &self.storage
    }

    pub fn read(
        &mut self,
        path: &str,
        include_entries: bool,
        max_entries: usize,
    ) -> Result<Option<SectionView>> {
        Ok(self
            .storage
            .get_section(path)?
            .map(|section| SectionView::of(section, include_entries, max_entries)))
    }

    /// Append an entry to `path`, creating the section and its ancestors as
    /// needed. A provided overview replaces the existing one. Persisted with
    /// one save.
    pub fn write(
        &mut self,
        path: &str,
        content: &str,
        work_context: &str,
        overview: Option<&str>,
    ) -> Result<WriteOutcome> {
        let normalized = path::normalize(path)?;
        let outcome = self.storage.update(|journal| {
            let section = journal.create_section(&normalized)?;
            if let Some(overview) = overview {
                section.overview = overview.to_string();
            }
            let entry_number = section.push_entry(Entry::new(work_context, content));
            Ok(WriteOutcome {
                path: normalized.clone(),
                overview_updated: overview.is_some(),
                entry_number,
            })
        })?;
        tracing::info!(
            path = %outcome.path,
            entry = outcome.entry_number,
            overview_updated = outcome.overview_updated,
            "journal entry written"
        );
        Ok(outcome)
    }

    pub fn search(
        &mut self,
        work_context: &str,
        content: &str,
        params: &SearchParams,
    ) -> Result<Vec<SearchResult>> {
        let journal = self.storage.load()?;
        Ok(self.searcher.search(journal, work_context, content, params)?)
    }

    /// Table of contents for the whole journal, or rooted at `path`. A blank
    /// path means the root.
    pub fn toc(&mut self, path: Option<&str>, max_depth: usize) -> Result<Option<Vec<TocNode>>> {
        let journal = self.storage.load()?;
        match path.filter(|p| !p.trim().trim_matches('/').is_empty()) {
            None => Ok(Some(toc(journal, max_depth))),
            Some(p) => Ok(journal
                .get_section(p)
                .map(|section| toc_from(section, max_depth))),
        }
    }

    pub fn list_entries(
        &mut self,
        path: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Option<EntryPage>> {
        Ok(self
            .storage
            .get_section(path)?
            .map(|section| EntryPage::of(section, limit, offset)))
    }
}
