//! Dual-dimension semantic search over the journal tree.
//!
//! Every entry is scored on two independent axes, its work context and its
//! content, each by cosine similarity against the matching query embedding.
//! The mean of the two is discounted by a temporal factor with a 30-day
//! half-life floored at 0.1.
//!
//! Entry embeddings are computed per call. Wrap the embedder in
//! [`CachingEmbedder`](crate::embedding::CachingEmbedder) to reuse them
//! across calls; ranking is unchanged either way.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{
    DEFAULT_MAX_RESULTS, DEFAULT_SALIENCE_THRESHOLD, HALF_LIFE_DAYS, TEMPORAL_FLOOR,
};
use crate::embedding::{EmbedError, Embedder};
use crate::entry::Entry;
use crate::journal::Journal;
use crate::time;

/// A scored entry. Holds its own copy of the entry, so it stays valid
/// whatever happens to the live tree afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub section_path: String,
    /// 0-based index into the section's entry log.
    pub entry_index: usize,
    pub entry: Entry,
    pub work_context_score: f64,
    pub content_score: f64,
    pub combined_score: f64,
    pub temporal_score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchParams {
    /// Minimum combined score (inclusive) for a result to be kept.
    pub salience_threshold: f64,
    pub max_results: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            salience_threshold: DEFAULT_SALIENCE_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Search engine over a [`Journal`], parameterized by its embedder.
pub struct JournalSearcher<E> {
    embedder: E,
}

impl<E: Embedder> JournalSearcher<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Rank entries against the two query strings as of the current time.
    pub fn search(
        &self,
        journal: &Journal,
        work_context: &str,
        content: &str,
        params: &SearchParams,
    ) -> Result<Vec<SearchResult>, EmbedError> {
        self.search_at(journal, work_context, content, params, time::now())
    }

    /// Rank entries as of `now`.
    ///
    /// Sections are visited depth-first in insertion order, each section's
    /// entries before its subsections. Results are sorted by combined score
    /// descending with a stable sort, so equal scores keep visit order.
    pub fn search_at(
        &self,
        journal: &Journal,
        work_context: &str,
        content: &str,
        params: &SearchParams,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchResult>, EmbedError> {
        if params.max_results == 0 || journal.entry_count() == 0 {
            return Ok(Vec::new());
        }

        let work_query = self.embedder.embed(work_context)?;
        let content_query = self.embedder.embed(content)?;

        let mut scored = 0usize;
        let mut results = Vec::new();
        for section in journal.sections() {
            for (index, entry) in section.entries.iter().enumerate() {
                let result = self.score_entry(
                    &section.path,
                    index,
                    entry,
                    &work_query,
                    &content_query,
                    &now,
                )?;
                scored += 1;
                if result.combined_score >= params.salience_threshold {
                    results.push(result);
                }
            }
        }

        results.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
        let kept = results.len();
        results.truncate(params.max_results);

        tracing::debug!(
            scored,
            kept,
            returned = results.len(),
            threshold = params.salience_threshold,
            "journal search complete"
        );
        Ok(results)
    }

    fn score_entry(
        &self,
        section_path: &str,
        entry_index: usize,
        entry: &Entry,
        work_query: &[f32],
        content_query: &[f32],
        now: &DateTime<Utc>,
    ) -> Result<SearchResult, EmbedError> {
        let work_context_score =
            cosine_similarity(work_query, &self.embedder.embed(&entry.work_context)?);
        let content_score = cosine_similarity(content_query, &self.embedder.embed(&entry.content)?);
        let temporal_score = temporal_score(entry.age_in_days(now));
        let combined_score = combined_score(work_context_score, content_score, temporal_score);

        Ok(SearchResult {
            section_path: section_path.to_string(),
            entry_index,
            entry: entry.clone(),
            work_context_score,
            content_score,
            combined_score,
            temporal_score,
        })
    }
}

/// Cosine similarity. Zero when either vector has zero norm or the lengths
/// differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// `exp(-age * ln2 / 30)`, floored at 0.1.
pub fn temporal_score(age_days: i64) -> f64 {
    let age = age_days.max(0) as f64;
    let decay = (-age * std::f64::consts::LN_2 / HALF_LIFE_DAYS).exp();
    decay.max(TEMPORAL_FLOOR)
}

/// Mean of the two axis similarities, scaled by the temporal factor.
pub fn combined_score(work_context_score: f64, content_score: f64, temporal_score: f64) -> f64 {
    (work_context_score + content_score) / 2.0 * temporal_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;

    /// Table-driven embedder: known strings map to fixed vectors, anything
    /// else embeds to the zero vector.
    struct TableEmbedder(HashMap<&'static str, Vec<f32>>);

    impl TableEmbedder {
        fn new(rows: &[(&'static str, [f32; 2])]) -> Self {
            Self(rows.iter().map(|(k, v)| (*k, v.to_vec())).collect())
        }
    }

    impl Embedder for TableEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(self.0.get(text).cloned().unwrap_or_else(|| vec![0.0, 0.0]))
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn journal_with(entries: &[(&str, &str, &str, i64)]) -> Journal {
        let mut journal = Journal::new();
        for (path, ctx, content, age) in entries {
            journal
                .create_section(path)
                .unwrap()
                .push_entry(Entry::at(*ctx, *content, now() - Duration::days(*age)));
        }
        journal
    }

    fn params(threshold: f64, max: usize) -> SearchParams {
        SearchParams {
            salience_threshold: threshold,
            max_results: max,
        }
    }

    #[test]
    fn test_cosine_basic() {
        assert_relative_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_relative_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_relative_eq!(cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]), 0.5f64.sqrt());
        assert_relative_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
    }

    #[test]
    fn test_cosine_degenerate() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_temporal_score_points() {
        assert_relative_eq!(temporal_score(0), 1.0);
        assert_relative_eq!(temporal_score(30), 0.5, epsilon = 1e-12);
        assert_relative_eq!(temporal_score(60), 0.25, epsilon = 1e-12);
        assert_relative_eq!(temporal_score(10_000), TEMPORAL_FLOOR);
        assert_relative_eq!(temporal_score(-5), 1.0);
    }

    #[test]
    fn test_combined_score() {
        assert_relative_eq!(combined_score(1.0, 0.5, 0.5), 0.375);
    }

    #[test]
    fn test_empty_journal_returns_nothing() {
        let searcher = JournalSearcher::new(HashEmbedder::default());
        for threshold in [0.0, 0.5, 1.0] {
            let results = searcher
                .search(&Journal::new(), "anything", "at all", &params(threshold, 10))
                .unwrap();
            assert!(results.is_empty());
        }
    }

    #[test]
    fn test_max_results_zero() {
        let journal = journal_with(&[("a", "x", "y", 0)]);
        let searcher = JournalSearcher::new(HashEmbedder::default());
        let results = searcher.search(&journal, "x", "y", &params(0.0, 0)).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_scores_are_reported_per_axis() {
        let embedder = TableEmbedder::new(&[
            ("ctx-q", [1.0, 0.0]),
            ("content-q", [0.0, 1.0]),
            ("ctx-e", [1.0, 0.0]),
            ("content-e", [1.0, 1.0]),
        ]);
        let journal = journal_with(&[("p", "ctx-e", "content-e", 30)]);
        let results = JournalSearcher::new(embedder)
            .search_at(&journal, "ctx-q", "content-q", &params(0.0, 10), now())
            .unwrap();

        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.section_path, "p");
        assert_eq!(r.entry_index, 0);
        assert_relative_eq!(r.work_context_score, 1.0);
        assert_relative_eq!(r.content_score, 0.5f64.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(r.temporal_score, 0.5, epsilon = 1e-12);
        assert_relative_eq!(
            r.combined_score,
            (1.0 + 0.5f64.sqrt()) / 2.0 * 0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_threshold_is_inclusive_and_filters() {
        let embedder = TableEmbedder::new(&[
            ("q", [1.0, 0.0]),
            ("hit", [1.0, 0.0]),
            ("miss", [0.0, 1.0]),
        ]);
        let journal = journal_with(&[("a", "hit", "hit", 0), ("b", "miss", "miss", 0)]);
        let searcher = JournalSearcher::new(embedder);

        let all = searcher
            .search_at(&journal, "q", "q", &params(0.0, 10), now())
            .unwrap();
        assert_eq!(all.len(), 2);

        let exact = searcher
            .search_at(&journal, "q", "q", &params(1.0, 10), now())
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].section_path, "a");
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let embedder = TableEmbedder::new(&[("q", [1.0, 0.0]), ("e", [1.0, 0.0])]);
        let journal = journal_with(&[
            ("old", "e", "e", 90),
            ("new", "e", "e", 0),
            ("mid", "e", "e", 30),
        ]);
        let searcher = JournalSearcher::new(embedder);
        let results = searcher
            .search_at(&journal, "q", "q", &params(0.0, 2), now())
            .unwrap();

        let paths: Vec<&str> = results.iter().map(|r| r.section_path.as_str()).collect();
        assert_eq!(paths, vec!["new", "mid"]);
        assert!(results[0].combined_score >= results[1].combined_score);
    }

    #[test]
    fn test_ties_keep_traversal_order() {
        let embedder = TableEmbedder::new(&[("q", [1.0, 0.0]), ("e", [1.0, 0.0])]);
        let mut journal = Journal::new();
        for path in ["b", "b/child", "a"] {
            let section = journal.create_section(path).unwrap();
            section.push_entry(Entry::at("e", "e", now()));
            section.push_entry(Entry::at("e", "e", now()));
        }

        let results = JournalSearcher::new(embedder)
            .search_at(&journal, "q", "q", &params(0.0, 10), now())
            .unwrap();
        let order: Vec<(&str, usize)> = results
            .iter()
            .map(|r| (r.section_path.as_str(), r.entry_index))
            .collect();
        assert_eq!(
            order,
            vec![
                ("b", 0),
                ("b", 1),
                ("b/child", 0),
                ("b/child", 1),
                ("a", 0),
                ("a", 1)
            ]
        );
    }

    #[test]
    fn test_degenerate_embedding_scores_zero() {
        let embedder = TableEmbedder::new(&[("q", [1.0, 0.0])]);
        let journal = journal_with(&[("a", "unknown", "unknown", 0)]);
        let results = JournalSearcher::new(embedder)
            .search_at(&journal, "q", "q", &params(0.0, 10), now())
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].combined_score, 0.0);
    }

    #[test]
    fn test_results_are_snapshots() {
        let mut journal = journal_with(&[("a", "ctx", "content", 0)]);
        let searcher = JournalSearcher::new(HashEmbedder::default());
        let results = searcher
            .search(&journal, "ctx", "content", &params(0.0, 10))
            .unwrap();

        journal.get_section_mut("a").unwrap().entries.clear();
        assert_eq!(results[0].entry.content, "content");
    }

    #[test]
    fn test_embedder_failure_propagates() {
        struct Offline;
        impl Embedder for Offline {
            fn embed(&self, _: &str) -> Result<Vec<f32>, EmbedError> {
                Err(EmbedError::Backend("offline".into()))
            }
            fn dimensions(&self) -> usize {
                0
            }
        }

        let journal = journal_with(&[("a", "x", "y", 0)]);
        let err = JournalSearcher::new(Offline)
            .search(&journal, "x", "y", &SearchParams::default())
            .unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn test_jwt_scenario_with_hash_embedder() {
        let mut journal = Journal::new();
        journal
            .create_section("project-alpha")
            .unwrap()
            .push_entry(Entry::new("authentication development", "Implemented JWT auth"));

        let results = JournalSearcher::new(HashEmbedder::default())
            .search(
                &journal,
                "authentication development",
                "user authentication",
                &params(0.3, 10),
            )
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].section_path, "project-alpha");
        assert!(results[0].combined_score >= 0.3);
    }
}
