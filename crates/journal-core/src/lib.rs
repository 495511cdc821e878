//! Hierarchical, path-addressed journal with dual-dimension semantic search.
//!
//! A [`Journal`] is a tree of [`Section`]s addressed by slash-delimited
//! paths. Each section holds an overview and an append-only log of
//! [`Entry`] records. [`JournalSearcher`] ranks entries by how well their
//! work context and content match two query strings, discounted by age.
//!
//! Zero I/O: persistence and transport live in other crates.

pub mod constants;
pub mod embedding;
pub mod entry;
pub mod journal;
pub mod path;
pub mod search;
pub mod section;
pub mod time;
pub mod tokenizer;
pub mod view;

pub use constants::{
    DEFAULT_EMBEDDING_CACHE_CAPACITY, DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_LIST_LIMIT,
    DEFAULT_MAX_RESULTS, DEFAULT_READ_ENTRIES, DEFAULT_SALIENCE_THRESHOLD, DEFAULT_TOC_DEPTH,
    HALF_LIFE_DAYS, TEMPORAL_FLOOR,
};
pub use embedding::{CachingEmbedder, EmbedError, Embedder, HashEmbedder};
pub use entry::{Entry, NumberedEntry};
pub use journal::{Journal, SchemaError};
pub use path::PathError;
pub use search::{
    JournalSearcher, SearchParams, SearchResult, combined_score, cosine_similarity,
    temporal_score,
};
pub use section::Section;
pub use time::{parse_iso8601, to_iso8601};
pub use tokenizer::tokenize;
pub use view::{EntryPage, SectionView, TocNode, toc, toc_from};
