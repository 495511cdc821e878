/// Half-life of the temporal decay applied to entry scores, in days.
pub const HALF_LIFE_DAYS: f64 = 30.0;

/// Lower bound of the temporal factor. Old entries stay discoverable.
pub const TEMPORAL_FLOOR: f64 = 0.1;

/// Minimum combined score for an entry to appear in search results.
pub const DEFAULT_SALIENCE_THRESHOLD: f64 = 0.5;

/// Result cap for a search call.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Recent entries shown by a section read.
pub const DEFAULT_READ_ENTRIES: usize = 5;

/// Depth of the table-of-contents tree.
pub const DEFAULT_TOC_DEPTH: usize = 3;

/// Page size for entry listings.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Vector width of the built-in hashing embedder (matches MiniLM-sized models).
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

/// Texts kept by a caching embedder before the oldest is evicted.
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: usize = 4096;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';
