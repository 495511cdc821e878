use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use journal_core::{
    CachingEmbedder, DEFAULT_EMBEDDING_CACHE_CAPACITY, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_MAX_RESULTS, DEFAULT_SALIENCE_THRESHOLD, Embedder, HashEmbedder, SearchParams,
};
use serde::Deserialize;

use crate::error::{Result, StoreError};

pub const DATA_FILE_ENV: &str = "JOURNAL_DATA_FILE";
pub const CONFIG_ENV: &str = "JOURNAL_CONFIG";
pub const DEFAULT_DATA_FILE: &str = "journal.json";

/// Contents of the optional TOML config file.
///
/// ```toml
/// data_file = "~/notes/journal.json"
///
/// [search]
/// salience_threshold = 0.4
/// max_results = 20
///
/// [embedding]
/// dimensions = 512
/// cache = true
/// cache_capacity = 8192
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub search: SearchConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub salience_threshold: f64,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            salience_threshold: DEFAULT_SALIENCE_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingConfig {
    pub dimensions: usize,
    /// Memoize embeddings by text, evicting the oldest past `cache_capacity`.
    pub cache: bool,
    pub cache_capacity: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            cache: false,
            cache_capacity: DEFAULT_EMBEDDING_CACHE_CAPACITY,
        }
    }
}

impl Config {
    /// Parse and validate. `origin` only labels errors.
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self> {
        let config: Config = toml::from_str(raw).map_err(|e| StoreError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate().map_err(|reason| StoreError::Config {
            path: origin.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| StoreError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&raw, path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Locate and load the config file.
    ///
    /// An explicit path (flag, then `JOURNAL_CONFIG`) must exist. Without
    /// one, the defaults apply.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let env_value = env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(env_value) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let threshold = self.search.salience_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(format!(
                "search.salience_threshold must be a non-negative number, got {threshold}"
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err("embedding.dimensions must be at least 1".to_string());
        }
        Ok(())
    }

    /// Defaults used when a caller does not pass search parameters.
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            salience_threshold: self.search.salience_threshold,
            max_results: self.search.max_results,
        }
    }

    pub fn build_embedder(&self) -> Arc<dyn Embedder> {
        let embedder = HashEmbedder::new(self.embedding.dimensions);
        if self.embedding.cache {
            Arc::new(CachingEmbedder::with_capacity(
                embedder,
                self.embedding.cache_capacity,
            ))
        } else {
            Arc::new(embedder)
        }
    }

    /// Data file location: flag, then `JOURNAL_DATA_FILE`, then config,
    /// then `./journal.json`.
    pub fn resolve_data_file(&self, flag: Option<&Path>) -> PathBuf {
        let env_value = env::var_os(DATA_FILE_ENV).map(PathBuf::from);
        resolve_data_file_from(flag, env_value.as_deref(), self)
    }
}

// Pure so precedence can be tested without touching process env.
fn resolve_data_file_from(flag: Option<&Path>, env_value: Option<&Path>, config: &Config) -> PathBuf {
    flag.or(env_value)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| config.data_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}
