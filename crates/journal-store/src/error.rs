use std::path::PathBuf;

use journal_core::{EmbedError, PathError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file exists but is not a valid journal.
    #[error("corrupt journal file {}: {reason}", path.display())]
    CorruptJournal { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid section path: {0}")]
    InvalidPath(#[from] PathError),

    #[error(transparent)]
    Embedding(#[from] EmbedError),

    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
