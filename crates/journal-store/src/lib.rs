//! File-backed persistence and the journal operations built on it.

pub mod config;
pub mod error;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Result, StoreError};
pub use service::{JournalService, WriteOutcome};
pub use storage::JsonStorage;
