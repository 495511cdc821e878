use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time;

/// A single timestamped record in a section's log.
/// Entries are append-only: nothing in this crate mutates one after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The broader kind of work being done when the entry was written.
    pub work_context: String,
    /// What changed or was learned.
    pub content: String,
    #[serde(with = "crate::time::iso8601", default = "crate::time::now")]
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    pub fn new(work_context: impl Into<String>, content: impl Into<String>) -> Self {
        Self::at(work_context, content, time::now())
    }

    pub fn at(
        work_context: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            work_context: work_context.into(),
            content: content.into(),
            timestamp,
        }
    }

    /// Age in whole days relative to `now`.
    pub fn age_in_days(&self, now: &DateTime<Utc>) -> i64 {
        time::age_in_days(&self.timestamp, now)
    }
}

/// An entry paired with its 1-based position in the section log.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumberedEntry {
    pub number: usize,
    pub entry: Entry,
}
