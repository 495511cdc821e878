//! Slash-delimited section paths.
//!
//! Leading/trailing separators are ignored and each segment is trimmed, so
//! `/project-alpha/ api/` and `project-alpha/api` address the same section.
//! A blank segment makes the path invalid.

use thiserror::Error;

use crate::constants::PATH_SEPARATOR;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("section path is empty")]
    Empty,
    #[error("section path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Split a path into its segments.
pub fn split(path: &str) -> Result<Vec<&str>, PathError> {
    let trimmed = path.trim().trim_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }
    let segments: Vec<&str> = trimmed.split(PATH_SEPARATOR).map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(segments)
}

/// Canonical form of a path: its segments joined by `/`.
pub fn normalize(path: &str) -> Result<String, PathError> {
    Ok(split(path)?.join("/"))
}

/// Append `name` to `parent`. An empty parent yields a root path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{name}")
    }
}

/// Last segment of a path, used as the section's display name.
pub fn last_segment(path: &str) -> &str {
    let trimmed = path.trim().trim_matches(PATH_SEPARATOR);
    trimmed.rsplit(PATH_SEPARATOR).next().unwrap_or(trimmed).trim()
}

/// Whether `name` can be stored as a single key in the tree. Only names that
/// [`split`] can produce are valid, so every stored section is addressable.
pub fn is_valid_segment(name: &str) -> bool {
    !name.is_empty() && name.trim() == name && !name.contains(PATH_SEPARATOR)
}
