use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use journal_core::{Journal, Section};

use crate::error::{Result, StoreError};

/// Journal persisted as one pretty-printed JSON document.
///
/// The tree is read lazily on first access and cached. Every mutation is
/// applied to a copy, written to disk, and only then swapped into the cache,
/// so the cache never holds state the file does not.
pub struct JsonStorage {
    data_file: PathBuf,
    cached: Option<Journal>,
}

impl JsonStorage {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            cached: None,
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// The journal, reading the backing file if it has not been loaded yet.
    /// A missing file is an empty journal.
    pub fn load(&mut self) -> Result<&Journal> {
        let journal = match self.cached.take() {
            Some(journal) => journal,
            None => read_journal(&self.data_file)?,
        };
        Ok(self.cached.insert(journal))
    }

    /// Atomically replace the backing file with `journal`.
    pub fn save(&mut self, journal: Journal) -> Result<()> {
        write_atomic(&self.data_file, &journal)?;
        self.cached = Some(journal);
        Ok(())
    }

    /// Apply `mutate` to a copy of the journal and persist the result with a
    /// single save. Nothing changes on disk or in memory if either step fails.
    pub fn update<T>(&mut self, mutate: impl FnOnce(&mut Journal) -> Result<T>) -> Result<T> {
        let mut draft = self.load()?.clone();
        let value = mutate(&mut draft)?;
        self.save(draft)?;
        Ok(value)
    }

    pub fn get_section(&mut self, path: &str) -> Result<Option<&Section>> {
        Ok(self.load()?.get_section(path))
    }

    /// Materialize `path` and any missing ancestors, then persist. Returns a
    /// copy of the section as stored.
    pub fn create_section(&mut self, path: &str) -> Result<Section> {
        self.update(|journal| Ok(journal.create_section(path)?.clone()))
    }

    /// Drop the cached tree so the next access re-reads the file.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

fn read_journal(path: &Path) -> Result<Journal> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no journal file, starting empty");
            return Ok(Journal::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let journal: Journal =
        serde_json::from_slice(&raw).map_err(|e| StoreError::CorruptJournal {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    journal
        .validate()
        .map_err(|e| StoreError::CorruptJournal {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::debug!(
        path = %path.display(),
        sections = journal.section_count(),
        entries = journal.entry_count(),
        "loaded journal"
    );
    Ok(journal)
}

/// Write to a temporary file beside `path`, sync it, then rename it over the
/// target. The temporary file is removed if any step fails.
fn write_atomic(path: &Path, journal: &Journal) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".journal-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| StoreError::io(dir, e))?;

    serde_json::to_writer_pretty(tmp.as_file_mut(), journal)
        .map_err(|e| StoreError::io(tmp.path(), e.into()))?;
    tmp.write_all(b"\n")
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io(tmp.path(), e))?;

    tmp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;

    tracing::debug!(
        path = %path.display(),
        entries = journal.entry_count(),
        "saved journal"
    );
    Ok(())
}
