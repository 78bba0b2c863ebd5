//! Durable record of pending downloads
//!
//! The progress record is a pretty-printed JSON object mapping identifiers to
//! source URLs. Its presence means a previous run left work behind; absence
//! means either no run has happened or the last one finished cleanly.
//!
//! Every save goes through a temp file in the same directory followed by an
//! atomic rename, so a crash mid-write leaves the previous snapshot intact.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::app::models::WorkSet;
use crate::errors::{ProgressError, ProgressResult};

/// File-backed store for the pending work set
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a record from a previous run is present
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the persisted work set
    ///
    /// A missing file is not an error: it means there is no prior run.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the file exists but cannot be read or parsed
    pub fn load(&self) -> ProgressResult<Option<WorkSet>> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProgressError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let work_set: WorkSet =
            serde_json::from_slice(&content).map_err(|source| ProgressError::Parse {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "Loaded progress record {} with {} pending items",
            self.path.display(),
            work_set.len()
        );
        Ok(Some(work_set))
    }

    /// Persist the full work set, replacing any previous snapshot
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Write` if the snapshot cannot be made durable
    pub fn save(&self, work_set: &WorkSet) -> ProgressResult<()> {
        let write_error = |source: std::io::Error| ProgressError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(write_error)?;

        let json = serde_json::to_vec_pretty(work_set)
            .map_err(|e| write_error(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(write_error)?;
        temp.write_all(&json).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        temp.persist(&self.path).map_err(|e| write_error(e.error))?;

        debug!(
            "Saved progress record {} ({} pending)",
            self.path.display(),
            work_set.len()
        );
        Ok(())
    }

    /// Delete the record; an already-missing file is fine
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Remove` for failures other than "not found"
    pub fn clear(&self) -> ProgressResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed progress record {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ProgressError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
