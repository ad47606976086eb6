#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Storage media that honor the [`SessionStore`] contract.
//!
//! Both media hold the record as JSON text so that a session written by one
//! can be read back by the other.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use gridmerge_core::{SessionRecord, SessionStore};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading or writing a stored session.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying file could not be accessed.
    #[error("failed to access session file {}", .path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Operating system failure.
        #[source]
        source: io::Error,
    },
    /// The stored text is not a valid session record.
    #[error("stored session is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Volatile store that keeps the serialized record in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    /// Creates a store that holds no session.
    #[must_use]
    pub const fn new() -> Self {
        Self { json: None }
    }

    /// Creates a store pre-seeded with raw JSON text.
    #[must_use]
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
        }
    }

    /// Raw text of the stored record, if any.
    #[must_use]
    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl SessionStore for MemoryStore {
    type Error = StoreError;

    fn load(&mut self) -> Result<Option<SessionRecord>, Self::Error> {
        self.json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(StoreError::from)
    }

    fn save(&mut self, record: &SessionRecord) -> Result<(), Self::Error> {
        self.json = Some(serde_json::to_string(record)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.json = None;
        Ok(())
    }
}

/// Store backed by a JSON file on disk.
///
/// A missing file means no session exists. Writes land in a sibling
/// temporary file that is renamed over the target, so an interrupted write
/// leaves the previous record intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store that reads and writes the provided path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileStore {
    type Error = StoreError;

    fn load(&mut self) -> Result<Option<SessionRecord>, Self::Error> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.io_error(error)),
        };
        let record = serde_json::from_str(&contents)?;
        Ok(Some(record))
    }

    fn save(&mut self, record: &SessionRecord) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
            }
        }

        let json = serde_json::to_vec_pretty(record)?;
        let staging = self.staging_path();
        fs::write(&staging, json).map_err(|error| self.io_error(error))?;
        fs::rename(&staging, &self.path).map_err(|error| self.io_error(error))?;
        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session file removed");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}
