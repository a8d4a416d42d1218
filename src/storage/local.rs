//! Local filesystem history storage.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::{HistoryStore, StorageError};

/// History stored as a JSON file on disk.
pub struct LocalHistoryStore {
    path: PathBuf,
}

impl LocalHistoryStore {
    /// Create a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for LocalHistoryStore {
    fn load(&self) -> Result<Vec<String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ReadError(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&contents)
            .map_err(|e| StorageError::ParseError(format!("{}: {e}", self.path.display())))
    }

    fn save(&mut self, entries: &[String]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::WriteError(format!("create dir {}: {e}", parent.display()))
            })?;
        }

        let contents = serde_json::to_string(entries)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;

        fs::write(&self.path, contents)
            .map_err(|e| StorageError::WriteError(format!("{}: {e}", self.path.display())))
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::WriteError(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
