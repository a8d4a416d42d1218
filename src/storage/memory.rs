//! In-memory history storage, for tests and ephemeral sessions.

use crate::storage::{HistoryStore, StorageError};

#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    slot: Option<Vec<String>>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing entries in the slot.
    #[must_use]
    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            slot: Some(entries),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.slot.clone().unwrap_or_default())
    }

    fn save(&mut self, entries: &[String]) -> Result<(), StorageError> {
        self.slot = Some(entries.to_vec());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.slot = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
