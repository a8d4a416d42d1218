//! Storage backends for the recent-search history.
//!
//! History lives in a single slot holding a JSON array of query strings. The
//! slot is always overwritten whole; a missing slot reads as empty history.

pub mod local;
pub mod memory;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to write: {0}")]
    WriteError(String),

    #[error("Failed to parse history: {0}")]
    ParseError(String),

    #[error("Failed to serialize: {0}")]
    SerializeError(String),
}

/// Trait for history storage backends (local file, in-memory, etc.).
pub trait HistoryStore: Send + Sync {
    /// Read the stored history, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot exists but cannot be read or parsed.
    fn load(&self) -> Result<Vec<String>, StorageError>;

    /// Replace the stored history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be written.
    fn save(&mut self, entries: &[String]) -> Result<(), StorageError>;

    /// Remove the stored history entirely.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot exists but cannot be removed.
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Human-readable location of the slot, for diagnostics.
    fn location(&self) -> String;
}
