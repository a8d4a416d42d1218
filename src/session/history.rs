//! Bounded, most-recent-first list of recent search queries.

use std::collections::VecDeque;

/// Number of recent queries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Recent search queries, most recent first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SearchHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild history from stored entries, dropping blanks and duplicates
    /// and anything past capacity.
    #[must_use]
    pub fn from_entries<I>(entries: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut history = Self::new(capacity);
        for entry in entries {
            let entry = entry.trim();
            if entry.is_empty() || history.entries.iter().any(|e| e == entry) {
                continue;
            }
            if history.entries.len() == capacity {
                break;
            }
            history.entries.push_back(entry.to_string());
        }
        history
    }

    /// Add a query at the front.
    ///
    /// An equal entry already present is moved rather than duplicated.
    /// Returns false for blank queries, which are not recorded.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.capacity == 0 {
            return false;
        }

        self.entries.retain(|e| e != query);
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
