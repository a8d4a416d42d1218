//! Search session controller.
//!
//! Owns the transient search UI state and mediates between user input, the
//! debounce timer, the search index and the recent-search history. The
//! controller is single-threaded: input events and timer deliveries are
//! applied one at a time by whoever owns it.

pub mod history;
pub mod script;
pub mod timer;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::search::{QueryOptions, SearchResult, Searcher};
use crate::storage::HistoryStore;

pub use history::{DEFAULT_HISTORY_CAPACITY, SearchHistory};
pub use timer::{Scheduler, TimerHandle, TimerQueue};

/// Quiet period after the last keystroke before a lookup runs.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Trimmed queries must be longer than this to enter history.
const HISTORY_MIN_EXCLUSIVE: usize = 2;

/// Observable state, derived from the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Closed; query and results empty.
    Idle,
    /// Open with an empty query; history is shown.
    OpenEmpty,
    /// Open with a query whose lookup has not completed.
    Searching,
    /// Open with a query whose lookup completed (results may be empty).
    OpenResults,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Idle => "idle",
            SessionState::OpenEmpty => "open-empty",
            SessionState::Searching => "searching",
            SessionState::OpenResults => "open-results",
        })
    }
}

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
}

/// A key press; `modifier` is Cmd on macOS and Ctrl elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifier: bool,
}

impl KeyEvent {
    #[must_use]
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifier: false,
        }
    }

    #[must_use]
    pub fn with_modifier(key: Key) -> Self {
        Self {
            key,
            modifier: true,
        }
    }
}

/// What the host should do after an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Go to a post page. The session has already closed.
    Navigate { slug: String, path: String },
    /// A history entry was put back into the query field.
    Requery(String),
}

/// An entry the selection can point at.
#[derive(Debug, Clone, Copy)]
pub enum SelectableItem<'a> {
    History(&'a str),
    Result(&'a SearchResult),
}

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub options: QueryOptions,
    pub history_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            options: QueryOptions::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// The stateful core of search: query text, debounce, results, selection
/// and history.
pub struct SessionController<S: Scheduler> {
    scheduler: S,
    searcher: Option<Arc<dyn Searcher>>,
    store: Box<dyn HistoryStore>,
    settings: SessionSettings,
    is_open: bool,
    query: String,
    results: Vec<SearchResult>,
    is_searching: bool,
    selected_index: usize,
    history: SearchHistory,
    pending: Option<TimerHandle>,
}

impl<S: Scheduler> SessionController<S> {
    /// Create a closed session, loading history from `store`.
    ///
    /// The index starts unset; lookups return nothing until
    /// [`set_searcher`](Self::set_searcher) is called.
    pub fn new(scheduler: S, store: Box<dyn HistoryStore>, settings: SessionSettings) -> Self {
        let mut session = Self {
            scheduler,
            searcher: None,
            store,
            settings,
            is_open: false,
            query: String::new(),
            results: Vec::new(),
            is_searching: false,
            selected_index: 0,
            history: SearchHistory::new(settings.history_capacity),
            pending: None,
        };
        session.reload_history();
        session
    }

    /// Install the index built from a freshly loaded corpus.
    pub fn set_searcher(&mut self, searcher: Arc<dyn Searcher>) {
        self.searcher = Some(searcher);
    }

    /// Drop the index, e.g. after a corpus load failure.
    pub fn clear_searcher(&mut self) {
        self.searcher = None;
    }

    #[must_use]
    pub fn has_searcher(&self) -> bool {
        self.searcher.is_some()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if !self.is_open {
            SessionState::Idle
        } else if self.query.trim().is_empty() {
            SessionState::OpenEmpty
        } else if self.is_searching {
            SessionState::Searching
        } else {
            SessionState::OpenResults
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    #[must_use]
    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Handle of the debounce timer, if one is pending.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending
    }

    /// History entries while the query is empty, results otherwise.
    #[must_use]
    pub fn selectable_items(&self) -> Vec<SelectableItem<'_>> {
        if self.query.trim().is_empty() {
            self.history.iter().map(SelectableItem::History).collect()
        } else {
            self.results.iter().map(SelectableItem::Result).collect()
        }
    }

    fn selectable_len(&self) -> usize {
        if self.query.trim().is_empty() {
            self.history.len()
        } else {
            self.results.len()
        }
    }

    pub fn open_search(&mut self) {
        self.cancel_pending();
        self.is_open = true;
        self.query.clear();
        self.results.clear();
        self.is_searching = false;
        self.selected_index = 0;
        self.reload_history();
    }

    /// Close and reset. A pending lookup is cancelled so no stale results
    /// land after close.
    pub fn close_search(&mut self) {
        self.cancel_pending();
        self.is_open = false;
        self.query.clear();
        self.results.clear();
        self.is_searching = false;
        self.selected_index = 0;
    }

    pub fn toggle_search(&mut self) {
        if self.is_open {
            self.close_search();
        } else {
            self.open_search();
        }
    }

    /// Replace the query text and restart the debounce timer.
    ///
    /// Ignored while closed.
    pub fn set_query(&mut self, text: &str) {
        if !self.is_open {
            debug!("ignoring query input while search is closed");
            return;
        }

        self.cancel_pending();
        self.query = text.to_string();

        if text.trim().is_empty() {
            self.results.clear();
            self.is_searching = false;
        } else {
            self.pending = Some(self.scheduler.schedule(self.settings.debounce));
            self.is_searching = true;
        }
        self.reconcile_selection();
    }

    /// Deliver a fired timer.
    ///
    /// Only the current pending handle runs a lookup.
    pub fn on_timer(&mut self, handle: TimerHandle) {
        if self.pending != Some(handle) {
            debug!(?handle, "ignoring timer that is no longer pending");
            return;
        }
        self.pending = None;

        let query = self.query.trim().to_string();
        let results = match &self.searcher {
            Some(searcher) => searcher.search(&query, &self.settings.options),
            None => {
                debug!("search index not loaded; no results");
                Vec::new()
            }
        };

        self.results = results;
        self.is_searching = false;

        if self.searcher.is_some() && query.chars().count() > HISTORY_MIN_EXCLUSIVE {
            self.history.record(&query);
            self.persist_history();
        }
        self.reconcile_selection();
    }

    /// Apply a key press. Returns an action when an item was activated.
    pub fn handle_key(&mut self, event: KeyEvent) -> Option<SessionAction> {
        match event.key {
            Key::Char(c) if event.modifier && c.eq_ignore_ascii_case(&'k') => {
                self.toggle_search();
                None
            }
            Key::Escape if self.is_open => {
                self.close_search();
                None
            }
            _ if !self.is_open => None,
            Key::ArrowDown => {
                self.select_next();
                None
            }
            Key::ArrowUp => {
                self.select_previous();
                None
            }
            Key::Enter => self.activate_selected(),
            Key::Char(_) | Key::Escape => None,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.selectable_len();
        self.selected_index = if len == 0 {
            0
        } else {
            (self.selected_index + 1).min(len - 1)
        };
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Activate the selected item.
    ///
    /// A history entry becomes the new query; a result closes the session
    /// and asks the host to navigate.
    pub fn activate_selected(&mut self) -> Option<SessionAction> {
        let action = match self.selectable_items().get(self.selected_index)? {
            SelectableItem::History(query) => SessionAction::Requery((*query).to_string()),
            SelectableItem::Result(result) => SessionAction::Navigate {
                slug: result.post.slug.clone(),
                path: result.post.url_path(),
            },
        };

        match &action {
            SessionAction::Requery(query) => self.set_query(query),
            SessionAction::Navigate { .. } => self.close_search(),
        }
        Some(action)
    }

    /// Forget all history, in memory and in storage.
    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Err(e) = self.store.clear() {
            debug!(error = %e, "failed to clear stored history");
        }
        self.reconcile_selection();
    }

    /// Cancel outstanding work. Called on drop.
    pub fn shutdown(&mut self) {
        self.cancel_pending();
        self.is_searching = false;
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn reconcile_selection(&mut self) {
        if self.selected_index >= self.selectable_len() {
            self.selected_index = 0;
        }
    }

    fn reload_history(&mut self) {
        match self.store.load() {
            Ok(entries) => {
                self.history = SearchHistory::from_entries(entries, self.settings.history_capacity);
            }
            Err(e) => {
                debug!(error = %e, location = %self.store.location(), "history unavailable");
            }
        }
    }

    fn persist_history(&mut self) {
        if let Err(e) = self.store.save(&self.history.to_vec()) {
            debug!(error = %e, location = %self.store.location(), "failed to save history");
        }
    }
}

impl SessionController<TimerQueue> {
    /// Move the virtual clock and deliver every timer that came due.
    pub fn advance(&mut self, by: Duration) {
        for handle in self.scheduler.advance(by) {
            self.on_timer(handle);
        }
    }

    /// Fire all pending timers.
    pub fn settle(&mut self) {
        for handle in self.scheduler.settle() {
            self.on_timer(handle);
        }
    }
}

impl<S: Scheduler> Drop for SessionController<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: Scheduler> fmt::Debug for SessionController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("query", &self.query)
            .field("results", &self.results.len())
            .field("selected_index", &self.selected_index)
            .field("history", &self.history)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
