//! Configuration loading for blogsearch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use tracing::debug;

use crate::search::{
    DEFAULT_LIMIT, DEFAULT_MIN_MATCH_CHAR_LENGTH, DEFAULT_THRESHOLD, FieldWeights, PostField,
    QueryOptions,
};
use crate::seo::SiteInfo;
use crate::session::{DEFAULT_DEBOUNCE, DEFAULT_HISTORY_CAPACITY, SessionSettings};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "BLOGSEARCH_CONFIG";

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub site: SiteInfo,
}

/// Where posts are read from. Each path is a post directory or a JSON file.
#[derive(Debug, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_paths")]
    pub paths: Vec<String>,
}

fn default_corpus_paths() -> Vec<String> {
    vec!["./posts".to_string()]
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            paths: default_corpus_paths(),
        }
    }
}

/// Matching and debounce tunables.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub limit: usize,
    pub threshold: f64,
    pub min_match_char_length: usize,
    pub debounce_ms: u64,
    /// Field name to weight. Empty means the built-in weights.
    pub weights: BTreeMap<String, f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
            min_match_char_length: DEFAULT_MIN_MATCH_CHAR_LENGTH,
            debounce_ms: u64::try_from(DEFAULT_DEBOUNCE.as_millis()).unwrap_or(300),
            weights: BTreeMap::new(),
        }
    }
}

impl SearchConfig {
    /// Field weights, validated.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown field names or non-positive weights.
    pub fn field_weights(&self) -> anyhow::Result<FieldWeights> {
        if self.weights.is_empty() {
            return Ok(FieldWeights::default());
        }
        let mut entries: Vec<(&str, f64)> =
            self.weights.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by_key(|(name, _)| {
            PostField::ALL
                .iter()
                .position(|f| f.name() == *name)
                .unwrap_or(usize::MAX)
        });
        Ok(FieldWeights::from_names(entries)?)
    }

    #[must_use]
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            limit: self.limit,
            threshold: self.threshold,
        }
    }
}

/// Recent-query storage.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// History file. Defaults to `history.json` in the data directory.
    pub path: Option<String>,
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl HistoryConfig {
    /// Resolved history file location.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => expand_tilde(path),
            None => Config::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("history.json"),
        }
    }
}

impl Config {
    /// Load config from `$BLOGSEARCH_CONFIG` or ~/.config/blogsearch/config.toml,
    /// or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }

        debug!("no config file; using defaults");
        Ok(Config::default())
    }

    /// Load config from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "blogsearch").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    #[must_use]
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "blogsearch").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Corpus paths with `~` expanded.
    #[must_use]
    pub fn corpus_paths(&self) -> Vec<PathBuf> {
        self.corpus.paths.iter().map(|p| expand_tilde(p)).collect()
    }

    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            debounce: Duration::from_millis(self.search.debounce_ms),
            options: self.search.query_options(),
            history_capacity: self.history.capacity,
        }
    }
}

/// Expand ~ to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
