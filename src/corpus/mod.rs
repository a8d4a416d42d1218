//! Post corpus loading.
//!
//! A corpus is either a directory laid out as `<YYYY>/<id>/page.mdx` with
//! YAML front-matter, or a JSON array of posts (the shape served to the
//! search client).

pub mod frontmatter;
pub mod tags;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::seo::reading_time;

/// File names recognised as post sources, in priority order.
const POST_FILES: [&str; 2] = ["page.mdx", "page.md"];

/// Errors that can occur when loading a corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read corpus: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse posts JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid front-matter: {0}")]
    FrontMatter(String),

    #[error("{path}: missing required field '{field}'")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { path: PathBuf, value: String },

    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),
}

/// A blog post record.
///
/// Immutable once loaded. The slug (`YYYY/id`) is unique across a corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub date: NaiveDate,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDate>,
    /// Estimated reading time in minutes.
    #[serde(default)]
    pub reading_time: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Post {
    /// Site-relative URL path of the post page.
    #[must_use]
    pub fn url_path(&self) -> String {
        format!("/{}", self.slug)
    }

    /// Whether the post has enough text to be indexed.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

/// A loaded post corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub root: PathBuf,
    posts: Vec<Post>,
}

impl Corpus {
    /// Build a corpus from already-loaded posts.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::DuplicateSlug` if two posts share a slug.
    pub fn from_posts(root: PathBuf, posts: Vec<Post>) -> Result<Self, CorpusError> {
        let mut seen = HashSet::new();
        for post in &posts {
            if !seen.insert(post.slug.as_str()) {
                return Err(CorpusError::DuplicateSlug(post.slug.clone()));
            }
        }
        Ok(Self { root, posts })
    }

    /// Load a corpus from a posts directory or a `.json` posts file.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::NotFound` if the path doesn't exist, or any
    /// read/parse error from the posts themselves.
    pub fn load(root: &Path) -> Result<Self, CorpusError> {
        if !root.exists() {
            return Err(CorpusError::NotFound(root.to_path_buf()));
        }

        if root.is_file() {
            let contents = fs::read_to_string(root)?;
            return Self::from_json(root.to_path_buf(), &contents);
        }

        let mut posts = Vec::new();
        for entry in WalkDir::new(root).min_depth(2).max_depth(2).sort_by_file_name() {
            let entry = entry.map_err(|e| CorpusError::Read(e.into()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some((year, id)) = post_dir_parts(root, entry.path()) else {
                continue;
            };
            let Some(file) = POST_FILES
                .iter()
                .map(|name| entry.path().join(name))
                .find(|p| p.is_file())
            else {
                debug!(dir = %entry.path().display(), "skipping post directory without page file");
                continue;
            };

            let source = fs::read_to_string(&file)?;
            posts.push(parse_post(&file, &year, &id, &source)?);
        }

        debug!(root = %root.display(), count = posts.len(), "loaded corpus");
        Self::from_posts(root.to_path_buf(), posts)
    }

    /// Parse a JSON array of posts.
    ///
    /// Reading time is recomputed when the payload omits it.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Json` on malformed input or
    /// `CorpusError::DuplicateSlug` on repeated slugs.
    pub fn from_json(root: PathBuf, json: &str) -> Result<Self, CorpusError> {
        let mut posts: Vec<Post> = serde_json::from_str(json)?;
        for post in &mut posts {
            if post.reading_time == 0 {
                post.reading_time = reading_time(&post.content);
            }
        }
        Self::from_posts(root, posts)
    }

    /// Serialize the posts as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, CorpusError> {
        Ok(serde_json::to_string_pretty(&self.posts)?)
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }

    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&Post> {
        let slug = slug.trim_matches('/');
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Posts ordered newest first; equal dates keep corpus order.
    #[must_use]
    pub fn sorted_by_date(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }
}

/// Extract `(year, id)` from a `<root>/<YYYY>/<id>` directory.
fn post_dir_parts(root: &Path, dir: &Path) -> Option<(String, String)> {
    let relative = dir.strip_prefix(root).ok()?;
    let mut components = relative.components();
    let year = components.next()?.as_os_str().to_str()?;
    let id = components.next()?.as_os_str().to_str()?;

    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((year.to_string(), id.to_string()))
}

/// Build a post from a page file's contents.
///
/// # Errors
///
/// Returns an error if the front-matter is malformed, or `title`/`date`
/// is missing or invalid.
pub fn parse_post(path: &Path, year: &str, id: &str, source: &str) -> Result<Post, CorpusError> {
    let (front, body) = frontmatter::parse(source)?;

    let title = front.title.ok_or_else(|| CorpusError::MissingField {
        path: path.to_path_buf(),
        field: "title",
    })?;
    let date_str = front.date.ok_or_else(|| CorpusError::MissingField {
        path: path.to_path_buf(),
        field: "date",
    })?;
    let date = parse_date(path, &date_str)?;
    let updated_at = front
        .updated_at
        .map(|value| parse_date(path, &value))
        .transpose()?;

    if title.trim().is_empty() {
        warn!(path = %path.display(), "post has an empty title");
    }

    Ok(Post {
        id: id.to_string(),
        date,
        slug: format!("{year}/{id}"),
        title,
        description: front.description.filter(|d| !d.trim().is_empty()),
        reading_time: reading_time(body),
        content: body.to_string(),
        updated_at,
        tags: front.tags,
    })
}

fn parse_date(path: &Path, value: &str) -> Result<NaiveDate, CorpusError> {
    // Accept full timestamps by keeping the date part.
    let trimmed = value.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| CorpusError::InvalidDate {
        path: path.to_path_buf(),
        value: value.to_string(),
    })
}
