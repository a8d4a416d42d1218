//! Search index trait and types.
//!
//! Scores follow a distance convention: lower is a better match, and results
//! are ordered ascending by score.

pub mod fuzzy;
pub mod index;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::corpus::Post;

pub use index::SearchIndex;

/// Default maximum number of results per query.
pub const DEFAULT_LIMIT: usize = 10;

/// Default dissimilarity threshold (0 = exact only, 1 = anything).
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Default minimum length of a field value, and of a matched run.
pub const DEFAULT_MIN_MATCH_CHAR_LENGTH: usize = 2;

/// Errors raised while building an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Invalid search configuration: {0}")]
    Configuration(String),
}

/// Searchable fields of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Title,
    Tags,
    Description,
    Content,
}

impl PostField {
    pub const ALL: [PostField; 4] = [
        PostField::Title,
        PostField::Tags,
        PostField::Description,
        PostField::Content,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Tags => "tags",
            PostField::Description => "description",
            PostField::Content => "content",
        }
    }

    /// The field's text values on a post; list fields yield one per element.
    #[must_use]
    pub fn values(self, post: &Post) -> Vec<&str> {
        match self {
            PostField::Title => vec![post.title.as_str()],
            PostField::Tags => post.tags.iter().map(String::as_str).collect(),
            PostField::Description => post.description.as_deref().into_iter().collect(),
            PostField::Content => vec![post.content.as_str()],
        }
    }

    /// Whether the field holds a list of values.
    #[must_use]
    pub fn is_list(self) -> bool {
        matches!(self, PostField::Tags)
    }
}

impl fmt::Display for PostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PostField {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| IndexError::Configuration(format!("unknown post field '{s}'")))
    }
}

/// Relative importance of each searched field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWeights {
    weights: Vec<(PostField, f64)>,
}

impl FieldWeights {
    /// Build a weight table from field names.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` for unknown field names, repeated
    /// fields, or weights that are not finite and positive.
    pub fn from_names<I, S>(entries: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut weights: Vec<(PostField, f64)> = Vec::new();
        for (name, weight) in entries {
            let field: PostField = name.as_ref().parse()?;
            if weights.iter().any(|(f, _)| *f == field) {
                return Err(IndexError::Configuration(format!(
                    "field '{field}' listed more than once"
                )));
            }
            weights.push((field, weight));
        }
        let table = Self { weights };
        table.validate()?;
        Ok(table)
    }

    /// Check every weight is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` naming the offending field.
    pub fn validate(&self) -> Result<(), IndexError> {
        for (field, weight) in &self.weights {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(IndexError::Configuration(format!(
                    "weight for '{field}' must be positive, got {weight}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn entries(&self) -> &[(PostField, f64)] {
        &self.weights
    }

    /// Weights scaled to sum to 1, preserving order.
    #[must_use]
    pub fn normalized(&self) -> Vec<(PostField, f64)> {
        let total: f64 = self.weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        self.weights.iter().map(|(f, w)| (*f, w / total)).collect()
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            weights: vec![
                (PostField::Title, 0.4),
                (PostField::Tags, 0.3),
                (PostField::Description, 0.2),
                (PostField::Content, 0.1),
            ],
        }
    }
}

/// Per-query limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    pub limit: usize,
    pub threshold: f64,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Inclusive character range `[start, end]` within a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

impl MatchRange {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Matched spans within one field value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: PostField,
    /// Position of the value within a list field (tags).
    pub element: Option<usize>,
    pub value: String,
    pub ranges: Vec<MatchRange>,
    /// Dissimilarity of this value alone, in `[0, 1]`.
    pub score: f64,
}

/// A ranked hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub post: Arc<Post>,
    /// Position of the post in the indexed corpus.
    pub ref_index: usize,
    /// Field-weighted dissimilarity in `[0, threshold]`.
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

impl SearchResult {
    /// The first match recorded for `field`, if any.
    #[must_use]
    pub fn field_match(&self, field: PostField) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.field == field)
    }

    /// Matched ranges for `field`, empty when the field did not match.
    #[must_use]
    pub fn ranges(&self, field: PostField) -> &[MatchRange] {
        self.field_match(field).map_or(&[], |m| m.ranges.as_slice())
    }
}

/// Anything the search session can run lookups against.
pub trait Searcher {
    /// Search for posts matching the query.
    fn search(&self, query: &str, options: &QueryOptions) -> Vec<SearchResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in PostField::ALL {
            assert_eq!(field.name().parse::<PostField>().unwrap(), field);
        }
        assert!("author".parse::<PostField>().is_err());
    }

    #[test]
    fn weights_reject_non_positive() {
        let err = FieldWeights::from_names([("title", 0.0)]).unwrap_err();
        assert!(err.to_string().contains("must be positive"));

        assert!(FieldWeights::from_names([("title", -1.0)]).is_err());
        assert!(FieldWeights::from_names([("title", f64::NAN)]).is_err());
    }

    #[test]
    fn weights_reject_unknown_and_repeated_fields() {
        let err = FieldWeights::from_names([("summary", 1.0)]).unwrap_err();
        assert!(err.to_string().contains("unknown post field 'summary'"));

        let err = FieldWeights::from_names([("title", 1.0), ("title", 2.0)]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn normalized_weights_sum_to_one() {
        let weights = FieldWeights::from_names([("title", 2.0), ("content", 0.5)]).unwrap();
        let normalized = weights.normalized();
        let total: f64 = normalized.iter().map(|(_, w)| w).sum();

        assert!((total - 1.0).abs() < 1e-12);
        assert!((normalized[0].1 - 0.8).abs() < 1e-12);
    }

    #[test]
    fn match_range_len() {
        assert_eq!(MatchRange::new(9, 12).len(), 4);
        assert_eq!(MatchRange::new(3, 3).len(), 1);
    }
}
