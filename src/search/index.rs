//! Weighted fuzzy index over a post corpus.
//!
//! The index is a snapshot: posts are shared behind `Arc` and field text is
//! folded once at build time. Rebuild it to pick up corpus changes.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::corpus::Post;
use crate::search::fuzzy::{self, ValueHit};
use crate::search::{
    FieldMatch, FieldWeights, IndexError, PostField, QueryOptions, SearchResult, Searcher,
};

/// One searchable value of one post, ready for matching.
#[derive(Debug)]
struct IndexedValue {
    field: PostField,
    element: Option<usize>,
    text: String,
    folded: Vec<char>,
    /// Normalized field weight times the value's length norm.
    exponent: f64,
}

#[derive(Debug)]
struct IndexedPost {
    ref_index: usize,
    post: Arc<Post>,
    values: Vec<IndexedValue>,
}

/// In-memory search index over posts.
#[derive(Debug)]
pub struct SearchIndex {
    entries: Vec<IndexedPost>,
    min_match_char_length: usize,
}

impl SearchIndex {
    /// Build an index over `posts`.
    ///
    /// Posts without a title or content are left out of the index.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Configuration` if any weight is not positive.
    pub fn build(
        posts: &[Post],
        weights: &FieldWeights,
        min_match_char_length: usize,
    ) -> Result<Self, IndexError> {
        weights.validate()?;
        let normalized = weights.normalized();

        let mut entries = Vec::with_capacity(posts.len());
        for (ref_index, post) in posts.iter().enumerate() {
            if !post.is_searchable() {
                warn!(slug = %post.slug, "post has no title or content; not indexed");
                continue;
            }

            let mut values = Vec::new();
            for &(field, weight) in &normalized {
                for (i, text) in field.values(post).into_iter().enumerate() {
                    values.push(IndexedValue {
                        field,
                        element: field.is_list().then_some(i),
                        text: text.to_string(),
                        folded: fuzzy::fold_case(text),
                        exponent: weight * field_norm(text),
                    });
                }
            }

            entries.push(IndexedPost {
                ref_index,
                post: Arc::new(post.clone()),
                values,
            });
        }

        debug!(posts = entries.len(), "built search index");
        Ok(Self {
            entries,
            min_match_char_length,
        })
    }

    /// Run a query against the index.
    ///
    /// Results are ordered ascending by score (lower is better), ties in
    /// corpus order, and truncated to `options.limit` after sorting. Every
    /// returned score is at most the clamped threshold.
    #[must_use]
    pub fn query(&self, text: &str, options: &QueryOptions) -> Vec<SearchResult> {
        let text = text.trim();
        if text.is_empty() || options.limit == 0 {
            return Vec::new();
        }

        let pattern = fuzzy::fold_case(text);
        let threshold = if options.threshold.is_nan() {
            0.0
        } else {
            options.threshold.clamp(0.0, 1.0)
        };

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .filter_map(|entry| self.score_post(entry, &pattern, threshold))
            .collect();

        results.sort_by(|a, b| a.score.total_cmp(&b.score));
        results.truncate(options.limit);

        debug!(query = text, hits = results.len(), "search completed");
        results
    }

    fn score_post(&self, entry: &IndexedPost, pattern: &[char], threshold: f64) -> Option<SearchResult> {
        let mut matches = Vec::new();
        let mut weighted = 1.0_f64;

        for value in &entry.values {
            let Some(ValueHit { score, ranges }) =
                fuzzy::match_value(pattern, &value.folded, threshold, self.min_match_char_length)
            else {
                continue;
            };

            weighted *= score.max(f64::EPSILON).powf(value.exponent);
            matches.push(FieldMatch {
                field: value.field,
                element: value.element,
                value: value.text.clone(),
                ranges,
                score,
            });
        }

        if matches.is_empty() {
            return None;
        }

        // Weighted product is in (0, 1]; report it on the threshold's scale.
        let score = weighted * threshold;
        if score > threshold {
            return None;
        }

        Some(SearchResult {
            post: Arc::clone(&entry.post),
            ref_index: entry.ref_index,
            score,
            matches,
        })
    }

    /// Number of indexed posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Searcher for SearchIndex {
    fn search(&self, query: &str, options: &QueryOptions) -> Vec<SearchResult> {
        self.query(query, options)
    }
}

/// Length norm `1 / sqrt(words)`, rounded to three decimals.
#[allow(clippy::cast_precision_loss)]
fn field_norm(text: &str) -> f64 {
    let words = text.split(' ').filter(|w| !w.is_empty()).count().max(1);
    let norm = 1.0 / (words as f64).sqrt();
    (norm * 1000.0).round() / 1000.0
}
