//! Tag browsing over a corpus.

use std::collections::HashMap;

use crate::corpus::Post;

/// A tag and the number of posts carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Count posts per tag, most used first.
///
/// Equal counts are ordered by tag name so the listing is stable.
#[must_use]
pub fn tag_counts(posts: &[Post]) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        for tag in &post.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    tags
}

/// Posts carrying `tag` (exact match), in corpus order.
#[must_use]
pub fn posts_with_tag<'a>(posts: &'a [Post], tag: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|p| p.tags.iter().any(|t| t == tag))
        .collect()
}
