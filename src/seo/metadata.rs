//! Page metadata for a post: document title, Open Graph and Twitter card.

use chrono::NaiveDate;
use serde::Serialize;

use crate::corpus::Post;
use crate::seo::{SiteInfo, extract_keywords, reading_time};

/// Size of the generated Open Graph image.
pub const OG_IMAGE_WIDTH: u32 = 1200;
pub const OG_IMAGE_HEIGHT: u32 = 630;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenGraphType {
    #[default]
    Article,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TwitterCardType {
    #[default]
    SummaryLargeImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenGraphImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: OpenGraphType,
    pub published_time: NaiveDate,
    pub modified_time: NaiveDate,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub url: String,
    pub images: Vec<OpenGraphImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: TwitterCardType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

/// Extra `<meta>` tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleTags {
    #[serde(rename = "reading-time")]
    pub reading_time: String,
    #[serde(rename = "article:author")]
    pub author: String,
    #[serde(rename = "article:published_time")]
    pub published_time: NaiveDate,
    #[serde(rename = "og:locale")]
    pub locale: String,
}

/// Everything a post page puts in its `<head>`, apart from JSON-LD.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    pub other: ArticleTags,
}

impl PostMetadata {
    /// Metadata for `post` on `site`.
    #[must_use]
    pub fn for_post(post: &Post, site: &SiteInfo) -> Self {
        let keywords = extract_keywords(&post.title, &post.content);
        let image = site.og_image_url(post);

        Self {
            title: format!("{} | {}", post.title, site.name),
            description: post.description.clone(),
            keywords: keywords.clone(),
            open_graph: OpenGraph {
                title: post.title.clone(),
                description: post.description.clone(),
                kind: OpenGraphType::Article,
                published_time: post.date,
                modified_time: post.updated_at.unwrap_or(post.date),
                authors: vec![site.author.clone()],
                tags: keywords,
                url: site.post_url(post),
                images: vec![OpenGraphImage {
                    url: image.clone(),
                    width: OG_IMAGE_WIDTH,
                    height: OG_IMAGE_HEIGHT,
                    alt: post.title.clone(),
                }],
            },
            twitter: TwitterCard {
                card: TwitterCardType::SummaryLargeImage,
                title: post.title.clone(),
                description: post.description.clone(),
                images: vec![image],
                creator: site.twitter.clone(),
            },
            other: ArticleTags {
                reading_time: format!("{} min", reading_time(&post.content)),
                author: site.author.clone(),
                published_time: post.date,
                locale: site.locale.clone(),
            },
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
