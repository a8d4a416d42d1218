//! Post metadata helpers: reading time, keywords and schema.org JSON-LD.
//!
//! JSON-LD nodes are plain structs; each carries a single-variant enum in its
//! `@type` slot so a node can only ever serialize as its own schema type.

pub mod metadata;
pub mod sitemap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::corpus::Post;

pub use metadata::PostMetadata;
pub use sitemap::{ChangeFrequency, SitemapEntry, sitemap, sitemap_xml};

/// Reading speed used for the reading-time estimate, in characters.
pub const CHARS_PER_MINUTE: usize = 350;

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Technology names picked up as keywords when a post mentions them.
const TECH_KEYWORDS: [&str; 10] = [
    "AI",
    "React",
    "Next.js",
    "JavaScript",
    "TypeScript",
    "Rust",
    "WebAssembly",
    "CSS",
    "Node.js",
    "GraphQL",
];

/// Characters of text, not counting whitespace.
#[must_use]
pub fn char_count(content: &str) -> usize {
    content.chars().filter(|c| !c.is_whitespace()).count()
}

/// Estimated reading time in whole minutes, rounded up.
#[must_use]
pub fn reading_time(content: &str) -> u32 {
    let minutes = char_count(content).div_ceil(CHARS_PER_MINUTE);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Keywords for a post: title words longer than two characters, then any
/// known technology names the title or content mention. No duplicates.
#[must_use]
pub fn extract_keywords(title: &str, content: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut push = |word: &str| {
        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    };

    for word in title.split_whitespace().filter(|w| w.chars().count() > 2) {
        push(word);
    }
    for keyword in TECH_KEYWORDS {
        if title.contains(keyword) || content.contains(keyword) {
            push(keyword);
        }
    }
    keywords
}

/// Site-wide facts used in structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    /// Base URL without a trailing slash.
    pub url: String,
    pub name: String,
    pub description: String,
    /// BCP 47 tag for JSON-LD, e.g. `en-US`.
    pub language: String,
    /// Open Graph locale, e.g. `en_US`.
    pub locale: String,
    pub author: String,
    pub author_url: Option<String>,
    pub same_as: Vec<String>,
    /// Twitter handle credited on cards, e.g. `@someone`.
    pub twitter: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            url: "https://example.com".to_string(),
            name: "Blog".to_string(),
            description: "A personal blog".to_string(),
            language: "en-US".to_string(),
            locale: "en_US".to_string(),
            author: "Author".to_string(),
            author_url: None,
            same_as: Vec::new(),
            twitter: None,
        }
    }
}

impl SiteInfo {
    pub(crate) fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    #[must_use]
    pub fn post_url(&self, post: &Post) -> String {
        format!("{}{}", self.base(), post.url_path())
    }

    #[must_use]
    pub fn og_image_url(&self, post: &Post) -> String {
        format!("{}/og/{}", self.base(), post.id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BlogPostingType {
    #[default]
    BlogPosting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PersonType {
    #[default]
    Person,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BlogType {
    #[default]
    Blog,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum WebPageType {
    #[default]
    WebPage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "@type")]
    pub kind: PersonType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub same_as: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "@type")]
    pub kind: BlogType,
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub in_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebPage {
    #[serde(rename = "@type")]
    pub kind: WebPageType,
    #[serde(rename = "@id")]
    pub id: String,
}

/// schema.org `BlogPosting` for one post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPosting {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: BlogPostingType,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
    pub date_published: NaiveDate,
    pub date_modified: NaiveDate,
    pub author: Person,
    pub publisher: Person,
    pub is_part_of: Blog,
    pub main_entity_of_page: WebPage,
    pub word_count: usize,
    pub keywords: String,
    pub in_language: String,
}

impl BlogPosting {
    /// Structured data for `post` on `site`.
    #[must_use]
    pub fn for_post(post: &Post, site: &SiteInfo) -> Self {
        Self {
            context: SCHEMA_CONTEXT,
            kind: BlogPostingType::BlogPosting,
            headline: post.title.clone(),
            description: post.description.clone(),
            image: site.og_image_url(post),
            date_published: post.date,
            date_modified: post.updated_at.unwrap_or(post.date),
            author: Person {
                kind: PersonType::Person,
                name: site.author.clone(),
                url: site.author_url.clone(),
                same_as: site.same_as.clone(),
            },
            publisher: Person {
                kind: PersonType::Person,
                name: site.author.clone(),
                url: None,
                same_as: Vec::new(),
            },
            is_part_of: Blog {
                kind: BlogType::Blog,
                id: site.base().to_string(),
                name: site.name.clone(),
                description: site.description.clone(),
                url: site.base().to_string(),
                in_language: site.language.clone(),
            },
            main_entity_of_page: WebPage {
                kind: WebPageType::WebPage,
                id: site.post_url(post),
            },
            word_count: char_count(&post.content),
            keywords: extract_keywords(&post.title, &post.content).join(", "),
            in_language: site.language.clone(),
        }
    }

    /// Pretty-printed JSON for embedding in a `<script type="application/ld+json">`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(updated: Option<NaiveDate>) -> Post {
        Post {
            id: "hello-rust".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            slug: "2025/hello-rust".to_string(),
            title: "Hello Rust and React".to_string(),
            description: Some("First steps".to_string()),
            content: "Rust meets TypeScript".to_string(),
            updated_at: updated,
            reading_time: 1,
            tags: vec!["rust".to_string()],
        }
    }

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time(""), 0);
        assert_eq!(reading_time("a"), 1);
        assert_eq!(reading_time(&"x".repeat(350)), 1);
        assert_eq!(reading_time(&"x".repeat(700)), 2);
        assert_eq!(reading_time(&"x ".repeat(351)), 2);
    }

    #[test]
    fn keywords_from_title_and_tech_terms() {
        let keywords = extract_keywords("Hello Rust and React", "Rust meets TypeScript");
        assert_eq!(
            keywords,
            vec!["Hello", "Rust", "and", "React", "TypeScript"]
        );
    }

    #[test]
    fn json_ld_shape() {
        let site = SiteInfo {
            url: "https://blog.example/".to_string(),
            ..SiteInfo::default()
        };
        let value = serde_json::to_value(BlogPosting::for_post(&post(None), &site)).unwrap();

        assert_eq!(value["@context"], "https://schema.org");
        assert_eq!(value["@type"], "BlogPosting");
        assert_eq!(value["author"]["@type"], "Person");
        assert_eq!(value["isPartOf"]["@type"], "Blog");
        assert_eq!(value["datePublished"], "2025-04-01");
        assert_eq!(value["dateModified"], "2025-04-01");
        assert_eq!(value["image"], "https://blog.example/og/hello-rust");
        assert_eq!(
            value["mainEntityOfPage"]["@id"],
            "https://blog.example/2025/hello-rust"
        );
        assert_eq!(value["wordCount"], 19);
        assert!(value["author"].get("url").is_none());
    }

    #[test]
    fn json_ld_uses_updated_date() {
        let updated = NaiveDate::from_ymd_opt(2025, 5, 2);
        let posting = BlogPosting::for_post(&post(updated), &SiteInfo::default());
        let json = posting.to_json().unwrap();
        assert!(json.contains("\"dateModified\": \"2025-05-02\""));
    }
}
