//! Sitemap entries for the home page, the about page and every post.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use crate::corpus::Post;
use crate::highlight::escape_html;
use crate::seo::SiteInfo;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// How often a page is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: NaiveDate,
    pub change_frequency: ChangeFrequency,
    pub priority: f64,
}

/// Entries for the home page and `/about`, both dated `today`, followed by
/// one per post in the order given.
#[must_use]
pub fn sitemap(posts: &[Post], site: &SiteInfo, today: NaiveDate) -> Vec<SitemapEntry> {
    let mut entries = vec![
        SitemapEntry {
            url: site.base().to_string(),
            last_modified: today,
            change_frequency: ChangeFrequency::Weekly,
            priority: 1.0,
        },
        SitemapEntry {
            url: format!("{}/about", site.base()),
            last_modified: today,
            change_frequency: ChangeFrequency::Monthly,
            priority: 0.8,
        },
    ];

    entries.extend(posts.iter().map(|post| SitemapEntry {
        url: site.post_url(post),
        last_modified: post.updated_at.unwrap_or(post.date),
        change_frequency: ChangeFrequency::Monthly,
        priority: 0.7,
    }));
    entries
}

/// Render entries as a sitemaps.org `<urlset>` document.
#[must_use]
pub fn sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(out, "<urlset xmlns=\"{SITEMAP_NS}\">");
    for entry in entries {
        let _ = writeln!(
            out,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>",
            escape_html(&entry.url),
            entry.last_modified,
            entry.change_frequency.as_str(),
            entry.priority,
        );
    }
    out.push_str("</urlset>\n");
    out
}
