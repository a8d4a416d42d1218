//! Command implementations behind the CLI.
//!
//! Each command takes the loaded `Config` and returns data; printing is left
//! to `main`.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cli::HighlightStyle;
use crate::config::Config;
use crate::corpus::tags::{TagCount, posts_with_tag, tag_counts};
use crate::corpus::{Corpus, Post};
use crate::highlight::{self, snippet};
use crate::search::{MatchRange, PostField, SearchIndex, SearchResult};
use crate::seo::{self, BlogPosting, PostMetadata};
use crate::session::script::parse_script;
use crate::session::{SessionAction, SessionController, TimerQueue};
use crate::storage::HistoryStore;
use crate::storage::local::LocalHistoryStore;

/// Maximum query length accepted from the command line, in characters.
const MAX_QUERY_LENGTH: usize = 200;

/// Characters of context shown either side of a content match.
const SNIPPET_RADIUS: usize = 60;

/// Reject queries the search box would never send.
///
/// # Errors
///
/// Returns an error if the query is longer than 200 characters.
pub fn validate_query(query: &str) -> anyhow::Result<()> {
    let len = query.chars().count();
    if len > MAX_QUERY_LENGTH {
        anyhow::bail!("Query too long: {len} chars (max {MAX_QUERY_LENGTH})");
    }
    Ok(())
}

/// Load posts from every configured corpus path.
///
/// Missing paths are skipped. When two corpora share a slug the first one
/// wins.
///
/// # Errors
///
/// Returns an error if no posts were loaded and at least one corpus failed.
/// Individual corpus failures are logged but don't fail the whole load.
pub fn load_posts(config: &Config) -> anyhow::Result<Vec<Post>> {
    let mut posts: Vec<Post> = Vec::new();
    let mut errors = Vec::new();

    for path in config.corpus_paths() {
        if !path.exists() {
            debug!(path = %path.display(), "corpus path does not exist");
            continue;
        }

        match Corpus::load(&path) {
            Ok(corpus) => {
                info!(path = %path.display(), posts = corpus.posts().len(), "loaded corpus");
                for post in corpus.into_posts() {
                    if posts.iter().any(|p| p.slug == post.slug) {
                        warn!(slug = %post.slug, "duplicate slug across corpora; keeping first");
                        continue;
                    }
                    posts.push(post);
                }
            }
            Err(e) => errors.push(format!("Load {}: {e}", path.display())),
        }
    }

    if posts.is_empty() && !errors.is_empty() {
        anyhow::bail!("{}", errors.join("\n  "));
    }
    for error in &errors {
        warn!("{error}");
    }

    Ok(posts)
}

/// Build the search index over `posts` with the configured weights.
///
/// # Errors
///
/// Returns an error if the weight table is invalid.
pub fn build_index(config: &Config, posts: &[Post]) -> anyhow::Result<SearchIndex> {
    let weights = config.search.field_weights()?;
    let index = SearchIndex::build(posts, &weights, config.search.min_match_char_length)?;
    Ok(index)
}

fn history_store(config: &Config) -> LocalHistoryStore {
    LocalHistoryStore::new(config.history.resolved_path())
}

fn new_session(config: &Config) -> SessionController<TimerQueue> {
    SessionController::new(
        TimerQueue::new(),
        Box::new(history_store(config)),
        config.session_settings(),
    )
}

/// Run one search the way the search box does: open, type, wait out the
/// debounce. Queries longer than two characters are remembered.
///
/// # Errors
///
/// Returns an error if the query is too long, the corpus cannot be loaded,
/// or the weight table is invalid.
pub fn search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    threshold: Option<f64>,
    tag: Option<&str>,
) -> anyhow::Result<Vec<SearchResult>> {
    validate_query(query)?;

    let posts = filter_by_tag(load_posts(config).context("Search failed")?, tag);
    let index = build_index(config, &posts).context("Search failed")?;

    let mut settings = config.session_settings();
    if let Some(limit) = limit {
        settings.options.limit = limit;
    }
    if let Some(threshold) = threshold {
        settings.options.threshold = threshold;
    }

    let mut session =
        SessionController::new(TimerQueue::new(), Box::new(history_store(config)), settings);
    session.set_searcher(Arc::new(index));
    session.open_search();
    session.set_query(query);
    session.settle();

    Ok(session.results().to_vec())
}

/// Posts newest first, optionally only those carrying `tag`.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded.
pub fn list(config: &Config, tag: Option<&str>) -> anyhow::Result<Vec<Post>> {
    let mut posts = filter_by_tag(load_posts(config).context("List failed")?, tag);
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(posts)
}

fn filter_by_tag(posts: Vec<Post>, tag: Option<&str>) -> Vec<Post> {
    match tag {
        Some(tag) => posts_with_tag(&posts, tag).into_iter().cloned().collect(),
        None => posts,
    }
}

/// Every tag with the number of posts carrying it.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded.
pub fn tags(config: &Config) -> anyhow::Result<Vec<TagCount>> {
    let posts = load_posts(config).context("Tags failed")?;
    Ok(tag_counts(&posts))
}

/// Look up a post by slug. A leading or trailing `/` is ignored.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or no post has the slug.
pub fn get(config: &Config, slug: &str) -> anyhow::Result<Post> {
    let wanted = slug.trim_matches('/');
    load_posts(config)?
        .into_iter()
        .find(|p| p.slug == wanted)
        .ok_or_else(|| anyhow::anyhow!("Post not found: {slug}"))
}

/// Recent queries, most recent first.
///
/// # Errors
///
/// Returns an error if the history file exists but cannot be read.
pub fn history(config: &Config) -> anyhow::Result<Vec<String>> {
    let store = history_store(config);
    let entries = store
        .load()
        .with_context(|| format!("Cannot read history at {}", store.location()))?;
    Ok(entries)
}

/// Forget all recent queries.
///
/// # Errors
///
/// Returns an error if the history file cannot be removed.
pub fn clear_history(config: &Config) -> anyhow::Result<()> {
    let mut store = history_store(config);
    store.clear()?;
    Ok(())
}

/// Pretty-printed `BlogPosting` JSON-LD for a post.
///
/// # Errors
///
/// Returns an error if the post is not found or serialization fails.
pub fn jsonld(config: &Config, slug: &str) -> anyhow::Result<String> {
    let post = get(config, slug)?;
    let json = BlogPosting::for_post(&post, &config.site).to_json()?;
    Ok(json)
}

/// Page metadata (title, Open Graph, Twitter card) for a post, as JSON.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or the post is missing.
pub fn metadata(config: &Config, slug: &str) -> anyhow::Result<String> {
    let post = get(config, slug)?;
    let json = PostMetadata::for_post(&post, &config.site).to_json()?;
    Ok(json)
}

/// Sitemap for the site, posts newest first. XML unless `json` is set.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded.
pub fn sitemap(config: &Config, json: bool) -> anyhow::Result<String> {
    let posts = list(config, None)?;
    let today = chrono::Local::now().date_naive();
    let entries = seo::sitemap(&posts, &config.site, today);
    debug!(entries = entries.len(), "built sitemap");

    if json {
        let mut out = serde_json::to_string_pretty(&entries)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(seo::sitemap_xml(&entries))
    }
}

/// Replay a session script and return a transcript, one line per event.
///
/// A corpus that fails to load leaves the session without an index; lookups
/// then come back empty.
///
/// # Errors
///
/// Returns an error if the script cannot be parsed.
pub fn session(config: &Config, script: &str) -> anyhow::Result<Vec<String>> {
    let events = parse_script(script).context("Invalid session script")?;

    let mut session = new_session(config);
    match load_posts(config).and_then(|posts| build_index(config, &posts)) {
        Ok(index) => session.set_searcher(Arc::new(index)),
        Err(e) => {
            warn!(error = %e, "search index unavailable");
            session.clear_searcher();
        }
    }

    let mut transcript = vec![format!("start: {}", describe_session(&session))];
    for event in &events {
        let action = event.apply(&mut session);
        transcript.push(format!("{event}: {}", describe_session(&session)));
        if let Some(action) = action {
            transcript.push(format!("  -> {}", describe_action(&action)));
        }
    }

    if session.pending_timer().is_some() {
        session.settle();
        transcript.push(format!("settled: {}", describe_session(&session)));
    }

    Ok(transcript)
}

/// One-line summary of a session's observable state.
#[must_use]
pub fn describe_session(session: &SessionController<TimerQueue>) -> String {
    let mut line = format!(
        "{} query={:?} selected={}",
        session.state(),
        session.query(),
        session.selected_index()
    );
    if !session.results().is_empty() {
        let slugs: Vec<&str> = session.results().iter().map(|r| r.post.slug.as_str()).collect();
        let _ = write!(line, " results=[{}]", slugs.join(", "));
    }
    if !session.history().is_empty() {
        let entries: Vec<&str> = session.history().iter().collect();
        let _ = write!(line, " history=[{}]", entries.join(", "));
    }
    line
}

fn describe_action(action: &SessionAction) -> String {
    match action {
        SessionAction::Navigate { path, .. } => format!("navigate {path}"),
        SessionAction::Requery(query) => format!("search {query:?}"),
    }
}

/// Render `text` with its matched ranges in the given style.
#[must_use]
pub fn render(style: HighlightStyle, text: &str, ranges: &[MatchRange]) -> String {
    match style {
        HighlightStyle::Plain => highlight::to_brackets(text, ranges),
        HighlightStyle::Ansi => highlight::to_ansi(text, ranges),
        HighlightStyle::Markup => highlight::to_markup(text, ranges),
    }
}

/// Multi-line listing of one result: title and slug, matched tags, then a
/// preview of the best matching text.
#[must_use]
pub fn format_result(rank: usize, result: &SearchResult, style: HighlightStyle) -> String {
    let post = &result.post;
    let mut out = format!(
        "{rank}. {}  ({})",
        render(style, &post.title, result.ranges(PostField::Title)),
        post.slug
    );

    if !post.tags.is_empty() {
        let tags: Vec<String> = post
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| render(style, tag, tag_ranges(result, i)))
            .collect();
        let _ = write!(out, "\n   tags: {}", tags.join(", "));
    }

    let preview = if let Some(m) = result.field_match(PostField::Content) {
        snippet(&m.value, &m.ranges, SNIPPET_RADIUS)
    } else if let Some(m) = result.field_match(PostField::Description) {
        snippet(&m.value, &m.ranges, SNIPPET_RADIUS * 2)
    } else {
        let text = post.description.as_deref().unwrap_or(&post.content);
        snippet(text, &[], SNIPPET_RADIUS * 2)
    };
    if !preview.text.trim().is_empty() {
        let _ = write!(out, "\n   {}", render(style, &preview.text, &preview.ranges));
    }

    out
}

fn tag_ranges(result: &SearchResult, element: usize) -> &[MatchRange] {
    result
        .matches
        .iter()
        .find(|m| m.field == PostField::Tags && m.element == Some(element))
        .map_or(&[], |m| m.ranges.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::FieldMatch;
    use chrono::NaiveDate;

    fn result() -> SearchResult {
        let post = Post {
            id: "intro-next".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            slug: "2024/intro-next".to_string(),
            title: "Intro to Next.js".to_string(),
            description: None,
            content: "Pages and <layouts>.".to_string(),
            updated_at: None,
            reading_time: 1,
            tags: vec!["react".to_string(), "next".to_string()],
        };
        SearchResult {
            post: Arc::new(post),
            ref_index: 0,
            score: 0.01,
            matches: vec![
                FieldMatch {
                    field: PostField::Title,
                    element: None,
                    value: "Intro to Next.js".to_string(),
                    ranges: vec![MatchRange::new(9, 12)],
                    score: 0.0,
                },
                FieldMatch {
                    field: PostField::Tags,
                    element: Some(1),
                    value: "next".to_string(),
                    ranges: vec![MatchRange::new(0, 3)],
                    score: 0.0,
                },
            ],
        }
    }

    mod validate_query_tests {
        use super::*;

        #[test]
        fn accepts_normal_query() {
            assert!(validate_query("next").is_ok());
            assert!(validate_query(&"a".repeat(MAX_QUERY_LENGTH)).is_ok());
        }

        #[test]
        fn rejects_long_query() {
            let result = validate_query(&"a".repeat(MAX_QUERY_LENGTH + 1));
            assert!(result.unwrap_err().to_string().contains("too long"));
        }

        #[test]
        fn counts_characters_not_bytes() {
            assert!(validate_query(&"é".repeat(MAX_QUERY_LENGTH)).is_ok());
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn plain_result_marks_title_and_tag() {
            let text = format_result(1, &result(), HighlightStyle::Plain);
            let lines: Vec<&str> = text.lines().collect();

            assert_eq!(lines[0], "1. Intro to [Next].js  (2024/intro-next)");
            assert_eq!(lines[1], "   tags: react, [next]");
            assert_eq!(lines[2], "   Pages and <layouts>.");
        }

        #[test]
        fn markup_result_is_escaped() {
            let text = format_result(1, &result(), HighlightStyle::Markup);
            assert!(text.contains("Intro to <mark>Next</mark>.js"));
            assert!(text.contains("&lt;layouts&gt;"));
        }

        #[test]
        fn ansi_wraps_matches() {
            let text = render(HighlightStyle::Ansi, "abc", &[MatchRange::new(1, 1)]);
            assert_eq!(text, "a\x1b[1;7mb\x1b[0mc");
        }
    }
}
