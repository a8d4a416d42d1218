//! Integration tests for blogsearch.
//!
//! Each test builds its own post tree in a temp directory and drives the
//! library through corpus loading, indexing, sessions and commands.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use blogsearch::config::{Config, CorpusConfig, HistoryConfig};
use blogsearch::corpus::Corpus;
use blogsearch::search::{FieldWeights, PostField, QueryOptions, SearchIndex};
use tempfile::TempDir;

/// Test helper owning a temporary post tree and history file.
struct TestCorpus {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub history: PathBuf,
}

impl TestCorpus {
    /// Create an empty post tree.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("posts");
        fs::create_dir_all(&root).expect("Failed to create posts dir");
        let history = temp_dir.path().join("state").join("history.json");

        Self {
            _temp_dir: temp_dir,
            root,
            history,
        }
    }

    /// Create a tree with three posts across two years.
    fn with_posts() -> Self {
        let corpus = Self::new();

        corpus.write_post(
            "2024",
            "intro-next",
            "---\ntitle: Intro to Next.js\ndate: 2024-03-01\ndescription: Getting started with the App Router\ntags: [react, next]\n---\nPages and layouts.\n",
        );
        corpus.write_post(
            "2024",
            "rust-basics",
            "---\ntitle: Rust Basics\ndate: 2024-05-10\ndescription: Ownership and borrowing\ntags:\n  - rust\n---\nMemory safety without garbage collection.\n",
        );
        corpus.write_post(
            "2023",
            "css-grid",
            "---\ntitle: CSS Grid Layouts\ndate: \"2023-11-20\"\ntags: [css]\n---\nGrid areas and tracks.\n",
        );

        corpus
    }

    fn write_post(&self, year: &str, id: &str, source: &str) {
        let dir = self.root.join(year).join(id);
        fs::create_dir_all(&dir).expect("Failed to create post dir");
        fs::write(dir.join("page.mdx"), source).expect("Failed to write post");
    }

    fn config(&self) -> Config {
        Config {
            corpus: CorpusConfig {
                paths: vec![self.root.display().to_string()],
            },
            history: HistoryConfig {
                path: Some(self.history.display().to_string()),
                ..HistoryConfig::default()
            },
            ..Config::default()
        }
    }

    fn index(&self) -> SearchIndex {
        let corpus = Corpus::load(&self.root).expect("Failed to load corpus");
        SearchIndex::build(corpus.posts(), &FieldWeights::default(), 2)
            .expect("Failed to build index")
    }
}

// =============================================================================
// Corpus Loading Tests
// =============================================================================

mod corpus_tests {
    use super::*;

    #[test]
    fn corpus_load_post_tree() {
        let corpus = TestCorpus::with_posts();
        let loaded = Corpus::load(&corpus.root);

        assert!(
            loaded.is_ok(),
            "Expected corpus to load, got: {:?}",
            loaded.err()
        );
        let loaded = loaded.unwrap();
        assert_eq!(loaded.posts().len(), 3);

        let post = loaded.find("2024/intro-next").unwrap();
        assert_eq!(post.title, "Intro to Next.js");
        assert_eq!(post.tags, vec!["react", "next"]);
        assert_eq!(post.content.trim(), "Pages and layouts.");
        assert_eq!(post.reading_time, 1);
    }

    #[test]
    fn corpus_load_ignores_other_paths() {
        let corpus = TestCorpus::with_posts();
        corpus.write_post("drafts", "wip", "---\ntitle: WIP\ndate: 2024-01-01\n---\nx\n");
        fs::write(corpus.root.join("2024").join("notes.txt"), "not a post").unwrap();
        fs::create_dir_all(corpus.root.join("2024").join("empty")).unwrap();

        let loaded = Corpus::load(&corpus.root).unwrap();
        assert_eq!(loaded.posts().len(), 3);
        assert!(loaded.find("drafts/wip").is_none());
    }

    #[test]
    fn corpus_load_missing_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let loaded = Corpus::load(&temp_dir.path().join("nope"));

        assert!(loaded.is_err());
    }

    #[test]
    fn corpus_load_rejects_bad_front_matter() {
        let corpus = TestCorpus::new();
        corpus.write_post("2024", "broken", "---\ntitle: Broken\ndate: 2024-01-01\nno closing\n");

        let err = Corpus::load(&corpus.root).unwrap_err();
        assert!(err.to_string().contains("front-matter"));
    }

    #[test]
    fn corpus_load_rejects_bad_date() {
        let corpus = TestCorpus::new();
        corpus.write_post("2024", "when", "---\ntitle: When\ndate: someday\n---\nx\n");

        let err = Corpus::load(&corpus.root).unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn corpus_json_export_loads_back() {
        let corpus = TestCorpus::with_posts();
        let loaded = Corpus::load(&corpus.root).unwrap();

        let json_path = corpus.root.parent().unwrap().join("posts.json");
        fs::write(&json_path, loaded.to_json().unwrap()).unwrap();

        let reloaded = Corpus::load(&json_path).unwrap();
        assert_eq!(reloaded.posts(), loaded.posts());
    }

    #[test]
    fn corpus_sorted_newest_first() {
        let corpus = TestCorpus::with_posts();
        let loaded = Corpus::load(&corpus.root).unwrap();

        let slugs: Vec<&str> = loaded
            .sorted_by_date()
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["2024/rust-basics", "2024/intro-next", "2023/css-grid"]);
    }
}

// =============================================================================
// Search Index Tests
// =============================================================================

mod search_tests {
    use super::*;

    #[test]
    fn exact_title_match() {
        let index = TestCorpus::with_posts().index();
        let results = index.query("next", &QueryOptions::default());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].post.slug, "2024/intro-next");
        assert_eq!(
            results[0].ranges(PostField::Title),
            &[blogsearch::search::MatchRange::new(9, 12)]
        );
    }

    #[test]
    fn typo_still_matches() {
        let index = TestCorpus::with_posts().index();
        let results = index.query("colection", &QueryOptions::default());

        assert!(!results.is_empty(), "Expected a fuzzy match for 'colection'");
        assert_eq!(results[0].post.slug, "2024/rust-basics");
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn title_outranks_content() {
        let index = TestCorpus::with_posts().index();
        let results = index.query("layouts", &QueryOptions::default());

        let slugs: Vec<&str> = results.iter().map(|r| r.post.slug.as_str()).collect();
        assert_eq!(slugs[0], "2023/css-grid");
        assert!(slugs.contains(&"2024/intro-next"));
    }

    #[test]
    fn tag_match_reports_element() {
        let index = TestCorpus::with_posts().index();
        let results = index.query("react", &QueryOptions::default());

        let tag = results[0].field_match(PostField::Tags).unwrap();
        assert_eq!(tag.element, Some(0));
        assert_eq!(tag.value, "react");
    }

    #[test]
    fn empty_query_no_results() {
        let index = TestCorpus::with_posts().index();
        assert!(index.query("   ", &QueryOptions::default()).is_empty());
    }

    #[test]
    fn limit_applies() {
        let index = TestCorpus::with_posts().index();
        let options = QueryOptions {
            limit: 1,
            threshold: 1.0,
        };
        assert_eq!(index.query("grid", &options).len(), 1);
    }
}

// =============================================================================
// Session Tests
// =============================================================================

mod session_tests {
    use super::*;
    use blogsearch::session::{SessionController, SessionSettings, SessionState, TimerQueue};
    use blogsearch::storage::local::LocalHistoryStore;

    fn session(corpus: &TestCorpus) -> SessionController<TimerQueue> {
        let store = LocalHistoryStore::new(corpus.history.clone());
        let mut session =
            SessionController::new(TimerQueue::new(), Box::new(store), SessionSettings::default());
        session.set_searcher(Arc::new(corpus.index()));
        session
    }

    #[test]
    fn history_survives_restart() {
        let corpus = TestCorpus::with_posts();

        {
            let mut first = session(&corpus);
            first.open_search();
            first.set_query("rust");
            first.advance(Duration::from_millis(300));
            assert_eq!(first.state(), SessionState::OpenResults);
            assert_eq!(first.results()[0].post.slug, "2024/rust-basics");
        }

        let mut second = session(&corpus);
        second.open_search();
        assert_eq!(second.history().to_vec(), vec!["rust"]);
    }

    #[test]
    fn corrupt_history_file_reads_as_empty() {
        let corpus = TestCorpus::with_posts();
        fs::create_dir_all(corpus.history.parent().unwrap()).unwrap();
        fs::write(&corpus.history, "not json").unwrap();

        let mut session = session(&corpus);
        session.open_search();
        assert!(session.history().is_empty());

        session.set_query("grid");
        session.settle();
        assert_eq!(session.results()[0].post.slug, "2023/css-grid");
    }

    #[test]
    fn close_during_debounce_drops_lookup() {
        let corpus = TestCorpus::with_posts();
        let mut session = session(&corpus);

        session.open_search();
        session.set_query("rust");
        session.close_search();
        session.advance(Duration::from_secs(1));

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.results().is_empty());
        assert!(!corpus.history.exists());
    }
}

// =============================================================================
// Command Tests
// =============================================================================

mod command_tests {
    use super::*;
    use blogsearch::commands;

    #[test]
    fn search_finds_and_records() {
        let corpus = TestCorpus::with_posts();
        let config = corpus.config();

        let results = commands::search(&config, "rust", None, None, None).unwrap();
        assert_eq!(results[0].post.slug, "2024/rust-basics");
        assert_eq!(commands::history(&config).unwrap(), vec!["rust"]);
    }

    #[test]
    fn short_query_not_recorded() {
        let corpus = TestCorpus::with_posts();
        let config = corpus.config();

        commands::search(&config, "ru", None, None, None).unwrap();
        assert!(commands::history(&config).unwrap().is_empty());
    }

    #[test]
    fn search_tag_filter() {
        let corpus = TestCorpus::with_posts();
        let config = corpus.config();

        let results = commands::search(&config, "layouts", None, None, Some("react")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].post.slug, "2024/intro-next");
    }

    #[test]
    fn search_rejects_long_query() {
        let corpus = TestCorpus::with_posts();
        let err = commands::search(&corpus.config(), &"a".repeat(201), None, None, None).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn list_tags_get() {
        let corpus = TestCorpus::with_posts();
        let config = corpus.config();

        let posts = commands::list(&config, None).unwrap();
        assert_eq!(posts[0].slug, "2024/rust-basics");
        assert_eq!(commands::list(&config, Some("css")).unwrap().len(), 1);

        let tags = commands::tags(&config).unwrap();
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0].tag, "css");

        let post = commands::get(&config, "/2024/intro-next").unwrap();
        assert_eq!(post.title, "Intro to Next.js");
        let err = commands::get(&config, "2024/missing").unwrap_err();
        assert!(err.to_string().contains("Post not found"));
    }

    #[test]
    fn clear_history_removes_entries() {
        let corpus = TestCorpus::with_posts();
        let config = corpus.config();

        commands::search(&config, "grid", None, None, None).unwrap();
        commands::clear_history(&config).unwrap();
        assert!(commands::history(&config).unwrap().is_empty());
    }

    #[test]
    fn jsonld_for_post() {
        let corpus = TestCorpus::with_posts();
        let json = commands::jsonld(&corpus.config(), "2024/rust-basics").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["@type"], "BlogPosting");
        assert_eq!(value["headline"], "Rust Basics");
        assert_eq!(value["dateModified"], "2024-05-10");
    }

    #[test]
    fn metadata_for_post() {
        let corpus = TestCorpus::with_posts();
        let json = commands::metadata(&corpus.config(), "2024/intro-next").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "Intro to Next.js | Blog");
        assert_eq!(value["openGraph"]["type"], "article");
        assert_eq!(value["openGraph"]["url"], "https://example.com/2024/intro-next");
        assert_eq!(value["twitter"]["card"], "summary_large_image");
    }

    #[test]
    fn sitemap_lists_posts_newest_first() {
        let corpus = TestCorpus::with_posts();
        let json = commands::sitemap(&corpus.config(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let urls: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["url"].as_str().unwrap())
            .collect();

        assert_eq!(
            urls,
            vec![
                "https://example.com",
                "https://example.com/about",
                "https://example.com/2024/rust-basics",
                "https://example.com/2024/intro-next",
                "https://example.com/2023/css-grid",
            ]
        );
        assert_eq!(value[4]["lastModified"], "2023-11-20");
        assert_eq!(value[4]["priority"], 0.7);
    }

    #[test]
    fn session_script_navigates() {
        let corpus = TestCorpus::with_posts();
        let script = "open\ntype next\nwait 300\ndown\nenter\n";

        let transcript = commands::session(&corpus.config(), script).unwrap();

        assert!(transcript[0].starts_with("start: idle"));
        assert!(transcript[2].starts_with("type \"next\": searching"));
        assert!(transcript[3].contains("results=[2024/intro-next]"));
        assert_eq!(transcript.last().unwrap(), "  -> navigate /2024/intro-next");
    }

    #[test]
    fn session_script_settles_pending_lookup() {
        let corpus = TestCorpus::with_posts();
        let transcript = commands::session(&corpus.config(), "open\ntype grid\n").unwrap();

        let last = transcript.last().unwrap();
        assert!(last.starts_with("settled: open-results"));
        assert!(last.contains("2023/css-grid"));
    }

    #[test]
    fn session_script_reports_bad_line() {
        let corpus = TestCorpus::with_posts();
        let err = commands::session(&corpus.config(), "open\nfly\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn session_without_corpus_finds_nothing() {
        let corpus = TestCorpus::new();
        fs::remove_dir_all(&corpus.root).unwrap();

        let transcript = commands::session(&corpus.config(), "open\ntype rust\n").unwrap();
        let last = transcript.last().unwrap();
        assert!(last.starts_with("settled: open-results"));
        assert!(!last.contains("results="));
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config_tests {
    use blogsearch::config::{Config, expand_tilde};
    use std::path::PathBuf;

    #[test]
    fn expand_tilde_absolute_path_unchanged() {
        let result = expand_tilde("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn expand_tilde_relative_path_unchanged() {
        let result = expand_tilde("relative/path");
        assert_eq!(result, PathBuf::from("relative/path"));
    }

    #[test]
    fn load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nlimit = 4\n[history]\ncapacity = 2\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.search.limit, 4);
        assert_eq!(config.session_settings().history_capacity, 2);
    }

    #[test]
    fn load_from_invalid_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[search\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
