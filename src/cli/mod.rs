//! CLI interface for blogsearch.
//!
//! Provides command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// How matched spans are marked in printed results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HighlightStyle {
    /// Wrap matches in square brackets (default).
    #[default]
    Plain,
    /// Bold reverse video for terminals.
    Ansi,
    /// HTML-escaped text with `<mark>` tags.
    Markup,
}

/// Command-line interface for blogsearch.
#[derive(Parser)]
#[command(name = "blogsearch")]
#[command(author, version, about = "Fuzzy search for a static blog", long_about = None)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fuzzy-search posts by title, tags, description and content.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return (config default: 10).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Match threshold from 0.0 (exact only) to 1.0 (anything).
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Only search posts carrying this tag.
        #[arg(long)]
        tag: Option<String>,

        /// How to mark matched text.
        #[arg(short, long, default_value = "plain")]
        style: HighlightStyle,
    },

    /// List posts, newest first.
    List {
        /// Only list posts carrying this tag.
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show every tag with its post count.
    Tags,

    /// Print the content of a post by its slug (e.g. "2024/hello-world").
    Get {
        slug: String,
    },

    /// Show or clear recent search queries.
    History {
        /// Forget all recent queries.
        #[arg(long)]
        clear: bool,
    },

    /// Print schema.org JSON-LD for a post.
    Jsonld {
        slug: String,
    },

    /// Print page metadata (title, Open Graph, Twitter card) for a post.
    Metadata {
        slug: String,
    },

    /// Print the sitemap for the home page, about page and every post.
    Sitemap {
        /// Print entries as JSON instead of sitemap XML.
        #[arg(long)]
        json: bool,
    },

    /// Replay a scripted search session (reads stdin without --script).
    Session {
        /// Event script, one event per line.
        #[arg(long)]
        script: Option<PathBuf>,
    },
}
