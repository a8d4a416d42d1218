//! blogsearch - fuzzy search for a statically rendered blog.
//!
//! This library loads posts from a `YYYY/<id>/page.mdx` tree (or a JSON
//! export), builds a weighted fuzzy index over title, tags, description and
//! content, and drives it through a debounced search session with history
//! and keyboard selection.
//!
//! # Modules
//!
//! - [`corpus`] - Post loading, front-matter, tag counts
//! - [`search`] - Fuzzy index, field weights and result types
//! - [`session`] - Debounced search session, timers, history, scripted replay
//! - [`highlight`] - Turning match ranges into marked-up text
//! - [`storage`] - History storage trait and implementations
//! - [`seo`] - Reading time, keywords and JSON-LD
//! - [`commands`] - High-level operations behind the CLI
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line interface definitions
//! - [`logging`] - Log subscriber setup

pub mod cli;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod highlight;
pub mod logging;
pub mod search;
pub mod seo;
pub mod session;
pub mod storage;
