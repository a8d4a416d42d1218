use std::io::Read;

use anyhow::Context;
use blogsearch::cli::{Cli, Commands};
use blogsearch::commands;
use blogsearch::config::Config;
use blogsearch::logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        Cli::parse_from(["blogsearch", "--help"]);
        return Ok(());
    };

    let config = Config::load()?;

    match command {
        Commands::Search {
            query,
            limit,
            threshold,
            tag,
            style,
        } => {
            let results = commands::search(&config, &query, limit, threshold, tag.as_deref())?;
            if results.is_empty() {
                println!("No matches found for '{query}'");
            } else {
                println!("{} result(s) found\n", results.len());
                for (i, result) in results.iter().enumerate() {
                    println!("{}", commands::format_result(i + 1, result, style));
                }
            }
        }
        Commands::List { tag } => {
            let posts = commands::list(&config, tag.as_deref())?;
            if posts.is_empty() {
                println!("No posts found");
            }
            for post in posts {
                println!("{}  {}  {}", post.date, post.slug, post.title);
            }
        }
        Commands::Tags => {
            let tags = commands::tags(&config)?;
            if tags.is_empty() {
                println!("No tags found");
            }
            for tag in tags {
                println!("{} ({})", tag.tag, tag.count);
            }
        }
        Commands::Get { slug } => {
            let post = commands::get(&config, &slug)?;
            println!("{}", post.content);
        }
        Commands::History { clear } => {
            if clear {
                commands::clear_history(&config)?;
                println!("History cleared");
            } else {
                let entries = commands::history(&config)?;
                if entries.is_empty() {
                    println!("No recent searches");
                }
                for (i, entry) in entries.iter().enumerate() {
                    println!("{}. {entry}", i + 1);
                }
            }
        }
        Commands::Jsonld { slug } => {
            println!("{}", commands::jsonld(&config, &slug)?);
        }
        Commands::Metadata { slug } => {
            println!("{}", commands::metadata(&config, &slug)?);
        }
        Commands::Sitemap { json } => {
            print!("{}", commands::sitemap(&config, json)?);
        }
        Commands::Session { script } => {
            let source = match script {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Cannot read script {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            for line in commands::session(&config, &source)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}
