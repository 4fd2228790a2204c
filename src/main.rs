mod config;
mod error;
mod loader;
mod logging;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use url::Url;

use crate::config::AppConfig;
use crate::loader::load_targets;
use crate::pipeline::Pipeline;
use crate::scraper::http_client::HttpClient;
use crate::scraper::parsers::FieldExtractor;

#[derive(Parser)]
#[command(name = "wiki-scraper", about = "Esports wiki player scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl the base URL for N pages and write CSV + JSON snapshots
    Crawl {
        /// Page to crawl (default: scraper.base_url)
        #[arg(short, long)]
        url: Option<Url>,

        /// Number of pages (default: crawl.pages)
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Scrape every player of an input list and append results to the JSON output
    Batch {
        /// JSON array of {href, title} (default: storage.input_path)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON output to append to (default: storage.json_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scrape one player page and print the record as JSON
    Player {
        url: Url,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let _log_guard = logging::init(&config.logging, cli.verbose)?;

    let base_url = Url::parse(&config.scraper.base_url)
        .with_context(|| format!("Invalid base URL {}", config.scraper.base_url))?;
    let extractor = FieldExtractor::new(&config.rules).context("Invalid extraction rules")?;
    let client = HttpClient::new(&config.scraper).context("Failed to build HTTP client")?;

    match cli.command {
        Command::Crawl { url, pages } => {
            let _t = utils::Timer::start("Crawl");
            let url = url.unwrap_or(base_url);
            let pages = pages.unwrap_or(config.crawl.pages);

            let entries = Pipeline::new(client, extractor, url).crawl(pages).await;

            if let Err(e) = storage::write_csv(&entries, &config.storage.csv_path) {
                error!("Error saving data: {}", e);
            }
            if let Err(e) = storage::write_json_snapshot(&entries, &config.storage.json_path) {
                error!("Error saving data: {}", e);
            }
        }

        Command::Batch { input, output } => {
            let _t = utils::Timer::start("Batch scrape");
            let input = input.unwrap_or(config.storage.input_path);
            let output = output.unwrap_or(config.storage.json_path);

            let targets = load_targets(&input)?;
            let stats = Pipeline::new(client, extractor, base_url)
                .run_batch(&targets, &output)
                .await;
            info!(
                "Done: {}/{} players saved to {:?}",
                stats.scraped + stats.empty,
                stats.targets,
                output
            );
        }

        Command::Player { url } => {
            let pipeline = Pipeline::new(client, extractor, base_url);
            match pipeline.scrape(&url).await {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => anyhow::bail!("Could not fetch {}", url),
            }
        }
    }

    Ok(())
}
