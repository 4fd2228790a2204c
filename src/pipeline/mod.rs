//! Drivers: tie page source → extractor → storage together.
//!
//! ## Run modes
//!
//! `crawl()`: fetch the base URL for pages 1..=N (page > 1 adds `?page=N`),
//!   extract one record per page and hand the collected entries back to the
//!   caller for a CSV / JSON snapshot.
//!
//! `run_batch()`: scrape every target of an input list and append each
//!   result to the JSON output as soon as it is extracted. Not idempotent:
//!   running it twice appends the same players twice.
//!
//! Targets are processed strictly one after another. A failure on one target
//! is logged and never stops the rest.

use crate::loader::resolve_target;
use crate::models::{PlayerEntry, PlayerRecord, TargetLink};
use crate::scraper::parsers::FieldExtractor;
use crate::scraper::{Document, PageSource};
use crate::storage;
use chrono::Utc;
use std::path::Path;
use tracing::{error, info, warn};
use url::Url;

pub struct Pipeline<S: PageSource> {
    source: S,
    extractor: FieldExtractor,
    base_url: Url,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, extractor: FieldExtractor, base_url: Url) -> Self {
        Self {
            source,
            extractor,
            base_url,
        }
    }

    /// Fetch boundary: errors are logged here and become "absent".
    async fn fetch_page(&self, url: &Url, params: &[(&str, String)]) -> Option<Document> {
        match self.source.fetch(url, params).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!("Error fetching {}: {}", url, e);
                None
            }
        }
    }

    /// Fetch and extract a single page. `None` when the page could not be
    /// fetched, as opposed to a fetched page with nothing on it.
    pub async fn scrape(&self, url: &Url) -> Option<PlayerRecord> {
        let doc = self.fetch_page(url, &[]).await?;
        Some(self.extractor.extract(&doc))
    }

    pub async fn crawl(&self, pages: u32) -> Vec<PlayerEntry> {
        let mut entries = Vec::new();

        for page in 1..=pages {
            info!("Crawling page {}/{}", page, pages);

            let params = if page > 1 {
                vec![("page", page.to_string())]
            } else {
                Vec::new()
            };

            let doc = self.fetch_page(&self.base_url, &params).await;
            let record = self.extractor.extract_page(doc.as_ref());

            if record.is_empty() {
                warn!("No data retrieved from page {}", page);
                continue;
            }

            info!("Got {} items from page {}", record.item_count(), page);
            let href = doc
                .as_ref()
                .map(|d| d.url().to_string())
                .unwrap_or_else(|| self.base_url.to_string());

            entries.push(PlayerEntry {
                href,
                title: None,
                scraped_at: Utc::now().naive_utc(),
                record,
            });
        }

        info!("Crawl finished: {} of {} pages yielded data", entries.len(), pages);
        entries
    }

    pub async fn run_batch(&self, targets: &[TargetLink], output: &Path) -> BatchStats {
        let mut stats = BatchStats {
            targets: targets.len(),
            ..Default::default()
        };

        for (i, target) in targets.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, targets.len(), target.href);

            let Some(url) = resolve_target(&self.base_url, &target.href) else {
                stats.failed += 1;
                continue;
            };

            let Some(doc) = self.fetch_page(&url, &[]).await else {
                stats.failed += 1;
                continue;
            };

            let record = self.extractor.extract(&doc);
            if record.is_empty() {
                stats.empty += 1;
            } else {
                stats.scraped += 1;
            }

            let entry = PlayerEntry {
                href: url.to_string(),
                title: Some(target.title.trim().to_string()).filter(|t| !t.is_empty()),
                scraped_at: Utc::now().naive_utc(),
                record,
            };

            if let Err(e) = storage::append_json(std::slice::from_ref(&entry), output) {
                error!("Failed to save {}: {}", url, e);
                stats.save_errors += 1;
            }
        }

        info!(
            "=== Done: {} targets | {} scraped | {} empty | {} failed | {} save errors ===",
            stats.targets, stats.scraped, stats.empty, stats.failed, stats.save_errors
        );
        stats
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub targets: usize,
    pub scraped: usize,
    pub empty: usize,
    pub failed: usize,
    pub save_errors: usize,
}
