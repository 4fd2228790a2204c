pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::error::FetchError;
use async_trait::async_trait;
use scraper::Html;
use url::Url;

// ── Document ──────────────────────────────────────────────────────────────────

/// A fetched page: the URL it was finally served from plus its parsed tree.
pub struct Document {
    url: Url,
    html: Html,
}

impl Document {
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").field("url", &self.url.as_str()).finish()
    }
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable page source. `HttpClient` is the real one; the drivers only
/// depend on this trait.
///
/// Parsed HTML trees are not `Send`, so neither is the returned future.
#[async_trait(?Send)]
pub trait PageSource {
    async fn fetch(&self, url: &Url, params: &[(&str, String)]) -> Result<Document, FetchError>;
}
