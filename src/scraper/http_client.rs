use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::scraper::{Document, PageSource};
use crate::utils::Jitter;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Polite single-attempt HTTP client. One instance keeps one connection pool
/// and cookie jar for its whole life.
pub struct HttpClient {
    inner: reqwest::Client,
    delay: Jitter,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("User-Agent", &config.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("Accept-Language", &config.accept_language)?,
        );
        headers.insert(ACCEPT, header_value("Accept", &config.accept)?);

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            inner,
            delay: Jitter::new(config.delay_min_ms, config.delay_max_ms),
        })
    }

    /// Sleep, GET once, parse. Any non-2xx status or transport failure is an
    /// error; there is no second attempt.
    pub async fn get_document(
        &self,
        url: &Url,
        params: &[(&str, String)],
    ) -> Result<Document, FetchError> {
        self.delay.sleep().await;

        let target = with_params(url, params);
        debug!("GET {}", target);

        let resp = self
            .inner
            .get(target.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: target.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.to_string(),
                status,
            });
        }

        // A redirect on a wiki page is often the first sign of being blocked
        if was_redirected(&target, resp.url()) {
            warn!("Redirected from {} to {}", target, resp.url());
        }

        let final_url = resp.url().clone();
        let body = resp.text().await.map_err(|source| FetchError::Transport {
            url: target.to_string(),
            source,
        })?;

        debug!("{}: {} bytes", final_url, body.len());
        Ok(Document::parse(final_url, &body))
    }
}

#[async_trait(?Send)]
impl PageSource for HttpClient {
    async fn fetch(&self, url: &Url, params: &[(&str, String)]) -> Result<Document, FetchError> {
        self.get_document(url, params).await
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}

/// reqwest hides the redirect chain; a changed final URL means at least one hop.
fn was_redirected(requested: &Url, served: &Url) -> bool {
    requested != served
}

fn with_params(url: &Url, params: &[(&str, String)]) -> Url {
    let mut target = url.clone();
    if !params.is_empty() {
        target.query_pairs_mut().extend_pairs(params);
    }
    target
}
