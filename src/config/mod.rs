use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub rules: ExtractionRules,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LogConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
}

/// HTTP behaviour of the page fetcher
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lower bound of the randomized pre-request sleep.
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound (inclusive) of the randomized pre-request sleep.
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    #[serde(default = "default_accept")]
    pub accept: String,
}

/// Selector rule set used by the field extractor.
///
/// Kept apart from the fetch and persist settings so markup changes on the
/// wiki only ever touch this section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionRules {
    #[serde(default = "default_table_primary")]
    pub table_primary: String,

    #[serde(default = "default_table_fallback")]
    pub table_fallback: String,

    #[serde(default = "default_row")]
    pub row: String,

    #[serde(default = "default_row_link")]
    pub row_link: String,

    #[serde(default = "default_row_year")]
    pub row_year: String,

    #[serde(default = "default_image")]
    pub image: String,

    #[serde(default = "default_label")]
    pub label: String,

    #[serde(default = "default_name_label")]
    pub name_label: String,

    #[serde(default = "default_role_label")]
    pub role_label: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// JSON array of `{href, title}` targets for batch mode
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,

    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    #[serde(default = "default_pages")]
    pub pages: u32,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://liquipedia.net/leagueoflegends/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_delay_min_ms() -> u64 {
    1000
}
fn default_delay_max_ms() -> u64 {
    3000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}
fn default_accept_language() -> String {
    "zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}
fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8"
        .to_string()
}
fn default_table_primary() -> String {
    "body > div:nth-child(3) > div:nth-child(2) > main > div > div > div:nth-child(3) \
     > div > div:nth-child(2) > div:nth-child(1) > div:nth-child(15) > div > table"
        .to_string()
}
fn default_table_fallback() -> String {
    "main table".to_string()
}
fn default_row() -> String {
    "tr".to_string()
}
fn default_row_link() -> String {
    "a[title]".to_string()
}
fn default_row_year() -> String {
    "td[class]".to_string()
}
fn default_image() -> String {
    "div.floatnone img".to_string()
}
fn default_label() -> String {
    "div.infobox-description".to_string()
}
fn default_name_label() -> String {
    "Name:".to_string()
}
fn default_role_label() -> String {
    "Role:".to_string()
}
fn default_input_path() -> PathBuf {
    PathBuf::from("players.json")
}
fn default_json_path() -> PathBuf {
    PathBuf::from("scraped_data.json")
}
fn default_csv_path() -> PathBuf {
    PathBuf::from("scraped_data.csv")
}
fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}
fn default_log_file_name() -> String {
    "scraper.log".to_string()
}
fn default_pages() -> u32 {
    1
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            accept: default_accept(),
        }
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            table_primary: default_table_primary(),
            table_fallback: default_table_fallback(),
            row: default_row(),
            row_link: default_row_link(),
            row_year: default_row_year(),
            image: default_image(),
            label: default_label(),
            name_label: default_name_label(),
            role_label: default_role_label(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            json_path: default_json_path(),
            csv_path: default_csv_path(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file_name: default_log_file_name(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { pages: default_pages() }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("WIKI").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        let app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.scraper;
        let base = Url::parse(&s.base_url)
            .with_context(|| format!("scraper.base_url is not a valid URL: {}", s.base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("scraper.base_url must use http or https: {}", s.base_url);
        }
        if s.timeout_secs == 0 {
            bail!("scraper.timeout_secs must be greater than 0");
        }
        if s.delay_min_ms > s.delay_max_ms {
            bail!(
                "scraper.delay_min_ms ({}) exceeds delay_max_ms ({})",
                s.delay_min_ms,
                s.delay_max_ms
            );
        }
        Ok(())
    }
}
