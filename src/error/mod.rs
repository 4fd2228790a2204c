use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a URL into a parsed page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Content table not found (primary and fallback selectors missed)")]
    TableNotFound,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed for {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV write failed for {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io { path: path.to_path_buf(), source }
    }

    pub(crate) fn json(path: &std::path::Path, source: serde_json::Error) -> Self {
        StoreError::Json { path: path.to_path_buf(), source }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        StoreError::Csv { path: path.to_path_buf(), source }
    }
}
