//! Error taxonomy for the crawl pipeline.
//!
//! Only the outer shell (config loading, output writing, prompting) ever
//! surfaces these to the user. Inside the crawl loop, transport and parse
//! failures are absorbed: a failed listing page counts as an empty page and
//! a failed detail page yields an empty [`ContactInfo`](crate::models::ContactInfo).
//!
//! Field-level validation failures (a title that is too short, a phone number
//! that does not look like one) are not errors at all; the field or item is
//! silently dropped.

use thiserror::Error;

/// Failures that can occur while crawling or persisting results.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} answered with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// No selection strategy found a usable set of listing rows.
    #[error("no listing container matched any selection strategy")]
    NoListingContainer,

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CrawlError::Transport { .. } => true,
            CrawlError::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}
