//! HTTP transport with exponential backoff retry logic.
//!
//! The crawler never talks to `reqwest` directly. It owns a [`Transport`] and
//! lends it to the detail fetcher, which keeps a single connection pool and
//! header set for the whole run and lets tests substitute canned pages.
//!
//! # Architecture
//!
//! - [`Transport`]: core trait, a GET with query parameters returning the raw body
//! - [`HttpTransport`]: `reqwest`-backed implementation with the portal's header set
//! - [`RetryTransport`]: decorator that adds retry logic to any `Transport`
//!
//! # Retry Strategy
//!
//! - Only transient failures (network errors, 5xx) are retried
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each wait

use crate::config::CrawlerConfig;
use crate::error::CrawlError;
use rand::{Rng, rng};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// A capability that performs GET requests and returns raw response bytes.
pub trait Transport {
    /// Fetch `url` with the given query parameters appended.
    ///
    /// # Errors
    ///
    /// [`CrawlError::Transport`] when no response arrives and
    /// [`CrawlError::Status`] for non-2xx responses.
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Vec<u8>, CrawlError>;
}

impl<T: Transport> Transport for &T {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Vec<u8>, CrawlError> {
        (**self).get(url, query).await
    }
}

/// `reqwest`-backed transport sharing one client (and connection pool) per crawl.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client carrying the browser-like header set and per-request timeout.
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (USER_AGENT, &config.user_agent),
            (ACCEPT, &config.accept),
            (ACCEPT_LANGUAGE, &config.accept_language),
        ] {
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.insert(name, v);
                }
                Err(e) => warn!(header = %name, error = %e, "Dropping invalid header value"),
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| CrawlError::Transport {
                url: config.listing_url.clone(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Vec<u8>, CrawlError> {
        let t0 = Instant::now();
        let transport_err = |source| CrawlError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: response.url().to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport_err)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "GET completed"
        );
        Ok(body.to_vec())
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Transport`].
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryTransport<T> {
    /// The underlying transport to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap.
    max_delay: StdDuration,
}

impl<T> RetryTransport<T>
where
    T: Transport,
{
    /// Create a new retry wrapper around an existing [`Transport`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// let http = HttpTransport::new(&config)?;
    /// let transport = RetryTransport::new(http, 2, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryTransport")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Transport for RetryTransport<T>
where
    T: Transport,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Vec<u8>, CrawlError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.get(url, query).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries || !e.is_transient() {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "GET failed; giving up"
                        );
                        return Err(e);
                    }

                    // backoff calc
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "GET attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// In-memory transport serving canned bodies, shared by the crate's tests.
#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Routes by URL plus the `page` query parameter (when present).
    /// Unknown routes answer 404.
    #[derive(Debug, Default)]
    pub struct FakeTransport {
        pages: HashMap<String, Result<String, reqwest::StatusCode>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn key(url: &str, query: &[(String, String)]) -> String {
            match query.iter().find(|(k, _)| k == "page") {
                Some((_, page)) => format!("{url}#page={page}"),
                None => url.to_string(),
            }
        }

        pub fn with_listing(mut self, url: &str, page: u32, html: &str) -> Self {
            self.pages
                .insert(format!("{url}#page={page}"), Ok(html.to_string()));
            self
        }

        pub fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(html.to_string()));
            self
        }

        pub fn with_status(mut self, url: &str, status: reqwest::StatusCode) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requested(&self, url: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|k| k.as_str() == url)
                .count()
        }
    }

    impl Transport for FakeTransport {
        async fn get(&self, url: &str, query: &[(String, String)]) -> Result<Vec<u8>, CrawlError> {
            let key = Self::key(url, query);
            self.requests.lock().unwrap().push(key.clone());
            match self.pages.get(&key) {
                Some(Ok(body)) => Ok(body.clone().into_bytes()),
                Some(Err(status)) => Err(CrawlError::Status {
                    url: key,
                    status: *status,
                }),
                None => Err(CrawlError::Status {
                    url: key,
                    status: reqwest::StatusCode::NOT_FOUND,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let fake = FakeTransport::new().with_status("https://a.test/x", reqwest::StatusCode::BAD_GATEWAY);
        let retry = RetryTransport::new(&fake, 2, StdDuration::ZERO);

        let err = retry.get("https://a.test/x", &[]).await.unwrap_err();
        assert!(matches!(err, CrawlError::Status { .. }));
        assert_eq!(fake.requested("https://a.test/x"), 3);
    }

    #[tokio::test]
    async fn test_retry_skips_permanent_failures() {
        let fake = FakeTransport::new();
        let retry = RetryTransport::new(&fake, 3, StdDuration::ZERO);

        assert!(retry.get("https://a.test/missing", &[]).await.is_err());
        assert_eq!(fake.requested("https://a.test/missing"), 1);
    }

    #[tokio::test]
    async fn test_retry_passes_through_success() {
        let fake = FakeTransport::new().with_page("https://a.test/ok", "<p>hi</p>");
        let retry = RetryTransport::new(&fake, 3, StdDuration::ZERO);

        let body = retry.get("https://a.test/ok", &[]).await.unwrap();
        assert_eq!(body, b"<p>hi</p>");
        assert_eq!(fake.request_count(), 1);
    }

    #[test]
    fn test_http_transport_builds_from_defaults() {
        let config = CrawlerConfig::default();
        assert!(HttpTransport::new(&config).is_ok());
    }

    #[test]
    fn test_retry_debug_omits_inner() {
        let retry = RetryTransport::new(FakeTransport::new(), 1, StdDuration::from_millis(5));
        let dbg = format!("{retry:?}");
        assert!(dbg.contains("max_retries: 1"));
    }
}
