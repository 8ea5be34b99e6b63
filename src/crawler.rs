//! Crawl orchestration.
//!
//! [`Crawler::crawl`] walks the paginated listing one page at a time:
//!
//! 1. fetch and parse the listing page
//! 2. keep the items published by the target unit
//! 3. for each new item (by URL and by title), fetch its article and extract
//!    the contact details
//!
//! until one of the stop conditions holds: enough records, too many pages, or
//! too many consecutive empty pages. Requests are strictly sequential and a
//! fixed delay follows every listing and every article request.
//!
//! Nothing inside the loop is fatal. A failed listing fetch counts as an empty
//! page and a failed article fetch leaves that record's author empty, so a
//! crawl may legitimately return fewer records than requested.

use crate::config::CrawlerConfig;
use crate::error::CrawlError;
use crate::models::{NewsItem, ScrapedRecord};
use crate::scrapers::contact::ContactExtractor;
use crate::scrapers::detail::DetailFetcher;
use crate::scrapers::listing::ListingParser;
use crate::scrapers::unit_filter::UnitFilter;
use crate::transport::Transport;
use crate::utils::truncate_for_log;
use scraper::Html;
use std::collections::HashSet;
use std::fmt;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Progress is reported every this many pages.
const PROGRESS_EVERY: u32 = 10;

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    MaxPages,
    EmptyPages,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::TargetReached => "target reached",
            StopReason::MaxPages => "page limit reached",
            StopReason::EmptyPages => "too many consecutive empty pages",
        };
        f.write_str(s)
    }
}

/// Outcome of a crawl: the records plus how it ended.
#[derive(Debug)]
pub struct CrawlReport {
    pub records: Vec<ScrapedRecord>,
    pub stop_reason: StopReason,
    /// Listing pages requested.
    pub pages_visited: u32,
}

/// Mutable state of one crawl. Lives only for the duration of [`Crawler::crawl_report`].
#[derive(Debug)]
struct CrawlState {
    page: u32,
    records: Vec<ScrapedRecord>,
    seen_urls: HashSet<String>,
    seen_titles: HashSet<String>,
    empty_pages: u32,
    pages_visited: u32,
}

impl CrawlState {
    fn new() -> Self {
        Self {
            page: 1,
            records: Vec::new(),
            seen_urls: HashSet::new(),
            seen_titles: HashSet::new(),
            empty_pages: 0,
            pages_visited: 0,
        }
    }

    fn is_duplicate(&self, item: &NewsItem) -> bool {
        self.seen_urls.contains(&item.link) || self.seen_titles.contains(&item.title)
    }

    fn push(&mut self, record: ScrapedRecord) {
        self.seen_urls.insert(record.url.clone());
        self.seen_titles.insert(record.title.clone());
        self.records.push(record);
    }
}

/// Drives listing retrieval, filtering, dedup and detail enrichment.
///
/// Owns the transport; the detail fetcher borrows it for each crawl.
#[derive(Debug)]
pub struct Crawler<T> {
    transport: T,
    config: CrawlerConfig,
    parser: ListingParser,
    filter: UnitFilter,
    extractor: ContactExtractor,
}

impl<T: Transport> Crawler<T> {
    pub fn new(transport: T, config: CrawlerConfig) -> Result<Self, CrawlError> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            transport,
            parser: ListingParser::new(base_url),
            filter: UnitFilter::new(config.units.clone(), config.filter_policy),
            extractor: ContactExtractor::new(),
            config,
        })
    }

    /// Collect up to `max_count` records published by `target_unit`.
    pub async fn crawl(&self, target_unit: &str, max_count: usize) -> Vec<ScrapedRecord> {
        let report = self.crawl_report(target_unit, max_count).await;
        if report.records.is_empty() {
            warn!(
                reason = %report.stop_reason,
                pages_visited = report.pages_visited,
                "Crawl collected no records"
            );
        }
        report.records
    }

    /// Like [`crawl`](Self::crawl), also reporting why the crawl stopped.
    #[instrument(level = "info", skip(self))]
    async fn crawl_report(&self, target_unit: &str, max_count: usize) -> CrawlReport {
        info!("Starting crawl");
        let details = DetailFetcher::new(&self.transport, self.extractor);
        let mut state = CrawlState::new();

        let stop_reason = loop {
            if state.records.len() >= max_count {
                break StopReason::TargetReached;
            }
            if state.page > self.config.max_pages {
                break StopReason::MaxPages;
            }
            if state.empty_pages >= self.config.max_empty_pages {
                break StopReason::EmptyPages;
            }

            info!(
                page = state.page,
                collected = state.records.len(),
                max_count,
                "Crawling listing page"
            );

            state.pages_visited += 1;
            let items = match self.fetch_listing(state.page).await {
                Ok(items) if !items.is_empty() => items,
                Ok(_) => {
                    warn!(page = state.page, "Listing page had no news items");
                    self.mark_empty(&mut state).await;
                    continue;
                }
                Err(e) => {
                    warn!(page = state.page, error = %e, "Could not fetch listing page");
                    self.mark_empty(&mut state).await;
                    continue;
                }
            };
            state.empty_pages = 0;

            let matched = self.filter.filter(items, target_unit);
            info!(page = state.page, matched = matched.len(), "Items matching target unit");

            for item in matched {
                if state.records.len() >= max_count {
                    break;
                }
                if state.is_duplicate(&item) {
                    debug!(title = %truncate_for_log(&item.title, 30), "Skipping duplicate item");
                    continue;
                }

                let author = details.fetch(&item.link).await;
                let record = ScrapedRecord::from_item(item, target_unit, author);
                info!(
                    n = state.records.len() + 1,
                    max_count,
                    title = %truncate_for_log(&record.title, 50),
                    "Collected record"
                );
                state.push(record);
                sleep(self.config.delay()).await;
            }

            if state.records.len() >= max_count {
                break StopReason::TargetReached;
            }
            self.advance(&mut state).await;
        };

        match stop_reason {
            StopReason::TargetReached => info!("Target count reached"),
            StopReason::MaxPages => warn!(max_pages = self.config.max_pages, "Page limit reached"),
            StopReason::EmptyPages => warn!(
                max_empty_pages = self.config.max_empty_pages,
                "Consecutive empty pages; giving up"
            ),
        }
        info!(
            collected = state.records.len(),
            pages_visited = state.pages_visited,
            reason = %stop_reason,
            "Crawl finished"
        );

        CrawlReport {
            records: state.records,
            stop_reason,
            pages_visited: state.pages_visited,
        }
    }

    /// Fetch and parse one listing page.
    #[instrument(level = "debug", skip(self))]
    async fn fetch_listing(&self, page: u32) -> Result<Vec<NewsItem>, CrawlError> {
        let mut query: Vec<(String, String)> = self
            .config
            .listing_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.push(("page".to_string(), page.to_string()));

        let body = self.transport.get(&self.config.listing_url, &query).await?;
        let html = String::from_utf8_lossy(&body);
        let document = Html::parse_document(&html);
        self.parser.try_parse(&document)
    }

    async fn mark_empty(&self, state: &mut CrawlState) {
        state.empty_pages += 1;
        self.advance(state).await;
    }

    async fn advance(&self, state: &mut CrawlState) {
        state.page += 1;
        if state.page % PROGRESS_EVERY == 0 {
            info!(
                pages = state.page,
                collected = state.records.len(),
                "Progress report"
            );
        }
        sleep(self.config.delay()).await;
    }
}
