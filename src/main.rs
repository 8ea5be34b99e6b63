//! # Edu News Scraper
//!
//! Collects press releases from the Ministry of Education news portal
//! (`https://www.edu.tw/News.aspx`) for one publishing unit, enriches each
//! with the contact person and phone printed in the article, and writes the
//! result to a JSON file.
//!
//! ## Usage
//!
//! ```sh
//! edu_news_scraper --unit 體育署 --count 10 -o ./out
//! ```
//!
//! ## Architecture
//!
//! The crawl is a strictly sequential pipeline:
//! 1. **Listing**: fetch a paginated listing page and parse its news rows
//! 2. **Filtering**: keep rows published by the target unit
//! 3. **Enrichment**: fetch each new article and extract contact details
//! 4. **Output**: write the accumulated records as pretty-printed JSON
//!
//! Listing and article failures degrade the result (fewer records, empty
//! contacts) but never abort the crawl.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawler;
mod error;
mod models;
mod outputs;
mod prompt;
mod scrapers;
mod transport;
mod utils;

use cli::Cli;
use config::CrawlerConfig;
use crawler::Crawler;
use outputs::json;
use prompt::{CrawlRequest, resolve_request};
use transport::{HttpTransport, RetryTransport};
use utils::ensure_writable_dir;

/// Unit and count used by `--sample`.
const SAMPLE_UNIT: &str = "體育署";
const SAMPLE_COUNT: usize = 3;
const SAMPLE_FILE_PREFIX: &str = "test_sports";

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("edu_news_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => CrawlerConfig::load(path)?,
        None => CrawlerConfig::default(),
    };

    // Early check: ensure output dir is writable before spending time crawling
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let (request, file_prefix) = if args.sample {
        info!(unit = SAMPLE_UNIT, count = SAMPLE_COUNT, "Sample mode");
        let request = CrawlRequest {
            unit: SAMPLE_UNIT.to_string(),
            count: SAMPLE_COUNT,
        };
        (request, SAMPLE_FILE_PREFIX.to_string())
    } else {
        let request = resolve_request(
            args.unit.clone(),
            args.count.map(usize::from),
            &config.known_units(),
            args.yes,
        )?;
        let prefix = request.unit.clone();
        (request, prefix)
    };

    let http = HttpTransport::new(&config)?;
    let transport = RetryTransport::new(http, config.max_retries, config.retry_base_delay());
    let crawler = Crawler::new(transport, config)?;

    let records = crawler.crawl(&request.unit, request.count).await;

    if records.is_empty() {
        warn!(
            unit = %request.unit,
            "No records collected; check the network connection or the unit name"
        );
    } else {
        let path = json::write_records(&records, &args.output_dir, &file_prefix).await?;
        info!(
            unit = %request.unit,
            requested = request.count,
            collected = records.len(),
            path = %path.display(),
            "Crawl summary"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
