//! JSON output of scraped records.
//!
//! Records are written as a pretty-printed UTF-8 array. Non-ASCII text such as
//! unit names and headlines is kept readable rather than `\u` escaped.
//!
//! ```json
//! [
//!   {
//!     "date": "114-08-14",
//!     "unit": "體育署",
//!     "title": "全國運動會開幕",
//!     "url": "https://www.edu.tw/News_Content.aspx?...",
//!     "author": { "name": "王小明", "tel": "02-1234-5678" }
//!   }
//! ]
//! ```

use crate::error::CrawlError;
use crate::models::ScrapedRecord;
use crate::utils::output_file_name;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `records` to `{output_dir}/{prefix}_news_{timestamp}.json`.
///
/// `prefix` is normally the target unit. Returns the path written.
///
/// # Errors
///
/// Fails if the directory cannot be created, serialization fails, or the
/// file cannot be written.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.as_ref().display(), %prefix))]
pub async fn write_records(
    records: &[ScrapedRecord],
    output_dir: impl AsRef<Path>,
    prefix: &str,
) -> Result<PathBuf, CrawlError> {
    let json = serde_json::to_string_pretty(records)?;

    let dir = output_dir.as_ref();
    if let Err(e) = fs::create_dir_all(dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = dir.join(output_file_name(prefix, Local::now()));
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), count = records.len(), "Wrote scraped records");

    Ok(path)
}
