//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the collected [`ScrapedRecord`](crate::models::ScrapedRecord)s
//!   to a timestamped, human-readable JSON file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 體育署_news_20250814_093000.json
//! ├── 青年署_news_20250815_101500.json
//! └── test_sports_news_20250815_102000.json   # --sample runs
//! ```

pub mod json;
