//! Extraction stages of the crawl pipeline.
//!
//! Leaves first:
//!
//! | Stage | Module | Input | Output |
//! |-------|--------|-------|--------|
//! | Contact extraction | [`contact`] | article text | `ContactInfo` |
//! | Listing parsing | [`listing`] | listing document | `Vec<NewsItem>` |
//! | Unit filtering | [`unit_filter`] | news items + target unit | matching items |
//! | Detail fetching | [`detail`] | article URL | `ContactInfo` |
//!
//! The stages are tied together by [`crate::crawler::Crawler`].
//!
//! All stages are best-effort over irregular government markup:
//! - Selector and pattern lists are tried in order until one yields something usable
//! - Candidates that fail validation are dropped silently rather than reported
//! - Only the detail fetcher touches the network, through a borrowed `Transport`

pub mod contact;
pub mod detail;
pub mod listing;
pub mod unit_filter;
