//! Crawler configuration.
//!
//! Everything has a default that targets the Ministry of Education news
//! portal, so a config file is optional. When one is given (`--config`),
//! it is read as YAML and any key it omits keeps its default:
//!
//! ```yaml
//! delay_ms: 1500
//! max_pages: 40
//! filter_policy: unit_or_title
//! units:
//!   高教司: [高教司, 高等教育司]
//! ```
//!
//! Entries under `units` are merged over the built-in synonym table rather
//! than replacing it.

use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Which fields of a news item the unit filter inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Match keywords against the unit cell only.
    #[default]
    UnitOnly,
    /// Also accept items whose headline mentions a keyword. Prone to false
    /// positives when another unit's release mentions the target by name.
    UnitOrTitle,
}

/// Runtime settings for transport, pacing and filtering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base used to resolve relative article links.
    pub base_url: String,
    /// Paginated listing endpoint.
    pub listing_url: String,
    /// Fixed query parameters identifying the listing; `page` is appended per request.
    pub listing_params: BTreeMap<String, String>,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Pause after every page fetch and every detail fetch.
    pub delay_ms: u64,
    pub max_pages: u32,
    /// Consecutive empty (or failed) listing pages before giving up.
    pub max_empty_pages: u32,
    /// Extra attempts per request on transient failures.
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
    pub filter_policy: FilterPolicy,
    /// Target unit name -> synonym keywords.
    pub units: BTreeMap<String, Vec<String>>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.edu.tw".to_string(),
            listing_url: "https://www.edu.tw/News.aspx".to_string(),
            listing_params: BTreeMap::from([
                ("n".to_string(), "9E7AC85F1954DDA8".to_string()),
                ("sms".to_string(), "169B8E91BB75571F".to_string()),
            ]),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
            accept_language: "zh-TW,zh;q=0.9,en;q=0.8".to_string(),
            request_timeout_secs: 30,
            delay_ms: 1000,
            max_pages: 100,
            max_empty_pages: 3,
            max_retries: 1,
            retry_base_delay_ms: 1000,
            filter_policy: FilterPolicy::UnitOnly,
            units: default_units(),
        }
    }
}

/// Built-in synonym table, including English names used on bilingual pages.
pub fn default_units() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 3] = [
        ("體育署", &["體育署", "體育", "Sports"]),
        ("國教署", &["國教署", "國民及學前教育署", "國教", "K-12"]),
        ("青年署", &["青年署", "青年發展署", "青年", "Youth"]),
    ];
    table
        .into_iter()
        .map(|(unit, keywords)| {
            (
                unit.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

impl CrawlerConfig {
    /// Read a YAML config file, filling omitted keys with defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&raw)?;
        info!(
            max_pages = config.max_pages,
            delay_ms = config.delay_ms,
            units = config.units.len(),
            "Loaded crawler configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, CrawlError> {
        let mut config: Self = serde_yaml::from_str(raw)?;
        let mut units = default_units();
        units.extend(std::mem::take(&mut config.units));
        config.units = units;
        Ok(config)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Known unit names, for prompting.
    pub fn known_units(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_edu_portal() {
        let config = CrawlerConfig::default();
        assert_eq!(config.listing_url, "https://www.edu.tw/News.aspx");
        assert_eq!(config.listing_params["n"], "9E7AC85F1954DDA8");
        assert_eq!(config.listing_params["sms"], "169B8E91BB75571F");
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.max_empty_pages, 3);
        assert_eq!(config.delay(), Duration::from_secs(1));
        assert_eq!(config.filter_policy, FilterPolicy::UnitOnly);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CrawlerConfig::from_yaml("delay_ms: 250\nfilter_policy: unit_or_title\n").unwrap();
        assert_eq!(config.delay_ms, 250);
        assert_eq!(config.filter_policy, FilterPolicy::UnitOrTitle);
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_units_merge_over_builtin_table() {
        let yaml = "units:\n  高教司: [高教司, 高等教育司]\n  體育署: [體育署]\n";
        let config = CrawlerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.units["高教司"], vec!["高教司", "高等教育司"]);
        assert_eq!(config.units["體育署"], vec!["體育署"]);
        assert!(config.units.contains_key("青年署"));
        assert_eq!(config.known_units().len(), 4);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = CrawlerConfig::from_yaml("max_pages: lots").unwrap_err();
        assert!(matches!(err, CrawlError::Config(_)));
    }
}
