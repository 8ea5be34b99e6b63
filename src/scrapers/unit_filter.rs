//! Publishing-unit filter.
//!
//! A target unit is matched through its synonym keywords (e.g. 體育署 also
//! matches 體育 and Sports). Under the default [`FilterPolicy::UnitOnly`] only
//! the item's unit cell is inspected, so a headline from another unit that
//! merely mentions the target is not picked up.

use crate::config::FilterPolicy;
use crate::models::NewsItem;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UnitFilter {
    units: BTreeMap<String, Vec<String>>,
    policy: FilterPolicy,
}

impl UnitFilter {
    pub fn new(units: BTreeMap<String, Vec<String>>, policy: FilterPolicy) -> Self {
        Self { units, policy }
    }

    /// Keywords for `target_unit`; unknown units match on their own name.
    pub fn keywords<'a>(&'a self, target_unit: &'a str) -> Vec<&'a str> {
        match self.units.get(target_unit) {
            Some(keywords) if !keywords.is_empty() => keywords.iter().map(String::as_str).collect(),
            _ => vec![target_unit],
        }
    }

    pub fn matches(&self, item: &NewsItem, keywords: &[&str]) -> bool {
        let hit = |field: &str| keywords.iter().any(|k| !k.is_empty() && field.contains(k));
        match self.policy {
            FilterPolicy::UnitOnly => hit(&item.unit),
            FilterPolicy::UnitOrTitle => hit(&item.unit) || hit(&item.title),
        }
    }

    /// Keep the items published by `target_unit`, preserving order.
    pub fn filter(&self, items: Vec<NewsItem>, target_unit: &str) -> Vec<NewsItem> {
        let keywords = self.keywords(target_unit);
        let total = items.len();
        let kept: Vec<NewsItem> = items
            .into_iter()
            .filter(|item| self.matches(item, &keywords))
            .collect();
        debug!(target_unit, ?keywords, total, kept = kept.len(), "Filtered by unit");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_units;

    fn item(title: &str, unit: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            link: format!("https://www.edu.tw/News_Content.aspx?t={title}"),
            date: String::new(),
            unit: unit.to_string(),
        }
    }

    fn sample() -> Vec<NewsItem> {
        vec![
            item("全運會開幕", "體育署"),
            item("會考放榜", "國民及學前教育署"),
            item("體育班招生", "國民及學前教育署"),
            item("Sports for all", "Sports Administration"),
            item("青年壯遊", "青年發展署"),
        ]
    }

    #[test]
    fn test_filter_uses_synonyms_and_preserves_order() {
        let filter = UnitFilter::new(default_units(), FilterPolicy::UnitOnly);
        let kept = filter.filter(sample(), "體育署");
        let titles: Vec<&str> = kept.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["全運會開幕", "Sports for all"]);
    }

    #[test]
    fn test_title_is_ignored_by_default() {
        let filter = UnitFilter::new(default_units(), FilterPolicy::UnitOnly);
        let kept = filter.filter(sample(), "體育署");
        assert!(kept.iter().all(|i| i.title != "體育班招生"));
    }

    #[test]
    fn test_unit_or_title_policy() {
        let filter = UnitFilter::new(default_units(), FilterPolicy::UnitOrTitle);
        let kept = filter.filter(sample(), "體育署");
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[1].title, "體育班招生");
    }

    #[test]
    fn test_unknown_unit_matches_literally() {
        let filter = UnitFilter::new(default_units(), FilterPolicy::UnitOnly);
        assert_eq!(filter.keywords("綜合規劃司"), vec!["綜合規劃司"]);

        let items = vec![item("計畫說明", "綜合規劃司"), item("其他", "秘書處")];
        let kept = filter.filter(items, "綜合規劃司");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].unit, "綜合規劃司");
    }

    #[test]
    fn test_every_kept_item_matches_a_keyword() {
        let filter = UnitFilter::new(default_units(), FilterPolicy::UnitOnly);
        for unit in ["體育署", "國教署", "青年署"] {
            let keywords = filter.keywords(unit);
            for kept in filter.filter(sample(), unit) {
                assert!(keywords.iter().any(|k| kept.unit.contains(k)));
            }
        }
    }
}
