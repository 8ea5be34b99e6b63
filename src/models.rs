//! Data models for listing items and scraped records.
//!
//! - [`NewsItem`]: one row pulled off a listing page
//! - [`ContactInfo`]: contact person and phone extracted from an article body
//! - [`ScrapedRecord`]: the final output unit, one per accepted news item
//!
//! Only [`ScrapedRecord`] (and the [`ContactInfo`] nested in it) is
//! serialized. The JSON field names are `date`, `unit`, `title`, `url` and
//! `author { name, tel }`.

use serde::{Deserialize, Serialize};

/// A candidate news item as found on a listing page.
///
/// The listing parser guarantees `title` has at least three characters and
/// `link` is an absolute URL. `date` and `unit` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    /// Visible text of the item's link.
    pub title: String,
    /// Absolute URL of the article page.
    pub link: String,
    /// Date as printed on the listing (ROC, ISO or US style), or empty.
    pub date: String,
    /// Publishing unit cell, or empty.
    pub unit: String,
}

/// Contact details for a single article.
///
/// Both fields are empty strings when nothing trustworthy was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactInfo {
    /// Contact person's name.
    #[serde(rename = "name")]
    pub person: String,
    /// Contact phone number, exactly as printed in the article.
    #[serde(rename = "tel")]
    pub phone: String,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.person.is_empty() && self.phone.is_empty()
    }
}

/// One accepted news item, enriched with its article's contact details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScrapedRecord {
    pub date: String,
    pub unit: String,
    pub title: String,
    pub url: String,
    pub author: ContactInfo,
}

impl ScrapedRecord {
    /// Build a record from a listing item.
    ///
    /// Listing rows that carried no unit cell are attributed to the unit the
    /// crawl was asked for, since they passed the filter for it.
    pub fn from_item(item: NewsItem, target_unit: &str, author: ContactInfo) -> Self {
        let unit = if item.unit.is_empty() {
            target_unit.to_string()
        } else {
            item.unit
        };
        Self {
            date: item.date,
            unit,
            title: item.title,
            url: item.link,
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(unit: &str) -> NewsItem {
        NewsItem {
            title: "全國運動會開幕".to_string(),
            link: "https://www.edu.tw/News_Content.aspx?s=1".to_string(),
            date: "114-08-14".to_string(),
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_record_serialization_field_names() {
        let record = ScrapedRecord::from_item(
            item("體育署"),
            "體育署",
            ContactInfo {
                person: "王小明".to_string(),
                phone: "02-1234-5678".to_string(),
            },
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "114-08-14");
        assert_eq!(json["unit"], "體育署");
        assert_eq!(json["url"], "https://www.edu.tw/News_Content.aspx?s=1");
        assert_eq!(json["author"]["name"], "王小明");
        assert_eq!(json["author"]["tel"], "02-1234-5678");
        assert!(json["author"].get("person").is_none());
    }

    #[test]
    fn test_record_unit_falls_back_to_target() {
        let record = ScrapedRecord::from_item(item(""), "青年署", ContactInfo::default());
        assert_eq!(record.unit, "青年署");

        let record = ScrapedRecord::from_item(item("體育署"), "體育", ContactInfo::default());
        assert_eq!(record.unit, "體育署");
    }

    #[test]
    fn test_contact_info_deserialization() {
        let json = r#"{"name": "", "tel": "(02)7736-7890"}"#;
        let contact: ContactInfo = serde_json::from_str(json).unwrap();
        assert_eq!(contact.person, "");
        assert_eq!(contact.phone, "(02)7736-7890");
        assert!(!contact.is_empty());
        assert!(ContactInfo::default().is_empty());
    }
}
