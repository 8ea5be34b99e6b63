//! Article detail fetching.
//!
//! Contact details live in the article body, whose container class differs
//! between page templates. Body text is taken from the first match of:
//!
//! 1. a known content container (`div.content`, `div.CP_content`, ...)
//! 2. any `div` mentioning a contact marker (聯絡人 / 電話)
//! 3. the whole page
//!
//! Enrichment is best-effort: any failure yields an empty [`ContactInfo`].

use crate::error::CrawlError;
use crate::models::ContactInfo;
use crate::scrapers::contact::ContactExtractor;
use crate::transport::Transport;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "div.content",
        "div.news-content",
        "div.article-content",
        "div#content",
        "div.CP_content",
        ".page_content",
    ]
    .iter()
    .map(|css| Selector::parse(css).expect("static content selector"))
    .collect()
});

static DIV: Lazy<Selector> = Lazy::new(|| Selector::parse("div").expect("static selector"));

const CONTACT_MARKERS: [&str; 2] = ["聯絡人", "電話"];

/// Fetches article pages through a borrowed transport and extracts contacts.
#[derive(Debug)]
pub struct DetailFetcher<'t, T> {
    transport: &'t T,
    extractor: ContactExtractor,
}

impl<'t, T: Transport> DetailFetcher<'t, T> {
    pub fn new(transport: &'t T, extractor: ContactExtractor) -> Self {
        Self {
            transport,
            extractor,
        }
    }

    /// Fetch `url` and extract its contact details. Never fails.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch(&self, url: &str) -> ContactInfo {
        match self.try_fetch(url).await {
            Ok(contact) if contact.is_empty() => {
                debug!("No contact details in article");
                contact
            }
            Ok(contact) => {
                debug!(person = %contact.person, phone = %contact.phone, "Extracted article contact");
                contact
            }
            Err(e) => {
                warn!(error = %e, "Detail fetch failed; leaving contact empty");
                ContactInfo::default()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<ContactInfo, CrawlError> {
        let body = self.transport.get(url, &[]).await?;
        let html = String::from_utf8_lossy(&body);
        let text = {
            let document = Html::parse_document(&html);
            body_text(&document)
        };
        debug!(preview = %truncate_for_log(&text, 120), "Article body");
        Ok(self.extractor.extract(&text))
    }
}

/// Text nodes of `el`, trimmed and joined line by line so neighbouring fields
/// (`聯絡人：王小明` / `電話：...`) stay separated.
fn block_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).join("\n")
}

/// Choose the article body text following the container cascade.
pub fn body_text(document: &Html) -> String {
    let from_container = CONTENT_SELECTORS
        .iter()
        .filter_map(|sel| document.select(sel).next())
        .map(block_text)
        .find(|text| !text.is_empty());
    if let Some(text) = from_container {
        return text;
    }

    let from_marker = document
        .select(&DIV)
        .map(block_text)
        .find(|text| CONTACT_MARKERS.iter().any(|m| text.contains(m)));
    if let Some(text) = from_marker {
        return text;
    }

    block_text(document.root_element())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;

    const ARTICLE: &str = r#"
        <html><body>
          <div class="header">教育部全球資訊網</div>
          <div class="CP_content">
            <p>全國運動會今日開幕。</p>
            <p>新聞聯絡人：林專員</p>
            <p>聯絡電話：(02)7736-7890</p>
          </div>
          <div class="footer">電話：02-2356-6051</div>
        </body></html>
    "#;

    #[test]
    fn test_body_prefers_content_container() {
        let doc = Html::parse_document(ARTICLE);
        let text = body_text(&doc);
        assert!(text.starts_with("全國運動會今日開幕。"));
        assert!(!text.contains("2356"));
    }

    #[test]
    fn test_body_falls_back_to_contact_block() {
        let doc = Html::parse_document(
            r#"<div><section>公告</section></div><p>x</p><div class="info">承辦人：陳科長 電話：04-2345-6789</div>"#,
        );
        let text = body_text(&doc);
        assert_eq!(text, "承辦人：陳科長 電話：04-2345-6789");
    }

    #[test]
    fn test_body_falls_back_to_whole_page() {
        let doc = Html::parse_document("<html><body><p>聯絡人：張老師</p></body></html>");
        assert_eq!(body_text(&doc), "聯絡人：張老師");
    }

    #[test]
    fn test_empty_container_is_skipped() {
        let doc = Html::parse_document(
            r#"<div class="content"> </div><div class="page_content">電話：02-1234-5678</div>"#,
        );
        assert_eq!(body_text(&doc), "電話：02-1234-5678");
    }

    #[tokio::test]
    async fn test_fetch_extracts_contact() {
        let url = "https://www.edu.tw/News_Content.aspx?s=1";
        let transport = FakeTransport::new().with_page(url, ARTICLE);
        let fetcher = DetailFetcher::new(&transport, ContactExtractor::new());

        let contact = fetcher.fetch(url).await;
        assert_eq!(contact.person, "林專員");
        assert_eq!(contact.phone, "(02)7736-7890");
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty_contact() {
        let transport = FakeTransport::new();
        let fetcher = DetailFetcher::new(&transport, ContactExtractor::new());

        let contact = fetcher.fetch("https://www.edu.tw/missing").await;
        assert!(contact.is_empty());
    }
}
