//! Listing page parser.
//!
//! The portal's listing markup has changed shape over the years (plain
//! tables, `tbody` rows, `CP_list` containers, `li.news` lists), so rows are
//! located by a cascade of [`SelectionStrategy`] objects. The first strategy
//! that yields more than one element wins; raw table-row strategies then drop
//! their first element, which is the header row.
//!
//! Each row is turned into a [`NewsItem`] on a best-effort basis. Rows with no
//! usable link or with a too-short title are skipped without error.

use crate::error::CrawlError;
use crate::models::NewsItem;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

/// Characters that mark an organizational unit name (署, 司, 處 ...).
const UNIT_MARKERS: [&str; 7] = ["署", "司", "處", "部", "會", "局", "中心"];

/// Unit cells are short; anything longer is prose that happens to contain a marker.
const MAX_UNIT_CHARS: usize = 20;

const MIN_TITLE_CHARS: usize = 3;

static ARTICLE_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"News_Content|news|News").expect("static href pattern"));

/// ROC (114-08-14), ISO (2025-08-14) and US (8/14/2025) dates, tried in order.
/// The leading `\D` keeps the ROC pattern from matching the tail of an ISO year.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:^|\D)(\d{3}-\d{2}-\d{2})",
        r"(?:^|\D)(\d{4}-\d{2}-\d{2})",
        r"(?:^|\D)(\d{1,2}/\d{1,2}/\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static date pattern"))
    .collect()
});

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// One way of locating the repeating news rows in a listing document.
pub trait SelectionStrategy {
    /// Short description for logs.
    fn label(&self) -> &str;

    /// Return the candidate rows, or `None` if this strategy does not apply
    /// (fewer than two matches).
    fn try_select<'a>(&self, document: &'a Html) -> Option<Vec<ElementRef<'a>>>;
}

/// A plain CSS selector, optionally dropping the first match as a header row.
pub struct CssStrategy {
    css: &'static str,
    selector: Selector,
    skip_header: bool,
}

impl CssStrategy {
    pub fn new(css: &'static str, skip_header: bool) -> Self {
        Self {
            css,
            selector: selector(css),
            skip_header,
        }
    }
}

impl SelectionStrategy for CssStrategy {
    fn label(&self) -> &str {
        self.css
    }

    fn try_select<'a>(&self, document: &'a Html) -> Option<Vec<ElementRef<'a>>> {
        let found: Vec<ElementRef<'a>> = document.select(&self.selector).collect();
        if found.len() <= 1 {
            return None;
        }
        let skip = usize::from(self.skip_header);
        Some(found.into_iter().skip(skip).collect())
    }
}

/// Elements matching `container` that have at least one `descendant` match.
pub struct ContainsStrategy {
    label: &'static str,
    container: Selector,
    descendant: Selector,
}

impl ContainsStrategy {
    pub fn new(label: &'static str, container: &str, descendant: &str) -> Self {
        Self {
            label,
            container: selector(container),
            descendant: selector(descendant),
        }
    }
}

impl SelectionStrategy for ContainsStrategy {
    fn label(&self) -> &str {
        self.label
    }

    fn try_select<'a>(&self, document: &'a Html) -> Option<Vec<ElementRef<'a>>> {
        let found: Vec<ElementRef<'a>> = document
            .select(&self.container)
            .filter(|el| el.select(&self.descendant).next().is_some())
            .collect();
        (found.len() > 1).then_some(found)
    }
}

/// The strategy cascade used for the portal, most specific table forms first.
pub fn default_strategies() -> Vec<Box<dyn SelectionStrategy>> {
    vec![
        Box::new(CssStrategy::new("table tr", true)),
        Box::new(CssStrategy::new("tbody tr", true)),
        Box::new(CssStrategy::new("div.news_item", false)),
        Box::new(CssStrategy::new("li.news", false)),
        Box::new(CssStrategy::new(".CP_list tr", true)),
        Box::new(ContainsStrategy::new("tr:has(a)", "tr", "a")),
        Box::new(ContainsStrategy::new(
            r#"div:has(a[href*="News_Content"])"#,
            "div",
            r#"a[href*="News_Content"]"#,
        )),
    ]
}

/// Turns a listing document into [`NewsItem`]s.
pub struct ListingParser {
    base_url: Url,
    strategies: Vec<Box<dyn SelectionStrategy>>,
}

impl std::fmt::Debug for ListingParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingParser")
            .field("base_url", &self.base_url.as_str())
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.label()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ListingParser {
    pub fn new(base_url: Url) -> Self {
        Self::with_strategies(base_url, default_strategies())
    }

    pub fn with_strategies(base_url: Url, strategies: Vec<Box<dyn SelectionStrategy>>) -> Self {
        Self {
            base_url,
            strategies,
        }
    }

    /// Locate rows with the first applicable strategy.
    fn select_rows<'a>(&self, document: &'a Html) -> Option<(&str, Vec<ElementRef<'a>>)> {
        self.strategies
            .iter()
            .find_map(|s| s.try_select(document).map(|rows| (s.label(), rows)))
    }

    /// Extract every well-formed news item from a listing document.
    ///
    /// Returns an empty vector when no strategy matches or no row carries a
    /// usable title and link.
    pub fn parse(&self, document: &Html) -> Vec<NewsItem> {
        self.try_parse(document).unwrap_or_default()
    }

    /// Like [`parse`](Self::parse), but reports a page without any usable
    /// row container as [`CrawlError::NoListingContainer`].
    pub fn try_parse(&self, document: &Html) -> Result<Vec<NewsItem>, CrawlError> {
        let (label, rows) = self
            .select_rows(document)
            .ok_or(CrawlError::NoListingContainer)?;
        debug!(strategy = label, rows = rows.len(), "Selected listing rows");

        let items: Vec<NewsItem> = rows
            .into_iter()
            .filter_map(|row| self.parse_row(row))
            .collect();

        for (i, item) in items.iter().enumerate() {
            debug!(index = i + 1, title = %item.title, unit = %item.unit, date = %item.date, "Listing item");
        }
        info!(strategy = label, count = items.len(), "Parsed listing page");
        Ok(items)
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Option<NewsItem> {
        let link_el = find_article_link(row)?;

        let title = stripped_text(link_el);
        if title.chars().count() < MIN_TITLE_CHARS {
            return None;
        }

        let href = link_el.value().attr("href").filter(|h| !h.trim().is_empty())?;
        let link = self.base_url.join(href.trim()).ok()?.to_string();

        // Cells are separated so a serial-number column cannot fuse with the date.
        let full_text = row.text().join(" ");

        Some(NewsItem {
            title,
            link,
            date: find_date(&full_text).unwrap_or_default(),
            unit: find_unit(row, link_el).unwrap_or_default(),
        })
    }
}

/// Prefer an anchor that points at an article; otherwise take the first anchor.
fn find_article_link(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.select(&ANCHOR)
        .find(|a| a.value().attr("href").is_some_and(|h| ARTICLE_HREF.is_match(h)))
        .or_else(|| row.select(&ANCHOR).next())
}

/// Visible text with each text node trimmed and concatenated.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

pub fn find_date(text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First short cell carrying a unit marker. The headline cell is skipped, since
/// titles such as 全國運動會 contain markers too.
fn find_unit(row: ElementRef<'_>, link_el: ElementRef<'_>) -> Option<String> {
    row.select(&CELL)
        .filter(|cell| !link_el.ancestors().any(|n| n.id() == cell.id()))
        .map(stripped_text)
        .find(|text| {
            UNIT_MARKERS.iter().any(|m| text.contains(m)) && text.chars().count() < MAX_UNIT_CHARS
        })
}
