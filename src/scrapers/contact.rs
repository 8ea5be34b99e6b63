//! Contact person and phone extraction from article text.
//!
//! Press releases on the portal end with a contact block, but its shape
//! varies from one article to the next (`聯絡人：王小明`, `新聞聯絡人:林專員`,
//! `TEL:(02)7736-7890`, or just a bare number). Extraction is therefore split
//! into two steps:
//!
//! 1. **Find candidates** with an ordered list of patterns. Each pattern
//!    contributes at most its first match.
//! 2. **Accept a candidate** only if it passes an independent validator.
//!
//! The first candidate that passes wins. The bare-number fallback pattern is
//! greedy across whitespace, so every phone candidate is checked again against
//! the canonical shape before it is trusted.

use crate::models::ContactInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Token following a label: no whitespace, no list punctuation.
const NAME_TOKEN: &str = r"([^\s,，；;]+)";

/// Leading zero, 1-2 digit area code (optionally parenthesized), exchange, subscriber.
const PHONE_BODY: &str = r"(\(?0\d{1,2}\)?\s*-?\s*\d{3,4}\s*-?\s*\d{3,4})";

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"聯絡人[：:]\s*{NAME_TOKEN}"),
        format!(r"連絡人[：:]\s*{NAME_TOKEN}"),
        format!(r"新聞聯絡人[：:]\s*{NAME_TOKEN}"),
        format!(r"承辦人[：:]\s*{NAME_TOKEN}"),
        format!(r"聯絡人\s*{NAME_TOKEN}"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static name pattern"))
    .collect()
});

static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(r"電話[：:]?\s*{PHONE_BODY}"),
        format!(r"聯絡電話[：:]?\s*{PHONE_BODY}"),
        format!(r"(?:TEL|Tel|tel)[：:]?\s*{PHONE_BODY}"),
        PHONE_BODY.to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static phone pattern"))
    .collect()
});

static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?0\d{1,2}\)?[-\s]?\d{3,4}[-\s]?\d{3,4}$").expect("static phone shape"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{3,}").expect("static digit run"));

const MAX_NAME_CHARS: usize = 10;

/// Pulls a [`ContactInfo`] out of free text. Pure and stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactExtractor;

impl ContactExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the contact person and phone from `text`.
    ///
    /// Fields that cannot be found, or whose candidates all fail validation,
    /// are left empty.
    pub fn extract(&self, text: &str) -> ContactInfo {
        let contact = ContactInfo {
            person: first_accepted(&NAME_PATTERNS, text, is_plausible_name).unwrap_or_default(),
            phone: first_accepted(&PHONE_PATTERNS, text, is_valid_phone).unwrap_or_default(),
        };
        trace!(person = %contact.person, phone = %contact.phone, "Extracted contact");
        contact
    }
}

/// Run each pattern in order and return the first capture the validator accepts.
fn first_accepted(patterns: &[Regex], text: &str, accept: fn(&str) -> bool) -> Option<String> {
    patterns
        .iter()
        .filter_map(|re| re.captures(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|candidate| accept(candidate))
}

/// A contact name is short and does not contain a phone-number fragment.
pub fn is_plausible_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.chars().count() <= MAX_NAME_CHARS
        && !DIGIT_RUN.is_match(candidate)
}

/// Canonical phone shape, e.g. `02-1234-5678`, `(02)7736-7890`, `049 2345 678`.
pub fn is_valid_phone(candidate: &str) -> bool {
    PHONE_SHAPE.is_match(candidate)
}
