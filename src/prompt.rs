//! Interactive console prompts for crawl settings.

use crate::cli::MAX_COUNT;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::error::Error;

/// Settings a crawl needs from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub unit: String,
    pub count: usize,
}

pub fn validate_count(count: &usize) -> Result<(), String> {
    if (1..=MAX_COUNT).contains(count) {
        Ok(())
    } else {
        Err(format!("文章數量必須在 1-{MAX_COUNT} 之間"))
    }
}

pub fn validate_unit(unit: &String) -> Result<(), &'static str> {
    if unit.trim().is_empty() {
        Err("發布單位不能為空")
    } else {
        Ok(())
    }
}

/// Ask for whichever of `unit` / `count` was not supplied, then confirm.
///
/// Loops until the user confirms the settings. With `assume_yes` the
/// confirmation step is skipped.
pub fn resolve_request(
    unit: Option<String>,
    count: Option<usize>,
    known_units: &[&str],
    assume_yes: bool,
) -> Result<CrawlRequest, Box<dyn Error>> {
    if let (Some(unit), Some(count)) = (&unit, count) {
        return Ok(CrawlRequest {
            unit: unit.trim().to_string(),
            count,
        });
    }

    let theme = ColorfulTheme::default();
    loop {
        let count = match count {
            Some(c) => c,
            None => Input::<usize>::with_theme(&theme)
                .with_prompt(format!("請輸入要爬取的文章數量 (1-{MAX_COUNT})"))
                .validate_with(validate_count)
                .interact_text()?,
        };

        let unit = match &unit {
            Some(u) => u.trim().to_string(),
            None => {
                let prompt = format!("請輸入要爬取的發布單位 (可選: {})", known_units.join("、"));
                let input: String = Input::with_theme(&theme)
                    .with_prompt(prompt)
                    .validate_with(validate_unit)
                    .interact_text()?;
                input.trim().to_string()
            }
        };

        let request = CrawlRequest { unit, count };
        if assume_yes {
            return Ok(request);
        }

        let confirmed = Confirm::with_theme(&theme)
            .with_prompt(format!(
                "確認設定：發布單位 {}，文章數量 {}？",
                request.unit, request.count
            ))
            .default(true)
            .interact()?;
        if confirmed {
            return Ok(request);
        }
    }
}
