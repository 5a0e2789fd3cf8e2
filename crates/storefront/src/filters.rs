//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a skin count with its noun, e.g. `1 skin`, `4 skins`.
///
/// Usage in templates: `{{ account.skin_count|skins }}`
#[askama::filter_fn]
pub fn skins(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(skins_label(&count.to_string()))
}

fn skins_label(count: &str) -> String {
    if count == "1" {
        "1 skin".to_string()
    } else {
        format!("{count} skins")
    }
}
