//! Free-text field normalization for titles, authors and publishers,
//! plus publication-year cleanup.

use chrono::Datelike;

/// Collapse whitespace runs and Title Case each word.
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.extend(chars.flat_map(|c| c.to_lowercase()));
            out
        }
        None => String::new(),
    }
}

/// Clean a publication-year cell.
///
/// Spreadsheet round-trips turn years into floats ("1965.0"), so the text
/// before the first `.` is taken. The cleaned value is returned even when
/// invalid so the error log can show it.
pub fn normalize_year(raw: &str) -> (String, Option<String>) {
    let cleaned = raw.split('.').next().unwrap_or("").trim().to_string();

    let plausible = cleaned.len() == 4
        && cleaned.bytes().all(|b| b.is_ascii_digit())
        && cleaned
            .parse::<i32>()
            .map(|y| (1400..=chrono::Utc::now().year() + 1).contains(&y))
            .unwrap_or(false);

    if plausible {
        (cleaned, None)
    } else {
        (cleaned, Some("Invalid year".to_string()))
    }
}
