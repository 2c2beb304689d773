//! SOP references mentioned in free text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::message::SopReference;

// SOP-prefixed numbers ("SOP 3.1"), bare dotted section numbers ("4.2.1")
// and manual pages ("Page 32-33"). A currency sign before or a percent sign
// after a bare number marks an amount, not a section.
static SOP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bSOP\s*(\d+(?:\.\d+){0,2})\b|([$€£]\s*)?\b([1-9]\d?\.\d{1,2}(?:\.\d{1,2})?)\b(%)?|\b(Page\s+\d+(?:\s*-\s*\d+)?)\b",
    )
    .expect("SOP reference pattern is valid")
});

/// Extracts SOP references in order of first appearance, without repeats.
pub fn extract_sop_references(text: &str) -> Vec<SopReference> {
    let mut found: Vec<SopReference> = Vec::new();
    for caps in SOP_PATTERN.captures_iter(text) {
        let is_amount = caps.get(2).is_some() || caps.get(4).is_some();
        let section = caps.get(1).or_else(|| caps.get(3).filter(|_| !is_amount));
        let reference = if let Some(section) = section {
            SopReference::Title {
                title: format!("SOP {}", section.as_str()),
            }
        } else if let Some(page) = caps.get(5) {
            let normalized: String = page.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
            SopReference::Page {
                page: capitalize_page(&normalized),
            }
        } else {
            continue;
        };
        if !found.contains(&reference) {
            found.push(reference);
        }
    }
    found
}

fn capitalize_page(raw: &str) -> String {
    match raw.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("page") => format!("Page{}", &raw[4..]),
        _ => raw.to_string(),
    }
}
