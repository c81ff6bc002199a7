use std::sync::LazyLock;

use regex::Regex;

static SHOWING_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)showing\s+\d+\s+of\s+(\d+)").expect("static hint pattern")
});

/// Read the advisory total from page text such as `Showing 50 of 2849`.
/// A total of zero is ignored.
pub fn detect_count_hint(page_text: &str) -> Option<u64> {
    SHOWING_OF
        .captures(page_text)
        .and_then(|caps| caps.get(1))
        .and_then(|total| total.as_str().parse::<u64>().ok())
        .filter(|&total| total > 0)
}

pub fn completion_percent(accepted: usize, hint: Option<u64>) -> Option<f64> {
    hint.filter(|&n| n > 0)
        .map(|total| accepted as f64 / total as f64 * 100.0)
}
