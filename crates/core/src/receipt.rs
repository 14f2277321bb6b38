//! Receipt title detection heuristic.
//!
//! Given the raw multi-line text that OCR produced for a till receipt,
//! propose the line item most likely to be a book title. A receipt line
//! item looks like `2 LE PETIT PRINCE 12,50`: optional quantity, the item
//! label, then a price with two decimals. The label of the first plausible
//! line wins.
//!
//! This is a heuristic, not a parser. Both false negatives (no title found)
//! and false positives (wrong line picked) are expected; callers must treat
//! `None` as "needs manual matching", never as a failure.

use std::sync::LazyLock;

use regex::Regex;

/// A priced line item: optional leading quantity, a label starting with an
/// uppercase letter, then a price with exactly two decimal digits
/// (comma or dot separator).
static LINE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+\s+)?([A-Z][^0-9]+?)\s+\d+[,.]\d{2}").expect("line-item regex is valid")
});

/// Labels that are receipt bookkeeping, not item names.
const RESERVED_PREFIXES: [&str; 5] = ["total", "prix", "montant", "tva", "remise"];

/// Scan OCR text for the first line whose label passes all plausibility
/// checks, returning the trimmed label.
pub fn detect_title(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let captures = LINE_ITEM.captures(line)?;
        let candidate = captures.get(1)?.as_str().trim();
        if is_plausible_title(candidate) {
            Some(candidate.to_string())
        } else {
            None
        }
    })
}

/// All checks a candidate label must pass:
/// longer than 3 characters, not a reserved bookkeeping word, not purely
/// numeric, starts with an ASCII letter, and contains at least one word.
fn is_plausible_title(candidate: &str) -> bool {
    if candidate.chars().count() <= 3 {
        return false;
    }
    let lowered = candidate.to_lowercase();
    if RESERVED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return false;
    }
    if candidate.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if !candidate.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    candidate.split_whitespace().next().is_some()
}
