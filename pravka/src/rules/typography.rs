//! Russian typography: ellipsis and non-breaking spaces.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{NBSP, REFERENCE_ABBREVIATIONS, UNIT_ABBREVIATIONS};

static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\.\.").unwrap());
static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)\s*%").unwrap());
static UNITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)(\d)\s+({})", UNIT_ABBREVIATIONS)).unwrap());
static NUMERO: Lazy<Regex> = Lazy::new(|| Regex::new(r"№\s*(\d)").unwrap());
static REFERENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({})\.\s*(\d+)", REFERENCE_ABBREVIATIONS)).unwrap());
static LEFTOVER_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Applies Russian typography rules.
///
/// Three literal periods become a single ellipsis character; numbers are
/// bound to a following `%` or unit abbreviation with a non-breaking
/// space, as are `№` and short references (ст., п., г.) to a following
/// number. Any run of plain spaces left behind collapses to one;
/// non-breaking spaces are never collapsed.
pub fn typograph(text: &str) -> String {
    let t = ELLIPSIS.replace_all(text, "…");
    let t = PERCENT.replace_all(&t, format!("${{1}}{}%", NBSP).as_str());
    let t = UNITS.replace_all(&t, format!("${{1}}{}${{2}}", NBSP).as_str());
    let t = NUMERO.replace_all(&t, format!("№{}${{1}}", NBSP).as_str());
    let t = REFERENCES.replace_all(&t, format!("${{1}}.{}${{2}}", NBSP).as_str());
    LEFTOVER_SPACES.replace_all(&t, " ").into_owned()
}
