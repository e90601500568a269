pub const NBSP: char = '\u{00a0}';

pub const DEFAULT_MAX_TEXT_LEN: usize = 15_000;

/// Unit abbreviations that bind to a preceding number with a non-breaking
/// space, as a regex alternation. Matched case-insensitively.
pub const UNIT_ABBREVIATIONS: &str = r"кг|г|м|км|см|мм|л|мл|шт|тыс\.|млн|млрд";

/// Short-form reference markers (статья, пункт, год) that bind to a
/// following number. Matched case-insensitively, each followed by a period.
pub const REFERENCE_ABBREVIATIONS: &str = "ст|п|г";
