//! Deterministic rewrite passes.
//!
//! Every pass is a pure function over the input text. Passes that run in
//! the legal tier also report what they changed as [`TextEdit`]s; offsets
//! for sequential matches within one pass are drift-corrected, i.e. they
//! account for length changes already made earlier in the same pass.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::constants::NBSP;
use crate::edit::TextEdit;

pub mod typography;

static HORIZONTAL_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_PADDING: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\n ?").unwrap());
static STRAIGHT_QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"\n]+)""#).unwrap());
static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());
static DOUBLE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r" +([.,;:!?])").unwrap());
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static PUNCT_THEN_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,;:!?])([А-Яа-яA-Za-z])").unwrap());

const EM_DASH: &str = " — ";

/// Normalizes whitespace and line breaks.
///
/// Non-breaking spaces become regular spaces, runs of spaces and tabs
/// collapse to one space, spaces hugging a newline are removed, and the
/// whole text is trimmed. Idempotent.
pub fn normalize(text: &str) -> String {
    let t = text.replace(NBSP, " ");
    let t = HORIZONTAL_WS.replace_all(&t, " ");
    let t = NEWLINE_PADDING.replace_all(&t, "\n");
    t.trim().to_string()
}

/// Applies one regex rewrite left to right, recording an edit per match
/// that actually changed something.
///
/// The recorded offset is the number of characters already emitted when
/// the match was reached, which equals the match's pre-pass position plus
/// the cumulative length drift of earlier replacements in this pass.
fn rewrite_pass<F>(
    text: &str,
    pattern: &Regex,
    rule_id: &str,
    message: &str,
    mut replacement_for: F,
) -> (String, Vec<TextEdit>)
where
    F: FnMut(&Captures) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut out_chars = 0usize;
    let mut edits = Vec::new();
    let mut last = 0usize;

    for caps in pattern.captures_iter(text) {
        let m = caps.get(0).expect("capture 0 always exists");
        let gap = &text[last..m.start()];
        out.push_str(gap);
        out_chars += gap.chars().count();

        let original = m.as_str();
        let replacement = replacement_for(&caps);
        if replacement != original {
            edits.push(TextEdit::new(
                out_chars,
                original.chars().count(),
                original,
                replacement.as_str(),
                message,
                rule_id,
            ));
        }
        out.push_str(&replacement);
        out_chars += replacement.chars().count();
        last = m.end();
    }

    out.push_str(&text[last..]);
    (out, edits)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Rewrites a hyphen between two words to a spaced em-dash.
///
/// Fires on any hyphen with word characters on both sides, with or without
/// surrounding whitespace. This is deliberately broad and also converts
/// compound names ("Москва-Питер" becomes "Москва — Питер"); narrowing it
/// needs a product decision, not a code change.
fn convert_dashes(text: &str) -> (String, Vec<TextEdit>) {
    let mut out = String::with_capacity(text.len());
    let mut out_chars = 0usize;
    let mut edits = Vec::new();
    let mut last = 0usize;

    for m in DASH_RUN.find_iter(text) {
        let prev_is_word = text[..m.start()].chars().next_back().map_or(false, is_word_char);
        let next_is_word = text[m.end()..].chars().next().map_or(false, is_word_char);
        if !prev_is_word || !next_is_word {
            continue;
        }

        let gap = &text[last..m.start()];
        out.push_str(gap);
        out_chars += gap.chars().count();

        let original = m.as_str();
        if original != EM_DASH {
            edits.push(TextEdit::new(
                out_chars,
                original.chars().count(),
                original,
                EM_DASH,
                "Convert to em-dash",
                "EM_DASH",
            ));
        }
        out.push_str(EM_DASH);
        out_chars += EM_DASH.chars().count();
        last = m.end();
    }

    out.push_str(&text[last..]);
    (out, edits)
}

/// Applies legal-document formatting rules and reports every change.
///
/// In order: straight quotes to «», hyphens between words to spaced
/// em-dashes, runs of spaces to one, and spaces before punctuation
/// removed. Each sub-pass runs over the previous sub-pass's output, so a
/// reported edit's offset is relative to that sub-pass's own input.
pub fn apply_legal_rules(text: &str) -> (String, Vec<TextEdit>) {
    let (t, mut edits) = rewrite_pass(
        text,
        &STRAIGHT_QUOTES,
        "RU_QUOTES",
        "Convert to Russian quotes",
        |caps| format!("«{}»", &caps[1]),
    );

    let (t, dash_edits) = convert_dashes(&t);
    edits.extend(dash_edits);

    let (t, space_edits) = rewrite_pass(&t, &DOUBLE_SPACES, "DOUBLE_SPACE", "Collapse spaces", |_| {
        " ".to_string()
    });
    edits.extend(space_edits);

    let (t, punct_edits) = rewrite_pass(
        &t,
        &SPACE_BEFORE_PUNCT,
        "SPACE_BEFORE_PUNCT",
        "Remove space before punctuation",
        |caps| caps[1].to_string(),
    );
    edits.extend(punct_edits);

    (t, edits)
}

/// Applies the aggressive strict-tier normalization.
///
/// Collapses three or more consecutive newlines to two and inserts a
/// space between a punctuation mark and a letter glued to it. Changes are
/// not individually tracked.
pub fn apply_strict_rules(text: &str) -> String {
    let t = EXCESS_NEWLINES.replace_all(text, "\n\n");
    PUNCT_THEN_LETTER.replace_all(&t, "$1 $2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_spaces_and_tabs() {
        let result = normalize("Текст   с \t лишними     пробелами");
        assert_eq!(result, "Текст с лишними пробелами");
    }

    #[test]
    fn normalize_replaces_nbsp() {
        let result = normalize("Текст\u{a0}с\u{a0}nbsp");
        assert_eq!(result, "Текст с nbsp");
    }

    #[test]
    fn normalize_strips_spaces_around_newlines() {
        assert_eq!(normalize("Строка 1 \n Строка 2"), "Строка 1\nСтрока 2");
    }

    #[test]
    fn normalize_is_idempotent() {
        for text in [
            "  Текст \u{a0} с\t\tшумом \n и переносами  \n\nвторой абзац ",
            "уже чистый текст",
            "",
        ] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn quotes_converted_to_guillemets() {
        let (result, edits) = apply_legal_rules("Он сказал \"привет\" и ушёл");
        assert_eq!(result, "Он сказал «привет» и ушёл");
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].rule_id, "RU_QUOTES");
        assert_eq!(edits[0].original, "\"привет\"");
        assert_eq!(edits[0].replacement, "«привет»");
    }

    #[test]
    fn multiple_quoted_spans_convert_independently() {
        let (result, edits) = apply_legal_rules("\"раз\" и \"два\"");
        assert_eq!(result, "«раз» и «два»");
        assert_eq!(edits.len(), 2);
        // Offsets are drift-corrected; «» and "" are the same length here,
        // so the second edit sits where the second quoted span starts.
        assert_eq!(edits[0].offset, 0);
        assert_eq!(edits[1].offset, 8);
        assert!(edits[1].is_valid_for("\"раз\" и \"два\""));
    }

    #[test]
    fn dash_between_words_becomes_em_dash() {
        let (result, edits) = apply_legal_rules("Москва-Питер");
        assert_eq!(result, "Москва — Питер");
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].rule_id, "EM_DASH");
        assert_eq!(edits[0].offset, 6);
        assert_eq!(edits[0].length, 1);
    }

    #[test]
    fn spaced_hyphen_collapses_to_same_em_dash() {
        let (result, _) = apply_legal_rules("Москва - Питер");
        assert_eq!(result, "Москва — Питер");
    }

    #[test]
    fn quote_round_trip_with_latin_text() {
        let (result, _) = apply_legal_rules("He said \"hi\" today");
        assert_eq!(result, "He said «hi» today");
    }

    #[test]
    fn leading_or_trailing_hyphen_is_left_alone() {
        let (result, edits) = apply_legal_rules("- пункт списка -");
        assert_eq!(result, "- пункт списка -");
        assert!(edits.is_empty());
    }

    #[test]
    fn double_spaces_removed() {
        let (result, edits) = apply_legal_rules("Текст  с  двойными  пробелами");
        assert_eq!(result, "Текст с двойными пробелами");
        assert_eq!(edits.len(), 3);
        assert!(edits.iter().all(|e| e.rule_id == "DOUBLE_SPACE"));
    }

    #[test]
    fn space_before_punctuation_removed() {
        let (result, _) = apply_legal_rules("Текст .");
        assert_eq!(result, "Текст.");
    }

    #[test]
    fn drift_corrected_offsets_within_one_pass() {
        // «» replacements happen to keep length; force drift with spaces.
        let (result, edits) = apply_legal_rules("a  b  c");
        assert_eq!(result, "a b c");
        assert_eq!(edits[0].offset, 1);
        // Second run started at char 4 pre-pass; one char of drift from
        // the first collapse moves it to 3.
        assert_eq!(edits[1].offset, 3);
    }

    #[test]
    fn abbreviations_preserved() {
        let (result, _) = apply_legal_rules("ООО РФ ГК РФ");
        assert_eq!(result, "ООО РФ ГК РФ");
    }

    #[test]
    fn strict_collapses_newline_runs() {
        assert_eq!(
            apply_strict_rules("Строка 1\n\n\n\nСтрока 2"),
            "Строка 1\n\nСтрока 2"
        );
    }

    #[test]
    fn strict_inserts_space_after_punctuation() {
        assert_eq!(apply_strict_rules("Текст.Продолжение"), "Текст. Продолжение");
    }

    #[test]
    fn strict_leaves_numbers_and_dates_alone() {
        assert_eq!(apply_strict_rules("01.01.2026"), "01.01.2026");
    }
}
