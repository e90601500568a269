//! The correction pipeline and edit reconciliation.
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_MAX_TEXT_LEN;
use crate::diff::make_diff;
use crate::edit::{byte_offset, TextEdit};
use crate::provider::CorrectionProvider;
use crate::rules::{self, typography::typograph};

/// Which rewrite passes run.
///
/// Tiers are cumulative: `Legal` includes everything `Base` does, `Strict`
/// everything `Legal` does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Provider corrections only.
    Base,
    /// Provider corrections plus quote, dash and spacing rules.
    Legal,
    /// Legal rules plus aggressive whitespace and newline normalization.
    Strict,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Mode::Base => "base",
            Mode::Legal => "legal",
            Mode::Strict => "strict",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = CorrectError;

    fn from_str(s: &str) -> Result<Mode, CorrectError> {
        match s {
            "base" => Ok(Mode::Base),
            "legal" => Ok(Mode::Legal),
            "strict" => Ok(Mode::Strict),
            other => Err(CorrectError::UnknownMode(other.to_string())),
        }
    }
}

/// Process-wide engine settings, fixed for the engine's lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Texts longer than this many characters are rejected.
    pub max_text_len: usize,
    /// Mode used by callers that do not pick one.
    pub default_mode: Mode,
    /// Whether [`correct`](CorrectionEngine::correct) runs the typography pass.
    pub typography: bool,
}

impl EngineConfig {
    /// The stock configuration: 15 000 character limit, legal mode,
    /// typography on.
    pub const fn default() -> EngineConfig {
        EngineConfig {
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            default_mode: Mode::Legal,
            typography: true,
        }
    }
}

/// Per-call switches.
#[derive(Clone, Copy, Debug)]
pub struct CorrectOptions {
    /// Run the typography pass after the rule passes.
    pub typography: bool,
    /// Also render an HTML diff between the normalized input and the result.
    pub diff: bool,
}

impl CorrectOptions {
    /// Typography on, no diff.
    pub const fn default() -> CorrectOptions {
        CorrectOptions {
            typography: true,
            diff: false,
        }
    }
}

/// The outcome of one correction run.
///
/// Every caller-facing view (text only, text plus edits, text plus diff)
/// is a projection of this value, so they always agree on the text.
#[derive(Clone, Debug, Serialize)]
pub struct Correction {
    /// The corrected text.
    pub text: String,
    /// Reconciled edit list: duplicates removed, conflicts resolved.
    /// Reporting metadata only; each edit's offsets are relative to the
    /// snapshot its pass ran against.
    pub edits: Vec<TextEdit>,
    /// HTML diff, present when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Failures the engine surfaces to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrectError {
    /// The input exceeds the configured maximum length.
    #[error("text is too long: {length} characters, the limit is {max}")]
    TooLong {
        /// character count of the rejected input
        length: usize,
        /// the configured maximum
        max: usize,
    },
    /// A mode string did not name a known tier.
    #[error("unknown correction mode: {0}")]
    UnknownMode(String),
    /// Something that should never happen did. The payload is for logs;
    /// the display string is deliberately generic.
    #[error("internal correction failure")]
    Internal(String),
}

/// Applies `edits` to `text`, splicing from the highest offset down so
/// earlier offsets stay valid while later spans change length.
///
/// Callers must have resolved conflicts first; overlapping edits here are
/// a programming error. An edit pointing outside the text is an internal
/// error; an edit whose `original` no longer matches is skipped with a
/// warning.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, CorrectError> {
    if edits.is_empty() {
        return Ok(text.to_string());
    }

    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut result = text.to_string();
    for edit in sorted {
        let range = byte_offset(&result, edit.offset)
            .zip(byte_offset(&result, edit.end()));
        let (start, end) = match range {
            Some(r) => r,
            None => {
                log::error!(
                    "edit {:?} is outside the text ({} chars)",
                    edit,
                    result.chars().count()
                );
                return Err(CorrectError::Internal(format!(
                    "edit at offset {} is outside the text",
                    edit.offset
                )));
            }
        };
        if !edit.original.is_empty() && &result[start..end] != edit.original.as_str() {
            log::warn!(
                "skipping stale edit at offset {}: expected {:?}, found {:?}",
                edit.offset,
                edit.original,
                &result[start..end]
            );
            continue;
        }
        result.replace_range(start..end, &edit.replacement);
    }

    Ok(result)
}

/// Removes exact duplicates, then resolves overlaps by scanning in
/// ascending offset order and keeping an edit only if it conflicts with
/// nothing already kept. Among conflicting edits the lowest offset wins.
pub fn deduplicate_edits(edits: Vec<TextEdit>) -> Vec<TextEdit> {
    let mut unique: Vec<TextEdit> = edits.into_iter().unique().collect();
    unique.sort_by_key(|e| e.offset);

    let mut kept: Vec<TextEdit> = Vec::with_capacity(unique.len());
    for edit in unique {
        if kept.iter().any(|k| edit.conflicts_with(k)) {
            log::debug!("skipping conflicting edit at offset {}", edit.offset);
            continue;
        }
        kept.push(edit);
    }
    kept
}

/// Runs the full correction pipeline against an injected provider.
///
/// The pipeline is: normalize, provider check, apply provider edits, mode
/// rules, typography, edit reconciliation. Provider failures are soft:
/// the deterministic passes still run and the result carries zero
/// provider edits.
pub struct CorrectionEngine<P> {
    provider: P,
    config: EngineConfig,
}

impl<P: CorrectionProvider> CorrectionEngine<P> {
    /// Creates an engine with the stock configuration.
    pub fn new(provider: P) -> CorrectionEngine<P> {
        CorrectionEngine::with_config(provider, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(provider: P, config: EngineConfig) -> CorrectionEngine<P> {
        CorrectionEngine { provider, config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Corrects `text` in the configured default mode.
    pub fn correct_default(&self, text: &str) -> Result<Correction, CorrectError> {
        self.correct(text, self.config.default_mode)
    }

    /// Corrects `text` with default options (typography per config, no diff).
    pub fn correct(&self, text: &str, mode: Mode) -> Result<Correction, CorrectError> {
        let options = CorrectOptions {
            typography: self.config.typography,
            diff: false,
        };
        self.correct_with_options(text, mode, &options)
    }

    /// Corrects `text` with explicit per-call options.
    pub fn correct_with_options(
        &self,
        text: &str,
        mode: Mode,
        options: &CorrectOptions,
    ) -> Result<Correction, CorrectError> {
        if text.trim().is_empty() {
            return Ok(Correction {
                text: String::new(),
                edits: vec![],
                diff: options.diff.then(String::new),
            });
        }

        let length = text.chars().count();
        if length > self.config.max_text_len {
            return Err(CorrectError::TooLong {
                length,
                max: self.config.max_text_len,
            });
        }

        log::info!("correcting: mode={}, {} chars", mode, length);
        let normalized = rules::normalize(text);

        let provider_edits: Vec<TextEdit> = match self.provider.check(&normalized) {
            Ok(edits) => edits
                .into_iter()
                .filter(|e| !e.replacement.is_empty())
                .collect(),
            Err(e) => {
                log::warn!("provider failed, continuing with rules only: {}", e);
                vec![]
            }
        };

        let after_provider = apply_edits(&normalized, &provider_edits)?;

        let mut all_edits = provider_edits;
        let after_legal = if mode >= Mode::Legal {
            let (t, legal_edits) = rules::apply_legal_rules(&after_provider);
            all_edits.extend(legal_edits);
            t
        } else {
            after_provider
        };

        let after_strict = if mode >= Mode::Strict {
            rules::apply_strict_rules(&after_legal)
        } else {
            after_legal
        };

        let text = if options.typography {
            typograph(&after_strict)
        } else {
            after_strict
        };

        let edits = deduplicate_edits(all_edits);
        log::info!("correction complete: {} edits", edits.len());

        let diff = options.diff.then(|| make_diff(&normalized, &text));
        Ok(Correction { text, edits, diff })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FixedProvider, ProviderError};

    struct FailingProvider;

    impl CorrectionProvider for FailingProvider {
        fn check(&self, _text: &str) -> Result<Vec<TextEdit>, ProviderError> {
            Err(ProviderError::Unavailable)
        }
    }

    fn edit(offset: usize, length: usize, original: &str, replacement: &str) -> TextEdit {
        TextEdit::new(offset, length, original, replacement, "", "")
    }

    #[test]
    fn apply_single_edit() {
        let edits = [edit(0, 5, "Hello", "Hi")];
        assert_eq!(apply_edits("Hello world", &edits).unwrap(), "Hi world");
    }

    #[test]
    fn apply_multiple_edits() {
        let edits = [
            edit(0, 5, "Hello", "Hi"),
            edit(12, 4, "test", "demo"),
        ];
        assert_eq!(
            apply_edits("Hello world test", &edits).unwrap(),
            "Hi world demo"
        );
    }

    #[test]
    fn apply_edits_uses_char_offsets() {
        let edits = [edit(0, 5, "Првет", "Привет")];
        assert_eq!(apply_edits("Првет мир", &edits).unwrap(), "Привет мир");
    }

    #[test]
    fn out_of_range_edit_is_internal_error() {
        let edits = [edit(40, 5, "nope", "x")];
        assert!(matches!(
            apply_edits("короткий", &edits),
            Err(CorrectError::Internal(_))
        ));
    }

    #[test]
    fn stale_edit_is_skipped() {
        let edits = [edit(0, 5, "Howdy", "Hi")];
        assert_eq!(apply_edits("Hello world", &edits).unwrap(), "Hello world");
    }

    #[test]
    fn deduplicate_removes_exact_duplicates() {
        let edits = vec![
            edit(0, 5, "Hello", "Hi"),
            edit(0, 5, "Hello", "Hi"),
        ];
        assert_eq!(deduplicate_edits(edits).len(), 1);
    }

    #[test]
    fn deduplicate_keeps_lower_offset_on_conflict() {
        let edits = vec![
            edit(3, 5, "lo wo", "lo wo!"),
            edit(0, 5, "Hello", "Hi"),
        ];
        let kept = deduplicate_edits(edits);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].offset, 0);
    }

    #[test]
    fn deduplicate_keeps_touching_edits() {
        let edits = vec![
            edit(0, 5, "Hello", "Hi"),
            edit(5, 1, " ", "  "),
        ];
        assert_eq!(deduplicate_edits(edits).len(), 2);
    }

    #[test]
    fn base_mode_applies_provider_edits_only() {
        let provider = FixedProvider::new(vec![edit(0, 5, "Првет", "Привет")]);
        let engine = CorrectionEngine::new(provider);

        let correction = engine.correct("Првет \"мир\"", Mode::Base).unwrap();
        assert!(correction.text.contains("Привет"));
        assert!(!correction.text.contains('«'));
    }

    #[test]
    fn legal_mode_converts_quotes_and_dashes() {
        let engine = CorrectionEngine::new(FixedProvider::empty());

        let correction = engine
            .correct("Текст \"в кавычках\" и дефис-тире", Mode::Legal)
            .unwrap();
        assert!(correction.text.contains("«в кавычках»"));
        assert!(correction.text.contains('—'));
        assert!(correction.edits.iter().any(|e| e.rule_id == "RU_QUOTES"));
        assert!(correction.edits.iter().any(|e| e.rule_id == "EM_DASH"));
    }

    #[test]
    fn strict_mode_collapses_newlines() {
        let engine = CorrectionEngine::new(FixedProvider::empty());

        let correction = engine
            .correct("Текст \"в кавычках\".\n\n\n\nНовая строка", Mode::Strict)
            .unwrap();
        assert!(correction.text.contains("«в кавычках»"));
        assert!(!correction.text.contains("\n\n\n"));
    }

    #[test]
    fn date_reference_survives_legal_mode() {
        let engine = CorrectionEngine::new(FixedProvider::empty());

        let correction = engine.correct("Дата: 01.01.2026 г.", Mode::Legal).unwrap();
        assert!(correction.text.contains("01.01.2026"));
    }

    #[test]
    fn deterministic_for_same_input() {
        let engine = CorrectionEngine::new(FixedProvider::empty());
        let text = "Тест \"кавычки\" и дефис-тире... 50 %";

        let first = engine.correct(text, Mode::Legal).unwrap();
        let second = engine.correct(text, Mode::Legal).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.edits, second.edits);
    }

    #[test]
    fn provider_edit_order_does_not_matter() {
        let provider = FixedProvider::new(vec![
            edit(6, 5, "world", "Earth"),
            edit(0, 5, "Hello", "Hi"),
        ]);
        let engine = CorrectionEngine::new(provider);

        let correction = engine.correct("Hello world", Mode::Base).unwrap();
        assert_eq!(correction.text, "Hi Earth");
    }

    #[test]
    fn provider_failure_is_soft() {
        let failing = CorrectionEngine::new(FailingProvider);
        let silent = CorrectionEngine::new(FixedProvider::empty());
        let text = "Текст \"в кавычках\" и дефис-тире";

        let with_failure = failing.correct(text, Mode::Legal).unwrap();
        let rules_only = silent.correct(text, Mode::Legal).unwrap();
        assert_eq!(with_failure.text, rules_only.text);
        assert_eq!(with_failure.edits, rules_only.edits);
    }

    #[test]
    fn empty_and_whitespace_input() {
        let engine = CorrectionEngine::new(FixedProvider::empty());

        for input in ["", "   ", " \n\t "] {
            let correction = engine.correct(input, Mode::Legal).unwrap();
            assert_eq!(correction.text, "");
            assert!(correction.edits.is_empty());
        }

        let options = CorrectOptions {
            typography: true,
            diff: true,
        };
        let correction = engine
            .correct_with_options("  ", Mode::Legal, &options)
            .unwrap();
        assert_eq!(correction.diff.as_deref(), Some(""));
    }

    #[test]
    fn over_long_input_is_rejected() {
        let config = EngineConfig {
            max_text_len: 10,
            ..EngineConfig::default()
        };
        let engine = CorrectionEngine::with_config(FixedProvider::empty(), config);

        let result = engine.correct("одиннадцать символов и больше", Mode::Legal);
        assert!(matches!(result, Err(CorrectError::TooLong { max: 10, .. })));
    }

    #[test]
    fn typography_can_be_disabled() {
        let engine = CorrectionEngine::new(FixedProvider::empty());
        let options = CorrectOptions {
            typography: false,
            diff: false,
        };

        let correction = engine
            .correct_with_options("Текст с ... точками", Mode::Base, &options)
            .unwrap();
        assert!(correction.text.contains("..."));

        let with_typography = engine.correct("Текст с ... точками", Mode::Base).unwrap();
        assert!(with_typography.text.contains('…'));
    }

    #[test]
    fn diff_is_returned_on_request() {
        let engine = CorrectionEngine::new(FixedProvider::empty());
        let options = CorrectOptions {
            typography: true,
            diff: true,
        };

        let correction = engine
            .correct_with_options("Он сказал \"привет\"", Mode::Legal, &options)
            .unwrap();
        let diff = correction.diff.unwrap();
        assert!(diff.contains("<mark"));
        assert!(correction.text.contains('«'));
    }

    #[test]
    fn default_mode_comes_from_config() {
        let config = EngineConfig {
            default_mode: Mode::Base,
            ..EngineConfig::default()
        };
        let engine = CorrectionEngine::with_config(FixedProvider::empty(), config);

        // Base tier leaves quotes alone.
        let correction = engine.correct_default("Текст \"в кавычках\"").unwrap();
        assert!(!correction.text.contains('«'));
    }

    #[test]
    fn mode_parses_and_displays() {
        assert_eq!("legal".parse::<Mode>().unwrap(), Mode::Legal);
        assert_eq!(Mode::Strict.to_string(), "strict");
        assert!(matches!(
            "shouty".parse::<Mode>(),
            Err(CorrectError::UnknownMode(_))
        ));
        assert!(Mode::Base < Mode::Legal && Mode::Legal < Mode::Strict);
    }
}
