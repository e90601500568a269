/*! Russian text correction and typography.

Corrects Russian-language text in three stages: suggested edits from an
external grammar checker (LanguageTool), deterministic rewrite rules for
legal-document formatting (quotes, dashes, whitespace), and a typography
pass (ellipsis, non-breaking spaces before units and references).

The [`engine::CorrectionEngine`] orchestrates the pipeline and reconciles
possibly-overlapping edits from the different sources into one reported
edit list. Providers are injected through the
[`provider::CorrectionProvider`] trait, so the engine can run against the
remote checker, a test double, or nothing at all.

```no_run
use pravka::engine::{CorrectionEngine, Mode};
use pravka::provider::languagetool::LanguageToolProvider;

let engine = CorrectionEngine::new(LanguageToolProvider::default());
let correction = engine.correct("Он сказал \"привет\"", Mode::Legal).unwrap();
assert_eq!(correction.text, "Он сказал «привет»");
```
*/

#![warn(missing_docs)]

pub mod diff;
pub mod edit;
pub mod engine;
pub mod provider;
pub mod rules;

pub(crate) mod constants;
