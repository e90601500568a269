//! Sources of suggested corrections.
//!
//! A provider inspects a text and proposes [`TextEdit`]s against it. The
//! engine treats provider failures as soft: a provider that cannot answer
//! contributes zero edits and the deterministic rule pipeline still runs.
use thiserror::Error;

use crate::edit::TextEdit;

pub mod languagetool;

/// Why a provider could not produce suggestions.
///
/// Display strings are fixed and safe to show to end users; transport and
/// service detail is logged at the adapter, never carried in the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The checker service could not be reached.
    #[error("grammar checker is not reachable")]
    Unavailable,
    /// The checker did not answer within the configured timeout.
    #[error("grammar checker timed out")]
    Timeout,
    /// The checker rejected our credentials.
    #[error("grammar checker rejected the request credentials")]
    AuthFailed,
    /// The checker is rate limiting us.
    #[error("grammar checker is rate limiting requests")]
    RateLimited,
    /// The checker answered with something we could not interpret.
    #[error("grammar checker returned an unexpected response")]
    Protocol,
}

/// Inspects text and proposes edits against it.
pub trait CorrectionProvider {
    /// Returns suggested edits for `text`.
    ///
    /// `text` is already normalized. Every returned edit must carry a
    /// non-empty replacement and offsets valid against `text`; ordering is
    /// not required, the engine sorts and resolves conflicts.
    fn check(&self, text: &str) -> Result<Vec<TextEdit>, ProviderError>;
}

/// Provider returning a fixed edit list regardless of input.
///
/// Makes pipeline behavior deterministic and network-independent in tests.
#[derive(Debug, Clone, Default)]
pub struct FixedProvider {
    edits: Vec<TextEdit>,
}

impl FixedProvider {
    /// Creates a provider that always suggests `edits`.
    pub fn new(edits: Vec<TextEdit>) -> FixedProvider {
        FixedProvider { edits }
    }

    /// Creates a provider that never suggests anything.
    pub fn empty() -> FixedProvider {
        FixedProvider { edits: vec![] }
    }
}

impl CorrectionProvider for FixedProvider {
    fn check(&self, _text: &str) -> Result<Vec<TextEdit>, ProviderError> {
        Ok(self.edits.clone())
    }
}
