//! Remote LanguageTool provider.
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{CorrectionProvider, ProviderError};
use crate::edit::{char_slice, TextEdit};

/// Connection settings for the LanguageTool HTTP API.
#[derive(Clone, Debug)]
pub struct LanguageToolConfig {
    /// Base URL of the service, without the `/v2/check` suffix.
    pub endpoint: String,
    /// Language tag sent with every check request.
    pub language: String,
    /// Hard deadline for one check call.
    pub timeout: Duration,
}

impl Default for LanguageToolConfig {
    fn default() -> LanguageToolConfig {
        LanguageToolConfig {
            endpoint: "https://api.languagetool.org".into(),
            language: "ru-RU".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Grammar and spelling suggestions from a LanguageTool server.
///
/// The HTTP client is built lazily on first use and reused afterwards. If
/// building it fails, the failure is sticky: later calls report
/// [`ProviderError::Unavailable`] without retrying, so a broken environment
/// does not pay the construction cost on every request.
#[derive(Debug, Default)]
pub struct LanguageToolProvider {
    config: LanguageToolConfig,
    client: OnceCell<Option<Client>>,
}

impl LanguageToolProvider {
    /// Creates a provider talking to the given server.
    pub fn new(config: LanguageToolConfig) -> LanguageToolProvider {
        LanguageToolProvider {
            config,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client, ProviderError> {
        let client = self.client.get_or_init(|| {
            match Client::builder().timeout(self.config.timeout).build() {
                Ok(client) => Some(client),
                Err(e) => {
                    log::error!("failed to build HTTP client for LanguageTool: {}", e);
                    None
                }
            }
        });
        client.as_ref().ok_or(ProviderError::Unavailable)
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Debug, Deserialize)]
struct Match {
    offset: usize,
    length: usize,
    #[serde(default)]
    message: String,
    #[serde(default)]
    replacements: Vec<Replacement>,
    rule: Option<Rule>,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct Rule {
    id: String,
}

/// Turns a check response into edits against `text`.
///
/// Matches without replacements carry nothing actionable and are dropped.
/// LanguageTool offsets are UTF-16 code units; for BMP text (all of
/// Russian) these coincide with character counts.
fn edits_from_response(text: &str, response: CheckResponse) -> Vec<TextEdit> {
    response
        .matches
        .into_iter()
        .filter_map(|m| {
            let replacement = m.replacements.into_iter().next()?;
            if replacement.value.is_empty() {
                return None;
            }
            let original = match char_slice(text, m.offset, m.length) {
                Some(s) => s.to_string(),
                None => {
                    log::warn!(
                        "discarding match outside text: offset {} length {}",
                        m.offset,
                        m.length
                    );
                    return None;
                }
            };
            Some(TextEdit::new(
                m.offset,
                m.length,
                original,
                replacement.value,
                m.message,
                m.rule.map(|r| r.id).unwrap_or_default(),
            ))
        })
        .collect()
}

impl CorrectionProvider for LanguageToolProvider {
    fn check(&self, text: &str) -> Result<Vec<TextEdit>, ProviderError> {
        let client = self.client()?;
        let url = format!("{}/v2/check", self.config.endpoint.trim_end_matches('/'));

        log::debug!("checking {} chars against {}", text.chars().count(), url);

        let response = client
            .post(&url)
            .form(&[("text", text), ("language", self.config.language.as_str())])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    log::warn!("LanguageTool request timed out after {:?}", self.config.timeout);
                    ProviderError::Timeout
                } else {
                    log::warn!("LanguageTool request failed: {}", e);
                    ProviderError::Unavailable
                }
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                log::warn!("LanguageTool rejected credentials: {}", response.status());
                return Err(ProviderError::AuthFailed);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                log::warn!("LanguageTool rate limited the request");
                return Err(ProviderError::RateLimited);
            }
            status => {
                log::warn!("LanguageTool returned status {}", status);
                return Err(ProviderError::Protocol);
            }
        }

        let body: CheckResponse = response.json().map_err(|e| {
            log::warn!("undecodable LanguageTool response: {}", e);
            ProviderError::Protocol
        })?;

        let edits = edits_from_response(text, body);
        log::debug!("LanguageTool suggested {} edits", edits.len());
        Ok(edits)
    }
}
