//! Best-effort translation of generated copy.
//!
//! Translation never blocks content: any backend failure yields the original
//! text tagged as [`Translation::Degraded`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use yukti_core::AppConfig;

use crate::error::TranslateError;

/// Generated copy is always written in English.
pub const SOURCE_LANGUAGE: &str = "en";

/// Outcome of a translation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Target was English or empty; no call was made.
    Passthrough(String),
    Translated(String),
    /// The backend failed; `text` is the untranslated original.
    Degraded { text: String, reason: String },
}

impl Translation {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Translation::Passthrough(text)
            | Translation::Translated(text)
            | Translation::Degraded { text, .. } => text,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Translation::Degraded { .. })
    }
}

/// Returns `true` when `target` names a language other than the source.
#[must_use]
pub fn needs_translation(target: Option<&str>) -> bool {
    target
        .map(str::trim)
        .is_some_and(|t| !t.is_empty() && !t.eq_ignore_ascii_case(SOURCE_LANGUAGE))
}

/// A machine translation service.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError>;
}

/// Applies the passthrough and degrade policy around a backend.
#[derive(Clone)]
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
}

impl Translator {
    #[must_use]
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    pub async fn translate(&self, text: &str, target: &str) -> Translation {
        if !needs_translation(Some(target)) {
            return Translation::Passthrough(text.to_string());
        }
        let target = target.trim().to_lowercase();

        match self.backend.translate(text, SOURCE_LANGUAGE, &target).await {
            Ok(translated) => Translation::Translated(translated),
            Err(e) => {
                tracing::warn!(
                    target_language = %target,
                    error = %e,
                    "translation failed, keeping original text",
                );
                Translation::Degraded {
                    text: text.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct TranslateClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl TranslateClient {
    /// # Errors
    ///
    /// Returns [`TranslateError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`TranslateError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("translate"))
            .map_err(|e| TranslateError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.map(str::to_owned),
        })
    }

    /// # Errors
    ///
    /// See [`TranslateClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, TranslateError> {
        Self::with_base_url(
            &config.translate_api_url,
            config.translate_api_key.as_deref(),
            config.http_timeout_secs,
            &config.user_agent,
        )
    }
}

#[async_trait]
impl TranslationBackend for TranslateClient {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let request = TranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse = response.json().await?;
        if let Some(message) = parsed.error {
            return Err(TranslateError::Api(message));
        }
        parsed.translated_text.ok_or(TranslateError::MissingText)
    }
}
