//! Hosted language model access.
//!
//! [`TextModel`] is the narrow seam the generator depends on; [`BedrockClient`]
//! implements it over the Bedrock `InvokeModel` text-completions endpoint
//! using a Bedrock API key as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use yukti_core::AppConfig;

use crate::error::ModelError;

/// Protocol tag sent with every text-completions request.
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Fixed sampling parameters for a completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
            top_k: 250,
            top_p: 0.999,
        }
    }
}

/// Anything that can turn a prompt into completion text.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    prompt: &'a str,
    max_tokens_to_sample: u32,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    anthropic_version: &'a str,
}

#[derive(Deserialize)]
struct InvokeResponse {
    completion: Option<String>,
}

/// Bedrock runtime client bound to a single model id.
pub struct BedrockClient {
    client: Client,
    api_key: String,
    invoke_url: Url,
}

impl BedrockClient {
    /// Creates a client for `model_id` under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ModelError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model_id: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let invalid = |reason: &str| ModelError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let mut invoke_url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        invoke_url
            .path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base"))?
            .pop_if_empty()
            .push("model")
            .push(model_id)
            .push("invoke");

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            invoke_url,
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingApiKey`] when no Bedrock API key is
    /// configured, before any network activity.
    pub fn from_config(config: &AppConfig) -> Result<Self, ModelError> {
        let api_key = config
            .bedrock_api_key
            .as_deref()
            .ok_or(ModelError::MissingApiKey("AWS_BEARER_TOKEN_BEDROCK"))?;
        Self::with_base_url(
            api_key,
            &config.bedrock_model_id,
            &config.bedrock_base_url,
            config.http_timeout_secs,
            &config.user_agent,
        )
    }
}

#[async_trait]
impl TextModel for BedrockClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String, ModelError> {
        let body = InvokeRequest {
            prompt,
            max_tokens_to_sample: params.max_tokens,
            temperature: params.temperature,
            top_k: params.top_k,
            top_p: params.top_p,
            anthropic_version: ANTHROPIC_VERSION,
        };

        tracing::debug!(url = %self.invoke_url, "invoking text model");

        let response = self
            .client
            .post(self.invoke_url.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InvokeResponse = response.json().await?;
        parsed.completion.ok_or(ModelError::MissingCompletion)
    }
}
