//! Tweets through the X API v2.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use yukti_core::{AppConfig, Platform};

use crate::error::PublishError;
use crate::outcome::{FailureKind, PublishFailure, PublishOutcome, PublishedPost};
use crate::publisher::{
    check_credentials, credential, endpoint, http_client, parse_base_url, Publisher,
};

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// Character limit of a standard post.
pub const MAX_TWEET_CHARS: usize = 280;

const PLATFORM: &str = "twitter";

#[derive(Deserialize)]
struct TweetResponse {
    data: Option<TweetData>,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

pub struct TwitterPublisher {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl TwitterPublisher {
    /// # Errors
    ///
    /// Returns [`PublishError`] if the HTTP client cannot be built or
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        bearer_token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            client: http_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            bearer_token: credential(bearer_token),
        })
    }

    /// # Errors
    ///
    /// See [`TwitterPublisher::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PublishError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            config.twitter_bearer_token.as_deref(),
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    async fn tweet(
        &self,
        content: &str,
        media: Option<&Path>,
    ) -> Result<PublishedPost, PublishFailure> {
        let fail = |kind, detail: String| PublishFailure::new(PLATFORM, kind, detail);

        let token = self.bearer_token.as_deref().ok_or_else(|| {
            fail(FailureKind::MissingCredentials, "TWITTER_BEARER_TOKEN is not set".to_string())
        })?;
        if media.is_some() {
            return Err(fail(
                FailureKind::UnsupportedMedia,
                "media uploads are not supported for X posts".to_string(),
            ));
        }
        let chars = content.chars().count();
        if chars > MAX_TWEET_CHARS {
            return Err(fail(
                FailureKind::ContentRejected,
                format!("post is {chars} characters, limit is {MAX_TWEET_CHARS}"),
            ));
        }

        let response = self
            .client
            .post(endpoint(&self.base_url, &["2", "tweets"]))
            .bearer_auth(token)
            .json(&serde_json::json!({ "text": content }))
            .send()
            .await
            .map_err(|e| fail(FailureKind::Transport, e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let failure = fail(
                FailureKind::ProviderError,
                format!("tweets endpoint returned HTTP {}", status.as_u16()),
            );
            return Err(match serde_json::from_str(&text) {
                Ok(body) => failure.with_response(body),
                Err(_) => failure,
            });
        }

        let parsed: TweetResponse = serde_json::from_str(&text)
            .map_err(|e| {
                fail(
                    FailureKind::ProviderError,
                    format!("unexpected tweets response: {e}"),
                )
            })?;
        let post_id = parsed
            .data
            .map(|d| d.id)
            .ok_or_else(|| {
                fail(
                    FailureKind::MissingPostId,
                    "no post id received from X API".to_string(),
                )
            })?;

        Ok(PublishedPost {
            platform: Platform::Twitter,
            permalink: Some(format!("https://x.com/i/web/status/{post_id}")),
            post_id,
        })
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn authenticate(&self) -> bool {
        let Some(token) = self.bearer_token.as_deref() else {
            tracing::warn!(platform = PLATFORM, "no bearer token configured");
            return false;
        };
        let request = self
            .client
            .get(endpoint(&self.base_url, &["2", "users", "me"]))
            .bearer_auth(token);
        check_credentials(Platform::Twitter, request).await
    }

    async fn publish(&self, content: &str, media: Option<&Path>) -> PublishOutcome {
        match self.tweet(content, media).await {
            Ok(post) => {
                tracing::info!(platform = PLATFORM, post_id = %post.post_id, "tweet published");
                PublishOutcome::Published(post)
            }
            Err(failure) => {
                tracing::warn!(
                    platform = PLATFORM,
                    kind = %failure.kind,
                    detail = %failure.detail,
                    "tweet failed",
                );
                PublishOutcome::Failed(failure)
            }
        }
    }

    fn validate_media(&self, _path: &Path) -> bool {
        false
    }
}
