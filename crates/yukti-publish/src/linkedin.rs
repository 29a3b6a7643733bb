//! LinkedIn text sharing through the UGC posts API.

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

pub const DEFAULT_BASE_URL: &str = "https://api.linkedin.com";

const PLATFORM: &str = "linkedin";

#[derive(Deserialize)]
struct Profile {
    id: String,
}

pub struct LinkedInPublisher {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl LinkedInPublisher {
    /// # Errors
    ///
    /// Returns [`PublishError`] if the HTTP client cannot be built or
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        access_token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            client: http_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            access_token: credential(access_token),
        })
    }

    /// # Errors
    ///
    /// See [`LinkedInPublisher::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PublishError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            config.linkedin_access_token.as_deref(),
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    fn failure(kind: FailureKind, detail: impl Into<String>) -> PublishFailure {
        PublishFailure::new(PLATFORM, kind, detail)
    }

    async fn person_id(&self, token: &str) -> Result<String, PublishFailure> {
        let response = self
            .client
            .get(endpoint(&self.base_url, &["v2", "me"]))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Self::failure(FailureKind::Transport, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::failure(
                FailureKind::ProviderError,
                format!("profile lookup returned HTTP {}: {body}", status.as_u16()),
            ));
        }
        let profile: Profile = response
            .json()
            .await
            .map_err(|e| {
                Self::failure(
                    FailureKind::ProviderError,
                    format!("unexpected profile response: {e}"),
                )
            })?;
        Ok(profile.id)
    }

    async fn share(
        &self,
        content: &str,
        media: Option<&Path>,
    ) -> Result<PublishedPost, PublishFailure> {
        let token = self.access_token.as_deref().ok_or_else(|| {
            Self::failure(FailureKind::MissingCredentials, "LINKEDIN_ACCESS_TOKEN is not set")
        })?;
        if media.is_some() {
            return Err(Self::failure(
                FailureKind::UnsupportedMedia,
                "LinkedIn sharing supports text posts only",
            ));
        }

        let person = self.person_id(token).await?;
        let body = serde_json::json!({
            "author": format!("urn:li:person:{person}"),
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": content },
                    "shareMediaCategory": "NONE"
                }
            },
            "visibility": { "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC" }
        });

        let response = self
            .client
            .post(endpoint(&self.base_url, &["v2", "ugcPosts"]))
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::failure(FailureKind::Transport, e.to_string()))?;

        let status = response.status();
        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = response.text().await.unwrap_or_default();
        let parsed: Option<serde_json::Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let failure = Self::failure(
                FailureKind::ProviderError,
                format!("ugcPosts returned HTTP {}", status.as_u16()),
            );
            return Err(match parsed {
                Some(body) => failure.with_response(body),
                None => failure,
            });
        }

        let post_id = header_id
            .or_else(|| {
                parsed
                    .as_ref()
                    .and_then(|b| b.get("id"))
                    .and_then(|id| id.as_str())
                    .map(str::to_owned)
            })
            .ok_or_else(|| {
                Self::failure(
                    FailureKind::MissingPostId,
                    "no post id received from LinkedIn API",
                )
            })?;

        Ok(PublishedPost {
            platform: Platform::LinkedIn,
            permalink: Some(format!("https://www.linkedin.com/feed/update/{post_id}")),
            post_id,
        })
    }
}

#[async_trait]
impl Publisher for LinkedInPublisher {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn authenticate(&self) -> bool {
        let Some(token) = self.access_token.as_deref() else {
            tracing::warn!(platform = PLATFORM, "no access token configured");
            return false;
        };
        let request = self
            .client
            .get(endpoint(&self.base_url, &["v2", "me"]))
            .bearer_auth(token);
        check_credentials(Platform::LinkedIn, request).await
    }

    async fn publish(&self, content: &str, media: Option<&Path>) -> PublishOutcome {
        match self.share(content, media).await {
            Ok(post) => {
                tracing::info!(
                    platform = PLATFORM,
                    post_id = %post.post_id,
                    "linkedin post published",
                );
                PublishOutcome::Published(post)
            }
            Err(failure) => {
                tracing::warn!(
                    platform = PLATFORM,
                    kind = %failure.kind,
                    detail = %failure.detail,
                    "linkedin publish failed",
                );
                PublishOutcome::Failed(failure)
            }
        }
    }

    fn validate_media(&self, _path: &Path) -> bool {
        false
    }
}
