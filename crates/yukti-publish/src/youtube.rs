//! YouTube channel authentication. Video upload is not available.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Url};

use yukti_core::{AppConfig, Platform};

use crate::error::PublishError;
use crate::media::extension_of;
use crate::outcome::{FailureKind, PublishFailure, PublishOutcome};
use crate::publisher::{
    check_credentials, credential, endpoint, http_client, parse_base_url, Publisher,
};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

pub struct YouTubePublisher {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl YouTubePublisher {
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
    /// See [`YouTubePublisher::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PublishError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            config.youtube_access_token.as_deref(),
            config.http_timeout_secs,
            &config.user_agent,
        )
    }
}

#[async_trait]
impl Publisher for YouTubePublisher {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    async fn authenticate(&self) -> bool {
        let Some(token) = self.access_token.as_deref() else {
            tracing::warn!(platform = "youtube", "no access token configured");
            return false;
        };
        let request = self
            .client
            .get(endpoint(&self.base_url, &["youtube", "v3", "channels"]))
            .query(&[("part", "id"), ("mine", "true")])
            .bearer_auth(token);
        check_credentials(Platform::YouTube, request).await
    }

    async fn publish(&self, _content: &str, _media: Option<&Path>) -> PublishOutcome {
        PublishOutcome::Failed(PublishFailure::new(
            "youtube",
            FailureKind::NotImplemented,
            "video upload to YouTube is not available; publish the copy manually",
        ))
    }

    fn validate_media(&self, path: &Path) -> bool {
        path.is_file() && extension_of(path).as_deref() == Some("mp4")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reports_not_implemented() {
        let publisher =
            YouTubePublisher::with_base_url("http://127.0.0.1:9", Some("tok"), 1, "yukti-test")
                .unwrap();
        let outcome = publisher.publish("video description", None).await;
        assert_eq!(outcome.failure().unwrap().kind, FailureKind::NotImplemented);
    }

    #[test]
    fn only_mp4_is_valid_media() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.MP4");
        let still = dir.path().join("still.png");
        std::fs::write(&clip, b"mp4").unwrap();
        std::fs::write(&still, b"png").unwrap();

        let publisher =
            YouTubePublisher::with_base_url("http://127.0.0.1:9", None, 1, "yukti-test").unwrap();
        assert!(publisher.validate_media(&clip));
        assert!(!publisher.validate_media(&still));
    }

    #[tokio::test]
    async fn missing_token_fails_authentication() {
        let publisher =
            YouTubePublisher::with_base_url("http://127.0.0.1:9", None, 1, "yukti-test").unwrap();
        assert!(!publisher.authenticate().await);
    }
}
