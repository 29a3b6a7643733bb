use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use yukti_core::Platform;

use crate::error::PublishError;
use crate::outcome::PublishOutcome;

/// One platform's publishing capabilities.
#[async_trait]
pub trait Publisher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Checks the configured credentials against the provider.
    ///
    /// Missing credentials, transport errors and non-2xx responses are all `false`.
    async fn authenticate(&self) -> bool;

    async fn publish(&self, content: &str, media: Option<&Path>) -> PublishOutcome;

    /// Whether this platform accepts `path` as an attachment.
    fn validate_media(&self, path: &Path) -> bool;
}

/// HTTP client with the request and connect timeouts every publisher uses.
pub(crate) fn http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, PublishError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Parses `base_url`, dropping any trailing slash so paths can be appended.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, PublishError> {
    Url::parse(base_url.trim_end_matches('/')).map_err(|e| PublishError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Appends `segments` to `base`.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Trimmed, non-empty credential.
pub(crate) fn credential(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Sends `request` and reports whether it came back 2xx.
pub(crate) async fn check_credentials(
    platform: Platform,
    request: reqwest::RequestBuilder,
) -> bool {
    match request.send().await {
        Ok(response) if response.status().is_success() => {
            tracing::debug!(%platform, "authentication succeeded");
            true
        }
        Ok(response) => {
            tracing::warn!(
                %platform,
                status = response.status().as_u16(),
                "authentication rejected",
            );
            false
        }
        Err(e) => {
            tracing::warn!(%platform, error = %e, "authentication request failed");
            false
        }
    }
}
