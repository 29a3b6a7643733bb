//! Instagram publishing through the two-phase Graph API flow.
//!
//! `publish` walks credentials check, media check, container creation,
//! container status polling and finally `media_publish`. The first failing
//! step ends the attempt with a tagged [`PublishFailure`].

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::Value;

use yukti_core::{AppConfig, Platform};

use crate::error::PublishError;
use crate::media::extension_of;
use crate::outcome::{FailureKind, ProviderError, PublishFailure, PublishOutcome, PublishedPost};
use crate::publisher::{
    check_credentials, credential, endpoint, http_client, parse_base_url, Publisher,
};
use crate::retry::backoff_delay;

const PLATFORM: &str = "instagram";
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const PERMALINK_BASE: &str = "https://www.instagram.com/p";

/// Processing state of an uploaded media container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    InProgress,
    Finished,
    Error,
    Expired,
    Published,
    Unknown(String),
}

impl ContainerStatus {
    fn parse(code: &str) -> Self {
        match code {
            "IN_PROGRESS" => ContainerStatus::InProgress,
            "FINISHED" => ContainerStatus::Finished,
            "ERROR" => ContainerStatus::Error,
            "EXPIRED" => ContainerStatus::Expired,
            "PUBLISHED" => ContainerStatus::Published,
            other => ContainerStatus::Unknown(other.to_string()),
        }
    }

    fn code(&self) -> &str {
        match self {
            ContainerStatus::InProgress => "IN_PROGRESS",
            ContainerStatus::Finished => "FINISHED",
            ContainerStatus::Error => "ERROR",
            ContainerStatus::Expired => "EXPIRED",
            ContainerStatus::Published => "PUBLISHED",
            ContainerStatus::Unknown(code) => code,
        }
    }
}

/// A server-side container and its last observed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContainer {
    pub creation_id: String,
    pub status: ContainerStatus,
    /// Free-form `status` text returned alongside `status_code`.
    pub status_detail: Option<String>,
}

/// Result of the access-token debug call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub app_id: Option<String>,
    /// Unix seconds; `0` or absent means the token never expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Business account details for the configured access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub token: TokenInfo,
    pub business_account_id: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub profile_picture_url: Option<String>,
}

#[derive(Deserialize)]
struct AccountDetails {
    username: Option<String>,
    name: Option<String>,
    profile_picture_url: Option<String>,
}

struct Credentials<'a> {
    token: &'a str,
    account_id: &'a str,
}

pub struct InstagramPublisher {
    client: Client,
    base_url: Url,
    api_version: String,
    access_token: Option<String>,
    account_id: Option<String>,
    status_polls: u32,
    poll_backoff_ms: u64,
}

impl InstagramPublisher {
    /// Creates a publisher against `base_url` with five status checks one second apart.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PublishError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        api_version: &str,
        access_token: Option<&str>,
        account_id: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            client: http_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            api_version: api_version.to_string(),
            access_token: credential(access_token),
            account_id: credential(account_id),
            status_polls: 5,
            poll_backoff_ms: 1_000,
        })
    }

    /// Sets how many status checks are made and the base back-off between them.
    #[must_use]
    pub fn with_polling(mut self, status_polls: u32, poll_backoff_ms: u64) -> Self {
        self.status_polls = status_polls.max(1);
        self.poll_backoff_ms = poll_backoff_ms;
        self
    }

    /// # Errors
    ///
    /// See [`InstagramPublisher::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PublishError> {
        Ok(Self::with_base_url(
            &config.instagram_graph_base_url,
            &config.instagram_api_version,
            config.instagram_access_token.as_deref(),
            config.instagram_account_id.as_deref(),
            config.http_timeout_secs,
            &config.user_agent,
        )?
        .with_polling(config.instagram_status_polls, config.instagram_poll_backoff_ms))
    }

    fn credentials(&self) -> Result<Credentials<'_>, PublishFailure> {
        match (self.access_token.as_deref(), self.account_id.as_deref()) {
            (Some(token), Some(account_id)) => Ok(Credentials { token, account_id }),
            (token, account_id) => {
                let set = |present: bool| if present { "Set" } else { "Missing" };
                Err(PublishFailure::new(
                    PLATFORM,
                    FailureKind::MissingCredentials,
                    format!(
                        "Account ID: {}, Access Token: {}",
                        set(account_id.is_some()),
                        set(token.is_some())
                    ),
                ))
            }
        }
    }

    fn check_media<'m>(media: Option<&'m Path>) -> Result<&'m Path, PublishFailure> {
        let path = media.ok_or_else(|| {
            PublishFailure::new(
                PLATFORM,
                FailureKind::MissingMedia,
                "Instagram posts require an image",
            )
        })?;
        if !path.exists() {
            return Err(PublishFailure::new(
                PLATFORM,
                FailureKind::MediaNotFound,
                format!("media file not found: {}", path.display()),
            ));
        }
        let ext = extension_of(path).unwrap_or_default();
        if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            let message = "Invalid file type. Only JPG and PNG images are supported.";
            return Err(PublishFailure::new(PLATFORM, FailureKind::InvalidMedia, message)
                .with_provider_error(ProviderError::new(message, "FileTypeError", 400)));
        }
        Ok(path)
    }

    fn version_endpoint(&self, segments: &[&str]) -> Url {
        let mut all = Vec::with_capacity(segments.len() + 1);
        all.push(self.api_version.as_str());
        all.extend_from_slice(segments);
        endpoint(&self.base_url, &all)
    }

    /// Sends a Graph request and returns its JSON body.
    ///
    /// Transport errors, unparseable bodies, `{"error": …}` payloads and
    /// non-2xx statuses all become failures.
    async fn send_graph(request: RequestBuilder) -> Result<Value, PublishFailure> {
        let transport = |e: reqwest::Error| {
            PublishFailure::new(PLATFORM, FailureKind::Transport, e.to_string())
                .with_provider_error(ProviderError::new(e.to_string(), "APIError", 500))
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            PublishFailure::new(
                PLATFORM,
                FailureKind::Transport,
                format!("invalid JSON from Graph API (HTTP {}): {e}", status.as_u16()),
            )
            .with_response(Value::String(text.clone()))
        })?;

        if let Some(error) = body.get("error").filter(|e| e.is_object()) {
            let provider = serde_json::from_value::<ProviderError>(error.clone())
                .unwrap_or_else(|_| ProviderError::new(error.to_string(), "APIError", 500));
            tracing::warn!(
                platform = PLATFORM,
                code = ?provider.code,
                error = %provider,
                "Graph API returned an error"
            );
            let message = provider.message.clone();
            return Err(PublishFailure::new(PLATFORM, FailureKind::ProviderError, message)
                .with_provider_error(provider)
                .with_response(body));
        }

        if !status.is_success() {
            return Err(PublishFailure::new(
                PLATFORM,
                FailureKind::ProviderError,
                format!("Graph API returned HTTP {}", status.as_u16()),
            )
            .with_response(body));
        }

        Ok(body)
    }

    async fn create_container(
        &self,
        creds: &Credentials<'_>,
        caption: &str,
        media: &Path,
    ) -> Result<String, PublishFailure> {
        let bytes = tokio::fs::read(media).await.map_err(|e| {
            PublishFailure::new(
                PLATFORM,
                FailureKind::InvalidMedia,
                format!("could not read {}: {e}", media.display()),
            )
        })?;
        let file_name = media
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = match extension_of(media).as_deref() {
            Some("png") => "image/png",
            _ => "image/jpeg",
        };
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| PublishFailure::new(PLATFORM, FailureKind::Transport, e.to_string()))?;

        let form = Form::new()
            .text("access_token", creds.token.to_string())
            .text("caption", caption.to_string())
            .part("image", part);

        let url = self.version_endpoint(&[creds.account_id, "media"]);
        let body = Self::send_graph(self.client.post(url).multipart(form)).await?;

        match body.get("id").and_then(id_text) {
            Some(id) => Ok(id),
            None => Err(PublishFailure::new(
                PLATFORM,
                FailureKind::MissingCreationId,
                "no creation id received from Instagram API",
            )
            .with_response(body)),
        }
    }

    /// Fetches the current status of a media container.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishFailure`] for transport or Graph errors.
    pub async fn container_status(
        &self,
        creation_id: &str,
    ) -> Result<MediaContainer, PublishFailure> {
        let token = self.access_token.as_deref().unwrap_or_default();
        let request = self
            .client
            .get(self.version_endpoint(&[creation_id]))
            .query(&[("fields", "status_code,status"), ("access_token", token)]);
        let body = Self::send_graph(request).await?;

        let code = body.get("status_code").and_then(Value::as_str).unwrap_or("UNKNOWN");
        Ok(MediaContainer {
            creation_id: creation_id.to_string(),
            status: ContainerStatus::parse(code),
            status_detail: body.get("status").and_then(Value::as_str).map(str::to_owned),
        })
    }

    /// Polls until the container is `FINISHED`, with bounded back-off while
    /// it is `IN_PROGRESS`.
    async fn wait_for_container(&self, creation_id: &str) -> Result<(), PublishFailure> {
        for attempt in 0..self.status_polls {
            let container = self.container_status(creation_id).await.map_err(|f| PublishFailure {
                kind: FailureKind::ProcessingFailed,
                detail: format!("Status: unavailable ({})", f.detail),
                ..f
            })?;

            tracing::debug!(
                creation_id,
                status = container.status.code(),
                attempt = attempt + 1,
                "container status"
            );

            match container.status {
                ContainerStatus::Finished => return Ok(()),
                ContainerStatus::InProgress => {
                    if attempt + 1 < self.status_polls {
                        tokio::time::sleep(backoff_delay(self.poll_backoff_ms, attempt)).await;
                    }
                }
                status => {
                    let detail = match container.status_detail {
                        Some(text) => format!("Status: {} ({text})", status.code()),
                        None => format!("Status: {}", status.code()),
                    };
                    tracing::warn!(creation_id, %detail, "container processing failed");
                    return Err(PublishFailure::new(
                        PLATFORM,
                        FailureKind::ProcessingFailed,
                        detail,
                    ));
                }
            }
        }

        Err(PublishFailure::new(
            PLATFORM,
            FailureKind::ProcessingFailed,
            format!(
                "Status: IN_PROGRESS (still processing after {} checks)",
                self.status_polls
            ),
        ))
    }

    async fn publish_container(
        &self,
        creds: &Credentials<'_>,
        creation_id: &str,
    ) -> Result<PublishedPost, PublishFailure> {
        let url = self.version_endpoint(&[creds.account_id, "media_publish"]);
        let request = self
            .client
            .post(url)
            .form(&[("access_token", creds.token), ("creation_id", creation_id)]);
        let body = Self::send_graph(request).await?;

        let post_id = body.get("id").and_then(id_text).ok_or_else(|| {
            PublishFailure::new(
                PLATFORM,
                FailureKind::MissingPostId,
                "no post id received from Instagram API",
            )
            .with_response(body.clone())
        })?;

        Ok(PublishedPost {
            platform: Platform::Instagram,
            permalink: Some(format!("{PERMALINK_BASE}/{post_id}")),
            post_id,
        })
    }

    async fn run_publish(
        &self,
        caption: &str,
        media: Option<&Path>,
    ) -> Result<PublishedPost, PublishFailure> {
        let creds = self.credentials()?;
        let media = Self::check_media(media)?;
        tracing::debug!(
            platform = PLATFORM,
            media = %media.display(),
            "credentials and media checked",
        );

        let creation_id = self.create_container(&creds, caption, media).await?;
        tracing::info!(platform = PLATFORM, %creation_id, "media container created");

        self.wait_for_container(&creation_id).await?;
        tracing::debug!(platform = PLATFORM, %creation_id, "container finished processing");

        let post = self.publish_container(&creds, &creation_id).await?;
        tracing::info!(platform = PLATFORM, post_id = %post.post_id, "instagram post published");
        Ok(post)
    }

    /// Looks up token validity and the linked business account.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishFailure`] when no token is configured, a Graph call
    /// fails, or the token has no linked Instagram business account.
    pub async fn account_info(&self) -> Result<AccountInfo, PublishFailure> {
        let token = self.access_token.as_deref().ok_or_else(|| {
            PublishFailure::new(
                PLATFORM,
                FailureKind::MissingCredentials,
                "INSTAGRAM_ACCESS_TOKEN is not set",
            )
        })?;

        let debug = Self::send_graph(
            self.client
                .get(endpoint(&self.base_url, &["debug_token"]))
                .query(&[("input_token", token), ("access_token", token)]),
        )
        .await?;
        let token_info = debug
            .get("data")
            .cloned()
            .and_then(|data| serde_json::from_value::<TokenInfo>(data).ok())
            .ok_or_else(|| {
                PublishFailure::new(
                    PLATFORM,
                    FailureKind::ProviderError,
                    "token debug response had no data",
                )
                .with_response(debug.clone())
            })?;

        let me = Self::send_graph(
            self.client
                .get(self.version_endpoint(&["me"]))
                .query(&[("fields", "instagram_business_account"), ("access_token", token)]),
        )
        .await?;
        let business_account_id = me
            .get("instagram_business_account")
            .and_then(|account| account.get("id"))
            .and_then(id_text)
            .ok_or_else(|| {
                PublishFailure::new(
                    PLATFORM,
                    FailureKind::ProviderError,
                    "no Instagram business account is linked to this token",
                )
                .with_response(me.clone())
            })?;

        let details = Self::send_graph(
            self.client
                .get(self.version_endpoint(&[business_account_id.as_str()]))
                .query(&[("fields", "username,name,profile_picture_url"), ("access_token", token)]),
        )
        .await?;
        let details: AccountDetails = serde_json::from_value(details.clone()).map_err(|e| {
            PublishFailure::new(PLATFORM, FailureKind::ProviderError, e.to_string())
                .with_response(details)
        })?;

        Ok(AccountInfo {
            token: token_info,
            business_account_id,
            username: details.username,
            name: details.name,
            profile_picture_url: details.profile_picture_url,
        })
    }
}

/// Graph ids arrive as strings but are occasionally numeric.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn authenticate(&self) -> bool {
        let Some(token) = self.access_token.as_deref() else {
            tracing::warn!(platform = PLATFORM, "no access token configured");
            return false;
        };
        let request = self
            .client
            .get(self.version_endpoint(&["me"]))
            .query(&[("access_token", token)]);
        check_credentials(Platform::Instagram, request).await
    }

    async fn publish(&self, content: &str, media: Option<&Path>) -> PublishOutcome {
        match self.run_publish(content, media).await {
            Ok(post) => PublishOutcome::Published(post),
            Err(failure) => {
                tracing::warn!(
                    platform = PLATFORM,
                    kind = %failure.kind,
                    detail = %failure.detail,
                    "instagram publish failed",
                );
                PublishOutcome::Failed(failure)
            }
        }
    }

    fn validate_media(&self, path: &Path) -> bool {
        path.is_file()
            && extension_of(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    }
}
