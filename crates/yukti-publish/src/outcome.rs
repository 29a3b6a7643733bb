use std::fmt;

use serde::Deserialize;

use yukti_core::Platform;

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Published(PublishedPost),
    Failed(PublishFailure),
}

impl PublishOutcome {
    #[must_use]
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published(_))
    }

    #[must_use]
    pub fn failure(&self) -> Option<&PublishFailure> {
        match self {
            PublishOutcome::Failed(failure) => Some(failure),
            PublishOutcome::Published(_) => None,
        }
    }
}

impl From<PublishFailure> for PublishOutcome {
    fn from(failure: PublishFailure) -> Self {
        PublishOutcome::Failed(failure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub platform: Platform,
    pub post_id: String,
    pub permalink: Option<String>,
}

/// Short failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    MissingCredentials,
    MissingMedia,
    MediaNotFound,
    InvalidMedia,
    UnsupportedMedia,
    ContentRejected,
    Transport,
    ProviderError,
    MissingCreationId,
    ProcessingFailed,
    MissingPostId,
    UnsupportedPlatform,
    NotImplemented,
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::MissingCredentials => "missing credentials",
            FailureKind::MissingMedia => "media required",
            FailureKind::MediaNotFound => "media file not found",
            FailureKind::InvalidMedia => "invalid media",
            FailureKind::UnsupportedMedia => "media not supported",
            FailureKind::ContentRejected => "content rejected",
            FailureKind::Transport => "request failed",
            FailureKind::ProviderError => "provider error",
            FailureKind::MissingCreationId => "failed to create media container",
            FailureKind::ProcessingFailed => "media processing failed",
            FailureKind::MissingPostId => "failed to publish media",
            FailureKind::UnsupportedPlatform => "unsupported platform",
            FailureKind::NotImplemented => "not implemented",
            FailureKind::Internal => "internal error",
        };
        f.write_str(text)
    }
}

/// The Graph-style `{"error": {"message", "type", "code"}}` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

impl ProviderError {
    #[must_use]
    pub fn new(message: impl Into<String>, error_type: &str, code: i64) -> Self {
        Self {
            message: message.into(),
            error_type: Some(error_type.to_string()),
            code: Some(code),
        }
    }

    /// Operator guidance for well-known Graph API error codes.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self.code? {
            190 => Some(
                "access token is invalid or expired; \
                 generate a new one in the Meta developer dashboard",
            ),
            10 | 24 | 200 => Some(
                "access token lacks required permissions: \
                 instagram_basic, instagram_content_publish",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(error_type) = &self.error_type {
            write!(f, " ({error_type}")?;
            if let Some(code) = self.code {
                write!(f, ", code {code}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// A failed publish with everything needed to diagnose it.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishFailure {
    /// Platform key as requested; may be outside the catalog.
    pub platform: String,
    pub kind: FailureKind,
    pub detail: String,
    pub provider_error: Option<ProviderError>,
    /// Raw provider response body, when one was received.
    pub api_response: Option<serde_json::Value>,
}

impl PublishFailure {
    pub fn new(platform: impl Into<String>, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            kind,
            detail: detail.into(),
            provider_error: None,
            api_response: None,
        }
    }

    #[must_use]
    pub fn with_provider_error(mut self, error: ProviderError) -> Self {
        self.provider_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_response(mut self, body: serde_json::Value) -> Self {
        self.api_response = Some(body);
        self
    }
}

impl fmt::Display for PublishFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)?;
        if let Some(hint) = self.provider_error.as_ref().and_then(ProviderError::hint) {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_deserializes_graph_shape() {
        let body = serde_json::json!({
            "message": "Invalid OAuth access token.",
            "type": "OAuthException",
            "code": 190,
            "fbtrace_id": "abc"
        });
        let error: ProviderError = serde_json::from_value(body).unwrap();
        assert_eq!(error.error_type.as_deref(), Some("OAuthException"));
        assert_eq!(error.code, Some(190));
        assert!(error.hint().unwrap().contains("invalid or expired"));
    }

    #[test]
    fn permission_codes_share_a_hint() {
        for code in [10, 24, 200] {
            let error = ProviderError::new("denied", "OAuthException", code);
            assert!(error.hint().unwrap().contains("instagram_content_publish"));
        }
        assert!(ProviderError::new("boom", "APIError", 500).hint().is_none());
    }

    #[test]
    fn failure_display_includes_kind_detail_and_hint() {
        let failure = PublishFailure::new(
            "instagram",
            FailureKind::ProviderError,
            "Invalid OAuth access token.",
        )
        .with_provider_error(ProviderError::new(
            "Invalid OAuth access token.",
            "OAuthException",
            190,
        ));
        let rendered = failure.to_string();
        assert!(rendered.starts_with("provider error: Invalid OAuth access token."));
        assert!(rendered.contains("invalid or expired"));
    }

    #[test]
    fn unsupported_platform_reads_plainly() {
        let failure = PublishFailure::new("myspace", FailureKind::UnsupportedPlatform, "myspace");
        assert_eq!(failure.to_string(), "unsupported platform: myspace");
    }
}
