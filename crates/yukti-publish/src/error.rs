use thiserror::Error;

/// Errors raised while constructing a publisher.
///
/// Publishing itself never returns these; see [`crate::PublishOutcome`].
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
