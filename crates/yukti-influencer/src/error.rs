use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfluencerError {
    #[error("YOUTUBE_API_KEY not provided")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
