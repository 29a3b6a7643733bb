use thiserror::Error;

/// Errors from the hosted language model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("missing credential: {0} is not set")]
    MissingApiKey(&'static str),

    #[error("model returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("model response had no completion")]
    MissingCompletion,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// A failed generation for one platform.
///
/// The `Display` form is the message shown in place of the post.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("campaign topic must not be empty")]
    EmptyTopic,

    #[error("Error generating {platform} content: {source}")]
    Model {
        platform: String,
        #[source]
        source: ModelError,
    },

    #[error("Error generating {platform} content: model returned an empty completion")]
    EmptyCompletion { platform: String },
}

/// Errors from the translation backend. Never surfaced past [`crate::Translator`].
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation API returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("translation API error: {0}")]
    Api(String),

    #[error("translation response had no translated text")]
    MissingText,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
