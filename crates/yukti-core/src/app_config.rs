use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings read once at startup.
///
/// Provider credentials are optional here; each component checks for the
/// ones it needs when it is constructed.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub styles_path: Option<PathBuf>,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub aws_region: String,
    pub bedrock_api_key: Option<String>,
    pub bedrock_model_id: String,
    pub bedrock_base_url: String,
    pub translate_api_url: String,
    pub translate_api_key: Option<String>,
    pub instagram_access_token: Option<String>,
    pub instagram_account_id: Option<String>,
    pub instagram_api_version: String,
    pub instagram_graph_base_url: String,
    pub instagram_status_polls: u32,
    pub instagram_poll_backoff_ms: u64,
    pub linkedin_access_token: Option<String>,
    pub twitter_bearer_token: Option<String>,
    pub youtube_access_token: Option<String>,
    pub youtube_api_key: Option<String>,
    pub youtube_max_results: u32,
    pub max_upload_bytes: u64,
    pub upload_dir: PathBuf,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("styles_path", &self.styles_path)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("aws_region", &self.aws_region)
            .field("bedrock_api_key", &redact(self.bedrock_api_key.as_ref()))
            .field("bedrock_model_id", &self.bedrock_model_id)
            .field("bedrock_base_url", &self.bedrock_base_url)
            .field("translate_api_url", &self.translate_api_url)
            .field(
                "translate_api_key",
                &redact(self.translate_api_key.as_ref()),
            )
            .field(
                "instagram_access_token",
                &redact(self.instagram_access_token.as_ref()),
            )
            .field("instagram_account_id", &self.instagram_account_id)
            .field("instagram_api_version", &self.instagram_api_version)
            .field("instagram_graph_base_url", &self.instagram_graph_base_url)
            .field("instagram_status_polls", &self.instagram_status_polls)
            .field("instagram_poll_backoff_ms", &self.instagram_poll_backoff_ms)
            .field(
                "linkedin_access_token",
                &redact(self.linkedin_access_token.as_ref()),
            )
            .field(
                "twitter_bearer_token",
                &redact(self.twitter_bearer_token.as_ref()),
            )
            .field(
                "youtube_access_token",
                &redact(self.youtube_access_token.as_ref()),
            )
            .field("youtube_api_key", &redact(self.youtube_api_key.as_ref()))
            .field("youtube_max_results", &self.youtube_max_results)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}
