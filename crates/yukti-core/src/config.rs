use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `KEY=` in a .env file disables a provider.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("YUKTI_ENV", "development"))?;
    let log_level = or_default("YUKTI_LOG_LEVEL", "info");
    let styles_path = optional("YUKTI_STYLES_PATH").map(PathBuf::from);
    let http_timeout_secs = parse_u64("YUKTI_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("YUKTI_USER_AGENT", "yukti/0.1 (campaign-publisher)");

    let aws_region = or_default("AWS_REGION", "us-west-2");
    let bedrock_api_key = optional("AWS_BEARER_TOKEN_BEDROCK");
    let bedrock_model_id = or_default("BEDROCK_MODEL_ID", "anthropic.claude-v2");
    let bedrock_base_url = optional("BEDROCK_BASE_URL")
        .unwrap_or_else(|| format!("https://bedrock-runtime.{aws_region}.amazonaws.com"));

    let translate_api_url = or_default("TRANSLATE_API_URL", "https://libretranslate.com");
    let translate_api_key = optional("TRANSLATE_API_KEY");

    let instagram_access_token = optional("INSTAGRAM_ACCESS_TOKEN");
    let instagram_account_id = optional("INSTAGRAM_BUSINESS_ACCOUNT_ID");
    let instagram_api_version = or_default("INSTAGRAM_API_VERSION", "v18.0");
    let instagram_graph_base_url =
        or_default("INSTAGRAM_GRAPH_BASE_URL", "https://graph.facebook.com");
    let instagram_status_polls = parse_u32("YUKTI_INSTAGRAM_STATUS_POLLS", "5")?;
    if instagram_status_polls == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "YUKTI_INSTAGRAM_STATUS_POLLS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let instagram_poll_backoff_ms = parse_u64("YUKTI_INSTAGRAM_POLL_BACKOFF_MS", "1000")?;

    let linkedin_access_token = optional("LINKEDIN_ACCESS_TOKEN");
    let twitter_bearer_token = optional("TWITTER_BEARER_TOKEN");
    let youtube_access_token = optional("YOUTUBE_ACCESS_TOKEN");
    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let youtube_max_results = parse_u32("YUKTI_YOUTUBE_MAX_RESULTS", "6")?;

    let max_upload_bytes = parse_u64("YUKTI_MAX_UPLOAD_BYTES", "10485760")?;
    let upload_dir = PathBuf::from(or_default("YUKTI_UPLOAD_DIR", "uploads"));

    Ok(AppConfig {
        env,
        log_level,
        styles_path,
        http_timeout_secs,
        user_agent,
        aws_region,
        bedrock_api_key,
        bedrock_model_id,
        bedrock_base_url,
        translate_api_url,
        translate_api_key,
        instagram_access_token,
        instagram_account_id,
        instagram_api_version,
        instagram_graph_base_url,
        instagram_status_polls,
        instagram_poll_backoff_ms,
        linkedin_access_token,
        twitter_bearer_token,
        youtube_access_token,
        youtube_api_key,
        youtube_max_results,
        max_upload_bytes,
        upload_dir,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "YUKTI_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
