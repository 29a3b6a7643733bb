//! Shared domain types and configuration for the yukti workspace.
//!
//! Holds the closed [`Platform`] catalog, the tone [`StyleCatalog`], the
//! supported translation [`Language`] table, and environment-driven
//! [`AppConfig`] loading.

pub mod app_config;
pub mod config;
pub mod language;
pub mod platform;
pub mod styles;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use language::{Language, LANGUAGES};
pub use platform::{Platform, UnknownPlatform};
pub use styles::{load_style_overrides, StyleCatalog, NEUTRAL_STYLE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read styles file {path}: {source}")]
    StylesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse styles file: {0}")]
    StylesFileParse(#[from] serde_yaml::Error),

    #[error("style validation failed: {0}")]
    Validation(String),
}
