use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A distribution channel that content is generated for.
///
/// Declaration order is the catalog order: maps keyed by `Platform` iterate
/// linkedin, instagram, twitter, email, youtube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Instagram,
    Twitter,
    Email,
    YouTube,
}

impl Platform {
    /// Every catalog platform, in catalog order.
    pub const ALL: [Platform; 5] = [
        Platform::LinkedIn,
        Platform::Instagram,
        Platform::Twitter,
        Platform::Email,
        Platform::YouTube,
    ];

    /// Lowercase key used in prompts, config files and CLI arguments.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Email => "email",
            Platform::YouTube => "youtube",
        }
    }

    /// Human-facing label for headings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Platform::LinkedIn => "LinkedIn",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "Twitter",
            Platform::Email => "Email",
            Platform::YouTube => "YouTube",
        }
    }

    /// Whether a post on this platform cannot be made without media.
    #[must_use]
    pub fn requires_media(self) -> bool {
        matches!(self, Platform::Instagram | Platform::YouTube)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkedin" => Ok(Platform::LinkedIn),
            "instagram" => Ok(Platform::Instagram),
            "twitter" | "x" => Ok(Platform::Twitter),
            "email" => Ok(Platform::Email),
            "youtube" => Ok(Platform::YouTube),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("LinkedIn".parse::<Platform>().unwrap(), Platform::LinkedIn);
        assert_eq!(" YOUTUBE ".parse::<Platform>().unwrap(), Platform::YouTube);
        assert_eq!("x".parse::<Platform>().unwrap(), Platform::Twitter);
    }

    #[test]
    fn rejects_unknown_key() {
        let err = "myspace".parse::<Platform>().unwrap_err();
        assert_eq!(err, UnknownPlatform("myspace".to_string()));
        assert_eq!(err.to_string(), "unsupported platform: myspace");
    }

    #[test]
    fn ordering_follows_catalog() {
        let mut shuffled = vec![
            Platform::YouTube,
            Platform::Email,
            Platform::LinkedIn,
            Platform::Twitter,
            Platform::Instagram,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Platform::ALL.to_vec());
    }

    #[test]
    fn key_round_trips_through_from_str() {
        for platform in Platform::ALL {
            assert_eq!(platform.key().parse::<Platform>().unwrap(), platform);
        }
    }
}
