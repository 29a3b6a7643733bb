use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::platform::Platform;
use crate::ConfigError;

/// Tone instruction used for any platform key outside the catalog.
pub const NEUTRAL_STYLE: &str = "Neutral style.";

/// Immutable mapping of platform to tone instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleCatalog {
    styles: BTreeMap<Platform, String>,
}

impl Default for StyleCatalog {
    fn default() -> Self {
        let styles = Platform::ALL
            .into_iter()
            .map(|p| (p, default_style(p).to_string()))
            .collect();
        Self { styles }
    }
}

fn default_style(platform: Platform) -> &'static str {
    match platform {
        Platform::LinkedIn => {
            "Professional tone, structured in 2-3 paragraphs, \
             with a clear call-to-action for business professionals."
        }
        Platform::Instagram => "Fun, short, emotional, with emojis and 5-8 trending hashtags.",
        Platform::Twitter => "Concise, witty, with a strong hook and 1-2 hashtags.",
        Platform::Email => {
            "Warm, personal, clear value proposition, ending with a call-to-action link."
        }
        Platform::YouTube => "Engaging intro, story-driven, ending with a call to subscribe.",
    }
}

impl StyleCatalog {
    /// Builds the catalog from defaults with per-platform overrides applied.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<Platform, String>) -> Self {
        let mut catalog = Self::default();
        for (platform, tone) in overrides {
            catalog.styles.insert(*platform, tone.clone());
        }
        catalog
    }

    /// Tone instruction for a catalog platform.
    #[must_use]
    pub fn style(&self, platform: Platform) -> &str {
        self.styles
            .get(&platform)
            .map_or(NEUTRAL_STYLE, String::as_str)
    }

    /// Tone instruction for a free-form platform key, case-insensitive.
    ///
    /// Keys outside the catalog get [`NEUTRAL_STYLE`].
    #[must_use]
    pub fn style_for_key(&self, key: &str) -> &str {
        key.parse::<Platform>()
            .map_or(NEUTRAL_STYLE, |platform| self.style(platform))
    }

    /// Catalog platforms in catalog order.
    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.styles.keys().copied()
    }
}

#[derive(Debug, Deserialize)]
struct StylesFile {
    styles: HashMap<String, String>,
}

/// Load tone overrides from a YAML file of the form `styles: { linkedin: "..." }`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, names a
/// platform outside the catalog, or carries an empty tone.
pub fn load_style_overrides(path: &Path) -> Result<BTreeMap<Platform, String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StylesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_style_overrides(&content)
}

fn parse_style_overrides(content: &str) -> Result<BTreeMap<Platform, String>, ConfigError> {
    let file: StylesFile = serde_yaml::from_str(content)?;

    let mut overrides = BTreeMap::new();
    for (key, tone) in file.styles {
        let platform = key
            .parse::<Platform>()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        let tone = tone.trim();
        if tone.is_empty() {
            return Err(ConfigError::Validation(format!(
                "style for '{key}' must be non-empty"
            )));
        }
        if overrides.insert(platform, tone.to_string()).is_some() {
            return Err(ConfigError::Validation(format!(
                "duplicate style for platform '{platform}'"
            )));
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_all_platforms_in_order() {
        let catalog = StyleCatalog::default();
        let platforms: Vec<Platform> = catalog.platforms().collect();
        assert_eq!(platforms, Platform::ALL.to_vec());
    }

    #[test]
    fn unknown_key_gets_neutral_style_verbatim() {
        let catalog = StyleCatalog::default();
        assert_eq!(catalog.style_for_key("mastodon"), NEUTRAL_STYLE);
        assert_eq!(catalog.style_for_key(""), "Neutral style.");
    }

    #[test]
    fn known_key_lookup_is_case_insensitive() {
        let catalog = StyleCatalog::default();
        assert_eq!(
            catalog.style_for_key("TWITTER"),
            "Concise, witty, with a strong hook and 1-2 hashtags."
        );
    }

    #[test]
    fn overrides_replace_only_named_platforms() {
        let overrides = parse_style_overrides("styles:\n  email: Short and direct.\n").unwrap();
        let catalog = StyleCatalog::with_overrides(&overrides);
        assert_eq!(catalog.style(Platform::Email), "Short and direct.");
        assert_eq!(
            catalog.style(Platform::Instagram),
            StyleCatalog::default().style(Platform::Instagram)
        );
    }

    #[test]
    fn overrides_reject_unknown_platform() {
        let err = parse_style_overrides("styles:\n  myspace: Loud.\n").unwrap_err();
        assert!(err.to_string().contains("unsupported platform: myspace"));
    }

    #[test]
    fn overrides_reject_empty_tone() {
        let err = parse_style_overrides("styles:\n  linkedin: \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn overrides_reject_aliases_of_same_platform() {
        let err = parse_style_overrides("styles:\n  x: One.\n  twitter: Two.\n").unwrap_err();
        assert!(err.to_string().contains("duplicate style"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("styles.yaml");
        let err = load_style_overrides(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::StylesFileIo { .. }));
    }
}
