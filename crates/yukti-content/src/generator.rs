//! Platform-tailored copy generation.

use std::sync::Arc;

use yukti_core::{Platform, StyleCatalog};

use crate::error::GenerateError;
use crate::model::{SamplingParams, TextModel};

/// Builds prompts from the style catalog and runs them through a [`TextModel`].
#[derive(Clone)]
pub struct ContentGenerator {
    model: Arc<dyn TextModel>,
    styles: StyleCatalog,
    params: SamplingParams,
}

impl ContentGenerator {
    #[must_use]
    pub fn new(model: Arc<dyn TextModel>, styles: StyleCatalog) -> Self {
        Self {
            model,
            styles,
            params: SamplingParams::default(),
        }
    }

    #[must_use]
    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    /// Generates copy for `platform`, which may be any key.
    ///
    /// Keys outside the catalog are written in the neutral style.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::EmptyTopic`] without calling the model when the
    /// topic is blank, [`GenerateError::Model`] when the model call fails, and
    /// [`GenerateError::EmptyCompletion`] when nothing is left after cleanup.
    pub async fn generate(&self, topic: &str, platform: &str) -> Result<String, GenerateError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(GenerateError::EmptyTopic);
        }

        let style = self.styles.style_for_key(platform);
        let prompt = build_prompt(topic, platform, style);

        let raw = self
            .model
            .complete(&prompt, &self.params)
            .await
            .map_err(|source| GenerateError::Model {
                platform: platform.to_string(),
                source,
            })?;

        let text = clean_completion(&raw);
        if text.is_empty() {
            return Err(GenerateError::EmptyCompletion {
                platform: platform.to_string(),
            });
        }

        tracing::debug!(platform, chars = text.len(), "generated post");
        Ok(text)
    }

    /// Generates copy for a catalog platform.
    ///
    /// # Errors
    ///
    /// See [`ContentGenerator::generate`].
    pub async fn generate_for(
        &self,
        topic: &str,
        platform: Platform,
    ) -> Result<String, GenerateError> {
        self.generate(topic, platform.key()).await
    }
}

/// Single instruction prompt in the text-completions turn format.
#[must_use]
pub fn build_prompt(topic: &str, platform: &str, style: &str) -> String {
    format!(
        "\n\nHuman: Write only the content for a {platform} post about: {topic}. {style} \
         Do not include any introductory text or explanations.\n\nAssistant:"
    )
}

/// Strips leaked role markers and surrounding whitespace from a completion.
#[must_use]
pub fn clean_completion(raw: &str) -> String {
    raw.replace("Assistant:", "").trim().to_string()
}
