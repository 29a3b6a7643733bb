//! Builds the domain services the commands need from configuration.

use std::sync::Arc;

use anyhow::Context;

use yukti_content::{
    BedrockClient, ContentGenerator, ContentPipeline, TextModel, TranslateClient, Translator,
};
use yukti_core::{load_style_overrides, AppConfig, Language, StyleCatalog, LANGUAGES};
use yukti_influencer::{FrequencyExtractor, InfluencerFinder, KeywordExtractor, ModelExtractor};
use yukti_publish::{AnalyticsTracker, PublishingManager, TracingObserver};

pub(crate) fn style_catalog(config: &AppConfig) -> anyhow::Result<StyleCatalog> {
    match &config.styles_path {
        Some(path) => {
            let overrides = load_style_overrides(path)
                .with_context(|| format!("loading styles from {}", path.display()))?;
            tracing::info!(overrides = overrides.len(), "style overrides loaded");
            Ok(StyleCatalog::with_overrides(&overrides))
        }
        None => Ok(StyleCatalog::default()),
    }
}

pub(crate) fn text_model(config: &AppConfig) -> anyhow::Result<Arc<dyn TextModel>> {
    let client = BedrockClient::from_config(config).context("content generation is unavailable")?;
    Ok(Arc::new(client))
}

pub(crate) fn content_pipeline(config: &AppConfig) -> anyhow::Result<ContentPipeline> {
    let generator = ContentGenerator::new(text_model(config)?, style_catalog(config)?);
    let translator = Translator::new(Arc::new(
        TranslateClient::from_config(config).context("building translation client")?,
    ));
    Ok(ContentPipeline::new(generator, translator))
}

/// Keyword extraction uses the language model when one is configured.
pub(crate) fn influencer_finder(config: &AppConfig) -> anyhow::Result<InfluencerFinder> {
    let extractor: Arc<dyn KeywordExtractor> = match BedrockClient::from_config(config) {
        Ok(client) => Arc::new(ModelExtractor::new(Arc::new(client))),
        Err(e) => {
            tracing::debug!(error = %e, "no keyword model, using frequency extraction");
            Arc::new(FrequencyExtractor)
        }
    };
    InfluencerFinder::from_config(config, extractor).context("building YouTube client")
}

pub(crate) fn publishing_manager(config: &AppConfig) -> PublishingManager {
    PublishingManager::from_config(config)
}

pub(crate) fn analytics_tracker() -> AnalyticsTracker {
    let mut tracker = AnalyticsTracker::new();
    tracker.add_observer(Arc::new(TracingObserver));
    tracker
}

/// Resolves a language by display name or code.
pub(crate) fn resolve_language(query: &str) -> anyhow::Result<Language> {
    Language::lookup(query).ok_or_else(|| {
        let known: Vec<&str> = LANGUAGES.iter().map(|l| l.name).collect();
        anyhow::anyhow!("unsupported language '{query}'; choose one of: {}", known.join(", "))
    })
}
