use std::collections::BTreeMap;

use futures::future::join_all;

use yukti_core::Platform;

use crate::error::GenerateError;
use crate::generator::ContentGenerator;
use crate::translator::{needs_translation, Translation, Translator};

/// One platform's slot in a fan-out result.
#[derive(Debug)]
pub struct GeneratedPost {
    pub platform: Platform,
    pub content: Result<String, GenerateError>,
    /// Set only for successful generations when a non-English target was requested.
    pub translation: Option<Translation>,
}

impl GeneratedPost {
    /// The English copy, if generation succeeded.
    #[must_use]
    pub fn english(&self) -> Option<&str> {
        self.content.as_deref().ok()
    }

    /// Text to show for this slot: translated copy, English copy, or the
    /// generation error message.
    #[must_use]
    pub fn display_text(&self) -> String {
        match (&self.content, &self.translation) {
            (Ok(_), Some(translation)) => translation.text().to_string(),
            (Ok(text), None) => text.clone(),
            (Err(e), _) => e.to_string(),
        }
    }
}

/// Generates every catalog platform concurrently, then localizes the results.
#[derive(Clone)]
pub struct ContentPipeline {
    generator: ContentGenerator,
    translator: Translator,
}

impl ContentPipeline {
    #[must_use]
    pub fn new(generator: ContentGenerator, translator: Translator) -> Self {
        Self {
            generator,
            translator,
        }
    }

    #[must_use]
    pub fn generator(&self) -> &ContentGenerator {
        &self.generator
    }

    /// Runs one generation per catalog platform and joins them all.
    ///
    /// The map always holds every catalog platform. A failed generation is
    /// recorded in its own slot without affecting the others. When `target`
    /// names a non-English language, successful posts are then translated
    /// concurrently.
    pub async fn generate_all(
        &self,
        topic: &str,
        target: Option<&str>,
    ) -> BTreeMap<Platform, GeneratedPost> {
        let tasks = Platform::ALL.into_iter().map(|platform| async move {
            let content = self.generator.generate_for(topic, platform).await;
            GeneratedPost {
                platform,
                content,
                translation: None,
            }
        });

        let mut posts: BTreeMap<Platform, GeneratedPost> = join_all(tasks)
            .await
            .into_iter()
            .map(|post| (post.platform, post))
            .collect();

        let failed = posts.values().filter(|p| p.content.is_err()).count();
        tracing::info!(
            platforms = posts.len(),
            failed,
            "content generation finished"
        );

        if let Some(target) = target.filter(|t| needs_translation(Some(t))) {
            for (platform, translation) in self.translate_all(&posts, target).await {
                if let Some(post) = posts.get_mut(&platform) {
                    post.translation = Some(translation);
                }
            }
        }

        posts
    }

    /// Translates every successful post in `posts` into `target`.
    ///
    /// Failed generations are skipped. Individual translation failures come
    /// back as [`Translation::Degraded`].
    pub async fn translate_all(
        &self,
        posts: &BTreeMap<Platform, GeneratedPost>,
        target: &str,
    ) -> BTreeMap<Platform, Translation> {
        let tasks = posts.values().filter_map(|post| {
            let text = post.english()?;
            let platform = post.platform;
            Some(async move { (platform, self.translator.translate(text, target).await) })
        });

        let translations: BTreeMap<Platform, Translation> =
            join_all(tasks).await.into_iter().collect();

        let degraded = translations.values().filter(|t| t.is_degraded()).count();
        if degraded > 0 {
            tracing::warn!(
                target_language = target,
                degraded,
                "some translations fell back to English",
            );
        }
        translations
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use yukti_core::StyleCatalog;

    use super::*;
    use crate::error::{ModelError, TranslateError};
    use crate::model::{SamplingParams, TextModel};
    use crate::translator::TranslationBackend;

    /// Replies with the platform named in the prompt; fails for `fail_on`.
    struct ScriptedModel {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn complete(
            &self,
            prompt: &str,
            _params: &SamplingParams,
        ) -> Result<String, ModelError> {
            let platform = Platform::ALL
                .into_iter()
                .map(Platform::key)
                .find(|key| prompt.contains(&format!("for a {key} post")))
                .unwrap_or("unknown");
            if self.fail_on == Some(platform) {
                return Err(ModelError::MissingCompletion);
            }
            Ok(format!("Assistant: copy for {platform}"))
        }
    }

    struct CountingBackend {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TranslationBackend for CountingBackend {
        async fn translate(
            &self,
            text: &str,
            _source: &str,
            target: &str,
        ) -> Result<String, TranslateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("email") {
                return Err(TranslateError::MissingText);
            }
            Ok(format!("{target}:{text}"))
        }
    }

    fn pipeline(fail_on: Option<&'static str>) -> (ContentPipeline, Arc<CountingBackend>) {
        let backend = Arc::new(CountingBackend {
            calls: AtomicU32::new(0),
        });
        let generator =
            ContentGenerator::new(Arc::new(ScriptedModel { fail_on }), StyleCatalog::default());
        let pipeline = ContentPipeline::new(generator, Translator::new(backend.clone()));
        (pipeline, backend)
    }

    #[tokio::test]
    async fn english_target_yields_all_five_platforms_untranslated() {
        let (pipeline, backend) = pipeline(None);

        let posts = pipeline.generate_all("reusable bottles", Some("en")).await;

        let keys: Vec<Platform> = posts.keys().copied().collect();
        assert_eq!(keys, Platform::ALL.to_vec());
        assert!(posts.values().all(|p| p.translation.is_none()));
        assert_eq!(posts[&Platform::Twitter].display_text(), "copy for twitter");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_siblings() {
        let (pipeline, _) = pipeline(Some("twitter"));

        let posts = pipeline.generate_all("reusable bottles", None).await;

        assert_eq!(posts.len(), 5);
        let twitter = &posts[&Platform::Twitter];
        assert!(twitter.content.is_err());
        assert!(twitter.display_text().starts_with("Error generating twitter content:"));
        for platform in [
            Platform::LinkedIn,
            Platform::Instagram,
            Platform::Email,
            Platform::YouTube,
        ] {
            assert!(posts[&platform].content.is_ok(), "{platform} should succeed");
        }
    }

    #[tokio::test]
    async fn only_successful_posts_are_translated() {
        let (pipeline, backend) = pipeline(Some("twitter"));

        let posts = pipeline.generate_all("reusable bottles", Some("hi")).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
        assert!(posts[&Platform::Twitter].translation.is_none());
        assert_eq!(posts[&Platform::LinkedIn].display_text(), "hi:copy for linkedin");

        let email = posts[&Platform::Email].translation.as_ref().unwrap();
        assert!(email.is_degraded());
        assert_eq!(email.text(), "copy for email");
    }

    #[tokio::test]
    async fn empty_topic_fails_every_slot() {
        let (pipeline, _) = pipeline(None);

        let posts = pipeline.generate_all("  ", Some("te")).await;

        assert_eq!(posts.len(), 5);
        assert!(posts.values().all(|p| {
            matches!(p.content, Err(GenerateError::EmptyTopic)) && p.translation.is_none()
        }));
    }
}
