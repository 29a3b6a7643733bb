use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;

use yukti_core::{AppConfig, Platform};

use crate::error::PublishError;
use crate::instagram::InstagramPublisher;
use crate::linkedin::LinkedInPublisher;
use crate::media::{MediaHandler, Optimized};
use crate::outcome::{FailureKind, PublishFailure, PublishOutcome};
use crate::publisher::Publisher;
use crate::twitter::TwitterPublisher;
use crate::youtube::YouTubePublisher;

/// Publishers keyed by platform. Only successfully constructed publishers are held.
#[derive(Default, Clone)]
pub struct PublisherRegistry {
    publishers: BTreeMap<Platform, Arc<dyn Publisher>>,
}

impl PublisherRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every publisher the configuration allows.
    ///
    /// A publisher whose construction fails is logged and left out.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        registry.register_result(Platform::Instagram, InstagramPublisher::from_config(config));
        registry.register_result(Platform::LinkedIn, LinkedInPublisher::from_config(config));
        registry.register_result(Platform::Twitter, TwitterPublisher::from_config(config));
        registry.register_result(Platform::YouTube, YouTubePublisher::from_config(config));
        registry
    }

    pub fn register(&mut self, publisher: Arc<dyn Publisher>) {
        self.publishers.insert(publisher.platform(), publisher);
    }

    fn register_result<P>(&mut self, platform: Platform, result: Result<P, PublishError>)
    where
        P: Publisher + 'static,
    {
        match result {
            Ok(publisher) => self.register(Arc::new(publisher)),
            Err(e) => tracing::warn!(%platform, error = %e, "publisher unavailable"),
        }
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<Arc<dyn Publisher>> {
        self.publishers.get(&platform).cloned()
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.publishers.keys().copied()
    }
}

/// Routes publish requests through media preparation to the right publisher.
#[derive(Clone)]
pub struct PublishingManager {
    registry: PublisherRegistry,
    media: MediaHandler,
}

impl PublishingManager {
    #[must_use]
    pub fn new(registry: PublisherRegistry, media: MediaHandler) -> Self {
        Self { registry, media }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            PublisherRegistry::from_config(config),
            MediaHandler::from_config(config),
        )
    }

    #[must_use]
    pub fn registry(&self) -> &PublisherRegistry {
        &self.registry
    }

    #[must_use]
    pub fn media(&self) -> &MediaHandler {
        &self.media
    }

    /// Publishes `content` to the platform named `platform_name`.
    ///
    /// Never panics or errors: unknown platforms, invalid media and publisher
    /// panics all come back as [`PublishOutcome::Failed`].
    pub async fn publish(
        &self,
        platform_name: &str,
        content: &str,
        media: Option<&Path>,
    ) -> PublishOutcome {
        let key = platform_name.trim().to_lowercase();
        let Some(publisher) = key
            .parse::<Platform>()
            .ok()
            .and_then(|p| self.registry.get(p))
        else {
            tracing::warn!(platform = %key, "no publisher for platform");
            return PublishFailure::new(key.clone(), FailureKind::UnsupportedPlatform, key).into();
        };
        let platform = publisher.platform();

        let media = match media {
            Some(path) => match self.prepare_media(&*publisher, path).await {
                Ok(prepared) => Some(prepared),
                Err(failure) => return failure.into(),
            },
            None => None,
        };

        let content = content.to_owned();
        let task = tokio::spawn(async move { publisher.publish(&content, media.as_deref()).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(%platform, error = %e, "publisher task aborted");
                let detail = if e.is_panic() {
                    "publisher panicked".to_string()
                } else {
                    e.to_string()
                };
                PublishFailure::new(platform.key(), FailureKind::Internal, detail).into()
            }
        }
    }

    /// Validates `path` against the upload limits and the publisher's own
    /// media rules, then shrinks it on a blocking thread.
    async fn prepare_media(
        &self,
        publisher: &dyn Publisher,
        path: &Path,
    ) -> Result<PathBuf, PublishFailure> {
        let platform = publisher.platform();
        if let Err(reason) = self.media.check(path) {
            tracing::warn!(%platform, path = %path.display(), %reason, "media rejected");
            return Err(PublishFailure::new(
                platform.key(),
                FailureKind::InvalidMedia,
                reason.to_string(),
            ));
        }
        if !publisher.validate_media(path) {
            tracing::warn!(%platform, path = %path.display(), "media not accepted by publisher");
            return Err(PublishFailure::new(
                platform.key(),
                FailureKind::InvalidMedia,
                format!("{} does not accept {}", platform.label(), path.display()),
            ));
        }

        let handler = self.media.clone();
        let input = path.to_path_buf();
        let optimized = tokio::task::spawn_blocking(move || handler.optimize(&input, None))
            .await
            .unwrap_or_else(|e| Optimized::Original {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });

        if let Optimized::Original { reason, .. } = &optimized {
            tracing::warn!(%platform, %reason, "publishing original media");
        }
        Ok(optimized.path().to_path_buf())
    }

    /// Checks every registered publisher's credentials concurrently.
    pub async fn authenticate_all(&self) -> BTreeMap<Platform, bool> {
        let checks = self.registry.publishers.iter().map(|(platform, publisher)| async move {
            (*platform, publisher.authenticate().await)
        });
        join_all(checks).await.into_iter().collect()
    }

    /// Publishes each platform's copy in catalog order.
    ///
    /// `media` is attached only where the publisher accepts it; other
    /// platforms get text only. Platforms that require media are skipped
    /// when `media` is `None`, and report `InvalidMedia` when they reject it.
    pub async fn publish_all(
        &self,
        contents: &BTreeMap<Platform, String>,
        media: Option<&Path>,
    ) -> BTreeMap<Platform, PublishOutcome> {
        let mut outcomes = BTreeMap::new();
        for (platform, content) in contents {
            let attach = match (media, self.registry.get(*platform)) {
                (Some(path), Some(publisher))
                    if platform.requires_media() || publisher.validate_media(path) =>
                {
                    Some(path)
                }
                _ => None,
            };
            if platform.requires_media() && attach.is_none() {
                tracing::info!(%platform, "skipped, media required");
                continue;
            }
            if media.is_some() && attach.is_none() {
                tracing::debug!(%platform, "publishing text only");
            }
            let outcome = self.publish(platform.key(), content, attach).await;
            outcomes.insert(*platform, outcome);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use image::RgbImage;

    use super::*;
    use crate::outcome::PublishedPost;

    type CallLog = Arc<Mutex<Vec<(String, Option<PathBuf>)>>>;

    struct FakePublisher {
        platform: Platform,
        calls: CallLog,
        panics: bool,
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn authenticate(&self) -> bool {
            self.platform == Platform::Twitter
        }

        async fn publish(&self, content: &str, media: Option<&Path>) -> PublishOutcome {
            if self.panics {
                panic!("provider SDK exploded");
            }
            self.calls
                .lock()
                .unwrap()
                .push((content.to_string(), media.map(Path::to_path_buf)));
            PublishOutcome::Published(PublishedPost {
                platform: self.platform,
                post_id: "1".to_string(),
                permalink: None,
            })
        }

        fn validate_media(&self, _path: &Path) -> bool {
            self.platform.requires_media()
        }
    }

    fn manager_with(platforms: &[(Platform, bool)]) -> (PublishingManager, CallLog) {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PublisherRegistry::new();
        for &(platform, panics) in platforms {
            registry.register(Arc::new(FakePublisher {
                platform,
                calls: calls.clone(),
                panics,
            }));
        }
        (PublishingManager::new(registry, MediaHandler::new(10_485_760)), calls)
    }

    #[tokio::test]
    async fn unregistered_platform_is_unsupported() {
        let (manager, calls) = manager_with(&[(Platform::Twitter, false)]);

        for name in ["instagram", "myspace", "email"] {
            let outcome = manager.publish(name, "hello", None).await;
            let failure = outcome.failure().unwrap();
            assert_eq!(failure.kind, FailureKind::UnsupportedPlatform);
            assert!(failure.to_string().starts_with("unsupported platform"));
        }
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn platform_name_is_case_insensitive() {
        let (manager, calls) = manager_with(&[(Platform::Twitter, false)]);

        assert!(manager.publish(" X ", "hello", None).await.is_published());
        assert_eq!(calls.lock().unwrap()[0].0, "hello");
    }

    #[tokio::test]
    async fn invalid_media_never_reaches_publisher() {
        let (manager, calls) = manager_with(&[(Platform::Instagram, false)]);

        let outcome = manager
            .publish("instagram", "hello", Some(Path::new("/missing/pic.png")))
            .await;

        assert_eq!(outcome.failure().unwrap().kind, FailureKind::InvalidMedia);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_media_is_optimized_before_publish() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("promo.png");
        RgbImage::new(16, 16).save(&src).unwrap();
        let (manager, calls) = manager_with(&[(Platform::Instagram, false)]);

        let outcome = manager.publish("instagram", "hello", Some(&src)).await;

        assert!(outcome.is_published());
        let recorded = calls.lock().unwrap();
        assert_eq!(
            recorded[0].1.as_deref(),
            Some(dir.path().join("optimized_promo.png").as_path()),
        );
    }

    #[tokio::test]
    async fn publisher_panic_becomes_internal_failure() {
        let (manager, _) = manager_with(&[(Platform::LinkedIn, true)]);

        let outcome = manager.publish("linkedin", "hello", None).await;

        assert_eq!(outcome.failure().unwrap().kind, FailureKind::Internal);
    }

    #[tokio::test]
    async fn authenticate_all_covers_registered_platforms() {
        let (manager, _) = manager_with(&[(Platform::Twitter, false), (Platform::LinkedIn, false)]);

        let status = manager.authenticate_all().await;

        assert_eq!(status.len(), 2);
        assert!(status[&Platform::Twitter]);
        assert!(!status[&Platform::LinkedIn]);
    }

    #[tokio::test]
    async fn publish_all_skips_media_platforms_without_media() {
        let (manager, calls) =
            manager_with(&[(Platform::Twitter, false), (Platform::Instagram, false)]);
        let contents = BTreeMap::from([
            (Platform::Instagram, "pic caption".to_string()),
            (Platform::Twitter, "short post".to_string()),
        ]);

        let outcomes = manager.publish_all(&contents, None).await;

        assert_eq!(outcomes.keys().copied().collect::<Vec<_>>(), vec![Platform::Twitter]);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn media_rejected_by_publisher_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("promo.png");
        RgbImage::new(16, 16).save(&src).unwrap();
        let (manager, calls) = manager_with(&[(Platform::Twitter, false)]);

        let outcome = manager.publish("twitter", "hello", Some(&src)).await;

        let failure = outcome.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidMedia);
        assert!(failure.detail.starts_with("Twitter does not accept"));
        assert!(calls.lock().unwrap().is_empty());
        assert!(!dir.path().join("optimized_promo.png").exists());
    }

    #[tokio::test]
    async fn publish_all_attaches_media_only_where_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("promo.png");
        RgbImage::new(16, 16).save(&src).unwrap();
        let (manager, calls) = manager_with(&[
            (Platform::Twitter, false),
            (Platform::LinkedIn, false),
            (Platform::Instagram, false),
        ]);
        let contents = BTreeMap::from([
            (Platform::LinkedIn, "long post".to_string()),
            (Platform::Instagram, "pic caption".to_string()),
            (Platform::Twitter, "short post".to_string()),
        ]);

        let outcomes = manager.publish_all(&contents, Some(&src)).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.values().all(PublishOutcome::is_published));
        let recorded = calls.lock().unwrap();
        let with_media: Vec<&str> = recorded
            .iter()
            .filter(|(_, media)| media.is_some())
            .map(|(content, _)| content.as_str())
            .collect();
        assert_eq!(with_media, ["pic caption"]);
    }

    #[test]
    fn registry_from_config_holds_all_publishing_platforms() {
        let config = yukti_core::build_app_config(|_| Err(std::env::VarError::NotPresent)).unwrap();
        let registry = PublisherRegistry::from_config(&config);
        let platforms: Vec<Platform> = registry.platforms().collect();
        assert_eq!(
            platforms,
            vec![Platform::LinkedIn, Platform::Instagram, Platform::Twitter, Platform::YouTube]
        );
    }
}
