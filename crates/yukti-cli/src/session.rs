//! State carried across commands in one interactive session.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use yukti_content::{needs_translation, ContentPipeline, GeneratedPost, Translation};
use yukti_core::Platform;
use yukti_influencer::{InfluencerError, InfluencerFinder, InfluencerRecord};

/// Last topic and its English copy, plus caches of derived results.
///
/// Translations are keyed by language code and only valid for the current
/// copy. Influencer results are keyed by description and requested size.
#[derive(Default)]
pub(crate) struct Session {
    topic: Option<String>,
    posts: BTreeMap<Platform, GeneratedPost>,
    translations: HashMap<String, BTreeMap<Platform, Translation>>,
    influencers: HashMap<(String, usize), Vec<InfluencerRecord>>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub(crate) fn posts(&self) -> &BTreeMap<Platform, GeneratedPost> {
        &self.posts
    }

    /// Replaces the copy with a fresh English generation for `topic`.
    pub(crate) async fn generate(
        &mut self,
        pipeline: &ContentPipeline,
        topic: &str,
    ) -> &BTreeMap<Platform, GeneratedPost> {
        let posts = pipeline.generate_all(topic, None).await;
        self.translations.clear();
        self.topic = Some(topic.to_string());
        self.posts = posts;
        &self.posts
    }

    /// Translations of the current copy into `code`, computed once per code.
    ///
    /// `None` when there is no copy yet or `code` is English.
    pub(crate) async fn translated(
        &mut self,
        pipeline: &ContentPipeline,
        code: &str,
    ) -> Option<&BTreeMap<Platform, Translation>> {
        if self.posts.is_empty() || !needs_translation(Some(code)) {
            return None;
        }
        let code = code.trim().to_lowercase();
        if self.translations.contains_key(&code) {
            tracing::debug!(language = %code, "translation cache hit");
        } else {
            let translations = pipeline.translate_all(&self.posts, &code).await;
            self.translations.insert(code.clone(), translations);
        }
        self.translations.get(&code)
    }

    /// Successful English copy, ready for publishing.
    pub(crate) fn contents(&self) -> BTreeMap<Platform, String> {
        self.posts
            .iter()
            .filter_map(|(platform, post)| Some((*platform, post.english()?.to_string())))
            .collect()
    }

    /// Cached influencer search; failures are not cached.
    pub(crate) async fn influencers(
        &mut self,
        finder: &InfluencerFinder,
        description: &str,
        top_n: usize,
    ) -> Result<&[InfluencerRecord], InfluencerError> {
        let description = description.trim();
        let records = match self.influencers.entry((description.to_string(), top_n)) {
            Entry::Occupied(cached) => cached.into_mut(),
            Entry::Vacant(slot) => {
                let records = finder.find(description, top_n).await?;
                slot.insert(records)
            }
        };
        Ok(records)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
