use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use yukti_core::AppConfig;

use crate::error::InfluencerError;
use crate::keywords::KeywordExtractor;
use crate::youtube::{ChannelStats, YouTubeClient};

/// Default number of channels returned by [`InfluencerFinder::find`].
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfluencerRecord {
    pub channel_id: String,
    pub channel: String,
    pub subscribers: u64,
    /// Number of keyword searches whose results included this channel.
    pub mentions: u32,
    pub link: String,
}

pub struct InfluencerFinder {
    youtube: Option<YouTubeClient>,
    extractor: Arc<dyn KeywordExtractor>,
    max_results: u32,
}

impl InfluencerFinder {
    #[must_use]
    pub fn new(
        youtube: Option<YouTubeClient>,
        extractor: Arc<dyn KeywordExtractor>,
        max_results: u32,
    ) -> Self {
        Self {
            youtube,
            extractor,
            max_results,
        }
    }

    /// Builds a finder; a missing API key is reported by [`InfluencerFinder::find`].
    ///
    /// # Errors
    ///
    /// Returns [`InfluencerError`] if the HTTP client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        extractor: Arc<dyn KeywordExtractor>,
    ) -> Result<Self, InfluencerError> {
        let youtube = match YouTubeClient::from_config(config) {
            Ok(client) => Some(client),
            Err(InfluencerError::MissingApiKey) => None,
            Err(e) => return Err(e),
        };
        Ok(Self::new(youtube, extractor, config.youtube_max_results))
    }

    /// Ranks YouTube channels relevant to `description`.
    ///
    /// # Errors
    ///
    /// Returns [`InfluencerError::MissingApiKey`] when no YouTube API key is
    /// configured. All search failures degrade to fewer results instead.
    pub async fn find(
        &self,
        description: &str,
        top_n: usize,
    ) -> Result<Vec<InfluencerRecord>, InfluencerError> {
        let youtube = self.youtube.as_ref().ok_or(InfluencerError::MissingApiKey)?;

        if description.trim().is_empty() {
            return Ok(Vec::new());
        }
        let keywords = self.extractor.extract(description).await;
        if keywords.is_empty() {
            tracing::info!("no keywords extracted, skipping search");
            return Ok(Vec::new());
        }
        tracing::debug!(?keywords, "searching influencers");

        let searches = keywords
            .iter()
            .map(|keyword| youtube.search_channels(keyword, self.max_results));
        let results = join_all(searches).await;

        let mut tallied = tally_mentions(&results);
        if tallied.is_empty() {
            return Ok(Vec::new());
        }
        // Stable: equal mention counts keep first-appearance order.
        tallied.sort_by(|a, b| b.1.cmp(&a.1));
        tallied.truncate(top_n);

        let ids: Vec<String> = tallied.iter().map(|(id, _)| id.clone()).collect();
        let stats = youtube.channel_stats(&ids).await;

        let ranked = rank_channels(&tallied, &stats);
        tracing::info!(
            keywords = keywords.len(),
            channels = ranked.len(),
            "influencer search finished",
        );
        Ok(ranked)
    }
}

/// Counts, per channel, how many searches returned it.
///
/// A channel appearing several times in one search counts once. The result
/// is in order of first appearance.
#[must_use]
pub fn tally_mentions(searches: &[Vec<String>]) -> Vec<(String, u32)> {
    let mut tallied: Vec<(String, u32)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for channels in searches {
        let mut seen = HashSet::new();
        for channel in channels {
            if !seen.insert(channel.as_str()) {
                continue;
            }
            match index.get(channel) {
                Some(&i) => tallied[i].1 += 1,
                None => {
                    index.insert(channel.clone(), tallied.len());
                    tallied.push((channel.clone(), 1));
                }
            }
        }
    }
    tallied
}

/// Orders channels by mentions, then subscribers, both descending.
///
/// Channels without statistics are dropped. Full ties keep the order of
/// `mentions`.
#[must_use]
pub fn rank_channels(
    mentions: &[(String, u32)],
    stats: &HashMap<String, ChannelStats>,
) -> Vec<InfluencerRecord> {
    let mut records: Vec<InfluencerRecord> = mentions
        .iter()
        .filter_map(|(id, count)| {
            let channel = stats.get(id)?;
            Some(InfluencerRecord {
                channel_id: id.clone(),
                channel: channel.title.clone(),
                subscribers: channel.subscribers,
                mentions: *count,
                link: format!("https://www.youtube.com/channel/{id}"),
            })
        })
        .collect();
    records.sort_by(|a, b| {
        b.mentions
            .cmp(&a.mentions)
            .then_with(|| b.subscribers.cmp(&a.subscribers))
    });
    records
}
