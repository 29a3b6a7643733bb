//! YouTube Data API v3 client for video search and channel statistics.
//!
//! Both calls degrade to an empty result on any failure so a single bad
//! keyword never sinks a whole influencer search.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use yukti_core::AppConfig;

use crate::error::InfluencerError;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Title and audience size of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub title: String,
    pub subscribers: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    snippet: Option<SearchSnippet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    channel_id: Option<String>,
}

#[derive(Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    id: String,
    snippet: ChannelSnippet,
    #[serde(default)]
    statistics: ChannelStatistics,
}

#[derive(Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    /// Sent as a decimal string.
    subscriber_count: Option<String>,
}

pub struct YouTubeClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl YouTubeClient {
    /// # Errors
    ///
    /// Returns [`InfluencerError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`InfluencerError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, InfluencerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let base_url =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| InfluencerError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    /// # Errors
    ///
    /// Returns [`InfluencerError::MissingApiKey`] when `YOUTUBE_API_KEY` is
    /// unset, before any client is built.
    pub fn from_config(config: &AppConfig) -> Result<Self, InfluencerError> {
        let api_key = config
            .youtube_api_key
            .as_deref()
            .ok_or(InfluencerError::MissingApiKey)?;
        Self::with_base_url(api_key, DEFAULT_BASE_URL, config.http_timeout_secs, &config.user_agent)
    }

    fn endpoint(&self, resource: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["youtube", "v3", resource]);
        }
        url
    }

    /// Channel ids of the videos matching `query`, in result order.
    pub async fn search_channels(&self, query: &str, max_results: u32) -> Vec<String> {
        let max_results = max_results.to_string();
        let request = self.client.get(self.endpoint("search")).query(&[
            ("part", "snippet"),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("q", query),
            ("key", self.api_key.as_str()),
        ]);

        match fetch_json::<SearchResponse>(request).await {
            Ok(response) => response
                .items
                .into_iter()
                .filter_map(|item| item.snippet.and_then(|s| s.channel_id))
                .collect(),
            Err(reason) => {
                tracing::warn!(keyword = query, %reason, "video search failed");
                Vec::new()
            }
        }
    }

    /// Statistics for `channel_ids` in one batch call.
    pub async fn channel_stats(&self, channel_ids: &[String]) -> HashMap<String, ChannelStats> {
        if channel_ids.is_empty() {
            return HashMap::new();
        }
        let ids = channel_ids.join(",");
        let request = self.client.get(self.endpoint("channels")).query(&[
            ("part", "statistics,snippet"),
            ("id", ids.as_str()),
            ("key", self.api_key.as_str()),
        ]);

        match fetch_json::<ChannelsResponse>(request).await {
            Ok(response) => response
                .items
                .into_iter()
                .map(|item| {
                    let subscribers = item
                        .statistics
                        .subscriber_count
                        .and_then(|count| count.parse().ok())
                        .unwrap_or(0);
                    (
                        item.id,
                        ChannelStats {
                            title: item.snippet.title,
                            subscribers,
                        },
                    )
                })
                .collect(),
            Err(reason) => {
                tracing::warn!(
                    channels = channel_ids.len(),
                    %reason,
                    "channel statistics lookup failed",
                );
                HashMap::new()
            }
        }
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("HTTP {}: {body}", status.as_u16()));
    }
    response.json::<T>().await.map_err(|e| e.to_string())
}
