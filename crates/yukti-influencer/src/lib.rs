//! YouTube channel discovery for campaign descriptions.
//!
//! Keywords are pulled from the description, each one is searched on YouTube,
//! and channels are ranked by how many keyword searches surfaced them, then by
//! subscriber count.

pub mod error;
pub mod finder;
pub mod keywords;
pub mod youtube;

pub use error::InfluencerError;
pub use finder::{rank_channels, tally_mentions, InfluencerFinder, InfluencerRecord, DEFAULT_TOP_N};
pub use keywords::{FrequencyExtractor, KeywordExtractor, ModelExtractor};
pub use youtube::{ChannelStats, YouTubeClient};
