//! Media preparation and per-platform publishing.
//!
//! Every publish attempt ends in a [`PublishOutcome`]; transport and provider
//! errors are folded into [`PublishFailure`] values at the publisher boundary.

pub mod analytics;
pub mod error;
pub mod instagram;
pub mod linkedin;
pub mod manager;
pub mod media;
pub mod outcome;
pub mod publisher;
pub(crate) mod retry;
pub mod twitter;
pub mod youtube;

pub use analytics::{AnalyticsTracker, MetricsObserver, PostMetrics, TracingObserver};
pub use error::PublishError;
pub use instagram::{AccountInfo, ContainerStatus, InstagramPublisher, MediaContainer, TokenInfo};
pub use linkedin::LinkedInPublisher;
pub use manager::{PublisherRegistry, PublishingManager};
pub use media::{MediaHandler, MediaRejection, Optimized};
pub use outcome::{FailureKind, ProviderError, PublishFailure, PublishOutcome, PublishedPost};
pub use publisher::Publisher;
pub use twitter::TwitterPublisher;
pub use youtube::YouTubePublisher;
