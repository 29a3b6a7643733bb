//! Post-publish metric snapshots and their observers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use yukti_core::Platform;

/// Metrics captured for one published post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostMetrics {
    pub timestamp: DateTime<Utc>,
    pub platform: Platform,
    pub post_id: String,
    /// Empty until a platform insights integration reports values.
    pub metrics: BTreeMap<String, f64>,
}

/// Receives every new snapshot.
pub trait MetricsObserver: Send + Sync {
    fn update(&self, metrics: &PostMetrics);
}

/// Logs snapshots at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MetricsObserver for TracingObserver {
    fn update(&self, metrics: &PostMetrics) {
        tracing::info!(
            platform = %metrics.platform,
            post_id = %metrics.post_id,
            metric_count = metrics.metrics.len(),
            "post tracked"
        );
    }
}

#[derive(Default)]
pub struct AnalyticsTracker {
    observers: Vec<Arc<dyn MetricsObserver>>,
    cache: HashMap<String, PostMetrics>,
}

impl AnalyticsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Arc<dyn MetricsObserver>) {
        self.observers.push(observer);
    }

    /// Records a snapshot for `post_id`, replacing any earlier one, and
    /// notifies observers in registration order.
    pub fn track_post(&mut self, platform: Platform, post_id: &str) -> PostMetrics {
        let snapshot = PostMetrics {
            timestamp: Utc::now(),
            platform,
            post_id: post_id.to_string(),
            metrics: BTreeMap::new(),
        };
        for observer in &self.observers {
            observer.update(&snapshot);
        }
        self.cache.insert(snapshot.post_id.clone(), snapshot.clone());
        snapshot
    }

    #[must_use]
    pub fn metrics(&self, post_id: &str) -> Option<&PostMetrics> {
        self.cache.get(post_id)
    }
}
