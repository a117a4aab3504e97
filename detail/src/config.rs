//! Configuration management for the order detail engine.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::environment::FeatureFlags;
use order_detail_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetailConfig {
    /// Load and show shipping labels (default: true)
    pub shipping_labels: bool,
    /// How often `wait_for_idle` polls for running effects, in milliseconds (default: 1)
    pub idle_poll_interval_ms: u64,
    /// `tracing` filter used when no `RUST_LOG` is set
    pub log_filter: String,
}

impl Default for OrderDetailConfig {
    fn default() -> Self {
        Self {
            shipping_labels: true,
            idle_poll_interval_ms: 1,
            log_filter: "order_detail=debug,order_detail_runtime=info".to_string(),
        }
    }
}

impl OrderDetailConfig {
    /// Load configuration from environment variables
    ///
    /// - `ORDER_DETAIL_SHIPPING_LABELS`
    /// - `ORDER_DETAIL_IDLE_POLL_INTERVAL_MS`
    /// - `ORDER_DETAIL_LOG_FILTER`
    ///
    /// Unset or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            shipping_labels: lookup("ORDER_DETAIL_SHIPPING_LABELS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.shipping_labels),
            idle_poll_interval_ms: lookup("ORDER_DETAIL_IDLE_POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .filter(|&ms| ms > 0)
                .unwrap_or(defaults.idle_poll_interval_ms),
            log_filter: lookup("ORDER_DETAIL_LOG_FILTER").unwrap_or(defaults.log_filter),
        }
    }

    /// Feature switches handed to the reducer environment
    #[must_use]
    pub const fn features(&self) -> FeatureFlags {
        FeatureFlags {
            shipping_labels: self.shipping_labels,
        }
    }

    /// Configuration of the underlying store
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(Duration::from_millis(self.idle_poll_interval_ms))
    }
}
