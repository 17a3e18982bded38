//! Per-loader configuration.

use serde::Deserialize;

/// Tuning switches for a single loader. The defaults reproduce the plain batch algorithm:
/// every referenced id is sent to the fetcher, and children are preloaded one after another.
///
/// The struct deserializes from any serde format, with missing fields falling back to
/// their defaults:
///
/// ```rust
/// use preloader::LoaderConfig;
///
/// let config: LoaderConfig = serde_json::from_str(r#"{ "dedup_node_ids": true }"#).unwrap();
/// assert!(config.dedup_node_ids);
/// assert!(!config.concurrent_children);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Drop repeated node ids before calling the fetcher.
    pub dedup_node_ids: bool,
    /// Preload attached children concurrently instead of in attachment order.
    pub concurrent_children: bool,
}

impl LoaderConfig {
    pub fn with_dedup_node_ids(mut self, enabled: bool) -> Self {
        self.dedup_node_ids = enabled;
        self
    }

    pub fn with_concurrent_children(mut self, enabled: bool) -> Self {
        self.concurrent_children = enabled;
        self
    }
}
