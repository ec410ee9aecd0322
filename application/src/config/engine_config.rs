//! Engine configuration: quota and render parallelism.

use serde::{Deserialize, Serialize};
use wikiscript_domain::ResourceQuota;

/// Application-level settings shared by every render session.
///
/// Built by the infrastructure config loader from the merged TOML/env
/// sources; use cases only ever see this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Limits applied to each session.
    pub quota: ResourceQuota,
    /// Maximum number of pages rendered concurrently.
    pub render_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quota: ResourceQuota::default(),
            render_workers: 4,
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_quota(mut self, quota: ResourceQuota) -> Self {
        self.quota = quota;
        self
    }

    /// At least one worker is always used.
    pub fn with_render_workers(mut self, workers: usize) -> Self {
        self.render_workers = workers.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert_eq!(config.quota, ResourceQuota::default());
        assert_eq!(config.render_workers, 4);
    }

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::default()
            .with_quota(ResourceQuota::default().with_max_calls(3))
            .with_render_workers(0);
        assert_eq!(config.quota.max_calls, 3);
        assert_eq!(config.render_workers, 1);
    }
}
