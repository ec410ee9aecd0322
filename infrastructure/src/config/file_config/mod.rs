//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to the application's
//! [`EngineConfig`] with [`FileConfig::to_engine_config`].

mod limits;
mod modules;
mod render;

pub use limits::FileLimitsConfig;
pub use modules::FileModulesConfig;
pub use render::FileRenderConfig;

use serde::{Deserialize, Serialize};
use wikiscript_application::EngineConfig;
use wikiscript_domain::{ConfigIssue, ConfigIssueCode, Severity};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Per-session resource limits
    pub limits: FileLimitsConfig,
    /// Where module source lives
    pub modules: FileModulesConfig,
    /// Page rendering settings
    pub render: FileRenderConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// It checks:
    /// 1. Limits that must be positive
    /// 2. Limits large enough to stall a worker
    /// 3. The module directory exists
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.limits.validate();

        if self.render.workers == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::ZeroLimit {
                    field: "render.workers".to_string(),
                },
                message: "render.workers is 0, using 1 worker".to_string(),
            });
        }

        if !self.modules.directory.is_dir() {
            let path = self.modules.directory.display().to_string();
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                message: format!(
                    "modules.directory '{}' does not exist; every module will be missing",
                    path
                ),
                code: ConfigIssueCode::MissingModuleDirectory { path },
            });
        }

        issues
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_quota(self.limits.to_quota())
            .with_render_workers(self.render.workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[limits]
max_calls = 10
max_time_ms = 1500
max_memory_mb = 16
max_modules = 5
check_interval = 200

[modules]
directory = "lua/modules"

[render]
workers = 2
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.max_calls, 10);
        assert_eq!(config.modules.directory.to_str(), Some("lua/modules"));

        let engine = config.to_engine_config();
        assert_eq!(engine.quota.max_time, Duration::from_millis(1500));
        assert_eq!(engine.quota.max_memory, 16 * 1024 * 1024);
        assert_eq!(engine.quota.max_modules, 5);
        assert_eq!(engine.quota.check_interval, 200);
        assert_eq!(engine.render_workers, 2);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[limits]
max_calls = 3
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.max_calls, 3);
        // Defaults should apply
        assert_eq!(config.limits.max_time_ms, 7000);
        assert_eq!(config.modules, FileModulesConfig::default());
        assert_eq!(config.render.workers, 4);
    }

    #[test]
    fn test_default_config_matches_engine_defaults() {
        assert_eq!(FileConfig::default().to_engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_validate_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FileConfig::default();
        config.modules.directory = dir.path().join("absent");

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::MissingModuleDirectory { .. }
        ));

        config.modules.directory = dir.path().to_path_buf();
        assert!(config.validate().is_empty());
    }
}
