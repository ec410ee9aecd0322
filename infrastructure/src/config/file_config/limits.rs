//! Resource limits from TOML (`[limits]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wikiscript_domain::{ConfigIssue, ConfigIssueCode, ResourceQuota, Severity};

/// Time limits above this let one page hold a render worker for too long.
const MAX_REASONABLE_TIME_MS: u64 = 60_000;

/// Raw per-session limits from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLimitsConfig {
    /// Maximum invocations per page render
    pub max_calls: u32,
    /// Wall-time budget per page render, in milliseconds
    pub max_time_ms: u64,
    /// Interpreter memory limit, in MiB
    pub max_memory_mb: usize,
    /// Maximum distinct modules per page render
    pub max_modules: usize,
    /// VM instructions between two time checks
    pub check_interval: u32,
}

impl Default for FileLimitsConfig {
    fn default() -> Self {
        let quota = ResourceQuota::default();
        Self {
            max_calls: quota.max_calls,
            max_time_ms: quota.max_time.as_millis() as u64,
            max_memory_mb: quota.max_memory / (1024 * 1024),
            max_modules: quota.max_modules,
            check_interval: quota.check_interval,
        }
    }
}

impl FileLimitsConfig {
    pub fn to_quota(&self) -> ResourceQuota {
        ResourceQuota::default()
            .with_max_calls(self.max_calls)
            .with_max_time(Duration::from_millis(self.max_time_ms))
            .with_max_memory(self.max_memory_mb.saturating_mul(1024 * 1024))
            .with_max_modules(self.max_modules)
            .with_check_interval(self.check_interval)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let zero_checks = [
            ("max_calls", self.max_calls == 0),
            ("max_time_ms", self.max_time_ms == 0),
            ("max_memory_mb", self.max_memory_mb == 0),
            ("max_modules", self.max_modules == 0),
            ("check_interval", self.check_interval == 0),
        ];
        for (name, is_zero) in zero_checks {
            if is_zero {
                let field = format!("limits.{}", name);
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    message: format!("{} must be greater than 0", field),
                    code: ConfigIssueCode::ZeroLimit { field },
                });
            }
        }

        if self.max_time_ms > MAX_REASONABLE_TIME_MS {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::ExcessiveLimit {
                    field: "limits.max_time_ms".to_string(),
                },
                message: format!(
                    "limits.max_time_ms is above {}; one slow page can stall a render worker",
                    MAX_REASONABLE_TIME_MS
                ),
            });
        }

        issues
    }
}
