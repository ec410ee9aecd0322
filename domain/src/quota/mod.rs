//! Session resource quotas.
//!
//! A [`ResourceQuota`] is attached to one render session and consumed
//! cumulatively by every invocation in it. Consumption never resets while
//! the session is alive.
//!
//! # Check granularity
//!
//! Limits are enforced cooperatively. The sandbox checks elapsed time every
//! [`ResourceQuota::check_interval`] VM instructions, so a runaway loop is
//! stopped at most one interval after the time budget is spent. Memory is
//! enforced by the interpreter allocator on every allocation. The call
//! limit is checked once per invocation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which quota was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitKind {
    /// Too many invocations in the session.
    Calls,
    /// Cumulative wall time spent.
    Time,
    /// Interpreter heap limit reached.
    Memory,
    /// Too many distinct modules loaded in the session.
    Modules,
}

impl LimitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Time => "time",
            Self::Memory => "memory",
            Self::Modules => "modules",
        }
    }

    /// Human-readable explanation shown in place of the module output.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Calls => "Too many script invocations on this page.",
            Self::Time => "The time allocated for running scripts has expired.",
            Self::Memory => "Not enough memory to run the script.",
            Self::Modules => "Too many modules loaded on this page.",
        }
    }
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-session resource limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuota {
    /// Maximum number of invocations.
    pub max_calls: u32,
    /// Maximum cumulative wall time across all loads and invocations.
    pub max_time: Duration,
    /// Maximum interpreter heap size in bytes.
    pub max_memory: usize,
    /// Maximum number of distinct modules held by the module cache.
    pub max_modules: usize,
    /// Number of VM instructions between two time checks.
    pub check_interval: u32,
}

impl Default for ResourceQuota {
    fn default() -> Self {
        Self {
            max_calls: 500,
            max_time: Duration::from_secs(7),
            max_memory: 50 * 1024 * 1024,
            max_modules: 100,
            check_interval: 1000,
        }
    }
}

impl ResourceQuota {
    // ==================== Builder Methods ====================

    pub fn with_max_calls(mut self, max: u32) -> Self {
        self.max_calls = max;
        self
    }

    pub fn with_max_time(mut self, max: Duration) -> Self {
        self.max_time = max;
        self
    }

    pub fn with_max_memory(mut self, bytes: usize) -> Self {
        self.max_memory = bytes;
        self
    }

    pub fn with_max_modules(mut self, max: usize) -> Self {
        self.max_modules = max;
        self
    }

    pub fn with_check_interval(mut self, instructions: u32) -> Self {
        self.check_interval = instructions.max(1);
        self
    }
}

/// Quota consumed so far by a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    /// Invocations that reached the sandbox.
    pub calls: u32,
    /// Wall time spent inside the sandbox.
    pub time: Duration,
    /// Highest interpreter heap size observed, in bytes.
    pub peak_memory: usize,
}

impl QuotaUsage {
    /// Remaining wall time before the time limit trips.
    pub fn remaining_time(&self, quota: &ResourceQuota) -> Duration {
        quota.max_time.saturating_sub(self.time)
    }
}

/// Read-only snapshot of a session's limits for the host's diagnostics report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitReport {
    pub engine: String,
    pub invocations: u32,
    pub max_calls: u32,
    pub time: Duration,
    pub max_time: Duration,
    pub peak_memory: usize,
    pub max_memory: usize,
    pub modules_loaded: usize,
}
