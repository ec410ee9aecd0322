//! Quota metering for one sandbox VM.
//!
//! The meter is shared between the sandbox and the VM's instruction hook.
//! Wall time only accrues while Lua code runs (loads and invocations), and
//! is checked by the hook every `check_interval` instructions, so a runaway
//! loop overshoots the limit by at most one interval. A single long-running
//! library call (a huge `string.rep`, say) is not interrupted until it
//! returns to Lua; the memory limit covers that case instead.
//!
//! Once any limit trips the meter stays tripped. The hook then fails every
//! check, so a module cannot keep running by catching the error with `pcall`.

use mlua::prelude::*;
use mlua::{HookTriggers, VmState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::info;
use wikiscript_application::SandboxError;
use wikiscript_domain::{LimitKind, QuotaUsage, ResourceQuota};

#[derive(Debug)]
struct MeterState {
    max_calls: u32,
    max_time: Duration,
    calls: u32,
    spent: Duration,
    running_since: Option<Instant>,
    peak_memory: usize,
    tripped: Option<LimitKind>,
}

impl MeterState {
    fn elapsed(&self) -> Duration {
        self.spent + self.running_since.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn trip(&mut self, limit: LimitKind) -> LimitKind {
        if self.tripped.is_none() {
            info!(limit = limit.as_str(), "Sandbox quota exceeded");
            self.tripped = Some(limit);
        }
        self.tripped.unwrap_or(limit)
    }
}

#[derive(Debug, Clone)]
pub struct QuotaMeter {
    state: Arc<Mutex<MeterState>>,
}

impl QuotaMeter {
    pub fn new(quota: &ResourceQuota) -> Self {
        Self {
            state: Arc::new(Mutex::new(MeterState {
                max_calls: quota.max_calls,
                max_time: quota.max_time,
                calls: 0,
                spent: Duration::ZERO,
                running_since: None,
                peak_memory: 0,
                tripped: None,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MeterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install the instruction hook that enforces the time limit.
    pub fn install(&self, lua: &Lua, check_interval: u32) {
        let meter = self.clone();
        lua.set_hook(
            HookTriggers::new().every_nth_instruction(check_interval.max(1)),
            move |lua, _debug| {
                meter.observe_memory(lua.used_memory());
                match meter.check_time() {
                    Ok(()) => Ok(VmState::Continue),
                    Err(limit) => Err(LuaError::runtime(format!(
                        "{} limit exceeded",
                        limit.as_str()
                    ))),
                }
            },
        );
    }

    /// Fail if any limit has already tripped.
    pub fn ensure_open(&self) -> Result<(), SandboxError> {
        match self.state().tripped {
            Some(limit) => Err(SandboxError::ResourceExceeded(limit)),
            None => Ok(()),
        }
    }

    /// Count one invocation against the call limit.
    pub fn count_call(&self) -> Result<(), SandboxError> {
        let mut state = self.state();
        if state.calls >= state.max_calls {
            let limit = state.trip(LimitKind::Calls);
            return Err(SandboxError::ResourceExceeded(limit));
        }
        state.calls += 1;
        Ok(())
    }

    /// Run Lua code with the clock running.
    ///
    /// The lock is released while `f` runs; the hook takes it on each check.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Result<T, SandboxError> {
        {
            let mut state = self.state();
            if state.elapsed() >= state.max_time {
                let limit = state.trip(LimitKind::Time);
                return Err(SandboxError::ResourceExceeded(limit));
            }
            state.running_since = Some(Instant::now());
        }

        let result = f();

        let mut state = self.state();
        if let Some(started) = state.running_since.take() {
            state.spent += started.elapsed();
        }
        Ok(result)
    }

    fn check_time(&self) -> Result<(), LimitKind> {
        let mut state = self.state();
        if let Some(limit) = state.tripped {
            return Err(limit);
        }
        if state.elapsed() > state.max_time {
            return Err(state.trip(LimitKind::Time));
        }
        Ok(())
    }

    pub fn observe_memory(&self, used: usize) {
        let mut state = self.state();
        state.peak_memory = state.peak_memory.max(used);
    }

    pub fn trip(&self, limit: LimitKind) -> LimitKind {
        self.state().trip(limit)
    }

    pub fn tripped(&self) -> Option<LimitKind> {
        self.state().tripped
    }

    pub fn usage(&self) -> QuotaUsage {
        let state = self.state();
        QuotaUsage {
            calls: state.calls,
            time: state.elapsed(),
            peak_memory: state.peak_memory,
        }
    }
}
