//! Report Limits use case.

use crate::session::RenderSession;
use wikiscript_domain::LimitReport;

/// Snapshots a session's resource usage for the host's limit report.
///
/// Reporting is read-only: it neither consumes quota nor touches the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportLimitsUseCase;

impl ReportLimitsUseCase {
    pub fn report(&self, session: &RenderSession) -> LimitReport {
        let quota = session.quota();
        let usage = session.usage();
        LimitReport {
            engine: session.engine_name().to_string(),
            invocations: usage.calls,
            max_calls: quota.max_calls,
            time: usage.time,
            max_time: quota.max_time,
            peak_memory: usage.peak_memory,
            max_memory: quota.max_memory,
            modules_loaded: session.cache().loaded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::argument_expander::LiteralExpander;
    use crate::test_support::{FakeEngine, FakeResolver};
    use crate::use_cases::invoke_module::InvokeModuleUseCase;
    use std::sync::Arc;
    use std::time::Duration;
    use wikiscript_domain::ResourceQuota;

    #[test]
    fn test_fresh_session_report() {
        let engine = FakeEngine::default();
        let quota = ResourceQuota::default().with_max_calls(20);
        let session = RenderSession::new(&engine, quota).unwrap();

        let report = ReportLimitsUseCase.report(&session);
        assert_eq!(report.engine, "Fake");
        assert_eq!(report.invocations, 0);
        assert_eq!(report.max_calls, 20);
        assert_eq!(report.max_time, Duration::from_secs(7));
        assert_eq!(report.modules_loaded, 0);
    }

    #[test]
    fn test_report_reflects_usage_without_consuming_it() {
        let engine = FakeEngine::default();
        let mut session = RenderSession::new(&engine, ResourceQuota::default()).unwrap();
        let resolver = FakeResolver::default()
            .with_module("A", "main")
            .with_module("B", "main");
        let dispatcher = InvokeModuleUseCase::new(Arc::new(resolver));

        for module in ["A", "A", "B"] {
            dispatcher
                .invoke_main(&mut session, &[module], &LiteralExpander)
                .unwrap();
        }

        let first = ReportLimitsUseCase.report(&session);
        let second = ReportLimitsUseCase.report(&session);
        assert_eq!(first, second);
        assert_eq!(first.invocations, 3);
        assert_eq!(first.modules_loaded, 2);
        assert_eq!(first.time, Duration::from_millis(3));
    }

    #[test]
    fn test_failed_loads_are_not_counted_as_loaded() {
        let engine = FakeEngine::default();
        let mut session = RenderSession::new(&engine, ResourceQuota::default()).unwrap();
        let resolver = FakeResolver::default()
            .with_module("Good", "main")
            .with_module("Broken", "!main");
        let dispatcher = InvokeModuleUseCase::new(Arc::new(resolver));

        assert!(dispatcher.invoke_main(&mut session, &["Good"], &LiteralExpander).is_ok());
        assert!(dispatcher.invoke_main(&mut session, &["Broken"], &LiteralExpander).is_err());

        let report = ReportLimitsUseCase.report(&session);
        assert_eq!(session.cache().len(), 2);
        assert_eq!(report.modules_loaded, 1);
    }
}
