//! Render Page use case.
//!
//! Runs every invocation of one page inside a single [`RenderSession`], in
//! page order, and collects the outputs together with the session's limit
//! report. A failed invocation only fills its own slot; the rest of the page
//! still renders.

use crate::ports::argument_expander::LiteralExpander;
use crate::ports::scripting_engine::{SandboxError, ScriptEnginePort};
use crate::session::{RenderSession, SessionStats};
use crate::use_cases::invoke_module::InvokeModuleUseCase;
use crate::use_cases::report_limits::ReportLimitsUseCase;
use std::sync::Arc;
use tracing::info;
use wikiscript_domain::{InvocationError, LimitReport, ResourceQuota};

/// One `{{#invoke:...}}` occurrence with its arguments already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub module: String,
    /// `None` selects the `main` shorthand.
    pub function: Option<String>,
    pub args: Vec<String>,
}

impl InvocationRequest {
    pub fn named(
        module: impl Into<String>,
        function: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            module: module.into(),
            function: Some(function.into()),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn main(module: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            module: module.into(),
            function: None,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `Module|function|arg|...`. A bare `Module` selects `main`.
    ///
    /// Returns `None` for blank lines and `#` comments.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut parts = line.split('|');
        let module = parts.next().unwrap_or_default().to_string();
        let function = parts.next().map(str::to_string);
        Some(Self {
            module,
            function,
            args: parts.map(str::to_string).collect(),
        })
    }
}

/// Outcome of rendering one page.
#[derive(Debug)]
pub struct PageRender {
    pub outputs: Vec<Result<String, InvocationError>>,
    pub limits: LimitReport,
    pub stats: SessionStats,
}

impl PageRender {
    pub fn failures(&self) -> usize {
        self.outputs.iter().filter(|o| o.is_err()).count()
    }
}

#[derive(Clone)]
pub struct RenderPageUseCase {
    engine: Arc<dyn ScriptEnginePort>,
    dispatcher: InvokeModuleUseCase,
    quota: ResourceQuota,
}

impl RenderPageUseCase {
    pub fn new(
        engine: Arc<dyn ScriptEnginePort>,
        dispatcher: InvokeModuleUseCase,
        quota: ResourceQuota,
    ) -> Self {
        Self {
            engine,
            dispatcher,
            quota,
        }
    }

    /// Render one page with a fresh session.
    ///
    /// Only sandbox setup can fail here; invocation failures are reported
    /// per request in [`PageRender::outputs`].
    pub fn execute(&self, page: &str, requests: &[InvocationRequest]) -> Result<PageRender, SandboxError> {
        let mut session = RenderSession::new(self.engine.as_ref(), self.quota.clone())?;

        let outputs = requests
            .iter()
            .map(|request| self.invoke(&mut session, request))
            .collect();

        let render = PageRender {
            outputs,
            limits: ReportLimitsUseCase.report(&session),
            stats: session.stats(),
        };
        info!(
            page,
            invocations = render.stats.invocations,
            failures = render.failures(),
            modules = render.limits.modules_loaded,
            "Rendered page"
        );
        Ok(render)
    }

    fn invoke(
        &self,
        session: &mut RenderSession,
        request: &InvocationRequest,
    ) -> Result<String, InvocationError> {
        let mut raw: Vec<&str> = Vec::with_capacity(request.args.len() + 2);
        raw.push(&request.module);
        match &request.function {
            Some(function) => {
                raw.push(function);
                raw.extend(request.args.iter().map(String::as_str));
                self.dispatcher.invoke_named(session, &raw, &LiteralExpander)
            }
            None => {
                raw.extend(request.args.iter().map(String::as_str));
                self.dispatcher.invoke_main(session, &raw, &LiteralExpander)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::scripting_engine::NoScriptEngine;
    use crate::test_support::{FakeEngine, FakeResolver};
    use wikiscript_domain::ErrorKind;

    fn use_case(quota: ResourceQuota) -> (RenderPageUseCase, FakeEngine) {
        let engine = FakeEngine::default();
        let resolver = FakeResolver::default()
            .with_module("Greeter", "hello\nmain\nfail")
            .with_module("Other", "main");
        let dispatcher = InvokeModuleUseCase::new(Arc::new(resolver));
        (
            RenderPageUseCase::new(Arc::new(engine.clone()), dispatcher, quota),
            engine,
        )
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(
            InvocationRequest::parse_line("Greeter|hello|World"),
            Some(InvocationRequest::named("Greeter", "hello", ["World"]))
        );
        assert_eq!(
            InvocationRequest::parse_line("  Greeter  "),
            Some(InvocationRequest::main("Greeter", Vec::<String>::new()))
        );
        assert_eq!(InvocationRequest::parse_line(""), None);
        assert_eq!(InvocationRequest::parse_line("# comment"), None);
    }

    #[test]
    fn test_failure_does_not_abort_page() {
        let (render_page, _) = use_case(ResourceQuota::default());
        let requests = vec![
            InvocationRequest::named("Greeter", "hello", ["World"]),
            InvocationRequest::named("Greeter", "fail", Vec::<String>::new()),
            InvocationRequest::named("Missing", "main", Vec::<String>::new()),
            InvocationRequest::main("Other", Vec::<String>::new()),
        ];

        let render = render_page.execute("Page", &requests).unwrap();

        assert_eq!(render.outputs.len(), 4);
        assert_eq!(render.outputs[0].as_deref(), Ok("Hello, World"));
        assert_eq!(
            render.outputs[1].as_ref().unwrap_err().kind,
            ErrorKind::RuntimeFault
        );
        assert_eq!(
            render.outputs[2].as_ref().unwrap_err().kind,
            ErrorKind::NoSuchModule
        );
        assert_eq!(render.outputs[3].as_deref(), Ok("main:"));
        assert_eq!(render.failures(), 2);
        assert_eq!(render.stats.invocations, 4);
        assert_eq!(render.limits.modules_loaded, 2);
    }

    #[test]
    fn test_each_page_gets_a_fresh_session() {
        let (render_page, engine) = use_case(ResourceQuota::default().with_max_calls(1));
        let requests = vec![InvocationRequest::main("Other", Vec::<String>::new())];

        for _ in 0..3 {
            let render = render_page.execute("Page", &requests).unwrap();
            assert!(render.outputs[0].is_ok());
        }
        assert_eq!(engine.loads(), 3);
    }

    #[test]
    fn test_unavailable_engine_fails_setup() {
        let dispatcher = InvokeModuleUseCase::new(Arc::new(FakeResolver::default()));
        let render_page =
            RenderPageUseCase::new(Arc::new(NoScriptEngine), dispatcher, ResourceQuota::default());
        assert!(render_page.execute("Page", &[]).is_err());
    }
}
