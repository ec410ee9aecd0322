//! Invoke Module use case.
//!
//! The dispatcher the host calls for `{{#invoke:Module|function|args}}` and
//! for the `main` shorthand. Every failure is returned as an
//! [`InvocationError`]; nothing escapes as a panic, so a broken module only
//! costs the host one inline error, never the whole render.

use crate::cache::CacheError;
use crate::ports::argument_expander::ArgumentExpander;
use crate::ports::scripting_engine::SandboxError;
use crate::ports::source_resolver::{ResolveError, SourceResolverPort};
use crate::session::RenderSession;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use wikiscript_domain::scripting::join_display;
use wikiscript_domain::{ErrorKind, InvocationError, LimitKind, ModuleIdentifier, ScriptValue};

/// Function called when the host gives no explicit name.
pub const MAIN_FUNCTION: &str = "main";

/// Longest result preview written to the debug log.
const LOG_PREVIEW_BYTES: usize = 80;

/// Use case for dispatching module invocations.
///
/// Flow of one invocation:
/// 1. Parse the module identifier (`NoSuchModule` if invalid)
/// 2. Get or load the module through the session cache (`NoSuchModule` if it does not resolve)
/// 3. Look up the export (`NoSuchFunction`)
/// 4. Expand the raw arguments, once each, left to right
/// 5. Invoke under the session quota
/// 6. Concatenate the return values and trim
#[derive(Clone)]
pub struct InvokeModuleUseCase {
    resolver: Arc<dyn SourceResolverPort>,
}

impl InvokeModuleUseCase {
    pub fn new(resolver: Arc<dyn SourceResolverPort>) -> Self {
        Self { resolver }
    }

    /// `{{#invoke:Module|function|args...}}`.
    ///
    /// `raw_args[0]` names the module and `raw_args[1]` the function; the
    /// rest are passed to the function.
    pub fn invoke_named<N>(
        &self,
        session: &mut RenderSession,
        raw_args: &[N],
        expander: &dyn ArgumentExpander<N>,
    ) -> Result<String, InvocationError> {
        let [module, function, args @ ..] = raw_args else {
            session.record(Default::default(), false);
            return Err(InvocationError::missing_arguments());
        };
        let module_name = expander.expand(module);
        let function_name = expander.expand(function);
        self.invoke(session, &module_name, &function_name, args, expander)
    }

    /// `{{script:Module|args...}}`: like [`invoke_named`](Self::invoke_named)
    /// with the function fixed to `main`.
    pub fn invoke_main<N>(
        &self,
        session: &mut RenderSession,
        raw_args: &[N],
        expander: &dyn ArgumentExpander<N>,
    ) -> Result<String, InvocationError> {
        let [module, args @ ..] = raw_args else {
            session.record(Default::default(), false);
            return Err(InvocationError::missing_arguments());
        };
        let module_name = expander.expand(module);
        self.invoke(session, &module_name, MAIN_FUNCTION, args, expander)
    }

    /// Invoke with module and function names already known.
    pub fn invoke<N>(
        &self,
        session: &mut RenderSession,
        module_name: &str,
        function_name: &str,
        args: &[N],
        expander: &dyn ArgumentExpander<N>,
    ) -> Result<String, InvocationError> {
        let started = Instant::now();
        let result = self.dispatch(session, module_name, function_name.trim(), args, expander);
        session.record(started.elapsed(), result.is_ok());

        match &result {
            Ok(text) => debug!(
                module = module_name,
                function = function_name,
                "Invocation returned {:?}",
                preview(text)
            ),
            Err(e) if e.is_resource_exceeded() => info!(
                module = module_name,
                function = function_name,
                "Invocation stopped by quota: {}",
                e.message
            ),
            Err(e) => debug!(
                module = module_name,
                function = function_name,
                kind = ?e.kind,
                "Invocation failed: {}",
                e.message
            ),
        }
        result
    }

    fn dispatch<N>(
        &self,
        session: &mut RenderSession,
        module_name: &str,
        function_name: &str,
        args: &[N],
        expander: &dyn ArgumentExpander<N>,
    ) -> Result<String, InvocationError> {
        if function_name.is_empty() {
            return Err(InvocationError::missing_arguments());
        }
        if session.usage().calls >= session.quota().max_calls {
            return Err(InvocationError::resource_exceeded(LimitKind::Calls));
        }

        let identifier = ModuleIdentifier::parse(module_name)
            .map_err(|_| InvocationError::no_such_module(module_name.trim()))?;
        let module = session
            .load_module(&identifier, self.resolver.as_ref())
            .map_err(|e| from_cache_error(e, &identifier))?;

        if module.function(function_name).is_none() {
            return Err(InvocationError::no_such_function(
                identifier.title(),
                function_name,
            ));
        }

        let values: Vec<ScriptValue> = args
            .iter()
            .map(|node| ScriptValue::String(expander.expand(node)))
            .collect();

        let returned = session
            .call(&module, function_name, &values)
            .map_err(|e| from_invoke_error(e, &identifier, function_name))?;

        Ok(join_display(&returned).trim().to_string())
    }
}

fn from_cache_error(error: CacheError, identifier: &ModuleIdentifier) -> InvocationError {
    let title = identifier.title();
    match error {
        CacheError::Resolve(ResolveError::NotFound(_)) => InvocationError::no_such_module(title),
        CacheError::Resolve(ResolveError::Unavailable { reason, .. }) => InvocationError::new(
            ErrorKind::LoadError,
            format!("Could not read {}: {}", title, reason),
        )
        .with_module(title),
        CacheError::TooManyModules(_) => {
            InvocationError::resource_exceeded(LimitKind::Modules).with_module(title)
        }
        CacheError::Load(SandboxError::ResourceExceeded(limit)) => {
            InvocationError::resource_exceeded(limit).with_module(title)
        }
        CacheError::Load(e) => {
            InvocationError::new(ErrorKind::LoadError, e.to_string()).with_module(title)
        }
    }
}

fn from_invoke_error(
    error: SandboxError,
    identifier: &ModuleIdentifier,
    function: &str,
) -> InvocationError {
    let title = identifier.title();
    match error {
        SandboxError::NoSuchFunction(_) => InvocationError::no_such_function(title, function),
        SandboxError::ResourceExceeded(limit) => InvocationError::resource_exceeded(limit)
            .with_module(title)
            .with_function(function),
        e => InvocationError::new(ErrorKind::RuntimeFault, e.to_string())
            .with_module(title)
            .with_function(function),
    }
}

fn preview(text: &str) -> &str {
    if text.len() <= LOG_PREVIEW_BYTES {
        return text;
    }
    let mut end = LOG_PREVIEW_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::argument_expander::LiteralExpander;
    use crate::test_support::{FakeEngine, FakeResolver, RecordingExpander};
    use wikiscript_domain::ResourceQuota;

    fn setup(resolver: FakeResolver) -> (InvokeModuleUseCase, FakeEngine, RenderSession) {
        setup_with_quota(resolver, ResourceQuota::default())
    }

    fn setup_with_quota(
        resolver: FakeResolver,
        quota: ResourceQuota,
    ) -> (InvokeModuleUseCase, FakeEngine, RenderSession) {
        let engine = FakeEngine::default();
        let session = RenderSession::new(&engine, quota).unwrap();
        (InvokeModuleUseCase::new(Arc::new(resolver)), engine, session)
    }

    fn greeter() -> FakeResolver {
        FakeResolver::default().with_module("Greeter", "hello\nmain\necho\npadded\nfail")
    }

    // ==================== Greeter example ====================

    #[test]
    fn test_hello_world() {
        let (dispatcher, _, mut session) = setup(greeter());
        let result =
            dispatcher.invoke_named(&mut session, &["Greeter", "hello", "World"], &LiteralExpander);
        assert_eq!(result.unwrap(), "Hello, World");
    }

    #[test]
    fn test_absent_function() {
        let (dispatcher, _, mut session) = setup(greeter());
        let error = dispatcher
            .invoke_named(&mut session, &["Greeter", "absent"], &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NoSuchFunction);
        assert_eq!(error.module.as_deref(), Some("Module:Greeter"));
        assert_eq!(error.function.as_deref(), Some("absent"));
    }

    #[test]
    fn test_missing_module_fails_before_any_load() {
        let (dispatcher, engine, mut session) = setup(greeter());
        let error = dispatcher
            .invoke_named(&mut session, &["Missing", "main"], &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NoSuchModule);
        assert_eq!(engine.loads(), 0);
    }

    #[test]
    fn test_invalid_title_is_no_such_module() {
        let (dispatcher, engine, mut session) = setup(greeter());
        let error = dispatcher
            .invoke_named(&mut session, &["Foo|bar", "main"], &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::NoSuchModule);
        assert_eq!(engine.loads(), 0);
    }

    // ==================== Argument handling ====================

    #[test]
    fn test_missing_arguments() {
        let (dispatcher, _, mut session) = setup(greeter());
        let none: [&str; 0] = [];

        let error = dispatcher
            .invoke_named(&mut session, &["Greeter"], &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MissingArguments);

        let error = dispatcher
            .invoke_main(&mut session, &none, &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MissingArguments);

        let error = dispatcher
            .invoke_named(&mut session, &["Greeter", "  "], &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::MissingArguments);

        assert_eq!(session.stats().invocations, 3);
        assert_eq!(session.stats().failures, 3);
    }

    #[test]
    fn test_arguments_expanded_once_in_order() {
        let (dispatcher, _, mut session) = setup(greeter());
        let expander = RecordingExpander::default();

        let result = dispatcher.invoke_named(
            &mut session,
            &["Greeter", "echo", "a", "b", "c"],
            &expander,
        );

        assert_eq!(result.unwrap(), "abc");
        assert_eq!(
            *expander.expanded.borrow(),
            ["Greeter", "echo", "a", "b", "c"]
        );
    }

    #[test]
    fn test_arguments_not_expanded_when_function_missing() {
        let (dispatcher, _, mut session) = setup(greeter());
        let expander = RecordingExpander::default();

        let _ = dispatcher.invoke_named(&mut session, &["Greeter", "nope", "x", "y"], &expander);

        assert_eq!(*expander.expanded.borrow(), ["Greeter", "nope"]);
    }

    #[test]
    fn test_result_is_trimmed() {
        let (dispatcher, _, mut session) = setup(greeter());
        let result = dispatcher.invoke_named(&mut session, &["Greeter", "padded"], &LiteralExpander);
        assert_eq!(result.unwrap(), "padded");
    }

    // ==================== main shorthand ====================

    #[test]
    fn test_invoke_main_matches_invoke_named_main() {
        let resolver = FakeResolver::default().with_module("Greeter", "main");
        let (dispatcher, _, mut session) = setup(resolver);

        let via_main = dispatcher.invoke_main(&mut session, &["Greeter", "x", "y"], &LiteralExpander);
        let via_named =
            dispatcher.invoke_named(&mut session, &["Greeter", "main", "x", "y"], &LiteralExpander);

        assert_eq!(via_main, via_named);
        assert_eq!(via_main.unwrap(), "main:x,y");
    }

    // ==================== Cache behavior ====================

    #[test]
    fn test_one_load_across_functions() {
        let (dispatcher, engine, mut session) = setup(greeter());

        for function in ["hello", "main", "echo", "hello"] {
            dispatcher
                .invoke_named(&mut session, &["Greeter", function, "x"], &LiteralExpander)
                .unwrap();
        }

        assert_eq!(engine.loads(), 1);
        assert_eq!(session.cache().loads(), 1);
        assert_eq!(session.cache().hits(), 3);
    }

    // ==================== Failures ====================

    #[test]
    fn test_runtime_fault() {
        let (dispatcher, _, mut session) = setup(greeter());
        let error = dispatcher
            .invoke_named(&mut session, &["Greeter", "fail"], &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::RuntimeFault);
        assert_eq!(error.message, "boom");
        assert!(!error.is_resource_exceeded());
    }

    #[test]
    fn test_load_error() {
        let resolver = FakeResolver::default().with_module("Broken", "!bad");
        let (dispatcher, _, mut session) = setup(resolver);
        let error = dispatcher
            .invoke_named(&mut session, &["Broken", "main"], &LiteralExpander)
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::LoadError);
        assert_eq!(error.module.as_deref(), Some("Module:Broken"));
    }

    #[test]
    fn test_time_limit_is_sticky() {
        let resolver = FakeResolver::default().with_module("Loop", "spin\nmain");
        let (dispatcher, _, mut session) = setup(resolver);

        let first = dispatcher
            .invoke_named(&mut session, &["Loop", "spin"], &LiteralExpander)
            .unwrap_err();
        let second = dispatcher
            .invoke_named(&mut session, &["Loop", "main"], &LiteralExpander)
            .unwrap_err();

        assert_eq!(first.kind, ErrorKind::ResourceExceeded(LimitKind::Time));
        assert_eq!(second.kind, ErrorKind::ResourceExceeded(LimitKind::Time));
    }

    #[test]
    fn test_call_limit() {
        let quota = ResourceQuota::default().with_max_calls(2);
        let (dispatcher, _, mut session) = setup_with_quota(greeter(), quota);

        for _ in 0..2 {
            dispatcher
                .invoke_named(&mut session, &["Greeter", "main"], &LiteralExpander)
                .unwrap();
        }
        let error = dispatcher
            .invoke_named(&mut session, &["Greeter", "main"], &LiteralExpander)
            .unwrap_err();

        assert_eq!(error.kind, ErrorKind::ResourceExceeded(LimitKind::Calls));
        assert!(error.is_resource_exceeded());
        assert_eq!(session.usage().calls, 2);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "é".repeat(60);
        let cut = preview(&text);
        assert!(cut.len() <= LOG_PREVIEW_BYTES);
        assert!(text.starts_with(cut));
    }
}
