//! Validate Module use case.
//!
//! Syntax-only checks for module source, run on save or on demand. The
//! source is compiled but never executed, so validation cannot consume a
//! render quota.

use crate::ports::scripting_engine::ScriptEnginePort;
use std::sync::Arc;
use tracing::debug;
use wikiscript_domain::{ModuleIdentifier, ValidationReport, is_module_title};

#[derive(Clone)]
pub struct ValidateModuleUseCase {
    engine: Arc<dyn ScriptEnginePort>,
}

impl ValidateModuleUseCase {
    pub fn new(engine: Arc<dyn ScriptEnginePort>) -> Self {
        Self { engine }
    }

    /// Validate `source`, reporting positions against `display_name`.
    ///
    /// Diagnostics are returned in source order regardless of the order
    /// the engine produced them in.
    pub fn validate(&self, source: &str, display_name: &str) -> ValidationReport {
        let mut report = self.engine.validate(source, display_name);
        report.sort_by_position();
        debug!(
            module = display_name,
            errors = report.len(),
            "Validated module source"
        );
        report
    }

    /// Validate an edit to a page.
    ///
    /// Returns `None` for pages outside the `Module` namespace; those are
    /// not scripts and are saved unchecked.
    pub fn validate_edit(&self, title: &str, text: &str) -> Option<ValidationReport> {
        if !is_module_title(title) {
            return None;
        }
        let display_name = ModuleIdentifier::parse(title)
            .map(|id| id.db_key())
            .unwrap_or_else(|_| title.trim().to_string());
        Some(self.validate(text, &display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeEngine;

    fn use_case() -> ValidateModuleUseCase {
        ValidateModuleUseCase::new(Arc::new(FakeEngine::default()))
    }

    #[test]
    fn test_valid_source_has_no_diagnostics() {
        let report = use_case().validate("hello\nmain", "Module:Greeter");
        assert!(report.is_valid());
    }

    #[test]
    fn test_two_errors_two_diagnostics_in_source_order() {
        // FakeEngine reports bottom-up; the use case restores source order.
        let report = use_case().validate("main\n!first\nok\n!second", "Module:Broken");
        let lines: Vec<_> = report.diagnostics().iter().map(|d| d.line).collect();
        assert_eq!(report.len(), 2);
        assert_eq!(lines, vec![Some(2), Some(4)]);
        assert_eq!(report.diagnostics()[0].message, "first");
    }

    #[test]
    fn test_validate_edit_skips_other_namespaces() {
        assert!(use_case().validate_edit("Template:Greeter", "!bad").is_none());
        assert!(use_case().validate_edit("Greeter", "!bad").is_none());
    }

    #[test]
    fn test_validate_edit_checks_module_pages() {
        let report = use_case()
            .validate_edit("module:data tables", "!bad")
            .unwrap();
        assert_eq!(report.len(), 1);
    }
}
