//! Output formatter trait

use wikiscript_domain::{InvocationError, LimitReport, ValidationReport};

/// Trait for formatting engine results
pub trait OutputFormatter {
    /// Format the result of one invocation
    fn invocation(&self, result: &Result<String, InvocationError>) -> String;

    /// Format validation diagnostics; `None` when the source is valid
    fn validation(&self, report: &ValidationReport) -> Option<String>;

    /// Format a session's limit report
    fn limits(&self, report: &LimitReport) -> String;
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// The limit report as `(label, value)` pairs, in display order.
///
/// ```text
/// Script engine: Lua 5.4
/// Script invocations: 3/500
/// Script time usage: 0.012/7.000 seconds
/// Script memory usage: 1.25/50.00 MB
/// Script modules loaded: 2
/// ```
pub fn limit_report_lines(report: &LimitReport) -> Vec<(&'static str, String)> {
    vec![
        ("Script engine", report.engine.clone()),
        (
            "Script invocations",
            format!("{}/{}", report.invocations, report.max_calls),
        ),
        (
            "Script time usage",
            format!(
                "{:.3}/{:.3} seconds",
                report.time.as_secs_f64(),
                report.max_time.as_secs_f64()
            ),
        ),
        (
            "Script memory usage",
            format!(
                "{:.2}/{:.2} MB",
                report.peak_memory as f64 / BYTES_PER_MB,
                report.max_memory as f64 / BYTES_PER_MB
            ),
        ),
        ("Script modules loaded", report.modules_loaded.to_string()),
    ]
}

/// Header line of a validation panel.
pub fn validation_heading(report: &ValidationReport) -> String {
    match report.len() {
        1 => "Script error:".to_string(),
        n => format!("{} script errors:", n),
    }
}
