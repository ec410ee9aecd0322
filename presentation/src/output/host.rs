//! Host (HTML) formatter
//!
//! Produces the fragments a wiki host embeds in rendered pages and edit
//! forms. Every piece of module-controlled text is escaped, so neither an
//! error message nor a diagnostic can inject markup.

use crate::output::formatter::{OutputFormatter, limit_report_lines, validation_heading};
use wikiscript_domain::{InvocationError, LimitReport, ValidationReport};

/// Formats results as host HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFormatter;

impl HostFormatter {
    /// Success text as-is; failure as an inline error.
    ///
    /// Module output is page content (it is further processed by the host's
    /// own parser), so only error text is escaped here.
    pub fn invocation(result: &Result<String, InvocationError>) -> String {
        match result {
            Ok(text) => text.clone(),
            Err(e) => format!(
                r#"<strong class="error">{}</strong>"#,
                escape_html(&e.to_string())
            ),
        }
    }

    /// Error panel shown above the edit form; `None` for valid source.
    pub fn validation_panel(report: &ValidationReport) -> Option<String> {
        if report.is_valid() {
            return None;
        }

        let lines = match report.diagnostics() {
            [only] => format!(": {}", escape_html(&only.to_string())),
            many => many
                .iter()
                .map(|d| format!("* {}", escape_html(&d.to_string())))
                .collect::<Vec<_>>()
                .join("\n"),
        };

        Some(format!(
            "<div class=\"errorbox\">\n{}\n{}\n</div>\n<br clear=\"all\" />",
            validation_heading(report),
            lines
        ))
    }

    /// Limit report, as an HTML comment appended to the rendered page.
    pub fn limit_report(report: &LimitReport) -> String {
        let body: String = limit_report_lines(report)
            .into_iter()
            .map(|(label, value)| format!("{}: {}\n", label, escape_html(&value)))
            .collect();
        format!("<!--\n{}-->", body.replace("--", "- -"))
    }
}

impl OutputFormatter for HostFormatter {
    fn invocation(&self, result: &Result<String, InvocationError>) -> String {
        Self::invocation(result)
    }

    fn validation(&self, report: &ValidationReport) -> Option<String> {
        Self::validation_panel(report)
    }

    fn limits(&self, report: &LimitReport) -> String {
        Self::limit_report(report)
    }
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}
