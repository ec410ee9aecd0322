//! Console output formatter

use crate::output::formatter::{OutputFormatter, limit_report_lines, validation_heading};
use colored::Colorize;
use wikiscript_domain::{InvocationError, LimitReport, ValidationReport};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn invocation(result: &Result<String, InvocationError>) -> String {
        match result {
            Ok(text) => text.clone(),
            Err(e) => {
                let mut output = format!("{} {}", "Script error:".red().bold(), e.message);
                let location = match (&e.module, &e.function) {
                    (Some(module), Some(function)) => Some(format!("{}|{}", module, function)),
                    (Some(module), None) => Some(module.clone()),
                    _ => None,
                };
                if let Some(location) = location {
                    output.push_str(&format!(" {}", format!("({})", location).dimmed()));
                }
                output
            }
        }
    }

    pub fn validation(report: &ValidationReport) -> Option<String> {
        if report.is_valid() {
            return None;
        }
        let mut output = format!("{}\n", validation_heading(report).red().bold());
        for diagnostic in report {
            let position = match diagnostic.line {
                Some(line) => format!("line {:>4}", line).yellow().to_string(),
                None => "         ".to_string(),
            };
            output.push_str(&format!("  {}  {}\n", position, diagnostic.message));
        }
        Some(output)
    }

    pub fn limit_report(report: &LimitReport) -> String {
        let mut output = Self::section_header("Limit report");
        for (label, value) in limit_report_lines(report) {
            output.push_str(&format!("{} {}\n", format!("{}:", label).cyan(), value));
        }
        output
    }

    /// Heading shown before each page's output in `render`.
    pub fn page_header(page: &str) -> String {
        Self::header(page)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn invocation(&self, result: &Result<String, InvocationError>) -> String {
        Self::invocation(result)
    }

    fn validation(&self, report: &ValidationReport) -> Option<String> {
        Self::validation(report)
    }

    fn limits(&self, report: &LimitReport) -> String {
        Self::limit_report(report)
    }
}
