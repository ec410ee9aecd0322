//! JSON output formatter

use crate::output::formatter::OutputFormatter;
use serde::Serialize;
use wikiscript_domain::{InvocationError, LimitReport, ValidationReport};

/// Formats results as JSON, one document per call
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn invocation(&self, result: &Result<String, InvocationError>) -> String {
        Self::render(result)
    }

    fn validation(&self, report: &ValidationReport) -> Option<String> {
        Some(Self::render(report))
    }

    fn limits(&self, report: &LimitReport) -> String {
        Self::render(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikiscript_domain::ErrorKind;

    #[test]
    fn test_invocation_json() {
        let ok: serde_json::Value =
            serde_json::from_str(&JsonFormatter.invocation(&Ok("hi".to_string()))).unwrap();
        assert_eq!(ok["Ok"], "hi");

        let error = InvocationError::new(ErrorKind::MissingArguments, "nope");
        let err: serde_json::Value =
            serde_json::from_str(&JsonFormatter.invocation(&Err(error))).unwrap();
        assert_eq!(err["Err"]["kind"]["kind"], "MissingArguments");
        assert_eq!(err["Err"]["message"], "nope");
    }

    #[test]
    fn test_valid_report_is_still_printed() {
        let output = JsonFormatter.validation(&ValidationReport::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value["diagnostics"].as_array().unwrap().is_empty());
    }
}
