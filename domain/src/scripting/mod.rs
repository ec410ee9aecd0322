//! Scripting domain types
//!
//! Values crossing the sandbox boundary. These types are runtime-agnostic;
//! the Lua conversion lives in the infrastructure layer behind `SandboxPort`.

use serde::Serialize;

/// A scalar value passed to or returned from a module function.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScriptValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Nil,
}

impl ScriptValue {
    /// Canonical text form used when a result is embedded in host output.
    ///
    /// `nil` renders as nothing; everything else as its literal text.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Nil => String::new(),
            other => other.to_string(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl std::fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Number(n) if n.is_nan() => write!(f, "nan"),
            Self::Number(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "inf" } else { "-inf" })
            }
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Nil => write!(f, "nil"),
        }
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Concatenate the display forms of a function's return values.
pub fn join_display(values: &[ScriptValue]) -> String {
    values.iter().map(ScriptValue::to_display_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(ScriptValue::from("Hello").to_display_string(), "Hello");
        assert_eq!(ScriptValue::Integer(42).to_display_string(), "42");
        assert_eq!(ScriptValue::Number(2.5).to_display_string(), "2.5");
        assert_eq!(ScriptValue::Boolean(true).to_display_string(), "true");
        assert_eq!(ScriptValue::Nil.to_display_string(), "");
        assert_eq!(ScriptValue::Nil.to_string(), "nil");
    }

    #[test]
    fn test_non_finite_numbers() {
        assert_eq!(ScriptValue::Number(f64::NAN).to_display_string(), "nan");
        assert_eq!(ScriptValue::Number(f64::INFINITY).to_display_string(), "inf");
        assert_eq!(
            ScriptValue::Number(f64::NEG_INFINITY).to_display_string(),
            "-inf"
        );
    }

    #[test]
    fn test_join_display_skips_nil() {
        let values = [
            ScriptValue::from("a"),
            ScriptValue::Nil,
            ScriptValue::Integer(1),
        ];
        assert_eq!(join_display(&values), "a1");
        assert_eq!(join_display(&[]), "");
    }
}
