//! Module identifiers.
//!
//! Hosts hand over module names as typed by page authors (`Greeter`,
//! `module:greeter`, ` Data_tables `). [`ModuleIdentifier::parse`] turns them
//! into one canonical title so that equal modules compare equal.

use serde::Serialize;
use thiserror::Error;

/// Canonical name of the namespace holding modules.
pub const MODULE_NAMESPACE: &str = "Module";

/// Characters that can never appear in a title.
const INVALID_TITLE_CHARS: &[char] = &['#', '<', '>', '[', ']', '|', '{', '}'];

/// Why a raw module name was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("module name is empty")]
    Empty,

    #[error("module name contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Namespace-qualified, normalized module title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleIdentifier {
    name: String,
}

impl ModuleIdentifier {
    /// Normalize a raw module name.
    ///
    /// Trims, strips an explicit `Module:` prefix, maps `_` to spaces,
    /// collapses whitespace runs and upper-cases the first character.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let name = strip_namespace(raw.trim()).replace('_', " ");
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

        if name.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if let Some(c) = name
            .chars()
            .find(|c| INVALID_TITLE_CHARS.contains(c) || c.is_control())
        {
            return Err(IdentifierError::InvalidCharacter(c));
        }

        let mut chars = name.chars();
        let name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => return Err(IdentifierError::Empty),
        };

        Ok(Self { name })
    }

    /// Title without the namespace (`Greeter`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefixed title (`Module:Data tables`).
    pub fn title(&self) -> String {
        format!("{}:{}", MODULE_NAMESPACE, self.name)
    }

    /// Prefixed title in storage form (`Module:Data_tables`).
    pub fn db_key(&self) -> String {
        format!("{}:{}", MODULE_NAMESPACE, self.name.replace(' ', "_"))
    }
}

impl std::fmt::Display for ModuleIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", MODULE_NAMESPACE, self.name)
    }
}

impl std::str::FromStr for ModuleIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whether a full page title lives in the `Module` namespace.
pub fn is_module_title(title: &str) -> bool {
    title
        .trim()
        .split_once(':')
        .is_some_and(|(ns, rest)| {
            ns.trim().eq_ignore_ascii_case(MODULE_NAMESPACE) && !rest.trim().is_empty()
        })
}

fn strip_namespace(raw: &str) -> &str {
    match raw.split_once(':') {
        Some((ns, rest)) if ns.trim().eq_ignore_ascii_case(MODULE_NAMESPACE) => rest.trim(),
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_name() {
        let id = ModuleIdentifier::parse("Greeter").unwrap();
        assert_eq!(id.name(), "Greeter");
        assert_eq!(id.title(), "Module:Greeter");
        assert_eq!(id.to_string(), "Module:Greeter");
    }

    #[test]
    fn test_parse_normalizes_spelling_variants() {
        let a = ModuleIdentifier::parse("  data_tables ").unwrap();
        let b = ModuleIdentifier::parse("Module:Data tables").unwrap();
        let c = ModuleIdentifier::parse("module: Data   tables").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.db_key(), "Module:Data_tables");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(ModuleIdentifier::parse(""), Err(IdentifierError::Empty));
        assert_eq!(ModuleIdentifier::parse("   "), Err(IdentifierError::Empty));
        assert_eq!(ModuleIdentifier::parse("Module:"), Err(IdentifierError::Empty));
        assert_eq!(ModuleIdentifier::parse("__"), Err(IdentifierError::Empty));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert_eq!(
            ModuleIdentifier::parse("Foo|bar"),
            Err(IdentifierError::InvalidCharacter('|'))
        );
        assert_eq!(
            ModuleIdentifier::parse("{{Foo}}"),
            Err(IdentifierError::InvalidCharacter('{'))
        );
        assert!(ModuleIdentifier::parse("Foo\u{0007}").is_err());
    }

    #[test]
    fn test_parse_keeps_other_namespaces_in_name() {
        let id = ModuleIdentifier::parse("Template:Foo").unwrap();
        assert_eq!(id.name(), "Template:Foo");
    }

    #[test]
    fn test_first_letter_uppercased_unicode() {
        let id = ModuleIdentifier::parse("éclair").unwrap();
        assert_eq!(id.name(), "Éclair");
    }

    #[test]
    fn test_is_module_title() {
        assert!(is_module_title("Module:Greeter"));
        assert!(is_module_title("module:Greeter"));
        assert!(!is_module_title("Greeter"));
        assert!(!is_module_title("Template:Greeter"));
        assert!(!is_module_title("Module:"));
    }
}
