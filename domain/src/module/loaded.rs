//! Loaded modules.

use super::content::ContentIdentity;
use super::identifier::ModuleIdentifier;
use std::collections::BTreeMap;

/// Opaque handle to a function held by the sandbox that loaded it.
///
/// Only meaningful to that sandbox; handles never cross sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionHandle(u64);

impl FunctionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The export table of a module after a successful sandbox load.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    identifier: ModuleIdentifier,
    identity: ContentIdentity,
    exports: BTreeMap<String, FunctionHandle>,
}

impl LoadedModule {
    pub fn new(
        identifier: ModuleIdentifier,
        identity: ContentIdentity,
        exports: BTreeMap<String, FunctionHandle>,
    ) -> Self {
        Self {
            identifier,
            identity,
            exports,
        }
    }

    pub fn identifier(&self) -> &ModuleIdentifier {
        &self.identifier
    }

    pub fn identity(&self) -> &ContentIdentity {
        &self.identity
    }

    /// Look up an exported function by name.
    pub fn function(&self, name: &str) -> Option<FunctionHandle> {
        self.exports.get(name).copied()
    }

    /// Exported function names, sorted.
    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_lookup() {
        let mut exports = BTreeMap::new();
        exports.insert("hello".to_string(), FunctionHandle::new(1));
        exports.insert("main".to_string(), FunctionHandle::new(2));
        let module = LoadedModule::new(
            ModuleIdentifier::parse("Greeter").unwrap(),
            ContentIdentity::from_revision(1),
            exports,
        );

        assert_eq!(module.function("hello"), Some(FunctionHandle::new(1)));
        assert_eq!(module.function("absent"), None);
        assert_eq!(module.export_names().collect::<Vec<_>>(), ["hello", "main"]);
    }
}
