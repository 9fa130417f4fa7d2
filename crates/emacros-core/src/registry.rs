//! In-session macro bindings.
//!
//! The registry is the source of truth for execution and listing. It is
//! rebuilt from definition files by load/refresh and otherwise changes only
//! as a side effect of successful store operations.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{MacroError, NotFoundDetail};
use crate::macros::{MacroCode, MacroName};

/// Name → code bindings, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    bindings: BTreeMap<MacroName, MacroCode>,
    reserved: BTreeSet<String>,
}

impl MacroRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry that refuses to shadow the given host bindings.
    pub fn with_reserved(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            bindings: BTreeMap::new(),
            reserved: names.into_iter().collect(),
        }
    }

    /// Whether `name` belongs to a non-macro host binding.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Bind `name`, replacing any previous binding. Returns the old code.
    pub fn bind(&mut self, name: MacroName, code: MacroCode) -> Option<MacroCode> {
        self.bindings.insert(name, code)
    }

    /// Remove the binding for `name`.
    pub fn unbind(&mut self, name: &str) -> Option<MacroCode> {
        self.bindings.remove(name)
    }

    /// Move a binding to a new name, using `code` when `old` was unbound.
    pub fn rebind(&mut self, old: &str, new: MacroName, code: MacroCode) {
        let code = self.bindings.remove(old).unwrap_or(code);
        self.bindings.insert(new, code);
    }

    /// Drop every binding. Reserved names are kept.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Look up the code bound to `name`.
    pub fn get(&self, name: &str) -> Option<&MacroCode> {
        self.bindings.get(name)
    }

    /// Look up the bound name and code for `name`.
    pub fn lookup(&self, name: &str) -> Option<(&MacroName, &MacroCode)> {
        self.bindings.get_key_value(name)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Sorted snapshot of every binding.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::NoRecords`] when nothing is bound.
    pub fn snapshot(&self) -> Result<Vec<(MacroName, MacroCode)>, MacroError> {
        if self.bindings.is_empty() {
            return Err(MacroError::NoRecords);
        }
        Ok(self
            .bindings
            .iter()
            .map(|(name, code)| (name.clone(), code.clone()))
            .collect())
    }

    /// Sorted names of every binding.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::NoRecords`] when nothing is bound.
    pub fn names(&self) -> Result<Vec<MacroName>, MacroError> {
        if self.bindings.is_empty() {
            return Err(MacroError::NoRecords);
        }
        Ok(self.bindings.keys().cloned().collect())
    }

    /// Resolve a prefix to a single bound name.
    ///
    /// An exact match wins; otherwise exactly one binding must start with
    /// `prefix`.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<MacroName, MacroError> {
        let candidates: Vec<&MacroName> = self
            .bindings
            .keys()
            .filter(|name| name.as_str().starts_with(prefix))
            .collect();

        if let Some(exact) = candidates.iter().find(|name| name.as_str() == prefix) {
            return Ok((*exact).clone());
        }
        match candidates.as_slice() {
            [] => Err(MacroError::NotFound {
                name: prefix.to_string(),
                detail: NotFoundDetail::Unbound,
            }),
            [only] => Ok((*only).clone()),
            many => Err(MacroError::Ambiguous {
                prefix: prefix.to_string(),
                candidates: many.iter().map(|n| n.to_string()).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> MacroName {
        MacroName::try_new(s).unwrap()
    }

    fn text(s: &str) -> MacroCode {
        MacroCode::Text(s.to_string())
    }

    #[test]
    fn test_last_binding_wins() {
        let mut reg = MacroRegistry::new();
        reg.bind(name("a"), text("1"));
        let old = reg.bind(name("a"), text("2"));
        assert_eq!(old, Some(text("1")));
        assert_eq!(reg.get("a"), Some(&text("2")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_snapshot_sorted_case_sensitive() {
        let mut reg = MacroRegistry::new();
        reg.bind(name("beta"), text("b"));
        reg.bind(name("Zed"), text("z"));
        reg.bind(name("alpha"), text("a"));
        let names: Vec<String> = reg.names().unwrap().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["Zed", "alpha", "beta"]);
    }

    #[test]
    fn test_empty_listing_is_an_error() {
        let reg = MacroRegistry::new();
        assert!(matches!(reg.snapshot(), Err(MacroError::NoRecords)));
        assert!(matches!(reg.names(), Err(MacroError::NoRecords)));
    }

    #[test]
    fn test_rebind_keeps_code() {
        let mut reg = MacroRegistry::new();
        reg.bind(name("old"), text("kept"));
        reg.rebind("old", name("new"), text("fallback"));
        assert!(!reg.contains("old"));
        assert_eq!(reg.get("new"), Some(&text("kept")));

        reg.rebind("ghost", name("other"), text("fallback"));
        assert_eq!(reg.get("other"), Some(&text("fallback")));
    }

    #[test]
    fn test_resolve_prefix() {
        let mut reg = MacroRegistry::new();
        reg.bind(name("fix"), text("1"));
        reg.bind(name("fixup"), text("2"));
        reg.bind(name("greet"), text("3"));

        assert_eq!(reg.resolve_prefix("gr").unwrap().as_str(), "greet");
        assert_eq!(reg.resolve_prefix("fix").unwrap().as_str(), "fix");
        match reg.resolve_prefix("f") {
            Err(MacroError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates, vec!["fix", "fixup"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
        assert!(matches!(
            reg.resolve_prefix("zz"),
            Err(MacroError::NotFound { .. })
        ));
    }

    #[test]
    fn test_clear_keeps_reserved() {
        let mut reg = MacroRegistry::with_reserved(["undo".to_string()]);
        reg.bind(name("a"), text("1"));
        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.is_reserved("undo"));
    }
}
