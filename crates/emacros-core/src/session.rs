//! Per-session context threaded through every engine call.
//!
//! Nothing here is process-wide: two [`Session`]s never see each other's
//! bindings, cache entries or default scope.

use crate::load_cache::LoadCache;
use crate::macros::MacroName;
use crate::paths::Scope;
use crate::registry::MacroRegistry;
use crate::surface::SurfaceSet;

/// Mutable bookkeeping reset by refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Scope offered when an add asks for one.
    pub default_scope: Scope,
    /// Macro most recently executed, added, renamed or moved.
    pub last_used: Option<MacroName>,
    /// Macro most recently written to a definition file.
    pub last_saved: Option<MacroName>,
}

impl SessionState {
    /// Fresh state offering `default_scope`.
    pub fn new(default_scope: Scope) -> Self {
        Self {
            default_scope,
            last_used: None,
            last_saved: None,
        }
    }

    /// Note a write of `name`.
    pub fn touch(&mut self, name: &MacroName) {
        self.last_used = Some(name.clone());
        self.last_saved = Some(name.clone());
    }

    /// Drop references to `name`. Returns whether any were held.
    pub fn forget(&mut self, name: &str) -> bool {
        let mut forgot = false;
        if self.last_used.as_ref().is_some_and(|n| n.as_str() == name) {
            self.last_used = None;
            forgot = true;
        }
        if self.last_saved.as_ref().is_some_and(|n| n.as_str() == name) {
            self.last_saved = None;
            forgot = true;
        }
        forgot
    }
}

/// One editing session.
#[derive(Debug, Default)]
pub struct Session {
    /// Default scope and last-used names.
    pub state: SessionState,
    /// Files already loaded.
    pub cache: LoadCache,
    /// Bound macros.
    pub registry: MacroRegistry,
    /// Documents the host has open for editing.
    pub surfaces: SurfaceSet,
}

impl Session {
    /// A new session offering `default_scope`, refusing `reserved` names.
    pub fn new(default_scope: Scope, reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            state: SessionState::new(default_scope),
            cache: LoadCache::new(),
            registry: MacroRegistry::with_reserved(reserved),
            surfaces: SurfaceSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forget_only_matching_names() {
        let a = MacroName::try_new("a").unwrap();
        let b = MacroName::try_new("b").unwrap();
        let mut state = SessionState::new(Scope::Global);
        state.touch(&a);
        state.last_used = Some(b);

        assert!(state.forget("a"));
        assert_eq!(state.last_saved, None);
        assert_eq!(state.last_used.as_ref().map(MacroName::as_str), Some("b"));
        assert!(!state.forget("a"));
        assert_eq!(state.default_scope, Scope::Global);
    }
}
