//! Memo of definition files already read this session.
//!
//! Local files are keyed by (mode, directory); the global file only by mode.
//! A file is marked once it has been looked at, whether or not it existed,
//! so an absent file is not probed again until the cache is cleared.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::paths::{comparable, ModeName};

/// Which definition files have been processed.
#[derive(Debug, Clone, Default)]
pub struct LoadCache {
    local: HashMap<ModeName, HashSet<PathBuf>>,
    global: HashSet<ModeName>,
}

impl LoadCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the global file for `mode` was processed.
    pub fn global_loaded(&self, mode: &ModeName) -> bool {
        self.global.contains(mode)
    }

    /// Record that the global file for `mode` was processed.
    pub fn mark_global(&mut self, mode: &ModeName) {
        self.global.insert(mode.clone());
    }

    /// Whether the local file for `mode` in `dir` was processed.
    pub fn local_loaded(&self, mode: &ModeName, dir: &Path) -> bool {
        self.local
            .get(mode)
            .is_some_and(|dirs| dirs.contains(&comparable(dir)))
    }

    /// Record that the local file for `mode` in `dir` was processed.
    pub fn mark_local(&mut self, mode: &ModeName, dir: &Path) {
        self.local
            .entry(mode.clone())
            .or_default()
            .insert(comparable(dir));
    }

    /// Directories whose local file for `mode` was processed.
    pub fn local_dirs(&self, mode: &ModeName) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = self
            .local
            .get(mode)
            .map(|dirs| dirs.iter().map(PathBuf::as_path).collect())
            .unwrap_or_default();
        dirs.sort();
        dirs
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.local.clear();
        self.global.clear();
    }

    /// Whether nothing has been processed.
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.local.values().all(HashSet::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_entries_are_per_directory() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let python = ModeName::new("python-mode");
        let mut cache = LoadCache::new();

        cache.mark_local(&python, a.path());
        assert!(cache.local_loaded(&python, a.path()));
        assert!(!cache.local_loaded(&python, b.path()));
        assert!(!cache.local_loaded(&ModeName::new("rust"), a.path()));
        assert!(!cache.global_loaded(&python));
    }

    #[test]
    fn test_directory_spelling_does_not_matter() {
        let a = TempDir::new().unwrap();
        std::fs::create_dir(a.path().join("sub")).unwrap();
        let mode = ModeName::new("c");
        let mut cache = LoadCache::new();

        cache.mark_local(&mode, a.path());
        assert!(cache.local_loaded(&mode, &a.path().join("sub").join("..")));
    }

    #[test]
    fn test_clear() {
        let a = TempDir::new().unwrap();
        let mode = ModeName::new("c");
        let mut cache = LoadCache::new();
        cache.mark_global(&mode);
        cache.mark_local(&mode, a.path());
        assert!(!cache.is_empty());
        assert_eq!(cache.local_dirs(&mode).len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.global_loaded(&mode));
    }
}
