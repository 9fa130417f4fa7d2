//! Open editable surfaces.
//!
//! The host may already have a definition file open for editing, possibly
//! with unsaved changes. Writes go through that surface when there is one,
//! so the operator's edits are kept instead of being overwritten by a blind
//! write of the file on disk.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::paths::comparable;

/// One open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    path: PathBuf,
    text: String,
    modified: bool,
}

impl Surface {
    /// A surface showing `text` as saved on disk.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            modified: false,
        }
    }

    /// Path of the file behind the surface.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current content, including unsaved edits.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the content differs from what was last saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Replace the content as an operator edit; marks the surface modified.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified = true;
    }

    /// Record that `text` was just written to disk.
    pub fn mark_saved(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified = false;
    }
}

/// Shared handle to an open surface.
pub type SharedSurface = Rc<RefCell<Surface>>;

/// The host's set of open surfaces, keyed by file identity.
#[derive(Debug, Default)]
pub struct SurfaceSet {
    open: HashMap<PathBuf, SharedSurface>,
}

impl SurfaceSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` with the given content and return its handle.
    ///
    /// Re-opening an already open path returns the existing surface.
    pub fn open(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> SharedSurface {
        let path = path.into();
        Rc::clone(
            self.open
                .entry(comparable(&path))
                .or_insert_with(|| Rc::new(RefCell::new(Surface::new(path, text)))),
        )
    }

    /// The open surface for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<SharedSurface> {
        self.open.get(&comparable(path)).map(Rc::clone)
    }

    /// Close the surface for `path`. Returns whether one was open.
    pub fn close(&mut self, path: &Path) -> bool {
        self.open.remove(&comparable(path)).is_some()
    }

    /// Number of open surfaces.
    pub fn len(&self) -> usize {
        self.open.len()
    }

    /// Whether no surface is open.
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_edit_and_save_flags() {
        let mut surface = Surface::new("/tmp/a.el", "x");
        assert!(!surface.is_modified());
        surface.edit("y");
        assert!(surface.is_modified());
        surface.mark_saved("z");
        assert!(!surface.is_modified());
        assert_eq!(surface.text(), "z");
    }

    #[test]
    fn test_open_is_keyed_by_identity() {
        let temp = TempDir::new().unwrap();
        let mut set = SurfaceSet::new();
        let a = set.open(temp.path().join("f.el"), "one");
        let b = set.open(temp.path().join(".").join("f.el"), "two");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(b.borrow().text(), "one");
        assert_eq!(set.len(), 1);
        assert!(set.close(&temp.path().join("f.el")));
        assert!(set.is_empty());
    }
}
