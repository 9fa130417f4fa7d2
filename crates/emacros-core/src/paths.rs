//! Definition file path resolution.
//!
//! Each (scope, mode) pair maps to exactly one file. With a subdirectory
//! configured the file is `<dir>/<subdir>/for-<mode>.<ext>`; without one it
//! is the hidden `<dir>/.<prefix>-for-<mode>.<ext>`. `<dir>` is the editing
//! directory for local scope and the configured global root for global
//! scope. Resolution is pure: nothing here touches the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::GlobalConfig;
use crate::constants::{FOR_MODE_STEM, MODE_NAMESPACE_SEPARATOR, MODE_SUFFIX};

// ============================================================================
// Scope
// ============================================================================

/// Which of the two definition files a macro lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The per-directory file.
    #[default]
    Local,
    /// The file under the global root.
    Global,
}

impl Scope {
    /// The complementary scope.
    pub fn other(self) -> Self {
        match self {
            Self::Local => Self::Global,
            Self::Global => Self::Local,
        }
    }

    /// Both scopes in the fixed order operations visit them.
    pub const ALL: [Scope; 2] = [Scope::Local, Scope::Global];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Global => write!(f, "global"),
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l" | "local" => Ok(Self::Local),
            "g" | "global" => Ok(Self::Global),
            _ => Err(format!(
                "Unknown scope: '{}'. Use 'local' or 'global'.",
                s
            )),
        }
    }
}

// ============================================================================
// ModeName
// ============================================================================

/// A normalized mode name used in definition file names.
///
/// Normalization strips a trailing `-mode`; failing that it truncates at the
/// first `-`; failing that the name is used as is.
///
/// # Example
///
/// ```
/// use emacros_core::ModeName;
///
/// assert_eq!(ModeName::new("python-mode").as_str(), "python");
/// assert_eq!(ModeName::new("lisp-interaction-mode").as_str(), "lisp-interaction");
/// assert_eq!(ModeName::new("web-template").as_str(), "web");
/// assert_eq!(ModeName::new("text").as_str(), "text");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeName(String);

impl ModeName {
    /// Normalize a raw mode name.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        let normalized = match raw.strip_suffix(MODE_SUFFIX) {
            Some(stem) if !stem.is_empty() => stem,
            _ => match raw.find(MODE_NAMESPACE_SEPARATOR) {
                Some(idx) if idx > 0 => &raw[..idx],
                _ => raw,
            },
        };
        Self(normalized.to_string())
    }

    /// Get the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// EditContext
// ============================================================================

/// Host-supplied context of an operation: the current mode and directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditContext {
    /// Normalized mode of the document being edited.
    pub mode: ModeName,
    /// Directory of the document being edited.
    pub directory: PathBuf,
}

impl EditContext {
    /// Build a context from a raw mode name and a directory.
    pub fn new(mode: &str, directory: impl Into<PathBuf>) -> Self {
        Self {
            mode: ModeName::new(mode),
            directory: directory.into(),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the definition file for `scope` in `ctx`.
pub fn definition_path(scope: Scope, ctx: &EditContext, config: &GlobalConfig) -> PathBuf {
    let root = match scope {
        Scope::Local => ctx.directory.clone(),
        Scope::Global => config.global_dir(),
    };
    file_in(&root, &ctx.mode, config)
}

/// The definition file for `mode` inside `dir`.
pub fn file_in(dir: &Path, mode: &ModeName, config: &GlobalConfig) -> PathBuf {
    match config.subdir.as_deref() {
        Some(subdir) if !subdir.is_empty() => dir.join(subdir).join(format!(
            "{}{}.{}",
            FOR_MODE_STEM, mode, config.extension
        )),
        _ => dir.join(format!(
            ".{}-{}{}.{}",
            config.file_prefix, FOR_MODE_STEM, mode, config.extension
        )),
    }
}

/// Best-effort absolute form of `path` for identity comparisons.
///
/// Existing paths are canonicalized; for missing files the parent is
/// canonicalized and the file name re-attached.
pub fn comparable(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            comparable(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}

/// Whether two paths name the same location.
pub fn same_location(a: &Path, b: &Path) -> bool {
    comparable(a) == comparable(b)
}

// ============================================================================
// Tests
// ============================================================================
