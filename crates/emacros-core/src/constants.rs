//! Common constants used throughout emacros-core.
//!
//! File naming, the record marker, and configuration locations live here so
//! the path resolver, the codec, and the config loader agree.

// ============================================================================
// Definition Files
// ============================================================================

/// Default prefix of hidden definition files (`.emacros-for-<mode>.el`).
pub const DEFAULT_FILE_PREFIX: &str = "emacros";

/// Default extension of definition files.
pub const DEFAULT_EXTENSION: &str = "el";

/// Default subdirectory holding `for-<mode>.<ext>` files.
pub const DEFAULT_SUBDIR: &str = "emacros";

/// Stem shared by every per-mode file name.
pub const FOR_MODE_STEM: &str = "for-";

// ============================================================================
// Mode Names
// ============================================================================

/// Trailing token stripped from a mode name (`python-mode` → `python`).
pub const MODE_SUFFIX: &str = "-mode";

/// Separator at which a mode name without [`MODE_SUFFIX`] is truncated.
pub const MODE_NAMESPACE_SEPARATOR: char = '-';

// ============================================================================
// Record Format
// ============================================================================

/// Literal marker opening every record header.
///
/// A header reads `(emacros-new-macro '<name> <code>)`.
pub const RECORD_MARKER: &str = "(emacros-new-macro '";

/// Character closing a record.
pub const RECORD_CLOSE: char = ')';

/// Glyph shown in place of event values outside the byte range.
pub const PLACEHOLDER_GLYPH: char = '?';

// ============================================================================
// Configuration
// ============================================================================

/// Name of the global configuration directory under the user home.
pub const EMACROS_HOME_DIR: &str = ".emacros";

/// Name of the global configuration file.
pub const GLOBAL_CONFIG_FILENAME: &str = "config.yaml";
