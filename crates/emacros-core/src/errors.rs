//! Error types for emacros-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::paths::Scope;

/// Why a rename found nothing to rename.
///
/// The engine checks the local file and then the global file; the operator
/// message differs depending on whether the name was missing or the operator
/// declined to overwrite in each of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundDetail {
    /// The name is in neither definition file.
    AbsentInBoth,
    /// The name was present in both files, but the operator skipped both.
    SkippedInBoth,
    /// Skipped by the operator in one file and absent from the other.
    SkippedInOne {
        /// The scope whose file was skipped.
        skipped: Scope,
    },
    /// Absent from a single expected scope.
    AbsentIn(Scope),
    /// Not bound in the session registry.
    Unbound,
}

impl fmt::Display for NotFoundDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsentInBoth => write!(f, "not defined locally or globally"),
            Self::SkippedInBoth => write!(f, "skipped in both the local and the global file"),
            Self::SkippedInOne { skipped } => write!(
                f,
                "skipped in the {} file and not defined in the {} file",
                skipped,
                skipped.other()
            ),
            Self::AbsentIn(scope) => write!(f, "not defined in the {} file", scope),
            Self::Unbound => write!(f, "not defined in this session"),
        }
    }
}

/// Domain-specific errors for macro store operations.
#[derive(Error, Debug)]
pub enum MacroError {
    /// The candidate macro name is not acceptable.
    #[error("Invalid macro name `{name}`: {reason}")]
    InvalidName {
        /// The rejected candidate.
        name: String,
        /// Human readable reason.
        reason: String,
    },

    /// A non-overwriting write hit an existing record.
    #[error("Macro `{name}` already exists in {}", path.display())]
    Conflict {
        /// The conflicting name.
        name: String,
        /// The definition file holding it.
        path: PathBuf,
    },

    /// The target macro is absent from the expected scope(s).
    #[error("Macro `{name}` not found: {detail}")]
    NotFound {
        /// The missing name.
        name: String,
        /// Which scopes were examined and how.
        detail: NotFoundDetail,
    },

    /// The operator declined a continuation prompt.
    #[error("Aborted: {0}")]
    Aborted(String),

    /// Persisting or reading a definition file failed.
    #[error("I/O error at `{}`: {message}", path.display())]
    Io {
        /// The definition file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// Local and global definition files are the same file.
    #[error("Local and global macro files are the same file ({}); nothing to move", path.display())]
    SameRoots {
        /// The shared path.
        path: PathBuf,
    },

    /// The registry holds no macros.
    #[error("No macros defined in this session")]
    NoRecords,

    /// A prefix matched more than one macro.
    #[error("Prefix `{prefix}` is ambiguous: {}", candidates.join(", "))]
    Ambiguous {
        /// The prefix that was looked up.
        prefix: String,
        /// Sorted matching names.
        candidates: Vec<String>,
    },

    /// A definition file holds the same name more than once.
    ///
    /// This only happens after manual edits; the store refuses to guess
    /// which record is meant.
    #[error("Macro `{name}` is defined {count} times in {}; fix the file by hand", path.display())]
    DuplicateRecord {
        /// The duplicated name.
        name: String,
        /// The definition file.
        path: PathBuf,
        /// Number of headers found.
        count: usize,
    },

    /// A record block could not be decoded.
    #[error("Parse error in {} at line {line}: {message}", path.display())]
    Parse {
        /// The definition file.
        path: PathBuf,
        /// 1-based line of the record header.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Configuration file is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A wrapped generic error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MacroError {
    /// Build an [`MacroError::Io`] for a definition file.
    pub fn io(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether the failure left persisted state untouched.
    ///
    /// `NotFound` and `Aborted` never mutate; validation, conflicts and
    /// duplicate records are detected before any write.
    pub fn is_mutation_free(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. }
                | Self::Conflict { .. }
                | Self::NotFound { .. }
                | Self::Aborted(_)
                | Self::SameRoots { .. }
                | Self::NoRecords
                | Self::Ambiguous { .. }
                | Self::DuplicateRecord { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages_distinguish_cases() {
        let both = MacroError::NotFound {
            name: "foo".into(),
            detail: NotFoundDetail::AbsentInBoth,
        };
        assert!(both.to_string().contains("not defined locally or globally"));

        let skipped = MacroError::NotFound {
            name: "foo".into(),
            detail: NotFoundDetail::SkippedInBoth,
        };
        assert!(skipped.to_string().contains("skipped in both"));

        let one = MacroError::NotFound {
            name: "foo".into(),
            detail: NotFoundDetail::SkippedInOne {
                skipped: Scope::Local,
            },
        };
        let msg = one.to_string();
        assert!(msg.contains("skipped in the local file"));
        assert!(msg.contains("not defined in the global file"));
    }

    #[test]
    fn test_mutation_free_classification() {
        assert!(MacroError::Aborted("no".into()).is_mutation_free());
        assert!(!MacroError::io("/tmp/x", "disk full").is_mutation_free());
    }
}
