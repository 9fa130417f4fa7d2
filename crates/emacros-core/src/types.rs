//! Request and result types of the engine API.
//!
//! Results are serializable so the CLI can print them as JSON.

use std::path::PathBuf;

use serde::Serialize;

use crate::macros::{MacroCode, MacroName};
use crate::paths::{ModeName, Scope};
use crate::scope::AddTarget;
use crate::store::SkippedRecord;

// ============================================================================
// Requests
// ============================================================================

/// Input of an add.
#[derive(Debug, Clone)]
pub struct AddRequest {
    /// Name to save under; `None` asks the operator.
    pub name: Option<String>,
    /// Payload handed over by the recorder.
    pub code: MacroCode,
    /// Where to save.
    pub target: AddTarget,
}

impl AddRequest {
    /// Add `code` under `name`, asking for the scope.
    pub fn new(name: impl Into<String>, code: MacroCode) -> Self {
        Self {
            name: Some(name.into()),
            code,
            target: AddTarget::Ask,
        }
    }

    /// Add `code`, asking the operator for the name and scope.
    pub fn unnamed(code: MacroCode) -> Self {
        Self {
            name: None,
            code,
            target: AddTarget::Ask,
        }
    }

    /// Save in `scope` without asking.
    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.target = AddTarget::Scope(scope);
        self
    }

    /// Save into a caller-chosen file.
    pub fn in_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.target = AddTarget::CustomFile(path.into());
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of an add.
#[derive(Debug, Clone, Serialize)]
pub struct AddResult {
    /// Saved name.
    pub name: MacroName,
    /// Scope written.
    pub scope: Scope,
    /// File written.
    pub path: PathBuf,
    /// Whether an existing record was overwritten.
    pub replaced: bool,
}

/// Outcome of a rename.
#[derive(Debug, Clone, Serialize)]
pub struct RenameResult {
    /// Previous name.
    pub old: MacroName,
    /// New name.
    pub new: MacroName,
    /// Scopes whose file was rewritten, in visit order.
    pub renamed_in: Vec<Scope>,
    /// Scopes the operator chose to skip.
    pub skipped: Vec<Scope>,
}

/// Outcome of a move.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResult {
    /// Moved macro.
    pub name: MacroName,
    /// Source scope.
    pub from: Scope,
    /// Target scope.
    pub to: Scope,
    /// Source file.
    pub from_path: PathBuf,
    /// Target file.
    pub to_path: PathBuf,
    /// Whether a record in the target was overwritten.
    pub replaced: bool,
}

/// Outcome of a remove.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResult {
    /// Removed macro.
    pub name: MacroName,
    /// Scopes whose file held the record.
    pub removed_from: Vec<Scope>,
}

/// One definition file looked at by a load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedFile {
    /// Scope of the file.
    pub scope: Scope,
    /// Path of the file.
    pub path: PathBuf,
    /// Whether the file was there.
    pub existed: bool,
    /// Records bound from it.
    pub records: usize,
    /// Records left unbound because they did not decode.
    pub skipped: Vec<SkippedRecord>,
}

/// Outcome of a load or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Normalized mode loaded for.
    pub mode: ModeName,
    /// Files read by this call.
    pub files: Vec<LoadedFile>,
    /// Scopes skipped because they were already loaded.
    pub cached: Vec<Scope>,
}

impl LoadReport {
    pub(crate) fn new(mode: ModeName) -> Self {
        Self {
            mode,
            files: Vec::new(),
            cached: Vec::new(),
        }
    }

    /// Total bindings created.
    pub fn bindings(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }

    /// Whether nothing had to be read.
    pub fn fully_cached(&self) -> bool {
        self.files.is_empty()
    }
}

/// One line of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    /// Macro name.
    pub name: MacroName,
    /// Stored payload.
    pub code: MacroCode,
    /// Payload rendered for display.
    pub display: String,
}

/// A macro handed to the player.
#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    /// Resolved name.
    pub name: MacroName,
    /// Payload to replay.
    pub code: MacroCode,
}
