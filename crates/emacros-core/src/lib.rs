//! # emacros-core
//!
//! Store for named keyboard macros kept in flat definition files.
//!
//! Every (mode, directory) pair has two definition files: a local one next to
//! the edited document and a global one under the configured root. This
//! crate saves, renames, moves and removes macro records in those files and
//! keeps an in-session registry of bound macros consistent with them.
//!
//! ## Main Types
//!
//! - [`MacroEngine`] – entry point for every operation
//! - [`Session`] – per-session registry, load cache and default scope
//! - [`Prompter`] – seam through which the host answers questions
//! - [`MacroError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`codec`] – the on-disk record format
//! - [`paths`] – scope and definition file resolution
//! - [`store`] – record lookup and mutation inside one file
//! - [`engine`] – add, rename, move, remove, load and refresh
//!
//! ## Example
//!
//! ```no_run
//! use emacros_core::{AddRequest, EditContext, MacroCode, MacroEngine, Scope, ScriptedPrompter};
//!
//! let engine = MacroEngine::with_defaults()?;
//! let mut session = engine.new_session();
//! let ctx = EditContext::new("python-mode", "/work/proj");
//! engine.load(&mut session, &ctx)?;
//!
//! let mut prompter = ScriptedPrompter::default();
//! let request = AddRequest::new("greet", MacroCode::Text("Hello".into())).in_scope(Scope::Local);
//! engine.add(&mut session, &ctx, request, &mut prompter)?;
//!
//! for entry in engine.list(&session)? {
//!     println!("{} {}", entry.name, entry.display);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

// Modules
pub mod codec;
pub mod config;
pub mod conflict;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod load_cache;
pub mod macros;
pub mod paths;
pub mod prompt;
pub mod registry;
pub mod scope;
pub mod session;
pub mod store;
pub mod surface;
pub mod types;

// Re-exports for convenience
pub use config::GlobalConfig;
pub use conflict::Overwrite;
pub use engine::MacroEngine;
pub use errors::{MacroError, NotFoundDetail};
pub use load_cache::LoadCache;
pub use macros::{
    check_name_syntax, validate_name, KeyEvent, MacroCode, MacroName, MacroRecord, NameValidation,
};
pub use paths::{definition_path, EditContext, ModeName, Scope};
pub use prompt::{Answer, AssumeYes, Prompter, ScriptedPrompter};
pub use registry::MacroRegistry;
pub use scope::{AddTarget, ScopeDecision};
pub use session::{Session, SessionState};
pub use store::{InsertOutcome, RecordStore, SkippedRecord};
pub use surface::{SharedSurface, Surface, SurfaceSet};
pub use types::{
    AddRequest, AddResult, Execution, ListEntry, LoadReport, LoadedFile, MoveResult,
    RemoveResult, RenameResult,
};
