//! Macro engine: the transactions behind every operator command.
//!
//! The [`MacroEngine`] owns the configuration; all mutable state lives in the
//! [`Session`] passed to each call. A transaction resolves paths and scope,
//! asks its questions through the [`Prompter`], then performs its writes.
//! Once the first write has started no further question is asked.

use std::path::{Path, PathBuf};

use crate::config::GlobalConfig;
use crate::conflict::{check_overwrite, require_overwrite, Overwrite};
use crate::errors::{MacroError, NotFoundDetail};
use crate::macros::{validate_name, MacroCode, MacroName, MacroRecord};
use crate::paths::{definition_path, same_location, EditContext, Scope};
use crate::prompt::Prompter;
use crate::scope::{choose_add_scope, ensure_distinct_roots};
use crate::session::{Session, SessionState};
use crate::store::{InsertOutcome, RecordStore};
use crate::types::{
    AddRequest, AddResult, Execution, ListEntry, LoadReport, LoadedFile, MoveResult,
    RemoveResult, RenameResult,
};

// ============================================================================
// MacroEngine
// ============================================================================

/// Entry point for macro store operations.
///
/// # Example
///
/// ```no_run
/// use emacros_core::{AddRequest, AssumeYes, EditContext, MacroCode, MacroEngine, Scope};
///
/// let engine = MacroEngine::with_defaults()?;
/// let mut session = engine.new_session();
/// let ctx = EditContext::new("python-mode", "/work/proj");
///
/// engine.load(&mut session, &ctx)?;
/// let request = AddRequest::new("greet", MacroCode::Text("Hello".into())).in_scope(Scope::Local);
/// engine.add(&mut session, &ctx, request, &mut AssumeYes)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MacroEngine {
    global_config: GlobalConfig,
}

impl MacroEngine {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    pub fn from_global_config(global_config: GlobalConfig) -> anyhow::Result<Self> {
        for warning in global_config.validate()? {
            tracing::warn!("{}", warning);
        }
        Ok(Self { global_config })
    }

    /// Create an engine from `~/.emacros/config.yaml`, or defaults.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let config = GlobalConfig::load_default()?;
        Self::from_global_config(config)
    }

    /// Create an engine from a specific configuration file.
    pub fn with_config(path: &Path) -> anyhow::Result<Self> {
        let config = GlobalConfig::from_path(path)?;
        Self::from_global_config(config)
    }

    /// Get a reference to the global configuration.
    pub fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }

    /// Start a session with the configured default scope and reserved names.
    pub fn new_session(&self) -> Session {
        Session::new(
            self.global_config.default_scope,
            self.global_config.reserved_names.iter().cloned(),
        )
    }

    /// Local definition file for `ctx`.
    pub fn local_path(&self, ctx: &EditContext) -> PathBuf {
        definition_path(Scope::Local, ctx, &self.global_config)
    }

    /// Global definition file for `ctx`.
    pub fn global_path(&self, ctx: &EditContext) -> PathBuf {
        definition_path(Scope::Global, ctx, &self.global_config)
    }

    /// Definition file for `scope` in `ctx`.
    pub fn path_for(&self, scope: Scope, ctx: &EditContext) -> PathBuf {
        definition_path(scope, ctx, &self.global_config)
    }

    // -------------------------------------------------------------------------
    // Add
    // -------------------------------------------------------------------------

    /// Save a recorded macro and bind it.
    ///
    /// Steps: settle the name (asking if none was given), settle the scope,
    /// confirm when the destination is open with unsaved edits, confirm any
    /// overwrite, then write and bind. Every refusal aborts before the write.
    ///
    /// # Errors
    ///
    /// - [`MacroError::InvalidName`] for an unusable name
    /// - [`MacroError::Aborted`] when the operator cancels or declines
    /// - [`MacroError::Io`] when the file cannot be written
    pub fn add(
        &self,
        session: &mut Session,
        ctx: &EditContext,
        request: AddRequest,
        prompter: &mut dyn Prompter,
    ) -> Result<AddResult, MacroError> {
        let name = match request.name {
            Some(raw) => {
                validate_name(&raw, &session.registry).into_result(&raw)?;
                MacroName::try_new(raw)?
            }
            None => {
                let registry = &session.registry;
                let raw = prompter
                    .read_name("Name for the last recorded macro: ", &|candidate| {
                        validate_name(candidate, registry)
                    })
                    .ok_or_else(|| MacroError::Aborted("no macro name given".to_string()))?;
                MacroName::try_new(raw)?
            }
        };

        let decision = choose_add_scope(
            &request.target,
            name.as_str(),
            ctx,
            &self.global_config,
            session.state.default_scope,
            prompter,
        )?;

        let mut store = RecordStore::open(&decision.path, &session.surfaces)?;
        if store.has_unsaved_edits() {
            let question = format!(
                "{} has unsaved edits that will be saved along with `{}`. Continue?",
                decision.path.display(),
                name
            );
            if !prompter.confirm(&question) {
                return Err(MacroError::Aborted(format!(
                    "left {} untouched",
                    decision.path.display()
                )));
            }
        }
        let overwrite = require_overwrite(&store, name.as_str(), decision.scope, prompter)?;

        let outcome = store.insert(&MacroRecord::new(name.clone(), request.code.clone()), overwrite)?;
        session.registry.bind(name.clone(), request.code);
        session.state.touch(&name);
        if !decision.custom {
            session.state.default_scope = decision.scope;
        }

        tracing::info!(
            "Saved macro `{}` to the {} file {}",
            name,
            decision.scope,
            decision.path.display()
        );
        Ok(AddResult {
            name,
            scope: decision.scope,
            path: decision.path,
            replaced: outcome == InsertOutcome::Replaced,
        })
    }

    // -------------------------------------------------------------------------
    // Rename
    // -------------------------------------------------------------------------

    /// Rename `old` to `new` in the local file, then in the global file.
    ///
    /// A `new` equal to `old` is asked for again. When `new` already exists
    /// in a file the operator may overwrite it or skip that file. Both files
    /// are checked before either is written.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::NotFound`] when neither file was renamed; the
    /// detail tells apart absent names and files the operator skipped.
    pub fn rename(
        &self,
        session: &mut Session,
        ctx: &EditContext,
        old: &str,
        new: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<RenameResult, MacroError> {
        let old_name = MacroName::try_new(old)?;
        let mut new = new.to_string();
        while new == old {
            let registry = &session.registry;
            new = prompter
                .read_name(
                    &format!("`{}` is the current name; enter a different one: ", old),
                    &|candidate| validate_name(candidate, registry),
                )
                .ok_or_else(|| MacroError::Aborted(format!("kept the name `{}`", old)))?;
        }
        validate_name(&new, &session.registry).into_result(&new)?;
        let new = MacroName::try_new(new)?;

        // Every file is checked and every question answered before the
        // first write.
        let mut seen: Vec<PathBuf> = Vec::new();
        let mut planned: Vec<(Scope, RecordStore, bool)> = Vec::new();
        let mut skipped = Vec::new();
        for scope in Scope::ALL {
            let path = self.path_for(scope, ctx);
            if seen.iter().any(|p| same_location(p, &path)) {
                continue;
            }
            seen.push(path.clone());

            let store = RecordStore::open(&path, &session.surfaces)?;
            if !store.contains(old)? {
                continue;
            }
            let replace = match check_overwrite(&store, new.as_str(), scope, prompter)? {
                Overwrite::Declined => {
                    tracing::debug!("Skipping rename in {}", path.display());
                    skipped.push(scope);
                    continue;
                }
                Overwrite::Approved => true,
                Overwrite::NoConflict => false,
            };
            planned.push((scope, store, replace));
        }

        let code = planned
            .first()
            .map(|(_, store, _)| store.get(old))
            .transpose()?
            .flatten()
            .map(|record| record.code);
        let Some(code) = code else {
            let detail = match skipped.as_slice() {
                [] => NotFoundDetail::AbsentInBoth,
                [only] => NotFoundDetail::SkippedInOne { skipped: *only },
                _ => NotFoundDetail::SkippedInBoth,
            };
            return Err(MacroError::NotFound {
                name: old.to_string(),
                detail,
            });
        };

        let mut renamed_in = Vec::new();
        for (scope, mut store, replace) in planned {
            if replace {
                store.delete(new.as_str())?;
            }
            store.rename(old, &new)?;
            tracing::info!("Renamed `{}` to `{}` in {}", old, new, store.path().display());
            renamed_in.push(scope);
        }

        session.registry.rebind(old, new.clone(), code);
        session.state.forget(old);
        session.state.touch(&new);

        Ok(RenameResult {
            old: old_name,
            new,
            renamed_in,
            skipped,
        })
    }

    // -------------------------------------------------------------------------
    // Move
    // -------------------------------------------------------------------------

    /// Move `name` from the `from` file to the other scope's file.
    ///
    /// The record is appended to the target before it is deleted from the
    /// source, so a failed write never loses it.
    ///
    /// # Errors
    ///
    /// - [`MacroError::SameRoots`] when both scopes resolve to one file
    /// - [`MacroError::NotFound`] when `name` is not in the source file
    /// - [`MacroError::Aborted`] when the operator declines an overwrite
    pub fn move_macro(
        &self,
        session: &mut Session,
        ctx: &EditContext,
        name: &str,
        from: Scope,
        prompter: &mut dyn Prompter,
    ) -> Result<MoveResult, MacroError> {
        let to = from.other();
        let from_path = self.path_for(from, ctx);
        let to_path = self.path_for(to, ctx);
        ensure_distinct_roots(&self.local_path(ctx), &self.global_path(ctx))?;

        let mut source = RecordStore::open(&from_path, &session.surfaces)?;
        let (Some(block), Some(record)) = (source.block(name)?, source.get(name)?) else {
            return Err(MacroError::NotFound {
                name: name.to_string(),
                detail: NotFoundDetail::AbsentIn(from),
            });
        };

        let mut target = RecordStore::open(&to_path, &session.surfaces)?;
        let replaced = require_overwrite(&target, name, to, prompter)?;

        if replaced {
            target.delete(name)?;
        }
        target.append_block(&block)?;
        source.delete(name)?;

        session.registry.bind(record.name.clone(), record.code);
        session.state.default_scope = to;
        session.state.touch(&record.name);

        tracing::info!(
            "Moved `{}` from {} to {}",
            name,
            from_path.display(),
            to_path.display()
        );
        Ok(MoveResult {
            name: record.name,
            from,
            to,
            from_path,
            to_path,
            replaced,
        })
    }

    // -------------------------------------------------------------------------
    // Remove
    // -------------------------------------------------------------------------

    /// Delete `name` from both definition files and unbind it.
    ///
    /// Both files are checked before either is written.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::NotFound`] if neither file held the record.
    pub fn remove(
        &self,
        session: &mut Session,
        ctx: &EditContext,
        name: &str,
    ) -> Result<RemoveResult, MacroError> {
        let name_checked = MacroName::try_new(name)?;

        let mut found: Vec<(Scope, RecordStore)> = Vec::new();
        for scope in Scope::ALL {
            let path = self.path_for(scope, ctx);
            if found.iter().any(|(_, store)| same_location(store.path(), &path)) {
                continue;
            }
            let store = RecordStore::open(&path, &session.surfaces)?;
            if store.contains(name)? {
                found.push((scope, store));
            }
        }

        if found.is_empty() {
            return Err(MacroError::NotFound {
                name: name.to_string(),
                detail: NotFoundDetail::AbsentInBoth,
            });
        }

        let mut removed_from = Vec::new();
        for (scope, mut store) in found {
            store.delete(name)?;
            tracing::info!("Removed `{}` from {}", name, store.path().display());
            removed_from.push(scope);
        }

        session.registry.unbind(name);
        session.state.forget(name);
        Ok(RemoveResult {
            name: name_checked,
            removed_from,
        })
    }

    // -------------------------------------------------------------------------
    // Load / Refresh
    // -------------------------------------------------------------------------

    /// Bind the macros of the global and local files for `ctx`.
    ///
    /// Each file is read at most once per session, absent or not. The
    /// global file is read first so local definitions win on collision.
    /// Records that do not decode are left unbound and listed in the report.
    /// A file that cannot be read is not marked and will be retried.
    pub fn load(&self, session: &mut Session, ctx: &EditContext) -> Result<LoadReport, MacroError> {
        let mut report = LoadReport::new(ctx.mode.clone());
        let global_path = self.global_path(ctx);
        let local_path = self.local_path(ctx);

        if session.cache.global_loaded(&ctx.mode) {
            tracing::debug!("Global macros for `{}` already loaded", ctx.mode);
            report.cached.push(Scope::Global);
        } else {
            report
                .files
                .push(self.load_file(session, Scope::Global, &global_path)?);
            session.cache.mark_global(&ctx.mode);
        }

        if session.cache.local_loaded(&ctx.mode, &ctx.directory) {
            tracing::debug!(
                "Local macros for `{}` in {} already loaded",
                ctx.mode,
                ctx.directory.display()
            );
            report.cached.push(Scope::Local);
        } else if same_location(&local_path, &global_path) {
            session.cache.mark_local(&ctx.mode, &ctx.directory);
            report.cached.push(Scope::Local);
        } else {
            report
                .files
                .push(self.load_file(session, Scope::Local, &local_path)?);
            session.cache.mark_local(&ctx.mode, &ctx.directory);
        }

        Ok(report)
    }

    fn load_file(
        &self,
        session: &mut Session,
        scope: Scope,
        path: &Path,
    ) -> Result<LoadedFile, MacroError> {
        let store = RecordStore::open(path, &session.surfaces)?;
        let (records, skipped) = store.records();
        let count = records.len();
        for record in records {
            session.registry.bind(record.name, record.code);
        }
        if store.exists() {
            tracing::debug!("Loaded {} macros from {}", count, path.display());
        }
        Ok(LoadedFile {
            scope,
            path: path.to_path_buf(),
            existed: store.exists(),
            records: count,
            skipped,
        })
    }

    /// Forget every binding, the load cache and session state, then load
    /// `ctx` again as if the session had just started.
    pub fn refresh(
        &self,
        session: &mut Session,
        ctx: &EditContext,
    ) -> Result<LoadReport, MacroError> {
        session.registry.clear();
        session.cache.clear();
        session.state = SessionState::new(self.global_config.default_scope);
        self.load(session, ctx)
    }

    // -------------------------------------------------------------------------
    // Listing and execution
    // -------------------------------------------------------------------------

    /// Every binding with its code, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::NoRecords`] when nothing is bound.
    pub fn list(&self, session: &Session) -> Result<Vec<ListEntry>, MacroError> {
        Ok(session
            .registry
            .snapshot()?
            .into_iter()
            .map(|(name, code)| ListEntry {
                display: code.render(),
                name,
                code,
            })
            .collect())
    }

    /// Every bound name, sorted.
    pub fn list_names(&self, session: &Session) -> Result<Vec<MacroName>, MacroError> {
        session.registry.names()
    }

    /// Look up `name` for the player.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::NotFound`] when `name` is not bound.
    pub fn execute(&self, session: &mut Session, name: &str) -> Result<Execution, MacroError> {
        let (bound, code) = session
            .registry
            .lookup(name)
            .ok_or_else(|| MacroError::NotFound {
                name: name.to_string(),
                detail: NotFoundDetail::Unbound,
            })?;
        let execution = Execution {
            name: bound.clone(),
            code: code.clone(),
        };
        session.state.last_used = Some(execution.name.clone());
        Ok(execution)
    }

    /// Run the macro whose name is `prefix`, or the only one starting with it.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::Ambiguous`] when several names match.
    pub fn auto_execute(
        &self,
        session: &mut Session,
        prefix: &str,
    ) -> Result<Execution, MacroError> {
        let name = session.registry.resolve_prefix(prefix)?;
        self.execute(session, name.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
