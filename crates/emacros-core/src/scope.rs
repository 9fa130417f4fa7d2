//! Local/global scope decisions.

use std::path::{Path, PathBuf};

use crate::config::GlobalConfig;
use crate::errors::MacroError;
use crate::paths::{definition_path, same_location, EditContext, Scope};
use crate::prompt::Prompter;

/// Where an add should write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddTarget {
    /// Ask the operator, offering the session default.
    #[default]
    Ask,
    /// Use this scope without asking.
    Scope(Scope),
    /// Write to a file the caller picked.
    CustomFile(PathBuf),
}

/// Resolved destination of an add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDecision {
    /// Scope the macro is saved under.
    pub scope: Scope,
    /// Definition file to write.
    pub path: PathBuf,
    /// Whether the caller picked the file; custom adds leave the session
    /// default scope alone.
    pub custom: bool,
}

/// Decide the scope and file for adding `name`.
///
/// Editing inside the global root always saves globally. Otherwise an
/// explicit scope is used as given, and [`AddTarget::Ask`] prompts until the
/// operator picks local, global, or accepts `default` with an empty answer.
///
/// # Errors
///
/// Returns [`MacroError::Aborted`] if the operator cancels the prompt.
pub fn choose_add_scope(
    target: &AddTarget,
    name: &str,
    ctx: &EditContext,
    config: &GlobalConfig,
    default: Scope,
    prompter: &mut dyn Prompter,
) -> Result<ScopeDecision, MacroError> {
    let global_dir = config.global_dir();

    if let AddTarget::CustomFile(path) = target {
        let in_global_dir = path
            .parent()
            .is_some_and(|parent| same_location(parent, &global_dir));
        let scope = if in_global_dir { Scope::Global } else { Scope::Local };
        return Ok(ScopeDecision {
            scope,
            path: path.clone(),
            custom: true,
        });
    }

    let scope = if same_location(&ctx.directory, &global_dir) {
        prompter.notify(&format!(
            "{} is the global macro directory; saving `{}` globally",
            global_dir.display(),
            name
        ));
        Scope::Global
    } else {
        match target {
            AddTarget::Scope(scope) => *scope,
            _ => ask_scope(name, default, prompter)?,
        }
    };

    Ok(ScopeDecision {
        scope,
        path: definition_path(scope, ctx, config),
        custom: false,
    })
}

fn ask_scope(name: &str, default: Scope, prompter: &mut dyn Prompter) -> Result<Scope, MacroError> {
    let question = format!(
        "Save macro `{}` locally or globally? (l/g, empty for {})",
        name, default
    );
    loop {
        let Some(answer) = prompter.ask(&question) else {
            return Err(MacroError::Aborted(format!("no scope chosen for `{}`", name)));
        };
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<Scope>() {
            Ok(scope) => return Ok(scope),
            Err(_) => prompter.notify("Please answer l (local) or g (global)"),
        }
    }
}

/// Refuse to move between two names for one file.
pub fn ensure_distinct_roots(local: &Path, global: &Path) -> Result<(), MacroError> {
    if same_location(local, global) {
        return Err(MacroError::SameRoots {
            path: local.to_path_buf(),
        });
    }
    Ok(())
}
