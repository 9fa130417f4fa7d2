//! CLI definition and command dispatch for emacros.
//!
//! Every invocation is one session: the engine is built from configuration,
//! the definition files for `--mode`/`--dir` are loaded, then the command
//! runs against that session.
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (e.g., `--config`, `--mode`)
//! 2. Environment variables (`EMACROS_CONFIG`, `EMACROS_MODE`, `EMACROS_DIR`, ...)
//! 3. Config file (`~/.emacros/config.yaml` or path from `--config`)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::prompt::TerminalPrompter;
use crate::ui::{color, format, table, ColorMode, MessageType, Style};

use emacros_core::{
    AddRequest, EditContext, Execution, LoadReport, MacroCode, MacroEngine, MacroError, Prompter,
    Scope, Session,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// emacros – named keyboard macros in local and global definition files
#[derive(Parser, Debug)]
#[command(name = "emacros")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "EMACROS_VERBOSE")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.emacros/config.yaml)
    #[arg(long, global = true, env = "EMACROS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Mode of the edited document, e.g. `python-mode`
    #[arg(short, long, global = true, env = "EMACROS_MODE", default_value = "text-mode")]
    pub mode: String,

    /// Directory of the edited document (default: current directory)
    #[arg(short, long, global = true, env = "EMACROS_DIR")]
    pub dir: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Color output mode: always, never, or auto
    #[arg(long, global = true, env = "EMACROS_COLOR", default_value = "auto")]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save a recorded macro under a name
    #[command(after_help = r#"EXAMPLES:
    # Save literal text locally
    emacros add greet --text "Hello" --scope local

    # Save key events (characters as numbers, keys by name)
    emacros add wrap --keys "40 return 41" --scope global

    # Ask for the name and scope interactively
    emacros add --text "TODO: "
"#)]
    Add {
        /// Macro name; asked for when omitted
        name: Option<String>,

        /// Literal text payload
        #[arg(long, conflicts_with = "keys", required_unless_present = "keys")]
        text: Option<String>,

        /// Key event payload, whitespace separated
        #[arg(long)]
        keys: Option<String>,

        /// Scope to save in; asked for when omitted
        #[arg(long, conflicts_with = "file")]
        scope: Option<Scope>,

        /// Save into this file instead of a scope's definition file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Rename a macro in the local and global files
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Move a macro between the local and global files
    #[command(after_help = r#"EXAMPLES:
    # Promote a local macro to the global file
    emacros move greet --from local
"#)]
    Move {
        /// Macro name
        name: String,

        /// Scope the macro is moved out of
        #[arg(long)]
        from: Scope,
    },

    /// Delete a macro from both files
    #[command(alias = "rm")]
    Remove {
        /// Macro name
        name: String,
    },

    /// Print the payload of a macro for replay
    Exec {
        /// Macro name
        name: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Like `exec`, accepting any unique prefix of the name
    Auto {
        /// Name or name prefix
        prefix: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Load the definition files and report what was read
    Load {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List bound macros with their code
    #[command(alias = "ls")]
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List bound macro names only
    Names,

    /// Forget the session and load everything again
    Refresh {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Commands that find records by header alone and can run when the
    /// bootstrap load failed.
    fn edits_by_header(&self) -> bool {
        matches!(
            self,
            Self::Rename { .. } | Self::Move { .. } | Self::Remove { .. }
        )
    }
}

// ============================================================================
// Run function
// ============================================================================

/// Run the CLI application.
///
/// Returns `ExitCode::SUCCESS` on success, or `ExitCode::FAILURE` on error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always; debug only with --verbose
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!("emacros_core={},emacros_cli={}", log_level, log_level);

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let style = Style::new(cli.color);

    let engine = match &cli.config {
        Some(config_path) => MacroEngine::with_config(config_path),
        None => MacroEngine::with_defaults(),
    };
    let engine = match engine {
        Ok(engine) => engine,
        Err(e) => {
            let hint = match &cli.config {
                Some(path) => format!("Check your config at {}", path.display()),
                None => "Check your config at ~/.emacros/config.yaml".to_string(),
            };
            eprintln!(
                "{}",
                style.error_with_context(
                    "Failed to initialize emacros",
                    Some(&e.to_string()),
                    Some(&hint),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let directory = match &cli.dir {
        Some(dir) => dir.clone(),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}",
                    style.error_with_context(
                        "Cannot determine the current directory",
                        Some(&e.to_string()),
                        Some("Pass --dir explicitly"),
                    )
                );
                return ExitCode::FAILURE;
            }
        },
    };
    let ctx = EditContext::new(&cli.mode, directory);
    tracing::debug!("Mode `{}` in {}", ctx.mode, ctx.directory.display());

    let mut session = engine.new_session();
    let mut prompter = TerminalPrompter::stdin(style.clone(), cli.yes, cli.quiet);
    let out = Output {
        style: &style,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Command::Load { json } => handle_load(&out, &engine, &mut session, &ctx, json),
        Command::Refresh { json } => handle_refresh(&out, &engine, &mut session, &ctx, json),
        command => match engine.load(&mut session, &ctx) {
            Err(e) if command.edits_by_header() => {
                out.warn(&format!("Could not load macros: {}", e));
                dispatch(&out, &engine, &mut session, &ctx, &mut prompter, command)
            }
            loaded => loaded
                .and_then(|_| dispatch(&out, &engine, &mut session, &ctx, &mut prompter, command)),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                style.error_with_context(&e.to_string(), None, error_hint(&e).as_deref())
            );
            ExitCode::FAILURE
        }
    }
}

/// Where handlers print.
struct Output<'a> {
    style: &'a Style,
    quiet: bool,
}

impl Output<'_> {
    fn ok(&self, text: &str) {
        println!("{}", self.style.message(MessageType::Ok, text));
    }

    fn info(&self, text: &str) {
        if !self.quiet {
            println!("{}", self.style.message(MessageType::Info, text));
        }
    }

    fn warn(&self, text: &str) {
        eprintln!("{}", self.style.message(MessageType::Warn, text));
    }

    fn skip(&self, text: &str) {
        println!("{}", self.style.message(MessageType::Skip, text));
    }

    fn detail(&self, label: &str, value: &str) {
        if !self.quiet {
            println!("{}", self.style.message_detail(label, value));
        }
    }
}

fn dispatch(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &mut Session,
    ctx: &EditContext,
    prompter: &mut dyn Prompter,
    command: Command,
) -> Result<(), MacroError> {
    match command {
        Command::Add {
            name,
            text,
            keys,
            scope,
            file,
            json,
        } => {
            let code = match (text, keys) {
                (Some(text), _) => MacroCode::Text(text),
                (None, Some(keys)) => MacroCode::parse_events(&keys)?,
                (None, None) => {
                    return Err(MacroError::Aborted("nothing to save".to_string()));
                }
            };
            let mut request = match name {
                Some(name) => AddRequest::new(name, code),
                None => AddRequest::unnamed(code),
            };
            if let Some(scope) = scope {
                request = request.in_scope(scope);
            }
            if let Some(file) = file {
                request = request.in_file(file);
            }
            handle_add(out, engine, session, ctx, prompter, request, json)
        }
        Command::Rename { old, new } => handle_rename(out, engine, session, ctx, prompter, &old, &new),
        Command::Move { name, from } => handle_move(out, engine, session, ctx, prompter, &name, from),
        Command::Remove { name } => handle_remove(out, engine, session, ctx, &name),
        Command::Exec { name, json } => {
            let execution = engine.execute(session, &name)?;
            print_execution(&execution, json)
        }
        Command::Auto { prefix, json } => {
            let execution = engine.auto_execute(session, &prefix)?;
            print_execution(&execution, json)
        }
        Command::List { json } => handle_list(out, engine, session, json),
        Command::Names => {
            for name in engine.list_names(session)? {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Load { .. } | Command::Refresh { .. } => Ok(()),
    }
}

fn error_hint(err: &MacroError) -> Option<String> {
    match err {
        MacroError::NoRecords => {
            Some("Save one with `emacros add NAME --text ...`".to_string())
        }
        MacroError::SameRoots { .. } => {
            Some("The directory is the global root; run from another --dir".to_string())
        }
        MacroError::Ambiguous { .. } => Some("Type more of the name".to_string()),
        MacroError::DuplicateRecord { path, .. } => {
            Some(format!("Edit {} and keep one definition", path.display()))
        }
        MacroError::Aborted(_) => Some("Pass --yes to approve confirmations".to_string()),
        MacroError::InvalidName { .. } => {
            Some("Names use letters, digits, `-` and `_`, and are not numbers".to_string())
        }
        _ => None,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), MacroError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| MacroError::Other(e.into()))?;
    println!("{}", json);
    Ok(())
}

// ============================================================================
// Command handlers
// ============================================================================

fn handle_add(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &mut Session,
    ctx: &EditContext,
    prompter: &mut dyn Prompter,
    request: AddRequest,
    json: bool,
) -> Result<(), MacroError> {
    let result = engine.add(session, ctx, request, prompter)?;
    if json {
        return print_json(&result);
    }
    let verb = if result.replaced { "Replaced" } else { "Saved" };
    out.ok(&format!(
        "{} macro {} in the {} file",
        verb,
        out.style.macro_name(result.name.as_str()),
        out.style.scope(result.scope)
    ));
    out.detail("File", &out.style.file_path(&result.path.display().to_string()));
    Ok(())
}

fn handle_rename(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &mut Session,
    ctx: &EditContext,
    prompter: &mut dyn Prompter,
    old: &str,
    new: &str,
) -> Result<(), MacroError> {
    let result = engine.rename(session, ctx, old, new, prompter)?;
    out.ok(&format!(
        "Renamed {} to {} in the {} {}",
        result.old,
        out.style.macro_name(result.new.as_str()),
        format::format_scopes(&result.renamed_in),
        if result.renamed_in.len() == 1 { "file" } else { "files" }
    ));
    for scope in &result.skipped {
        out.skip(&format!("Left the {} file unchanged", scope));
    }
    Ok(())
}

fn handle_move(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &mut Session,
    ctx: &EditContext,
    prompter: &mut dyn Prompter,
    name: &str,
    from: Scope,
) -> Result<(), MacroError> {
    let result = engine.move_macro(session, ctx, name, from, prompter)?;
    out.ok(&format!(
        "Moved {} from {} to {}",
        out.style.macro_name(result.name.as_str()),
        out.style.scope(result.from),
        out.style.scope(result.to)
    ));
    out.detail("From", &result.from_path.display().to_string());
    out.detail("To", &result.to_path.display().to_string());
    if result.replaced {
        out.info("The previous definition in the target file was replaced");
    }
    Ok(())
}

fn handle_remove(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &mut Session,
    ctx: &EditContext,
    name: &str,
) -> Result<(), MacroError> {
    let result = engine.remove(session, ctx, name)?;
    out.ok(&format!(
        "Removed {} from the {} {}",
        out.style.macro_name(result.name.as_str()),
        format::format_scopes(&result.removed_from),
        if result.removed_from.len() == 1 { "file" } else { "files" }
    ));
    Ok(())
}

fn print_execution(execution: &Execution, json: bool) -> Result<(), MacroError> {
    if json {
        return print_json(execution);
    }
    match &execution.code {
        MacroCode::Text(text) => println!("{}", text),
        MacroCode::Events(_) => println!("{}", execution.code.render()),
    }
    Ok(())
}

fn handle_list(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &Session,
    json: bool,
) -> Result<(), MacroError> {
    let entries = engine.list(session)?;
    if json {
        return print_json(&entries);
    }
    println!("{}", table::render_macro_table(&entries, color::terminal_width()));
    out.info(&format::pluralize(entries.len(), "macro"));
    Ok(())
}

fn handle_load(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &mut Session,
    ctx: &EditContext,
    json: bool,
) -> Result<(), MacroError> {
    let report = engine.load(session, ctx)?;
    print_load_report(out, &report, json)
}

fn handle_refresh(
    out: &Output<'_>,
    engine: &MacroEngine,
    session: &mut Session,
    ctx: &EditContext,
    json: bool,
) -> Result<(), MacroError> {
    let report = engine.refresh(session, ctx)?;
    print_load_report(out, &report, json)
}

fn print_load_report(out: &Output<'_>, report: &LoadReport, json: bool) -> Result<(), MacroError> {
    if json {
        return print_json(report);
    }
    out.ok(&format!(
        "Loaded {} for mode {}",
        format::pluralize(report.bindings(), "macro"),
        report.mode
    ));
    if !out.quiet {
        let rendered = table::render_load_table(report);
        if !rendered.is_empty() {
            println!("{}", rendered);
        }
    }
    for file in &report.files {
        for skipped in &file.skipped {
            out.warn(&format!(
                "Skipped {} at {}:{}: {}",
                out.style.macro_name(&skipped.name),
                file.path.display(),
                skipped.line,
                skipped.reason
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_needs_source_scope() {
        assert!(Cli::try_parse_from(["emacros", "move", "greet"]).is_err());
        let cli = Cli::try_parse_from(["emacros", "move", "greet", "--from", "global"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Move {
                from: Scope::Global,
                ..
            }
        ));
    }

    #[test]
    fn test_header_commands_tolerate_failed_load() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;
        assert!(parse(&["emacros", "remove", "bad"]).edits_by_header());
        assert!(parse(&["emacros", "rename", "a", "b"]).edits_by_header());
        assert!(parse(&["emacros", "move", "a", "--from", "local"]).edits_by_header());
        assert!(!parse(&["emacros", "exec", "a"]).edits_by_header());
        assert!(!parse(&["emacros", "names"]).edits_by_header());
    }
}
