//! Line-based prompter reading answers from stdin.
//!
//! Questions go to stderr so stdout stays clean for listings and JSON.

use std::io::{self, BufRead, Write};

use emacros_core::{NameValidation, Prompter};

use crate::ui::{MessageType, Style};

/// Prompter for a terminal session.
pub struct TerminalPrompter<R> {
    input: R,
    style: Style,
    assume_yes: bool,
    quiet: bool,
}

impl TerminalPrompter<io::StdinLock<'static>> {
    /// Prompter over the process stdin.
    pub fn stdin(style: Style, assume_yes: bool, quiet: bool) -> Self {
        Self::new(io::stdin().lock(), style, assume_yes, quiet)
    }
}

impl<R: BufRead> TerminalPrompter<R> {
    /// Prompter over any line source.
    pub fn new(input: R, style: Style, assume_yes: bool, quiet: bool) -> Self {
        Self {
            input,
            style,
            assume_yes,
            quiet,
        }
    }

    /// Print `question` and read one line. `None` at end of input.
    fn read_line(&mut self, question: &str) -> Option<String> {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{}", question);
        let _ = stderr.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                let _ = writeln!(stderr);
                None
            }
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl<R: BufRead> Prompter for TerminalPrompter<R> {
    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            tracing::debug!("Assuming yes: {}", question);
            return true;
        }
        self.read_line(&format!("{} [y/N] ", question))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        self.read_line(&format!("{} ", question))
    }

    fn read_name(
        &mut self,
        question: &str,
        validate: &dyn Fn(&str) -> NameValidation,
    ) -> Option<String> {
        loop {
            let answer = self.read_line(question)?;
            let candidate = answer.trim();
            match validate(candidate).reason() {
                None => return Some(candidate.to_string()),
                Some(reason) => eprintln!("{}", self.style.message(MessageType::Warn, &reason)),
            }
        }
    }

    fn notify(&mut self, message: &str) {
        if !self.quiet {
            eprintln!("{}", self.style.message(MessageType::Info, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ColorMode;
    use emacros_core::check_name_syntax;
    use std::io::Cursor;

    fn prompter(input: &str, assume_yes: bool) -> TerminalPrompter<Cursor<Vec<u8>>> {
        TerminalPrompter::new(
            Cursor::new(input.as_bytes().to_vec()),
            Style::new(ColorMode::Never),
            assume_yes,
            true,
        )
    }

    #[test]
    fn test_confirm_reads_yes() {
        let mut p = prompter("y\nno\n", false);
        assert!(p.confirm("Overwrite?"));
        assert!(!p.confirm("Overwrite?"));
        assert!(!p.confirm("Overwrite?"));
    }

    #[test]
    fn test_assume_yes_reads_nothing() {
        let mut p = prompter("", true);
        assert!(p.confirm("Overwrite?"));
    }

    #[test]
    fn test_read_name_loops_until_valid() {
        let mut p = prompter("12\nbad name\n  good \n", false);
        assert_eq!(p.read_name("Name: ", &check_name_syntax).as_deref(), Some("good"));
        assert_eq!(p.read_name("Name: ", &check_name_syntax), None);
    }

    #[test]
    fn test_ask_keeps_empty_answers() {
        let mut p = prompter("\ng\n", false);
        assert_eq!(p.ask("Scope?").as_deref(), Some(""));
        assert_eq!(p.ask("Scope?").as_deref(), Some("g"));
        assert_eq!(p.ask("Scope?"), None);
    }
}
