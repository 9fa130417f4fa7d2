//! The interactive prompter seam.
//!
//! Turning keystrokes into answers belongs to the host. The engine only asks
//! questions through [`Prompter`] and never blocks on input itself.

use std::collections::VecDeque;

use crate::macros::NameValidation;

/// Host-provided source of operator answers.
pub trait Prompter {
    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str) -> bool;

    /// Ask for a free-form answer. `None` means the operator cancelled.
    fn ask(&mut self, question: &str) -> Option<String>;

    /// Ask for a macro name.
    ///
    /// Implementations run `validate` on the input (per keystroke or on
    /// submission) and only return accepted names. `None` means cancel.
    fn read_name(
        &mut self,
        question: &str,
        validate: &dyn Fn(&str) -> NameValidation,
    ) -> Option<String>;

    /// Show a message that needs no answer.
    fn notify(&mut self, message: &str);
}

/// Non-interactive prompter that approves every confirmation.
///
/// Free-form questions are cancelled, so operations needing a choice that
/// was not supplied up front abort instead of guessing.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!("Auto-confirming: {}", question);
        true
    }

    fn ask(&mut self, _question: &str) -> Option<String> {
        None
    }

    fn read_name(
        &mut self,
        _question: &str,
        _validate: &dyn Fn(&str) -> NameValidation,
    ) -> Option<String> {
        None
    }

    fn notify(&mut self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// One scripted operator answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Answer "yes" to a confirmation.
    Yes,
    /// Answer "no" to a confirmation.
    No,
    /// Type a line of text.
    Text(String),
    /// Cancel the prompt.
    Cancel,
}

/// Prompter replaying a fixed script, recording what it was asked.
///
/// An exhausted script declines confirmations and cancels questions.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    /// Every question asked, in order.
    pub questions: Vec<String>,
    /// Every notification shown, in order.
    pub notices: Vec<String>,
}

impl ScriptedPrompter {
    /// A prompter that will give `answers` in order.
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            questions: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        matches!(self.answers.pop_front(), Some(Answer::Yes))
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        self.questions.push(question.to_string());
        match self.answers.pop_front() {
            Some(Answer::Text(text)) => Some(text),
            Some(Answer::Yes) => Some("y".to_string()),
            Some(Answer::No) => Some("n".to_string()),
            Some(Answer::Cancel) | None => None,
        }
    }

    fn read_name(
        &mut self,
        question: &str,
        validate: &dyn Fn(&str) -> NameValidation,
    ) -> Option<String> {
        self.questions.push(question.to_string());
        loop {
            match self.answers.pop_front() {
                Some(Answer::Text(text)) => match validate(&text).reason() {
                    None => return Some(text),
                    Some(reason) => self.notices.push(reason),
                },
                Some(_) | None => return None,
            }
        }
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::check_name_syntax;

    #[test]
    fn test_scripted_read_name_skips_invalid_input() {
        let mut prompter = ScriptedPrompter::new([
            Answer::Text("1".into()),
            Answer::Text("bad name".into()),
            Answer::Text("good".into()),
        ]);
        let name = prompter.read_name("Name: ", &check_name_syntax);
        assert_eq!(name.as_deref(), Some("good"));
        assert_eq!(prompter.notices.len(), 2);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_scripted_exhaustion_declines() {
        let mut prompter = ScriptedPrompter::default();
        assert!(!prompter.confirm("Overwrite?"));
        assert_eq!(prompter.ask("Scope?"), None);
        assert_eq!(prompter.questions.len(), 2);
    }

    #[test]
    fn test_assume_yes() {
        let mut prompter = AssumeYes;
        assert!(prompter.confirm("Overwrite?"));
        assert_eq!(prompter.read_name("Name: ", &check_name_syntax), None);
    }
}
