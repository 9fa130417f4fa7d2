//! Overwrite confirmation before mutating writes.
//!
//! Before a write that would clobber an existing record the operator is
//! asked, naming the macro and the destination. What a refusal means is the
//! caller's business: add and move abort, rename skips that file.

use crate::errors::MacroError;
use crate::paths::Scope;
use crate::prompt::Prompter;
use crate::store::RecordStore;

/// Decision reached for a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// The name is free at the destination.
    NoConflict,
    /// The operator approved replacing the existing record.
    Approved,
    /// The operator refused.
    Declined,
}

/// Check `store` for `name` and ask before overwriting.
pub fn check_overwrite(
    store: &RecordStore,
    name: &str,
    scope: Scope,
    prompter: &mut dyn Prompter,
) -> Result<Overwrite, MacroError> {
    if !store.contains(name)? {
        return Ok(Overwrite::NoConflict);
    }
    let question = format!(
        "Macro `{}` already exists in the {} file {}. Overwrite?",
        name,
        scope,
        store.path().display()
    );
    if prompter.confirm(&question) {
        tracing::debug!("Overwrite of `{}` in {} approved", name, store.path().display());
        Ok(Overwrite::Approved)
    } else {
        Ok(Overwrite::Declined)
    }
}

/// Like [`check_overwrite`], but a refusal aborts the whole operation.
///
/// Returns whether a record will be replaced.
pub fn require_overwrite(
    store: &RecordStore,
    name: &str,
    scope: Scope,
    prompter: &mut dyn Prompter,
) -> Result<bool, MacroError> {
    match check_overwrite(store, name, scope, prompter)? {
        Overwrite::NoConflict => Ok(false),
        Overwrite::Approved => Ok(true),
        Overwrite::Declined => Err(MacroError::Aborted(format!(
            "kept the existing macro `{}` in {}",
            name,
            store.path().display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::surface::SurfaceSet;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(content: &str) -> (TempDir, RecordStore) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("f.el");
        fs::write(&path, content).unwrap();
        let store = RecordStore::open(&path, &SurfaceSet::new()).unwrap();
        (temp, store)
    }

    #[test]
    fn test_no_conflict_asks_nothing() {
        let (_temp, store) = store_with("");
        let mut prompter = ScriptedPrompter::default();
        let outcome = check_overwrite(&store, "a", Scope::Local, &mut prompter).unwrap();
        assert_eq!(outcome, Overwrite::NoConflict);
        assert!(prompter.questions.is_empty());
    }

    #[test]
    fn test_question_names_macro_and_destination() {
        let (_temp, store) = store_with("(emacros-new-macro 'a \"1\")\n");
        let mut prompter = ScriptedPrompter::new([Answer::Yes]);
        let outcome = check_overwrite(&store, "a", Scope::Global, &mut prompter).unwrap();
        assert_eq!(outcome, Overwrite::Approved);
        let question = &prompter.questions[0];
        assert!(question.contains("`a`"));
        assert!(question.contains("global"));
        assert!(question.contains("f.el"));
    }

    #[test]
    fn test_require_overwrite_aborts_on_refusal() {
        let (_temp, store) = store_with("(emacros-new-macro 'a \"1\")\n");
        let mut prompter = ScriptedPrompter::new([Answer::No]);
        let err = require_overwrite(&store, "a", Scope::Local, &mut prompter).unwrap_err();
        assert!(matches!(err, MacroError::Aborted(_)));
    }
}
