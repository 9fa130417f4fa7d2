//! Formatting helpers for CLI output.

use emacros_core::Scope;

/// Truncate `s` to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }
    let kept: String = s.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

/// Join scopes for a sentence: `local`, `local and global`.
pub fn format_scopes(scopes: &[Scope]) -> String {
    let names: Vec<String> = scopes.iter().map(Scope::to_string).collect();
    match names.as_slice() {
        [] => "no".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// `1 macro`, `2 macros`.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("héllo wörld", 6), "hél...");
        assert_eq!(truncate_str("hello", 2), "..");
    }

    #[test]
    fn test_format_scopes() {
        assert_eq!(format_scopes(&[Scope::Local]), "local");
        assert_eq!(format_scopes(&[Scope::Local, Scope::Global]), "local and global");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "macro"), "1 macro");
        assert_eq!(pluralize(0, "macro"), "0 macros");
    }
}
