//! Name Validation (spec 4.5.9)
//!
//! Shared by the `data`, `match`, and pattern-matching handlers: a
//! binding name that collides with a target-language keyword would
//! silently produce invalid output, so every handler that introduces a
//! new binding runs it through `validate_bind_name` first.

use crate::error::{CoreError, Diagnostic, DiagnosticKind};

const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

pub fn validate_bind_name(name: &str) -> Result<(), CoreError> {
    if is_reserved(name) {
        return Err(CoreError::Diagnostic(Diagnostic::error(
            DiagnosticKind::Parse,
            format!("cannot bind name '{}': reserved word", name),
        )));
    }
    if name.is_empty() || !(name.chars().next().unwrap().is_alphabetic() || name.starts_with('_')) {
        return Err(CoreError::Diagnostic(Diagnostic::error(
            DiagnosticKind::Parse,
            format!("'{}' is not a valid identifier", name),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_are_rejected() {
        assert!(validate_bind_name("class").is_err());
        assert!(validate_bind_name("match").is_ok()); // soft keyword, not reserved
    }

    #[test]
    fn ordinary_identifiers_are_accepted() {
        assert!(validate_bind_name("x").is_ok());
        assert!(validate_bind_name("_private").is_ok());
    }

    #[test]
    fn empty_or_numeric_leading_names_are_rejected() {
        assert!(validate_bind_name("").is_err());
        assert!(validate_bind_name("1x").is_err());
    }
}
