//! Core Error Model
//!
//! Mirrors the hierarchy of spec section 4.7: an `Internal` kind for
//! invariant violations that should never surface to a caller, and a
//! `Diagnostic` kind covering everything a compilation can legitimately
//! fail (or warn) on. Exactly one `Diagnostic` is returned per failed
//! compilation; warnings accumulate separately and never abort.

use std::fmt;

/// Severity of a diagnostic. Warnings never abort a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// What kind of rule produced the diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Grammar failed to match at this position.
    Parse,
    /// `strict` promoted a style rule to an error.
    Style,
    /// Construct requires a target version the compile isn't targeting.
    Target,
    /// Raised by a handler after parsing, re-formed at evaluation time.
    DeferredSyntax,
    /// A top-level compiler error with no more specific classification.
    Exception,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::Parse => "SyntaxError",
            DiagnosticKind::Style => "StyleError",
            DiagnosticKind::Target => "TargetError",
            DiagnosticKind::DeferredSyntax => "DeferredSyntaxError",
            DiagnosticKind::Exception => "Exception",
        };
        write!(f, "{}", s)
    }
}

/// A single positioned diagnostic: message, optional hint, and enough
/// position information to draw a caret under the offending column in
/// terms of the *original* (pre-bracketing) source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub hint: Option<String>,
    pub original_line: u32,
    pub column: u32,
    pub snippet: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            hint: None,
            original_line: 0,
            column: 0,
            snippet: String::new(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            hint: None,
            original_line: 0,
            column: 0,
            snippet: String::new(),
        }
    }

    pub fn at(mut self, original_line: u32, column: u32, snippet: impl Into<String>) -> Self {
        self.original_line = original_line;
        self.column = column;
        self.snippet = snippet.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Strict-mode suffix required by spec 4.7 ("message suffix notes `--strict`").
    pub fn strict_suffix(mut self) -> Self {
        self.message.push_str(" (enforced because of --strict)");
        self
    }

    pub fn target_suffix(mut self, required_target: &str) -> Self {
        self.message
            .push_str(&format!(" (requires target {})", required_target));
        self
    }

    /// Render severity, message, hint, source line with caret, and the
    /// original-file line number -- the four things every diagnostic must
    /// show per spec 4.7.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} {}: {}\n",
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            },
            self.kind,
            self.message,
        ));
        if let Some(hint) = &self.hint {
            out.push_str(&format!("  hint: {}\n", hint));
        }
        out.push_str(&format!("  --> line {}\n", self.original_line));
        if !self.snippet.is_empty() {
            out.push_str(&format!("   | {}\n", self.snippet));
            let col = self.column as usize;
            out.push_str(&format!("   | {}^\n", " ".repeat(col)));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl std::error::Error for Diagnostic {}

/// Invariant violation inside the compiler itself. Never caught by
/// calling code; indicates a bug in this crate, not in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalError {
    pub message: String,
    pub handler_name: Option<String>,
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.handler_name {
            Some(name) => write!(f, "internal error in handler `{}`: {}", name, self.message),
            None => write!(f, "internal error: {}", self.message),
        }
    }
}

impl std::error::Error for InternalError {}

/// Top-level error type returned by every `api::parse_*` function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    Internal(InternalError),
    Diagnostic(Diagnostic),
}

impl CoreError {
    pub fn internal(message: impl Into<String>) -> Self {
        CoreError::Internal(InternalError {
            message: message.into(),
            handler_name: None,
        })
    }

    pub fn internal_in(handler_name: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Internal(InternalError {
            message: message.into(),
            handler_name: Some(handler_name.into()),
        })
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Internal(e) => write!(f, "{}", e),
            CoreError::Diagnostic(d) => write!(f, "{}", d),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<Diagnostic> for CoreError {
    fn from(d: Diagnostic) -> Self {
        CoreError::Diagnostic(d)
    }
}

impl From<InternalError> for CoreError {
    fn from(e: InternalError) -> Self {
        CoreError::Internal(e)
    }
}

/// `internal_assert`-style helper: wraps a condition failure into a
/// `CoreError::Internal`, matching upstream's `internal_assert`.
pub fn internal_assert(condition: bool, message: impl Into<String>) -> Result<(), CoreError> {
    if condition {
        Ok(())
    } else {
        Err(CoreError::internal(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_render_includes_caret() {
        let d = Diagnostic::error(DiagnosticKind::Parse, "unexpected token")
            .at(12, 4, "    return x")
            .with_hint("did you forget a colon?");
        let rendered = d.render();
        assert!(rendered.contains("line 12"));
        assert!(rendered.contains("unexpected token"));
        assert!(rendered.contains("hint"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn strict_suffix_is_appended() {
        let d = Diagnostic::error(DiagnosticKind::Style, "backslash continuation").strict_suffix();
        assert!(d.message.ends_with("--strict)"));
    }
}
