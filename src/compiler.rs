//! The `Compiler` — Process-Wide Configuration and Per-Parse State
//!
//! Spec section 3: "Per-parse state is reset at the start of each
//! top-level `parse_*` call, never leaks between compilations." Rather
//! than mutate-and-hope-clean, `ParseState::default()` is reconstructed
//! fresh inside every `api::parse_*` entry point, which is what makes
//! that invariant structurally true instead of merely documented.

use crate::side_table::SideTable;
use crate::skip_set::SkipSet;

/// One entry in the optional, in-memory trace log (spec's ambient
/// logging note in SPEC_FULL.md): never written to a process-wide sink,
/// just appended to `Compiler::trace_log` for the caller to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub stage: &'static str,
    pub detail: String,
}

/// Mutable state scoped to exactly one compilation. Reconstructed by
/// `Compiler::begin_parse`, never reused across calls.
#[derive(Debug, Default)]
pub struct ParseState {
    pub side_table: SideTable,
    pub skip_set: SkipSet,
    /// First indent character seen this compilation: ' ' or '\t'.
    pub indent_char: Option<char>,
    pub docstring_buffer: Option<String>,
    pub ichain_counter: u32,
}

impl ParseState {
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Allocate the next unique iterator-chain temporary name, used by
    /// the `::` chain lowering and iterator-pattern matching (spec
    /// 4.5.1, 4.5.2).
    pub fn next_ichain_temp(&mut self) -> String {
        let name = format!("_coconut_ichain_{}", self.ichain_counter);
        self.ichain_counter += 1;
        name
    }
}

/// Process-wide configuration plus the state of the compilation
/// currently in flight, if any.
pub struct Compiler {
    pub options: crate::config::CompileOptions,
    pub state: ParseState,
    pub warnings: Vec<crate::error::Diagnostic>,
    pub trace_log: Vec<TraceEvent>,
}

impl Compiler {
    pub fn new(options: crate::config::CompileOptions) -> Self {
        Self {
            options,
            state: ParseState::fresh(),
            warnings: Vec::new(),
            trace_log: Vec::new(),
        }
    }

    /// Reset all per-parse state. Called at the top of every
    /// `api::parse_*` function, even when the same `Compiler` is reused
    /// across multiple compilations by a caller.
    pub fn begin_parse(&mut self) {
        self.state = ParseState::fresh();
        self.warnings.clear();
        self.trace_log.clear();
    }

    pub fn trace(&mut self, stage: &'static str, detail: impl Into<String>) {
        if self.options.trace {
            self.trace_log.push(TraceEvent {
                stage,
                detail: detail.into(),
            });
        }
    }

    pub fn warn(&mut self, diagnostic: crate::error::Diagnostic) {
        self.warnings.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;

    #[test]
    fn begin_parse_clears_prior_state() {
        let mut compiler = Compiler::new(CompileOptions::default());
        compiler.state.ichain_counter = 7;
        compiler.warn(crate::error::Diagnostic::warning(
            crate::error::DiagnosticKind::Style,
            "test",
        ));
        compiler.begin_parse();
        assert_eq!(compiler.state.ichain_counter, 0);
        assert!(compiler.warnings.is_empty());
    }

    #[test]
    fn ichain_temps_are_unique_and_monotonic() {
        let mut state = ParseState::fresh();
        let a = state.next_ichain_temp();
        let b = state.next_ichain_temp();
        assert_ne!(a, b);
        assert_eq!(a, "_coconut_ichain_0");
        assert_eq!(b, "_coconut_ichain_1");
    }
}
