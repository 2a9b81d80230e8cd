//! Driver-Facing Configuration
//!
//! `CompileOptions` is the Rust name for the configuration bag of spec
//! 6.5. It is `Serialize`/`Deserialize` so an (out-of-scope) driver can
//! read it from a config file or CLI flags and hand it straight to the
//! API functions in `api`.

use serde::{Deserialize, Serialize};

/// The destination language/version triple controlling emission and
/// construct gating. `""` means universal mode: gated constructs emit a
/// runtime `sys.version_info` check instead of picking one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target(pub String);

impl Target {
    pub fn universal() -> Self {
        Target(String::new())
    }

    pub fn is_universal(&self) -> bool {
        self.0.is_empty()
    }

    /// The major version number this target pins to, if any ("2" or "3").
    pub fn major(&self) -> Option<&str> {
        if self.0.is_empty() {
            None
        } else {
            self.0.get(0..1)
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::universal()
    }
}

/// Driver-facing configuration (spec 6.5). Reset is not required between
/// compilations -- this struct is immutable configuration, not
/// per-parse state (see `compiler::ParseState` for that).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    pub target: Target,
    /// Promote style warnings to errors.
    pub strict: bool,
    /// Suppress line-number comments, minify the header.
    pub minify: bool,
    /// Emit `# <orig-line>` after each logical statement for debuggers.
    pub line_numbers: bool,
    /// Include original source as a trailing comment.
    pub keep_lines: bool,
    /// Suppress tail-call elimination helpers.
    pub no_tco: bool,
    /// Emit type annotations as executable expressions instead of
    /// forward-string-wrapped.
    pub no_wrap_types: bool,
    /// Append structured `TraceEvent`s during compilation instead of
    /// staying fully side-effect free. Off by default; never writes to
    /// any process-wide sink (see SPEC_FULL.md's ambient-logging note).
    pub trace: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            target: Target::universal(),
            strict: false,
            minify: false,
            line_numbers: false,
            keep_lines: false,
            no_tco: false,
            no_wrap_types: false,
            trace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_target_has_no_major() {
        assert_eq!(Target::universal().major(), None);
        assert!(Target::universal().is_universal());
    }

    #[test]
    fn pinned_target_reports_major() {
        assert_eq!(Target("35".to_string()).major(), Some("3"));
        assert_eq!(Target("27".to_string()).major(), Some("2"));
    }

    #[test]
    fn options_round_trip_through_json() {
        let opts = CompileOptions {
            strict: true,
            target: Target("3".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&opts).unwrap();
        let back: CompileOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(opts, back);
    }
}
