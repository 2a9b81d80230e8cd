//! Integration tests for the import universalizer (spec 8 E6) and for
//! indentation-error reporting (spec 8 E7), both exercised through the
//! full pipeline rather than the handler/stage in isolation.

use coconut_core::config::Target;
use coconut_core::{CompileOptions, Compiler, CoreError};

fn new_compiler() -> Compiler {
    Compiler::new(CompileOptions::default())
}

#[test]
fn universal_target_wraps_a_renamed_stdlib_import() {
    let mut compiler = new_compiler(); // universal by default
    let out = coconut_core::parse_block(&mut compiler, "import queue\n").unwrap();
    assert!(out.contains("try:"));
    assert!(out.contains("import queue as queue"));
    assert!(out.contains("except ImportError:"));
    assert!(out.contains("import Queue as queue"));
}

#[test]
fn pinned_target_leaves_a_renamed_import_untouched() {
    let mut compiler = Compiler::new(CompileOptions {
        target: Target("3".to_string()),
        ..Default::default()
    });
    let out = coconut_core::parse_block(&mut compiler, "import queue\n").unwrap();
    assert_eq!(out, "import queue\n");
}

#[test]
fn unrelated_import_is_never_wrapped() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "import os\n").unwrap();
    assert_eq!(out, "import os\n");
}

#[test]
fn from_import_with_alias_round_trips() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "from collections import Counter as C\n").unwrap();
    assert_eq!(out, "from collections import Counter as C\n");
}

#[test]
fn inconsistent_dedent_is_reported_as_a_diagnostic() {
    let mut compiler = new_compiler();
    let src = "if x:\n    y = 1\n  z = 2\n";
    let err = coconut_core::parse_block(&mut compiler, src).unwrap_err();
    match err {
        CoreError::Diagnostic(d) => {
            assert!(d.message.contains("dedent"));
        }
        CoreError::Internal(_) => panic!("expected a Diagnostic, got an Internal error"),
    }
}

#[test]
fn unclosed_bracket_is_reported_as_a_diagnostic() {
    let mut compiler = new_compiler();
    let err = coconut_core::parse_block(&mut compiler, "x = (1 + 2\n").unwrap_err();
    assert!(matches!(err, CoreError::Diagnostic(_)));
}

#[test]
fn backslash_continuation_is_rejected_in_strict_mode() {
    let mut compiler = Compiler::new(CompileOptions {
        strict: true,
        ..Default::default()
    });
    let src = "x = 1 + \\\n    2\n";
    let err = coconut_core::parse_block(&mut compiler, src).unwrap_err();
    match err {
        CoreError::Diagnostic(d) => assert!(d.message.contains("--strict")),
        CoreError::Internal(_) => panic!("expected a Diagnostic, got an Internal error"),
    }
}
