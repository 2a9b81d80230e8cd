//! Integration tests for `data` statements and the standalone `match`
//! statement end-to-end, matching spec 8's E3/E4 scenarios.

use coconut_core::{CompileOptions, Compiler};

fn new_compiler() -> Compiler {
    Compiler::new(CompileOptions::default())
}

#[test]
fn data_statement_lowers_to_a_namedtuple_subclass() {
    let mut compiler = new_compiler();
    let src = "data Point(x, y):\n    def mag(self):\n        return x\n";
    let out = coconut_core::parse_block(&mut compiler, src).unwrap();
    assert!(out.contains("class Point("));
    assert!(out.contains("_coconut.collections.namedtuple(\"Point\", \"x y\")"));
    assert!(out.contains("__slots__ = ()"));
    assert!(out.contains("def mag(self):"));
    assert!(out.contains("return x"));
}

#[test]
fn data_statement_with_explicit_bases_mixes_them_in() {
    let mut compiler = new_compiler();
    let src = "data Point3D(x, y, z) from Serializable:\n    pass\n";
    let out = coconut_core::parse_block(&mut compiler, src).unwrap();
    assert!(out.contains("Serializable"));
    assert!(out.contains("namedtuple(\"Point3D\", \"x y z\")"));
}

#[test]
fn match_statement_binds_subject_once_and_destructures() {
    let mut compiler = new_compiler();
    let src = "match (x, y) in pt:\n    return x\n";
    let out = coconut_core::parse_block(&mut compiler, src).unwrap();
    assert!(out.contains("_coconut_match_to = pt\n"));
    assert!(out.contains("isinstance(_coconut_match_to, _coconut.abc.Sequence)"));
    assert!(out.contains("_coconut.len("));
    assert!(out.contains("return x"));
}

#[test]
fn match_statement_with_series_rest_capture_destructures_per_e4() {
    let mut compiler = new_compiler();
    let src = "match [x, *xs] in lst:\n    return x\n";
    let out = coconut_core::parse_block(&mut compiler, src).unwrap();
    assert!(out.contains("isinstance(_coconut_match_to, _coconut.abc.Sequence)"));
    assert!(out.contains("_coconut.len(_coconut_match_to) >= 1"));
    assert!(out.contains("x = _coconut_match_to[0]"));
    assert!(out.contains("xs = list(_coconut_match_to[1:])"));
    assert!(out.contains("return x"));
}

#[test]
fn match_statement_falls_through_to_else_on_mismatch() {
    let mut compiler = new_compiler();
    let src = "match [x] in lst:\n    return x\nelse:\n    return None\n";
    let out = coconut_core::parse_block(&mut compiler, src).unwrap();
    assert!(out.contains("else:"));
    assert!(out.contains("return None"));
}

#[test]
fn match_statement_with_literal_pattern_checks_equality() {
    let mut compiler = new_compiler();
    let src = "match 1 in n:\n    return True\n";
    let out = coconut_core::parse_block(&mut compiler, src).unwrap();
    assert!(out.contains("_coconut_match_to == 1"));
}

#[test]
fn match_statement_with_wildcard_has_no_checks() {
    let mut compiler = new_compiler();
    let src = "match _ in anything:\n    return True\n";
    let out = coconut_core::parse_block(&mut compiler, src).unwrap();
    // A wildcard can never fail to match, so the flag is set unconditionally.
    assert!(out.contains("_coconut_match_check = True\n"));
    assert!(out.contains("if _coconut_match_check:"));
}
