//! Integration tests for pipeline/compose/partial lowering end-to-end
//! through the full ten-stage pipeline (not just the handler in
//! isolation), matching spec 8's E1/E2/E5 scenarios.

use coconut_core::{CompileOptions, Compiler};

fn new_compiler() -> Compiler {
    Compiler::new(CompileOptions::default())
}

#[test]
fn pipeline_forward_applies_function_to_value() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "y = x |> f\n").unwrap();
    assert_eq!(out, "y = (f)(x)\n");
}

#[test]
fn pipeline_reverse_applies_function_to_value() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "y = f <| x\n").unwrap();
    assert_eq!(out, "y = (f)(x)\n");
}

#[test]
fn pipeline_chain_of_three_nests_calls_left_to_right() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "y = x |> f |> g\n").unwrap();
    // x flows through f first, then g: (g)((f)(x))
    assert!(out.contains("(g)(") && out.contains("(f)("));
    assert!(out.find("(g)(").unwrap() < out.find("(f)(").unwrap());
}

#[test]
fn starred_pipeline_unpacks_the_value() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "y = args |*> f\n").unwrap();
    assert_eq!(out, "y = (f)(*args)\n");
}

#[test]
fn compose_builds_a_lambda_wrapping_both_functions() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "h = f..g\n").unwrap();
    assert!(out.contains("lambda *_coconut_args, **_coconut_kwargs"));
    assert!(out.contains("f(") && out.contains("g("));
}

#[test]
fn unicode_pipeline_alias_compiles_identically_to_ascii() {
    let mut compiler_ascii = new_compiler();
    let mut compiler_unicode = new_compiler();
    let ascii_out = coconut_core::parse_block(&mut compiler_ascii, "y = x |> f\n").unwrap();
    let unicode_out = coconut_core::parse_block(&mut compiler_unicode, "y = x \u{21A6} f\n").unwrap();
    assert_eq!(ascii_out, unicode_out);
}

#[test]
fn partial_application_wraps_in_functools_partial() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "add5 = $(add, 5)\n").unwrap();
    assert!(out.contains("functools.partial(add, 5)"));
}

#[test]
fn chain_operator_uses_itertools_chain() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "z = a :: b\n").unwrap();
    assert!(out.contains("itertools.chain.from_iterable(lazy_list(a, b))"));
}

#[test]
fn backtick_infix_desugars_to_a_function_call() {
    let mut compiler = new_compiler();
    let out = coconut_core::parse_block(&mut compiler, "z = 1 `add` 2\n").unwrap();
    assert!(out.contains("add(1, 2)"));
}
