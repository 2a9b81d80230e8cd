//! Public API — The Six Compilation Modes (spec 6.1)
//!
//! Each mode runs the same ten-stage pipeline and differs only in (a)
//! whether S1's blank-edge stripping applies, (b) which `HeaderKind`
//! S9 synthesizes, and (c) a mode-specific post-step (`parse_eval`
//! strips the trailing newline a bare expression wouldn't otherwise
//! carry). `compile_body` does the shared S1-S8 work; `finish` adds
//! S9 (header) then S10 (polish), in that order. Each
//! `parse_*` function is a thin wrapper choosing the header and any
//! trailing adjustment, mirroring how `coconut/compiler/compiler.py`'s
//! `parse_single`/`parse_file`/etc. all bottom out in one
//! `parse_block`-style core with different header/wrapper arguments.

use crate::compiler::Compiler;
use crate::error::CoreError;
use crate::grammar::lexer::tokenize;
use crate::grammar::stmt::StmtParser;
use crate::grammar::{evaluate, EvalContext, Graph};
use crate::header::{self, HeaderKind};
use crate::stages::{indent_proc, passthrough_proc, polish, prepare, reind_proc, repl_proc, string_proc};

/// Run S1 through S8 and S10 (everything but header synthesis),
/// returning the compiled body plus the normalized source text the
/// header's content hash is computed over.
fn compile_body(compiler: &mut Compiler, source: &str, strip_edges: bool) -> Result<(String, String), CoreError> {
    compiler.begin_parse();

    let normalized = prepare::normalize_line_endings(source);
    let normalized = if strip_edges { prepare::strip_blank_edges(&normalized) } else { normalized };
    compiler.trace("S1 prepare", format!("{} bytes", normalized.len()));

    let string_out = string_proc::extract(&normalized, &mut compiler.state.side_table, &mut compiler.state.skip_set)?;
    compiler.trace("S2 string_proc", format!("{} refs", compiler.state.side_table.len()));

    let passthrough_out =
        passthrough_proc::extract(&string_out.text, &mut compiler.state.side_table, &mut compiler.state.skip_set)?;
    compiler.trace("S3 passthrough_proc", format!("{} refs total", compiler.state.side_table.len()));

    let bracketed = indent_proc::convert(
        &passthrough_out,
        compiler.options.strict,
        &mut compiler.state.skip_set,
        &mut compiler.state.indent_char,
    )?;
    compiler.trace("S4 indent_proc", format!("{} bytes", bracketed.len()));

    let tokens = tokenize(&bracketed);
    let mut graph = Graph::new();
    let root = {
        let mut parser = StmtParser::new(tokens, &mut graph);
        parser.parse_module()?
    };
    compiler.trace("S5 parse", format!("{} nodes", graph.len()));

    let evaluated = {
        let mut ctx = EvalContext::new(&compiler.options);
        let rendered = evaluate(&graph, root, &mut ctx)?;
        (rendered, ctx.evaluations.len())
    };
    let (evaluated, evaluated_node_count) = evaluated;
    compiler.trace("S6 evaluate", format!("{} distinct nodes rendered", evaluated_node_count));

    let reindented = reind_proc::convert(&evaluated)?;
    compiler.trace("S7 reind_proc", format!("{} bytes", reindented.len()));

    let expanded = repl_proc::expand(&reindented, &compiler.state.side_table)?;
    compiler.trace("S8 repl_proc", format!("{} bytes", expanded.len()));

    Ok((expanded, normalized))
}

/// S9 (header synthesis) + S10 (polish), applied in that order to the
/// body `compile_body` produced: polish runs last so it also cleans up
/// any trailing whitespace the header template itself introduced.
fn finish(compiler: &Compiler, kind: HeaderKind, body: &str, hash_source: &str) -> String {
    let with_header = header::synthesize(kind, body, &compiler.options, hash_source);
    polish::polish(&with_header)
}

/// One logical line, compiled with no header. Used by REPL-style
/// callers that feed the compiler one statement at a time.
pub fn parse_single(compiler: &mut Compiler, source: &str) -> Result<String, CoreError> {
    let (body, normalized) = compile_body(compiler, source, true)?;
    Ok(finish(compiler, HeaderKind::None, &body, &normalized))
}

/// Full source, wrapped in a complete standalone module header with
/// the content hash on line 3.
pub fn parse_file(compiler: &mut Compiler, source: &str) -> Result<String, CoreError> {
    let (body, normalized) = compile_body(compiler, source, false)?;
    Ok(finish(compiler, HeaderKind::File, &body, &normalized))
}

/// Full source, no header at all -- for embedding straight into an
/// already-running interpreter (`exec`-style evaluation).
pub fn parse_exec(compiler: &mut Compiler, source: &str) -> Result<String, CoreError> {
    let (body, normalized) = compile_body(compiler, source, false)?;
    Ok(finish(compiler, HeaderKind::None, &body, &normalized))
}

/// One file within a package, at nesting `depth` (package `__init__`
/// levels between this file and the package root). Emits the
/// `package:n` header plus the content hash.
pub fn parse_package(compiler: &mut Compiler, source: &str, depth: u32) -> Result<String, CoreError> {
    let (body, normalized) = compile_body(compiler, source, false)?;
    Ok(finish(compiler, HeaderKind::Package(depth), &body, &normalized))
}

/// A source fragment compiled to body text only, no header -- for
/// splicing into a larger already-headered document.
pub fn parse_block(compiler: &mut Compiler, source: &str) -> Result<String, CoreError> {
    let (body, normalized) = compile_body(compiler, source, false)?;
    Ok(finish(compiler, HeaderKind::None, &body, &normalized))
}

/// A single expression, compiled to a target-language expression with
/// its trailing newline stripped (so the caller can embed it inline,
/// e.g. as an argument or in an f-string).
pub fn parse_eval(compiler: &mut Compiler, source: &str) -> Result<String, CoreError> {
    let (body, normalized) = compile_body(compiler, source, true)?;
    let rendered = finish(compiler, HeaderKind::None, &body, &normalized);
    Ok(rendered.trim_end_matches('\n').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;

    fn new_compiler() -> Compiler {
        Compiler::new(CompileOptions::default())
    }

    #[test]
    fn parse_single_emits_no_header() {
        let mut compiler = new_compiler();
        let out = parse_single(&mut compiler, "x = 1").unwrap();
        assert_eq!(out, "x = 1\n");
    }

    #[test]
    fn parse_file_embeds_hash_on_line_three() {
        let mut compiler = new_compiler();
        let out = parse_file(&mut compiler, "x = 1\n").unwrap();
        let hash = header::read_hash(&out);
        assert!(hash.is_some());
    }

    #[test]
    fn parse_package_reports_depth() {
        let mut compiler = new_compiler();
        let out = parse_package(&mut compiler, "x = 1\n", 2).unwrap();
        assert!(out.contains("package depth: 2"));
    }

    #[test]
    fn parse_eval_has_no_trailing_newline() {
        let mut compiler = new_compiler();
        let out = parse_eval(&mut compiler, "1 + 1").unwrap();
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn parse_block_renders_pipeline_rewrite() {
        let mut compiler = new_compiler();
        let out = parse_block(&mut compiler, "y = x |> f\n").unwrap();
        assert_eq!(out, "y = f(x)\n");
    }

    #[test]
    fn begin_parse_resets_state_between_calls() {
        let mut compiler = new_compiler();
        parse_single(&mut compiler, "x = \"hi\"").unwrap();
        let first_refs = compiler.state.side_table.len();
        parse_single(&mut compiler, "y = 2").unwrap();
        assert!(first_refs > 0);
        assert_eq!(compiler.state.side_table.len(), 0);
    }

    #[test]
    fn trace_log_populated_when_enabled() {
        let mut compiler = Compiler::new(CompileOptions { trace: true, ..Default::default() });
        parse_single(&mut compiler, "x = 1").unwrap();
        assert!(!compiler.trace_log.is_empty());
    }
}
