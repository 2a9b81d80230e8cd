//! Math-Style One-Line Function Definitions (spec 4.5.7)
//!
//! `def f(x) = expr` and `async def f(x) = expr` desugar to a normal
//! multi-line `def` whose body is a single `return` statement --
//! grounded on `coconut/compiler/grammar.py`'s `math_funcdef_suite`,
//! which wraps the expression in `return` rather than inventing a
//! separate single-expression function form in the target language.

use crate::error::CoreError;
use crate::handlers::missing_child;
use std::collections::HashMap;

/// Expected children: `[header, body_expr]`, where `header` is the
/// already-rendered `def name(params):`-less signature, e.g.
/// `"def f(x)"` or `"async def f(x)"`.
pub fn render_math_def(children: &[String], _metadata: &HashMap<&'static str, String>) -> Result<String, CoreError> {
    let header = children.first().ok_or_else(|| missing_child("math-def header"))?;
    let body = children.get(1).ok_or_else(|| missing_child("math-def body"))?;
    Ok(format!("{}:\n    return {}\n", header, body))
}
