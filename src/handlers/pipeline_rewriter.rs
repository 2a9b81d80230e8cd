//! Pipeline / Compose / Partial / Chain / Backtick Lowering (spec 4.5.1)
//!
//! All five constructs share one trait: they're sugar over a direct
//! call against the target runtime's standard library, so none of them
//! need a deferred-resolution pass beyond the single evaluation every
//! `ComputationNode` already gets. Grounded on `coconut/compiler/
//! util.py`'s `pipe`/`compose` codegen helpers, reimplemented here as
//! direct `functools`/`itertools` calls instead of calls into a
//! `__coconut__` runtime module (see DESIGN.md's scope note).

use crate::error::CoreError;
use crate::handlers::missing_child;
use std::collections::HashMap;

pub fn render_pipeline(children: &[String], metadata: &HashMap<&'static str, String>) -> Result<String, CoreError> {
    let value = children.first().ok_or_else(|| missing_child("pipeline value"))?;
    let func = children.get(1).ok_or_else(|| missing_child("pipeline function"))?;
    let starred = metadata.get("starred").map(|s| s == "true").unwrap_or(false);
    // The function operand is parenthesized so a compound operand (e.g. a
    // ternary) binds its whole expression to the call, not just its tail.
    if starred {
        Ok(format!("({})(*{})", func, value))
    } else {
        Ok(format!("({})({})", func, value))
    }
}

/// `f..g` composes to a function equivalent to `lambda *a, **kw: f(g(*a, **kw))`.
pub fn render_compose(children: &[String]) -> Result<String, CoreError> {
    let f = children.first().ok_or_else(|| missing_child("compose left"))?;
    let g = children.get(1).ok_or_else(|| missing_child("compose right"))?;
    Ok(format!(
        "(lambda *_coconut_args, **_coconut_kwargs: {}({}(*_coconut_args, **_coconut_kwargs)))",
        f, g
    ))
}

pub fn render_partial(children: &[String]) -> Result<String, CoreError> {
    let callee = children.first().ok_or_else(|| missing_child("partial callee"))?;
    let rest = &children[1.min(children.len())..];
    if rest.is_empty() {
        Ok(format!("functools.partial({})", callee))
    } else {
        Ok(format!("functools.partial({}, {})", callee, rest.join(", ")))
    }
}

/// `it$[...]` lazily re-slices/re-indexes an iterable without
/// materializing it, the way upstream's `_coconut_igetitem` does;
/// emitted here directly against `itertools.islice`.
pub fn render_lazy_index(children: &[String]) -> Result<String, CoreError> {
    let base = children.first().ok_or_else(|| missing_child("lazy index base"))?;
    let rest = &children[1.min(children.len())..];
    Ok(format!("itertools.islice({}, {})", base, rest.join(", ")))
}

/// `a :: b` must defer *both* operands -- `itertools.chain(a, b)` alone
/// already evaluates `a` and `b` to get their iterators, which is too
/// eager for an operand that is itself an expensive generator call.
/// `lazy_list` wraps them so construction doesn't touch either iterable
/// until the chain is actually consumed.
pub fn render_chain(children: &[String]) -> Result<String, CoreError> {
    let a = children.first().ok_or_else(|| missing_child("chain left"))?;
    let b = children.get(1).ok_or_else(|| missing_child("chain right"))?;
    Ok(format!("itertools.chain.from_iterable(lazy_list({}, {}))", a, b))
}

/// `` a`f`b `` is sugar for `f(a, b)`.
pub fn render_backtick(children: &[String]) -> Result<String, CoreError> {
    let func = children.first().ok_or_else(|| missing_child("backtick function"))?;
    let left = children.get(1).ok_or_else(|| missing_child("backtick left"))?;
    let right = children.get(2).ok_or_else(|| missing_child("backtick right"))?;
    Ok(format!("{}({}, {})", func, left, right))
}
