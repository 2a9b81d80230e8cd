//! Decorator Expression Lowering (spec 4.5.5)
//!
//! Older target versions only accept a dotted name or a simple call as
//! a decorator; the surface language allows an arbitrary expression
//! (e.g. a pipeline or a partial application). When the decorator
//! expression is more than a bare name/call, it's hoisted into a
//! generated temporary assigned just above the `def`/`class`, then
//! applied by name -- valid on every target.

use crate::error::CoreError;
use crate::handlers::missing_child;
use std::collections::HashMap;

/// Expected children: `[decorator_expr, definition]`.
/// `metadata["needs_hoist"]` is set by `stmt` when the decorator
/// expression isn't a bare dotted-name/call.
pub fn render_decorator(children: &[String], metadata: &HashMap<&'static str, String>) -> Result<String, CoreError> {
    let expr = children.first().ok_or_else(|| missing_child("decorator expression"))?;
    let def = children.get(1).ok_or_else(|| missing_child("decorated definition"))?;
    let needs_hoist = metadata.get("needs_hoist").map(|s| s == "true").unwrap_or(false);

    if needs_hoist {
        Ok(format!("_coconut_decorator = {}\n@_coconut_decorator\n{}", expr, def))
    } else {
        Ok(format!("@{}\n{}", expr, def))
    }
}

/// Whether a rendered expression is simple enough to stand directly
/// after `@` on every supported target: a dotted name, optionally
/// called with a plain argument list.
pub fn is_simple_decorator_expr(expr: &str) -> bool {
    let core = expr.split('(').next().unwrap_or(expr);
    !core.is_empty()
        && core
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && core.chars().next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_decorator_applies_directly() {
        let children = vec!["staticmethod".to_string(), "def f(): pass".to_string()];
        let out = render_decorator(&children, &HashMap::new()).unwrap();
        assert_eq!(out, "@staticmethod\ndef f(): pass");
    }

    #[test]
    fn complex_decorator_is_hoisted() {
        let mut meta = HashMap::new();
        meta.insert("needs_hoist", "true".to_string());
        let children = vec!["functools.partial(retry, times=3)".to_string(), "def f(): pass".to_string()];
        let out = render_decorator(&children, &meta).unwrap();
        assert!(out.starts_with("_coconut_decorator ="));
        assert!(out.contains("@_coconut_decorator"));
    }

    #[test]
    fn recognizes_dotted_names_and_calls_as_simple() {
        assert!(is_simple_decorator_expr("functools.wraps"));
        assert!(is_simple_decorator_expr("app.route(\"/x\")"));
        assert!(!is_simple_decorator_expr("a |> b"));
    }
}
