//! Augmented Assignment (spec 4.5.6)
//!
//! Ordinary augmented assignment (`+=`, `-=`, ...) passes straight
//! through. The three pipeline-family augmented operators (`|>=`,
//! `..=`, `::=`) have no equivalent in the target language and lower
//! to a plain assignment whose right-hand side reapplies the
//! corresponding pipeline/compose/chain rewrite with the target as
//! both operands, reusing `pipeline_rewriter`'s direct-call style.

use crate::error::{CoreError, Diagnostic, DiagnosticKind};
use crate::handlers::missing_child;
use std::collections::HashMap;

/// Expected children: `[target, value]`; `metadata["op"]` names the
/// operator exactly as tokenized (`"+="`, `"|>="`, `"..="`, `"::="`, ...).
pub fn render_aug_assign(children: &[String], metadata: &HashMap<&'static str, String>) -> Result<String, CoreError> {
    let target = children.first().ok_or_else(|| missing_child("assignment target"))?;
    let value = children.get(1).ok_or_else(|| missing_child("assignment value"))?;
    let op = metadata
        .get("op")
        .ok_or_else(|| CoreError::internal("augmented assignment missing 'op' metadata"))?;

    match op.as_str() {
        "|>=" => Ok(format!("{} = {}({})", target, value, target)),
        "<|=" => Ok(format!("{} = {}({})", target, target, value)),
        "|*>=" => Ok(format!("{} = {}(*{})", target, value, target)),
        "..=" => Ok(format!(
            "{} = (lambda *_coconut_args, **_coconut_kwargs: {}({}(*_coconut_args, **_coconut_kwargs)))",
            target, target, value
        )),
        "::=" => Ok(format!("{} = itertools.chain({}, {})", target, target, value)),
        plain if plain.ends_with('=') && plain.len() <= 3 => Ok(format!("{} {} {}", target, plain, value)),
        other => Err(CoreError::Diagnostic(Diagnostic::error(
            DiagnosticKind::Parse,
            format!("unrecognized augmented assignment operator '{}'", other),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_aug_assign_passes_through() {
        let mut meta = HashMap::new();
        meta.insert("op", "+=".to_string());
        let out = render_aug_assign(&["x".into(), "1".into()], &meta).unwrap();
        assert_eq!(out, "x += 1");
    }

    #[test]
    fn pipeline_aug_assign_reapplies_the_function() {
        let mut meta = HashMap::new();
        meta.insert("op", "|>=".to_string());
        let out = render_aug_assign(&["x".into(), "f".into()], &meta).unwrap();
        assert_eq!(out, "x = f(x)");
    }

    #[test]
    fn chain_aug_assign_uses_itertools() {
        let mut meta = HashMap::new();
        meta.insert("op", "::=".to_string());
        let out = render_aug_assign(&["xs".into(), "ys".into()], &meta).unwrap();
        assert_eq!(out, "xs = itertools.chain(xs, ys)");
    }
}
