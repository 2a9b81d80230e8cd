//! Pattern-Matching Function Definitions (spec 4.5.8)
//!
//! `def f(Pattern1, Pattern2) = body` (or with a full suite) binds its
//! parameters by structural pattern rather than by name: each argument
//! is matched with `pattern_match::Matcher` against a positional
//! parameter, and any pattern failure raises rather than falling
//! through, since only a single definition is in scope (upstream's
//! `addpattern`-based multi-clause dispatch is out of scope here).

use crate::config::CompileOptions;
use crate::error::CoreError;
use crate::handlers::missing_child;
use crate::handlers::pattern_match::{self, MATCH_FLAG};
use crate::stages::indent_proc::{INDENT_CLOSE, INDENT_OPEN};
use std::collections::HashMap;

/// Expected children: `[fn_name, params_csv, <steps...>, raw_body]`
/// where `metadata["steps"]` is a `'C'`/`'B'` string describing
/// `<steps...>`, mirroring `pattern_match::render_match_statement`'s
/// contract. `raw_body` is the suite's text with no indent wrapping of
/// its own -- this handler wraps the generated check/bind lines and
/// the body together in a single indent level, matching how a
/// hand-written `def` would read.
pub fn render_match_def(
    children: &[String],
    metadata: &HashMap<&'static str, String>,
    _options: &CompileOptions,
) -> Result<String, CoreError> {
    let fn_name = children.first().ok_or_else(|| missing_child("match-def name"))?;
    let params_csv = children.get(1).ok_or_else(|| missing_child("match-def params"))?;
    let kinds = metadata.get("steps").map(|s| s.as_str()).unwrap_or("");

    let (steps_code, depth, idx) = pattern_match::render_steps_block(kinds, children, 2)?;
    let body = children.get(idx).ok_or_else(|| missing_child("match-def body"))?;

    let mut out = format!("def {}({}):\n{}", fn_name, params_csv, INDENT_OPEN);
    if !kinds.is_empty() {
        out.push_str(&format!("{} = False\n", MATCH_FLAG));
        out.push_str(&steps_code);
        out.push_str(&format!("{} = True\n", MATCH_FLAG));
        for _ in 0..depth {
            out.push(INDENT_CLOSE);
        }
        out.push_str(&format!(
            "if not {}:\n{}raise _coconut_MatchError(\"pattern did not match arguments to {}\"){}\n",
            MATCH_FLAG, INDENT_OPEN, fn_name, INDENT_CLOSE,
        ));
    }
    out.push_str(body);
    out.push(INDENT_CLOSE);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_checked_params_and_body() {
        let options = CompileOptions::default();
        let mut meta = HashMap::new();
        meta.insert("steps", "CB".to_string());
        let children = vec![
            "f".to_string(),
            "_coconut_match_arg_0".to_string(),
            "_coconut_match_arg_0 == 0".to_string(),
            "n".to_string(),
            "_coconut_match_arg_0".to_string(),
            "return 1".to_string(),
        ];
        let out = render_match_def(&children, &meta, &options).unwrap();
        assert!(out.starts_with("def f(_coconut_match_arg_0):"));
        assert!(out.contains("raise _coconut_MatchError"));
        assert!(out.contains("n = _coconut_match_arg_0"));
    }

    #[test]
    fn renders_an_unchecked_def_with_no_pattern_constraints() {
        let options = CompileOptions::default();
        let mut meta = HashMap::new();
        meta.insert("steps", String::new());
        let children = vec!["f".to_string(), "_coconut_match_arg_0".to_string(), "return 1".to_string()];
        let out = render_match_def(&children, &meta, &options).unwrap();
        assert!(!out.contains("raise _coconut_MatchError"));
        assert!(out.contains("return 1"));
    }
}
