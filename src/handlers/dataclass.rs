//! `data` Statement (spec 4.5.3)
//!
//! Lowers to a `namedtuple` subclass: upstream's `data.py` codegen
//! generates a class wrapping `collections.namedtuple` with
//! `__slots__ = ()` so instances stay immutable and attribute-light,
//! plus whatever body the user wrote (methods, further decorators).
//! Additional declared bases are mixed in after the namedtuple base,
//! matching multiple inheritance order in the target language.

use crate::config::CompileOptions;
use crate::error::CoreError;
use crate::handlers::missing_child;
use std::collections::HashMap;

pub fn render_data_statement(
    children: &[String],
    metadata: &HashMap<&'static str, String>,
    _options: &CompileOptions,
) -> Result<String, CoreError> {
    let name = children.first().ok_or_else(|| missing_child("data name"))?;
    let fields_csv = children.get(1).ok_or_else(|| missing_child("data fields"))?;
    let has_bases = metadata.get("has_bases").map(|s| s == "true").unwrap_or(false);
    let (bases_csv, body) = if has_bases {
        (children.get(2).map(String::as_str), children.get(3))
    } else {
        (None, children.get(2))
    };
    let body = body.ok_or_else(|| missing_child("data body"))?;

    let field_names_quoted: String = fields_csv
        .split(',')
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut base_expr = format!("_coconut.collections.namedtuple(\"{}\", \"{}\")", name, field_names_quoted);
    if let Some(bases) = bases_csv {
        if !bases.trim().is_empty() {
            base_expr = format!("{}, {}", base_expr, bases);
        }
    }

    // `body` already carries its own INDENT_OPEN/CLOSE wrapping around
    // `__slots__ = ()` plus the user's suite (spliced in by `stmt`'s
    // `parse_data`), so it's appended as-is.
    Ok(format!("class {}({}):\n{}", name, base_expr, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_plain_data_statement() {
        let options = CompileOptions::default();
        let children = vec!["Point".to_string(), "x, y".to_string(), "__slots__ = ()\npass\n".to_string()];
        let out = render_data_statement(&children, &HashMap::new(), &options).unwrap();
        assert!(out.contains("class Point("));
        assert!(out.contains("namedtuple(\"Point\", \"x y\")"));
        assert!(out.contains("__slots__ = ()"));
    }

    #[test]
    fn renders_data_statement_with_bases() {
        let options = CompileOptions::default();
        let mut meta = HashMap::new();
        meta.insert("has_bases", "true".to_string());
        let children = vec![
            "Point3D".to_string(),
            "x, y, z".to_string(),
            "Serializable".to_string(),
            "__slots__ = ()\npass\n".to_string(),
        ];
        let out = render_data_statement(&children, &meta, &options).unwrap();
        assert!(out.contains("Serializable"));
    }
}
