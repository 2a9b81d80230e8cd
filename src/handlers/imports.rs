//! Import Universalizer (spec 4.5.4)
//!
//! A handful of standard-library modules were renamed or reorganized
//! between the two supported major target versions (`queue`/`Queue`,
//! `configparser`/`ConfigParser`, `io.StringIO`/`StringIO.StringIO`).
//! Grounded on `coconut/compiler/util.py`'s `py3_to_py2` import table:
//! when the compile targets a specific version the plain import is
//! left untouched; in universal mode (`Target::is_universal`), an
//! import of a renamed module is rewritten to a `try`/`except
//! ImportError` pair that works on either.

use crate::config::CompileOptions;
use crate::error::CoreError;
use crate::handlers::missing_child;
use std::collections::HashMap;

/// `(py3_name, py2_name)` pairs for modules renamed across the major
/// version boundary.
const RENAMED_MODULES: &[(&str, &str)] = &[
    ("queue", "Queue"),
    ("configparser", "ConfigParser"),
    ("io", "StringIO"), // io.StringIO vs top-level StringIO.StringIO
    ("collections.abc", "collections"),
    ("tkinter", "Tkinter"),
    ("socketserver", "SocketServer"),
];

fn py2_name_for(py3_name: &str) -> Option<&'static str> {
    RENAMED_MODULES
        .iter()
        .find(|(py3, _)| *py3 == py3_name)
        .map(|(_, py2)| *py2)
}

/// Expected children: `[module_path, alias_or_empty]`.
/// `metadata["kind"]` is `"import"` for `import module [as alias]`,
/// `"from"` for `from module import name [as alias]` (with `alias`
/// actually meaning the imported name, and a second metadata entry
/// `"from_alias"` for its own optional `as`).
pub fn render_import(
    children: &[String],
    metadata: &HashMap<&'static str, String>,
    options: &CompileOptions,
) -> Result<String, CoreError> {
    let module = children.first().ok_or_else(|| missing_child("import module"))?;
    let alias = children.get(1).map(String::as_str).unwrap_or("");
    let kind = metadata.get("kind").map(String::as_str).unwrap_or("import");

    let plain = if kind == "from" {
        let imported = metadata.get("imported_name").map(String::as_str).unwrap_or("*");
        if alias.is_empty() {
            format!("from {} import {}\n", module, imported)
        } else {
            format!("from {} import {} as {}\n", module, imported, alias)
        }
    } else if alias.is_empty() {
        format!("import {}\n", module)
    } else {
        format!("import {} as {}\n", module, alias)
    };

    if !options.target.is_universal() {
        return Ok(plain);
    }

    match py2_name_for(module) {
        Some(py2_name) if kind == "import" => {
            let bound_name = if alias.is_empty() { module.clone() } else { alias.to_string() };
            Ok(format!(
                "try:\n    import {} as {}\nexcept ImportError:\n    import {} as {}\n",
                module, bound_name, py2_name, bound_name
            ))
        }
        _ => Ok(plain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Target;

    #[test]
    fn pinned_target_leaves_import_untouched() {
        let mut options = CompileOptions::default();
        options.target = Target("3".to_string());
        let mut meta = HashMap::new();
        meta.insert("kind", "import".to_string());
        let out = render_import(&["queue".to_string(), String::new()], &meta, &options).unwrap();
        assert_eq!(out, "import queue\n");
    }

    #[test]
    fn universal_target_wraps_renamed_module() {
        let options = CompileOptions::default(); // universal
        let mut meta = HashMap::new();
        meta.insert("kind", "import".to_string());
        let out = render_import(&["queue".to_string(), String::new()], &meta, &options).unwrap();
        assert!(out.contains("try:"));
        assert!(out.contains("import Queue as queue"));
    }

    #[test]
    fn from_import_renders_with_alias() {
        let options = CompileOptions::default();
        let mut meta = HashMap::new();
        meta.insert("kind", "from".to_string());
        meta.insert("imported_name", "Counter".to_string());
        let out = render_import(&["collections".to_string(), "C".to_string()], &meta, &options).unwrap();
        assert_eq!(out, "from collections import Counter as C\n");
    }
}
