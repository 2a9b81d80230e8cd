//! Header Template Substitution
//!
//! Upstream synthesizes headers by calling `str.format(**format_dict)`
//! against a fixed template string (`header.py::process_header_args`,
//! `getheader`). This module is the Rust analogue: a small `{key}`
//! substitution pass over a template string and a `HashMap` of
//! build-time variables, kept separate from the direct string-building
//! in `header::synthesize` for the handful of spots (the runtime import
//! block) where a literal template reads more clearly than chained
//! `push_str` calls.

use std::collections::HashMap;

pub fn render(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            let mut key = String::new();
            let mut closed = false;
            for c2 in chars.by_ref() {
                if c2 == '}' {
                    closed = true;
                    break;
                }
                key.push(c2);
            }
            if closed {
                if let Some(value) = vars.get(key.as_str()) {
                    out.push_str(value);
                } else {
                    // unknown key: leave untouched for the caller to
                    // notice, rather than silently dropping it.
                    out.push('{');
                    out.push_str(&key);
                    out.push('}');
                }
            } else {
                out.push('{');
                out.push_str(&key);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_keys() {
        let mut vars = HashMap::new();
        vars.insert("name", "world".to_string());
        assert_eq!(render("hello {name}!", &vars), "hello world!");
    }

    #[test]
    fn leaves_unknown_keys_untouched() {
        let vars = HashMap::new();
        assert_eq!(render("hello {name}!", &vars), "hello {name}!");
    }
}
