//! S3 PassthroughProc — Backslash-Escaped Target Passthroughs
//!
//! Recognizes three source forms (spec 4.2):
//!
//! - `\x` — a single target-language character passed through verbatim.
//!   Stored as a non-multiline `Passthrough` ref; per spec 6.2 its
//!   marker bakes in a trailing `\n`, so this form always terminates
//!   the physical line it appears on (DESIGN.md records this as the
//!   resolution of an otherwise-unspecified detail).
//! - `\(...)` — a balanced-paren expression passthrough, possibly
//!   spanning multiple lines.
//! - `\\(...)` — the same, doubled-backslash spelling.
//!
//! Both paren forms store the inner (unparenthesized) text as a
//! multiline `Passthrough` ref and record every contained `\n` in the
//! `SkipSet`, since they collapse to one logical position.

use crate::error::{CoreError, Diagnostic, DiagnosticKind};
use crate::side_table::{Ref, SideTable};
use crate::skip_set::SkipSet;

pub fn extract(
    source: &str,
    side_table: &mut SideTable,
    skip_set: &mut SkipSet,
) -> Result<String, CoreError> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0usize;
    let mut line: u32 = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
            out.push(c);
            i += 1;
            continue;
        }
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }

        // Determine which of the three forms this is.
        let doubled = i + 1 < chars.len() && chars[i + 1] == '\\';
        let paren_start = if doubled { i + 2 } else { i + 1 };

        if paren_start < chars.len() && chars[paren_start] == '(' {
            let (inner, end, lines_consumed) = scan_balanced_parens(&chars, paren_start, line)?;
            for l in 1..=lines_consumed {
                skip_set.add(line + l);
            }
            let id = side_table.push(Ref::Passthrough {
                text: inner,
                is_multiline: true,
            });
            out.push_str(&SideTable::passthrough_marker_multi(id));
            line += lines_consumed;
            i = end;
        } else if i + 1 < chars.len() && !doubled {
            // single-character passthrough
            let ch = chars[i + 1];
            let id = side_table.push(Ref::Passthrough {
                text: ch.to_string(),
                is_multiline: false,
            });
            out.push_str(&SideTable::passthrough_marker_single(id));
            if ch == '\n' {
                line += 1;
            }
            line += 1; // the marker's baked-in trailing newline
            i += 2;
        } else {
            return Err(CoreError::Diagnostic(
                Diagnostic::error(DiagnosticKind::Parse, "dangling backslash at end of source")
                    .at(line + 1, i as u32, ""),
            ));
        }
    }

    Ok(out)
}

/// Scan a balanced `(...)` run starting at `open_paren_idx` (which must
/// point at `(`). Returns the inner text (without the outer
/// parentheses), the index just past the closing paren, and the number
/// of newlines consumed.
fn scan_balanced_parens(
    chars: &[char],
    open_paren_idx: usize,
    start_line: u32,
) -> Result<(String, usize, u32), CoreError> {
    let mut depth = 0i32;
    let mut i = open_paren_idx;
    let mut inner = String::new();
    let mut lines = 0u32;
    loop {
        if i >= chars.len() {
            return Err(CoreError::Diagnostic(
                Diagnostic::error(DiagnosticKind::Parse, "unbalanced parens in passthrough")
                    .at(start_line + 1, 0, &inner),
            ));
        }
        let c = chars[i];
        match c {
            '(' => {
                depth += 1;
                if depth > 1 {
                    inner.push(c);
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((inner, i + 1, lines));
                }
                inner.push(c);
            }
            '\n' => {
                lines += 1;
                inner.push(c);
            }
            _ => inner.push(c),
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> (String, SideTable, SkipSet) {
        let mut table = SideTable::new();
        let mut skips = SkipSet::new();
        let out = extract(src, &mut table, &mut skips).unwrap();
        (out, table, skips)
    }

    #[test]
    fn single_char_passthrough_is_stored() {
        let (_, table, _) = run("\\@\n");
        assert_eq!(table.len(), 1);
        match table.get(crate::side_table::RefId(0)).unwrap() {
            Ref::Passthrough { text, is_multiline } => {
                assert_eq!(text, "@");
                assert!(!is_multiline);
            }
            _ => panic!("expected passthrough"),
        }
    }

    #[test]
    fn single_paren_passthrough_is_stored_multiline() {
        let (_, table, _) = run("\\(a + b)\n");
        assert_eq!(table.len(), 1);
        match table.get(crate::side_table::RefId(0)).unwrap() {
            Ref::Passthrough { text, is_multiline } => {
                assert_eq!(text, "a + b");
                assert!(is_multiline);
            }
            _ => panic!("expected passthrough"),
        }
    }

    #[test]
    fn doubled_backslash_paren_form_is_stored() {
        let (_, table, _) = run("\\\\(x)\n");
        assert_eq!(table.len(), 1);
        match table.get(crate::side_table::RefId(0)).unwrap() {
            Ref::Passthrough { text, .. } => assert_eq!(text, "x"),
            _ => panic!("expected passthrough"),
        }
    }

    #[test]
    fn nested_parens_are_balanced() {
        let (_, table, _) = run("\\(f(g(1)))\n");
        match table.get(crate::side_table::RefId(0)).unwrap() {
            Ref::Passthrough { text, .. } => assert_eq!(text, "f(g(1))"),
            _ => panic!("expected passthrough"),
        }
    }

    #[test]
    fn multiline_paren_passthrough_records_skip_lines() {
        let (_, _, skips) = run("\\(a +\nb +\nc)\n");
        assert_eq!(skips.len(), 2);
    }

    #[test]
    fn round_trips_through_side_table() {
        let mut table = SideTable::new();
        let mut skips = SkipSet::new();
        let out = extract("\\(1 + 2)\n", &mut table, &mut skips).unwrap();
        let expanded = table.expand(&out).unwrap();
        assert_eq!(expanded, "1 + 2\n");
    }
}
