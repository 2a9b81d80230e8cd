//! S4 IndentProc — Significant Indentation to Explicit Brace Markers
//!
//! Converts leading whitespace into explicit OPEN/CLOSE sentinels
//! (spec 4.3) and joins backslash-continued and parenthetical
//! continuations into single logical lines before the grammar ever
//! sees them. Runs after S2/S3 so every visible `(`/`)`/`[`/`]`/`{`/`}`
//! is a real bracket, never one trapped inside a string or comment.

use crate::error::{CoreError, Diagnostic, DiagnosticKind};
use crate::skip_set::SkipSet;

/// Sentinel code points marking an indentation increase/decrease.
/// Distinct from the string/comment sentinels in `side_table` so S7 can
/// tell the two families apart unambiguously.
pub const INDENT_OPEN: char = '\u{E002}';
pub const INDENT_CLOSE: char = '\u{E003}';

fn bracket_delta(c: char) -> i32 {
    match c {
        '(' | '[' | '{' => 1,
        ')' | ']' | '}' => -1,
        _ => 0,
    }
}

fn indent_width(line: &str, tab_width: u32) -> (u32, usize) {
    let mut width = 0u32;
    let mut consumed = 0usize;
    for c in line.chars() {
        match c {
            ' ' => {
                width += 1;
                consumed += 1;
            }
            '\t' => {
                width = (width / tab_width + 1) * tab_width;
                consumed += 1;
            }
            _ => break,
        }
    }
    (width, consumed)
}

pub fn convert(
    source: &str,
    strict: bool,
    skip_set: &mut SkipSet,
    indent_char: &mut Option<char>,
) -> Result<String, CoreError> {
    const TAB_WIDTH: u32 = 8;

    let physical_lines: Vec<&str> = source.split('\n').collect();
    let mut out = String::with_capacity(source.len());
    let mut level_stack: Vec<u32> = Vec::new();
    let mut paren_depth: i32 = 0;
    let mut line_no: u32 = 0;
    let mut seen_nonblank = false;
    let mut mixed_indent_warned = false;

    let mut idx = 0usize;
    while idx < physical_lines.len() {
        let mut logical = String::new();
        let mut first_physical_in_logical = line_no;
        let mut joined_any = false;

        loop {
            let raw_line = physical_lines[idx];
            let line_after_depth_check = if paren_depth > 0 {
                // Inside unclosed parens: this physical line is always a
                // continuation, its own indentation is irrelevant.
                if joined_any {
                    skip_set.add(line_no);
                }
                joined_any = true;
                logical.push_str(raw_line);
                logical.push(' ');
                raw_line
            } else if let Some(stripped) = raw_line.strip_suffix('\\') {
                if strict {
                    return Err(CoreError::Diagnostic(
                        Diagnostic::error(DiagnosticKind::Style, "explicit backslash line continuation")
                            .at(line_no + 1, raw_line.len() as u32, raw_line)
                            .strict_suffix(),
                    ));
                }
                joined_any = true;
                logical.push_str(stripped);
                logical.push(' ');
                skip_set.add(line_no + 1);
                stripped
            } else {
                logical.push_str(raw_line);
                raw_line
            };

            for c in line_after_depth_check.chars() {
                paren_depth += bracket_delta(c);
            }

            let continues = paren_depth > 0 || raw_line.ends_with('\\');
            idx += 1;
            line_no += 1;
            if !continues || idx >= physical_lines.len() {
                break;
            }
        }
        let _ = first_physical_in_logical;
        first_physical_in_logical = 0;
        let _ = first_physical_in_logical;

        if paren_depth < 0 {
            return Err(CoreError::Diagnostic(Diagnostic::error(
                DiagnosticKind::Parse,
                "unbalanced closing bracket",
            )
            .at(line_no, 0, &logical)));
        }

        let trimmed_is_blank = logical.trim().is_empty();
        if trimmed_is_blank {
            out.push('\n');
            continue;
        }

        let (width, consumed) = indent_width(&logical, TAB_WIDTH);
        let body = &logical[consumed..];

        if let Some(first_char) = logical.chars().find(|c| *c == ' ' || *c == '\t') {
            match indent_char {
                None => *indent_char = Some(first_char),
                Some(established) if *established != first_char && !mixed_indent_warned => {
                    mixed_indent_warned = true;
                    if strict {
                        return Err(CoreError::Diagnostic(
                            Diagnostic::error(DiagnosticKind::Style, "mixed tabs and spaces in indentation")
                                .strict_suffix(),
                        ));
                    }
                }
                _ => {}
            }
        }

        if !seen_nonblank {
            seen_nonblank = true;
            if width > 0 {
                return Err(CoreError::Diagnostic(Diagnostic::error(
                    DiagnosticKind::Parse,
                    "unexpected indent on first line",
                )));
            }
            level_stack.push(0);
        }

        let top = *level_stack.last().unwrap_or(&0);
        if width > top {
            level_stack.push(width);
            out.push(INDENT_OPEN);
        } else if width < top {
            loop {
                level_stack.pop();
                out.push(INDENT_CLOSE);
                let new_top = *level_stack.last().unwrap_or(&0);
                if new_top == width {
                    break;
                }
                if new_top < width {
                    return Err(CoreError::Diagnostic(Diagnostic::error(
                        DiagnosticKind::Parse,
                        "dedent does not match any outer indentation level",
                    )));
                }
            }
        }

        out.push_str(body.trim_end());
        out.push('\n');
    }

    for _ in 1..level_stack.len() {
        out.push(INDENT_CLOSE);
    }

    if paren_depth != 0 {
        return Err(CoreError::Diagnostic(Diagnostic::error(
            DiagnosticKind::Parse,
            "unclosed parenthesis, bracket, or brace",
        )));
    }

    Ok(out)
}
