//! S2 StringProc — String/Comment Extraction
//!
//! A single-pass byte (here: `char`) scanner with three interlocked
//! states (spec 4.1):
//!
//! - `Scanning`: copy through; `#` -> `Comment`; a quote char -> `Start`.
//! - `Start`: accumulating 1-3 opening quotes of the same kind.
//! - `InString`: tracking the opener's quote-run length and escape
//!   parity until a matching closer run is seen.
//! - `Comment`: accumulate to end of line.
//!
//! Every extracted string/comment becomes a `side_table::Ref` and is
//! replaced in the output by its marker (spec 6.2). Triple-quoted
//! strings record each internal newline in the `SkipSet` since they
//! collapse to a single logical source position for line-number
//! remapping purposes.

use crate::error::{CoreError, Diagnostic, DiagnosticKind};
use crate::side_table::{Ref, SideTable};
use crate::skip_set::SkipSet;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Scanning,
    Comment,
}

struct Opener {
    quote_char: char,
    run_len: usize,
    is_raw: bool,
    is_byte: bool,
    is_fstring: bool,
    start_line: u32,
}

/// Result of running S2 over one source text.
pub struct StringProcOutput {
    pub text: String,
}

/// Run S2 over `source`, appending extracted refs to `side_table` and
/// collapsed line numbers to `skip_set`.
pub fn extract(
    source: &str,
    side_table: &mut SideTable,
    skip_set: &mut SkipSet,
) -> Result<StringProcOutput, CoreError> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0usize;
    let mut line: u32 = 0;
    let mut state = State::Scanning;
    let mut comment_buf = String::new();

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Scanning => {
                if c == '#' {
                    state = State::Comment;
                    comment_buf.clear();
                    i += 1;
                } else if c == '\'' || c == '"' {
                    let (prefix_len, is_raw, is_byte, is_fstring) = read_prefix(&chars, i, &out);
                    let prefix_start = out.len() - prefix_len_in_bytes(&out, prefix_len);
                    let _ = prefix_start;
                    let (opener, consumed) = start_quote(&chars, i, is_raw, is_byte, is_fstring, line);
                    i += consumed;
                    if let Some(opener) = opener {
                        let (body, new_i, new_line) = scan_string_body(&chars, i, &opener, skip_set)?;
                        let r = Ref::Str {
                            text: body,
                            quote_char: opener.quote_char,
                            is_multiline: opener.run_len == 3,
                            is_raw: opener.is_raw,
                            is_byte: opener.is_byte,
                            is_fstring: opener.is_fstring,
                        };
                        let id = side_table.push(r);
                        out.push_str(&SideTable::str_marker(id));
                        i = new_i;
                        line = new_line;
                    } else {
                        // two quotes of the same kind with nothing between: empty string.
                        let r = Ref::Str {
                            text: String::new(),
                            quote_char: c,
                            is_multiline: false,
                            is_raw,
                            is_byte,
                            is_fstring,
                        };
                        let id = side_table.push(r);
                        out.push_str(&SideTable::str_marker(id));
                    }
                } else {
                    if c == '\n' {
                        line += 1;
                    }
                    out.push(c);
                    i += 1;
                }
            }
            State::Comment => {
                if c == '\n' {
                    let id = side_table.push(Ref::Comment {
                        text: comment_buf.clone(),
                    });
                    out.push_str(&SideTable::comment_marker(id));
                    out.push('\n');
                    line += 1;
                    state = State::Scanning;
                    i += 1;
                } else {
                    comment_buf.push(c);
                    i += 1;
                }
            }
        }
    }

    if state == State::Comment {
        let id = side_table.push(Ref::Comment {
            text: comment_buf.clone(),
        });
        out.push_str(&SideTable::comment_marker(id));
    }

    Ok(StringProcOutput { text: out })
}

fn prefix_len_in_bytes(_out: &str, prefix_len: usize) -> usize {
    prefix_len
}

/// Look back from the current output tail for a string-prefix letter
/// combination (`r`, `b`, `f`, `rb`, `br`, `fr`, `rf`, and their
/// uppercase variants) immediately preceding the quote.
fn read_prefix(chars: &[char], quote_pos: usize, out: &str) -> (usize, bool, bool, bool) {
    let mut is_raw = false;
    let mut is_byte = false;
    let mut is_fstring = false;
    let mut n = 0usize;
    let mut j = quote_pos;
    while j > 0 && n < 2 {
        let prev = chars[j - 1];
        let is_prefix_letter = matches!(prev, 'r' | 'R' | 'b' | 'B' | 'f' | 'F');
        if !is_prefix_letter {
            break;
        }
        // only treat as a prefix if it directly abuts an identifier boundary
        if j >= 2 && chars[j - 2].is_alphanumeric() {
            break;
        }
        match prev {
            'r' | 'R' => is_raw = true,
            'b' | 'B' => is_byte = true,
            'f' | 'F' => is_fstring = true,
            _ => unreachable!(),
        }
        n += 1;
        j -= 1;
    }
    let _ = out;
    (n, is_raw, is_byte, is_fstring)
}

/// Consume the opening quote run starting at `pos`. Returns the Opener
/// (unless it's an empty string: two quotes of the same kind) and the
/// number of chars consumed.
fn start_quote(
    chars: &[char],
    pos: usize,
    is_raw: bool,
    is_byte: bool,
    is_fstring: bool,
    line: u32,
) -> (Option<Opener>, usize) {
    let q = chars[pos];
    let mut run = 1;
    while pos + run < chars.len() && chars[pos + run] == q && run < 3 {
        run += 1;
    }
    if run == 2 {
        // empty single-line string: "" or ''
        (None, 2)
    } else {
        (
            Some(Opener {
                quote_char: q,
                run_len: run,
                is_raw,
                is_byte,
                is_fstring,
                start_line: line,
            }),
            run,
        )
    }
}

/// Scan the body of a string until a closer run of the same length is
/// found, honoring escape parity. Returns the body text, the new index
/// into `chars`, and the updated line counter.
fn scan_string_body(
    chars: &[char],
    start: usize,
    opener: &Opener,
    skip_set: &mut SkipSet,
) -> Result<(String, usize, u32), CoreError> {
    let mut i = start;
    let mut line = opener.start_line;
    let mut body = String::new();
    loop {
        if i >= chars.len() {
            return Err(CoreError::Diagnostic(
                Diagnostic::error(DiagnosticKind::Parse, "unclosed string literal")
                    .at(opener.start_line + 1, 0, &body),
            ));
        }
        let c = chars[i];
        if c == '\\' && !opener.is_raw && i + 1 < chars.len() {
            body.push(c);
            body.push(chars[i + 1]);
            if chars[i + 1] == '\n' {
                line += 1;
                if opener.run_len == 3 {
                    skip_set.add(line);
                }
            }
            i += 2;
            continue;
        }
        if c == opener.quote_char {
            let mut run = 1;
            while i + run < chars.len() && chars[i + run] == opener.quote_char && run < opener.run_len {
                run += 1;
            }
            if run == opener.run_len {
                return Ok((body, i + run, line));
            }
            body.push(c);
            i += 1;
            continue;
        }
        if c == '\n' {
            if opener.run_len != 3 {
                return Err(CoreError::Diagnostic(
                    Diagnostic::error(
                        DiagnosticKind::Parse,
                        "single-line string literal contains a literal newline",
                    )
                    .at(opener.start_line + 1, 0, &body),
                ));
            }
            line += 1;
            skip_set.add(line);
        }
        body.push(c);
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
        (out.text, table, skips)
    }

    #[test]
    fn extracts_simple_double_quoted_string() {
        let (text, table, _) = run("x = \"hi\"\n");
        assert_eq!(table.len(), 1);
        assert!(text.starts_with("x = "));
        assert!(text.contains(crate::side_table::SENTINEL_OPEN));
    }

    #[test]
    fn extracts_comment() {
        let (text, table, _) = run("x = 1 # a comment\n");
        assert_eq!(table.len(), 1);
        assert!(text.contains('#'));
    }

    #[test]
    fn empty_string_literal_round_trips() {
        let (text, table, _) = run("x = \"\"\n");
        assert_eq!(table.len(), 1);
        let expanded = table.expand(&text).unwrap();
        assert_eq!(expanded, "x = \"\"\n");
    }

    #[test]
    fn triple_quoted_string_records_skip_lines() {
        let (_, _, skips) = run("x = \"\"\"a\nb\nc\"\"\"\n");
        assert_eq!(skips.len(), 2);
    }

    #[test]
    fn unclosed_string_is_an_error() {
        let mut table = SideTable::new();
        let mut skips = SkipSet::new();
        let result = extract("x = \"oops\n", &mut table, &mut skips);
        assert!(result.is_err());
    }

    #[test]
    fn raw_string_does_not_treat_backslash_as_escape() {
        let (text, table, _) = run("x = r\"a\\\"b\"\n");
        assert_eq!(table.len(), 1);
        let expanded = table.expand(&text).unwrap();
        assert!(expanded.contains("a\\\""));
    }

    #[test]
    fn full_round_trip_preserves_source() {
        let src = "a = \"hi\" # note\nb = 2\n";
        let (text, table, _) = run(src);
        let expanded = table.expand(&text).unwrap();
        assert_eq!(expanded, src);
    }
}
