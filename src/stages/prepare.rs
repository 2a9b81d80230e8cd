//! S1 Prepare — Line Ending Normalization
//!
//! Normalize `\r\n` and bare `\r` to `\n` so every later stage can
//! assume `\n` is the only line terminator in play (spec's SourceText
//! data-model guarantee). Optionally strips leading/trailing
//! whitespace-only lines for `parse_eval`/`parse_single` style
//! single-expression inputs.

/// Normalize all line endings to `\n`.
pub fn normalize_line_endings(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            other => out.push(other),
        }
    }
    out
}

/// Strip leading and trailing blank lines, used by the single-line and
/// eval compilation modes which expect one logical statement/expression.
pub fn strip_blank_edges(source: &str) -> String {
    source.trim_matches(|c: char| c == '\n' || c.is_whitespace()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_crlf() {
        assert_eq!(normalize_line_endings("a\r\nb\r\nc"), "a\nb\nc");
    }

    #[test]
    fn normalizes_bare_cr() {
        assert_eq!(normalize_line_endings("a\rb"), "a\nb");
    }

    #[test]
    fn leaves_lf_alone() {
        assert_eq!(normalize_line_endings("a\nb\n"), "a\nb\n");
    }

    #[test]
    fn strips_blank_edges() {
        assert_eq!(strip_blank_edges("\n\n  x = 1  \n\n"), "x = 1");
    }
}
