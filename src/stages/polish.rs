//! S10 Polish — Trailing Whitespace and Final Newline
//!
//! The last stage: strip trailing whitespace from every line and
//! guarantee the output terminates with exactly one newline.

pub fn polish(text: &str) -> String {
    let trimmed_lines: String = text
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let mut out = trimmed_lines.trim_end_matches('\n').to_string();
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_whitespace_per_line() {
        let out = polish("a = 1   \nb = 2\t\n");
        assert_eq!(out, "a = 1\nb = 2\n");
    }

    #[test]
    fn ensures_single_trailing_newline() {
        assert_eq!(polish("a = 1"), "a = 1\n");
        assert_eq!(polish("a = 1\n\n\n"), "a = 1\n");
    }
}
