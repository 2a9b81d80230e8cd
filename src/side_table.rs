//! Side Table — String/Comment/Passthrough Ref Storage
//!
//! Strings, comments, and backslash-passthroughs are lexically trapped
//! regions: later stages (S4 indentation, S5 grammar) must not see their
//! contents at all, since a string could contain anything that looks
//! like a brace or a keyword. S2/S3 replace each one with an opaque
//! marker referencing this table; S8 expands the markers back.
//!
//! Refs never move once appended: their index is their identity for the
//! lifetime of one compilation (spec section 3, "Refs never move").

use crate::error::{internal_assert, CoreError};

/// The two sentinel code points used to delimit string/comment markers,
/// and the prefix used for passthrough markers. None of the three
/// appear in legal source text for the surface language, so a scanner
/// can distinguish a marker from ordinary text with one character
/// lookahead.
pub const SENTINEL_OPEN: char = '\u{E000}';
pub const SENTINEL_CLOSE: char = '\u{E001}';

/// Stable identifier for one entry in the `SideTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefId(pub u32);

/// One trapped lexical region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    Str {
        text: String,
        quote_char: char,
        is_multiline: bool,
        is_raw: bool,
        is_byte: bool,
        is_fstring: bool,
    },
    Comment {
        text: String,
    },
    Passthrough {
        text: String,
        is_multiline: bool,
    },
}

/// Append-only list of `Ref`s produced by S2/S3 and consumed by S8.
#[derive(Debug, Clone, Default)]
pub struct SideTable {
    refs: Vec<Ref>,
}

impl SideTable {
    pub fn new() -> Self {
        Self { refs: Vec::new() }
    }

    /// Append a ref and return its stable id.
    pub fn push(&mut self, r: Ref) -> RefId {
        let id = RefId(self.refs.len() as u32);
        self.refs.push(r);
        id
    }

    pub fn get(&self, id: RefId) -> Result<&Ref, CoreError> {
        self.refs
            .get(id.0 as usize)
            .ok_or_else(|| CoreError::internal(format!("dangling side-table ref {}", id.0)))
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Marker text for a string ref, per spec 6.2:
    /// `<SENTINEL_OPEN_STR><decimal-index><SENTINEL_CLOSE>`.
    pub fn str_marker(id: RefId) -> String {
        format!("{}{}{}", SENTINEL_OPEN, id.0, SENTINEL_CLOSE)
    }

    /// Marker text for a comment ref: `#<decimal-index><SENTINEL_CLOSE>`.
    pub fn comment_marker(id: RefId) -> String {
        format!("#{}{}", id.0, SENTINEL_CLOSE)
    }

    /// Marker text for a single-line passthrough:
    /// `\<index><SENTINEL_CLOSE>\n`.
    pub fn passthrough_marker_single(id: RefId) -> String {
        format!("\\{}{}\n", id.0, SENTINEL_CLOSE)
    }

    /// Marker text for a multi-line passthrough: `\\<index><SENTINEL_CLOSE>`.
    pub fn passthrough_marker_multi(id: RefId) -> String {
        format!("\\\\{}{}", id.0, SENTINEL_CLOSE)
    }

    /// Re-expand every marker found in `text` back to its stored
    /// contents (S8 / ReplProc). Pure string rewrite: scans for
    /// `SENTINEL_OPEN` / `#`..`SENTINEL_CLOSE` / `\`..`SENTINEL_CLOSE`
    /// runs and substitutes.
    pub fn expand(&self, text: &str) -> Result<String, CoreError> {
        let mut out = String::with_capacity(text.len());
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == SENTINEL_OPEN {
                let (digits, next) = read_digits(&chars, i + 1);
                internal_assert(next < chars.len() && chars[next] == SENTINEL_CLOSE, "unterminated string marker")?;
                let id = RefId(digits.parse().map_err(|_| CoreError::internal("malformed string marker index"))?);
                match self.get(id)? {
                    Ref::Str { text, .. } => out.push_str(text),
                    other => return Err(CoreError::internal(format!("expected Str ref, got {:?}", other))),
                }
                i = next + 1;
            } else if c == '#' && matches!(peek_digits_then_close(&chars, i + 1), Some(_)) {
                let (digits, next) = read_digits(&chars, i + 1);
                let id = RefId(digits.parse().map_err(|_| CoreError::internal("malformed comment marker index"))?);
                match self.get(id)? {
                    Ref::Comment { text } => {
                        out.push('#');
                        out.push_str(text);
                    }
                    other => return Err(CoreError::internal(format!("expected Comment ref, got {:?}", other))),
                }
                i = next + 1;
            } else if c == '\\' && i + 1 < chars.len() && chars[i + 1] == '\\'
                && matches!(peek_digits_then_close(&chars, i + 2), Some(_))
            {
                // multi-line passthrough: \\<index><CLOSE>
                let (digits, next) = read_digits(&chars, i + 2);
                let id = RefId(digits.parse().map_err(|_| CoreError::internal("malformed passthrough marker index"))?);
                match self.get(id)? {
                    Ref::Passthrough { text, .. } => out.push_str(text),
                    other => return Err(CoreError::internal(format!("expected Passthrough ref, got {:?}", other))),
                }
                i = next + 1;
            } else if c == '\\' && matches!(peek_digits_then_close(&chars, i + 1), Some(_)) {
                // single-line passthrough: \<index><CLOSE>, trailing newline kept verbatim
                let (digits, next) = read_digits(&chars, i + 1);
                let id = RefId(digits.parse().map_err(|_| CoreError::internal("malformed passthrough marker index"))?);
                match self.get(id)? {
                    Ref::Passthrough { text, .. } => out.push_str(text),
                    other => return Err(CoreError::internal(format!("expected Passthrough ref, got {:?}", other))),
                }
                i = next + 1;
            } else {
                out.push(c);
                i += 1;
            }
        }
        Ok(out)
    }
}

fn read_digits(chars: &[char], start: usize) -> (String, usize) {
    let mut i = start;
    let mut digits = String::new();
    while i < chars.len() && chars[i].is_ascii_digit() {
        digits.push(chars[i]);
        i += 1;
    }
    (digits, i)
}

fn peek_digits_then_close(chars: &[char], start: usize) -> Option<()> {
    let (digits, next) = read_digits(chars, start);
    if !digits.is_empty() && next < chars.len() && chars[next] == SENTINEL_CLOSE {
        Some(())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_string_ref() {
        let mut table = SideTable::new();
        let id = table.push(Ref::Str {
            text: "hello".to_string(),
            quote_char: '"',
            is_multiline: false,
            is_raw: false,
            is_byte: false,
            is_fstring: false,
        });
        let marker = SideTable::str_marker(id);
        let expanded = table.expand(&marker).unwrap();
        assert_eq!(expanded, "hello");
    }

    #[test]
    fn round_trips_a_comment_ref() {
        let mut table = SideTable::new();
        let id = table.push(Ref::Comment {
            text: " a note".to_string(),
        });
        let marker = SideTable::comment_marker(id);
        let expanded = table.expand(&marker).unwrap();
        assert_eq!(expanded, "# a note");
    }

    #[test]
    fn refs_are_stable_across_pushes() {
        let mut table = SideTable::new();
        let a = table.push(Ref::Comment { text: "a".into() });
        let b = table.push(Ref::Comment { text: "b".into() });
        assert_eq!(a.0, 0);
        assert_eq!(b.0, 1);
        assert_eq!(table.len(), 2);
    }
}
