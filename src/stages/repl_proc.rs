//! S8 ReplProc — Re-expand String/Passthrough Markers
//!
//! Thin wrapper over `side_table::SideTable::expand`, which already
//! implements the full marker grammar (spec 6.2) for strings, comments,
//! and both passthrough spellings. Kept as its own pipeline stage
//! (rather than inlined into S9/S10) to mirror the one-module-per-stage
//! convention and to give S8 failures their own place to be reported.

use crate::error::CoreError;
use crate::side_table::SideTable;

pub fn expand(body: &str, side_table: &SideTable) -> Result<String, CoreError> {
    side_table.expand(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side_table::Ref;

    #[test]
    fn expands_a_string_marker_in_context() {
        let mut table = SideTable::new();
        let id = table.push(Ref::Str {
            text: "hi".into(),
            quote_char: '"',
            is_multiline: false,
            is_raw: false,
            is_byte: false,
            is_fstring: false,
        });
        let marker = format!("x = {}\n", SideTable::str_marker(id));
        let out = expand(&marker, &table).unwrap();
        assert_eq!(out, "x = hi\n");
    }
}
