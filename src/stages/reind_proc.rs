//! S7 ReindProc — Indent Markers Back to Whitespace
//!
//! Inverse of S4: walks the evaluated body text and converts every
//! `INDENT_OPEN`/`INDENT_CLOSE` sentinel into an indentation change at a
//! fixed tab width (spec 4.3's inverse, spec 2's S7). The tab width is
//! fixed (not configurable) since the emitted target code need only be
//! consistently indented, not match the user's original style.

use crate::error::CoreError;
use crate::stages::indent_proc::{INDENT_CLOSE, INDENT_OPEN};

const TAB_WIDTH: usize = 4;

pub fn convert(body: &str) -> Result<String, CoreError> {
    let mut out = String::new();
    let mut level: usize = 0;
    let mut at_line_start = true;

    for c in body.chars() {
        match c {
            INDENT_OPEN => {
                level += 1;
            }
            INDENT_CLOSE => {
                level = level.saturating_sub(1);
            }
            '\n' => {
                out.push('\n');
                at_line_start = true;
            }
            other => {
                if at_line_start {
                    out.push_str(&" ".repeat(level * TAB_WIDTH));
                    at_line_start = false;
                }
                out.push(other);
            }
        }
    }

    Ok(out)
}
