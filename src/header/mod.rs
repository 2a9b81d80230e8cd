//! S9 HeaderProc — Header Synthesis
//!
//! Six header kinds (spec 4.6): `None`, `Initial` (shebang + encoding +
//! version hash + docstring), `Coconut` (the runtime-module header,
//! named after the only collaborator whose contents are out of scope --
//! only the obligation to emit it is in scope), `Package(depth)`,
//! `Sys` (re-exports from an installed runtime), `Code` (single-line),
//! `File` (complete standalone module).
//!
//! `VersionGate` is the statically-typed analogue of upstream's
//! `pycondition(target, ver, if_lt, if_ge)` (spec 9's design note),
//! grounded directly on `coconut/compiler/header.py::base_pycondition`:
//! when the configured target's supported versions fall entirely below
//! or at-or-above `ver`, the gate collapses to one side at *generate*
//! time; otherwise it emits a runtime `if sys.version_info < ver: ...
//! else: ...` check.

pub mod hash;
pub mod template;

use crate::config::{CompileOptions, Target};
use hash::content_hash;

pub const HASH_PREFIX: &str = "# __coconut_hash__ = ";
/// Column upstream's `section()` banner pads comment lines out to.
pub const JUSTIFY_LEN: usize = 116;

/// Which of the six header kinds to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    None,
    Initial,
    Coconut,
    Package(u32),
    Sys,
    Code,
    File,
}

/// The statically-typed sum type spec 9 asks for in place of runtime
/// `pycondition` dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionGate {
    Always,
    OnlyIfLt((u32, u32)),
    OnlyIfGe((u32, u32)),
    Runtime((u32, u32)),
}

/// Minimum and maximum target versions a `Target` can resolve to, used
/// to decide whether a `VersionGate` collapses at generate time.
/// Two bounds only: 2.x and 3.x, matching the two supported major
/// target families (spec 1's "two major target versions").
fn bounds_for_target(target: &Target) -> ((u32, u32), (u32, u32)) {
    match target.major() {
        Some("2") => ((2, 0), (2, 7)),
        Some("3") => ((3, 0), (3, 12)),
        _ => ((2, 0), (3, 12)),
    }
}

/// Build a `VersionGate` for a construct gated at `ver`, given the
/// target's supported version range. `if_lt`/`if_ge` are provided by
/// the caller so `emit` knows which branch(es) to keep.
pub fn pycondition(target: &Target, ver: (u32, u32)) -> VersionGate {
    let (lo, hi) = bounds_for_target(target);
    if hi < ver {
        VersionGate::OnlyIfLt(ver)
    } else if lo >= ver {
        VersionGate::OnlyIfGe(ver)
    } else {
        VersionGate::Runtime(ver)
    }
}

impl VersionGate {
    /// Render code that depends on the Python version for the given
    /// target, mirroring `base_pycondition`'s three-way branch.
    pub fn emit(&self, if_lt: &str, if_ge: &str) -> String {
        match self {
            VersionGate::Always => if_ge.to_string(),
            VersionGate::OnlyIfLt(_) => if_lt.to_string(),
            VersionGate::OnlyIfGe(_) => if_ge.to_string(),
            VersionGate::Runtime(ver) => format!(
                "if _coconut_sys.version_info < ({}, {}):\n{}\nelse:\n{}",
                ver.0,
                ver.1,
                indent_block(if_lt),
                indent_block(if_ge),
            ),
        }
    }
}

fn indent_block(body: &str) -> String {
    body.lines()
        .map(|l| format!("    {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A section banner comment, padded to `JUSTIFY_LEN`, grounded on
/// `header.py::section`.
pub fn section_banner(name: &str) -> String {
    let line = format!("# {}: ", name);
    let pad = JUSTIFY_LEN.saturating_sub(line.chars().count());
    format!("{}{}\n\n", line, "-".repeat(pad))
}

/// Synthesize the header for `kind` and prepend it to `body`.
pub fn synthesize(kind: HeaderKind, body: &str, options: &CompileOptions, source_text: &str) -> String {
    match kind {
        HeaderKind::None => body.to_string(),
        HeaderKind::Code => body.to_string(),
        HeaderKind::Sys => {
            let mut out = String::new();
            out.push_str(&section_banner("Coconut Runtime"));
            out.push_str("from __coconut__ import *\n");
            out.push_str(&section_banner("Compiled Coconut"));
            out.push_str(body);
            out
        }
        HeaderKind::Package(depth) => {
            let mut out = String::new();
            out.push_str(&"#!/usr/bin/env python\n".to_string());
            out.push_str(&format!("# coding: utf-8\n# package depth: {}\n", depth));
            out.push_str(&hash_line(options, source_text));
            out.push_str(&section_banner("Coconut Header"));
            out.push_str(&import_block(options));
            out.push_str(&section_banner("Compiled Coconut"));
            out.push_str(body);
            out
        }
        HeaderKind::Initial | HeaderKind::Coconut | HeaderKind::File => {
            let mut out = String::new();
            out.push_str(&shebang_line(options));
            out.push_str("# -*- coding: utf-8 -*-\n");
            out.push_str(&hash_line(options, source_text));
            out.push('\n');
            out.push_str(&format!(
                "# Compiled with core compiler version {}\n",
                env!("CARGO_PKG_VERSION")
            ));
            out.push('\n');
            out.push_str(&section_banner("Coconut Header"));
            out.push_str(&import_block(options));
            out.push_str(&section_banner("Compiled Coconut"));
            out.push_str(body);
            out
        }
    }
}

fn shebang_line(options: &CompileOptions) -> String {
    let interp = match options.target.major() {
        Some("2") => "python2",
        Some("3") => "python3",
        _ => "python",
    };
    format!("#!/usr/bin/env {}\n", interp)
}

fn hash_line(options: &CompileOptions, source_text: &str) -> String {
    format!("{}{}\n", HASH_PREFIX, content_hash(source_text, options))
}

fn import_block(options: &CompileOptions) -> String {
    let future = pycondition(&options.target, (3, 0));
    let mut out = String::new();
    out.push_str(&future.emit(
        "from __future__ import print_function, absolute_import, unicode_literals, division\n",
        "",
    ));
    out.push_str("import sys as _coconut_sys\n");
    out
}

/// Read back the hash embedded on line 3 of an `Initial`/`Coconut`
/// header, mirroring `header.py::gethash`.
pub fn read_hash(compiled: &str) -> Option<&str> {
    let line = compiled.lines().nth(2)?;
    line.strip_prefix(HASH_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_collapses_when_target_fully_above_ver() {
        let gate = pycondition(&Target("35".to_string()), (3, 0));
        assert_eq!(gate, VersionGate::OnlyIfGe((3, 0)));
        assert_eq!(gate.emit("old", "new"), "new");
    }

    #[test]
    fn gate_collapses_when_target_fully_below_ver() {
        let gate = pycondition(&Target("27".to_string()), (3, 0));
        assert_eq!(gate, VersionGate::OnlyIfLt((3, 0)));
        assert_eq!(gate.emit("old", "new"), "old");
    }

    #[test]
    fn gate_is_runtime_checked_in_universal_mode() {
        let gate = pycondition(&Target::universal(), (3, 0));
        assert_eq!(gate, VersionGate::Runtime((3, 0)));
        let emitted = gate.emit("old", "new");
        assert!(emitted.contains("_coconut_sys.version_info < (3, 0)"));
        assert!(emitted.contains("old"));
        assert!(emitted.contains("new"));
    }

    #[test]
    fn hash_round_trips_from_header_line_three() {
        let options = CompileOptions::default();
        let header = synthesize(HeaderKind::Initial, "body\n", &options, "source");
        let hash = read_hash(&header).unwrap();
        assert_eq!(hash, content_hash("source", &options));
    }

    #[test]
    fn none_and_code_headers_do_not_modify_body() {
        let options = CompileOptions::default();
        assert_eq!(synthesize(HeaderKind::None, "body\n", &options, "s"), "body\n");
        assert_eq!(synthesize(HeaderKind::Code, "body\n", &options, "s"), "body\n");
    }

    #[test]
    fn section_banner_is_padded() {
        let banner = section_banner("X");
        assert!(banner.starts_with("# X: "));
        assert!(banner.trim_end().len() <= JUSTIFY_LEN);
    }
}
