//! Pipeline Stages S1-S4 and S7-S10
//!
//! Mirrors the teacher's three-phase split (lexer / parser / assembler,
//! `src/pipeline.rs` in the original markup-language processor) except
//! the phases here are the ten stages of spec section 2: S1-S4 prepare
//! plain text into bracketed text with lexical markers, S5/S6 (grammar
//! and evaluation, `crate::grammar`) turn that into a target-language
//! body, and S7-S10 invert the preparation and prepend the header.
//!
//! Each stage is one module, one state machine, one `Error` enum,
//! following `lexer/core/lexer.rs` and `parser/infrastructure/error.rs`
//! in the teacher.

pub mod indent_proc;
pub mod passthrough_proc;
pub mod polish;
pub mod prepare;
pub mod reind_proc;
pub mod repl_proc;
pub mod string_proc;
