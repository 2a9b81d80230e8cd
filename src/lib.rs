//! Coconut-Core — A Functional-Superset Source-to-Source Compiler
//!
//! Ten-stage pipeline (spec section 2): `stages` holds S1-S4 and
//! S7-S10; `grammar` holds S5/S6 (parse and evaluate, as a deferred
//! computation graph rather than direct string emission); `handlers`
//! renders the grammar's semantic constructs; `header` is S9; `api`
//! exposes the six driver-facing compilation modes over all of it.
//!
//! `Compiler` (in `compiler`) owns the process-wide `CompileOptions`
//! plus per-parse state (`side_table`, `skip_set`) that's reset at the
//! top of every `api::parse_*` call, never leaked between
//! compilations.

pub mod api;
pub mod compiler;
pub mod config;
pub mod error;
pub mod grammar;
pub mod handlers;
pub mod header;
pub mod side_table;
pub mod skip_set;
pub mod stages;

pub use api::{parse_block, parse_eval, parse_exec, parse_file, parse_package, parse_single};
pub use compiler::Compiler;
pub use config::{CompileOptions, Target};
pub use error::CoreError;
