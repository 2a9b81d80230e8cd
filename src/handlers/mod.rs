//! Semantic Handlers — Evaluate-Time Construct Lowering
//!
//! Each `HandlerId` the grammar assigns to a `ComputationNode` renders
//! here, dispatched from `grammar::evaluate`. Handlers receive their
//! children already rendered (post-order, spec 8 invariant 4) plus any
//! non-child metadata the grammar attached (operator spelling, flags).
//!
//! Scope decision (recorded in full in DESIGN.md): pipelines, compose,
//! partial application and chaining lower to direct calls against the
//! target runtime's standard library (`functools.partial`,
//! `itertools.chain`, `itertools.islice`) rather than through an
//! indirection layer, since runtime-helper bodies are out of scope and
//! direct emission is both spec-compliant and self-contained.

pub mod aug_assign;
pub mod dataclass;
pub mod decorators;
pub mod imports;
pub mod match_def;
pub mod math_def;
pub mod name_check;
pub mod pattern_match;
pub mod pipeline_rewriter;

use crate::config::CompileOptions;
use crate::error::CoreError;
use crate::grammar::HandlerId;
use std::collections::HashMap;

pub fn dispatch(
    handler: HandlerId,
    children: &[String],
    metadata: &HashMap<&'static str, String>,
    options: &CompileOptions,
) -> Result<String, CoreError> {
    match handler {
        HandlerId::Verbatim => Ok(children.concat()),
        HandlerId::Pipeline => pipeline_rewriter::render_pipeline(children, metadata),
        HandlerId::Compose => pipeline_rewriter::render_compose(children),
        HandlerId::Partial => pipeline_rewriter::render_partial(children),
        HandlerId::LazyList => pipeline_rewriter::render_lazy_index(children),
        HandlerId::ChainCall => pipeline_rewriter::render_chain(children),
        HandlerId::BacktickInfix => pipeline_rewriter::render_backtick(children),
        HandlerId::MatchStatement => pattern_match::render_match_statement(children, metadata, options),
        HandlerId::DataStatement => dataclass::render_data_statement(children, metadata, options),
        HandlerId::ImportStatement => imports::render_import(children, metadata, options),
        HandlerId::Decorator => decorators::render_decorator(children, metadata),
        HandlerId::AugAssign => aug_assign::render_aug_assign(children, metadata),
        HandlerId::MathDef => math_def::render_math_def(children, metadata),
        HandlerId::MatchDef => match_def::render_match_def(children, metadata, options),
    }
}

pub(crate) fn missing_child(name: &str) -> CoreError {
    CoreError::internal(format!("handler missing expected child: {}", name))
}
