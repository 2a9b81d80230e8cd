//! S5 Parse / S6 Evaluate — Computation Graph and Grammar
//!
//! The grammar does not produce target-language text directly. It
//! builds a `Graph` of `ComputationNode`s -- one per recognized
//! construct -- and defers rendering to `evaluate`, which walks the
//! graph post-order and asks each node's `HandlerId` to render itself
//! exactly once (spec 3's "every node evaluates at most once", spec
//! 8 invariant 4). Plain target-language text that needs no rewriting
//! is still a node (`HandlerId::Verbatim`), just one whose handler is
//! the identity function -- there is no separate fast path, so every
//! piece of source goes through the same single-evaluation discipline.
//!
//! This mirrors the upstream `MatchNode`/`ComputationGraph` design
//! described informally in `coconut/compiler/grammar.py` and
//! `coconut/compiler/matching.py`: productions build a tree of deferred
//! actions rather than computing strings as they parse, so a single
//! sub-expression shared by two productions (memoized by `Packrat`)
//! still only runs its semantic action once.

pub mod expr;
pub mod lexer;
pub mod packrat;
pub mod stmt;

use crate::config::CompileOptions;
use crate::error::CoreError;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Which semantic handler renders a node's children into text. Maps
/// one-to-one onto the `src/handlers` modules plus a `Verbatim`
/// identity case for ordinary target-language text that needs no
/// rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerId {
    /// Render children concatenated with nothing in between: the
    /// identity handler for plain passthrough text and punctuation.
    Verbatim,
    Pipeline,
    Compose,
    Partial,
    LazyList,
    ChainCall,
    BacktickInfix,
    MatchStatement,
    DataStatement,
    ImportStatement,
    Decorator,
    AugAssign,
    MathDef,
    MatchDef,
}

/// One node in the computation graph. `metadata` carries handler-
/// specific parameters that aren't themselves child nodes (operator
/// names, flags) -- small enough that a `HashMap` beats a handler-
/// specific enum variant explosion.
pub struct ComputationNode {
    pub handler: HandlerId,
    pub children: Vec<NodeId>,
    pub literal: Option<String>,
    pub metadata: HashMap<&'static str, String>,
    cache: OnceCell<String>,
}

impl ComputationNode {
    fn leaf(literal: String) -> Self {
        Self {
            handler: HandlerId::Verbatim,
            children: Vec::new(),
            literal: Some(literal),
            metadata: HashMap::new(),
            cache: OnceCell::new(),
        }
    }

    fn composite(handler: HandlerId, children: Vec<NodeId>) -> Self {
        Self {
            handler,
            children,
            literal: None,
            metadata: HashMap::new(),
            cache: OnceCell::new(),
        }
    }
}

/// Arena owning every `ComputationNode` produced while parsing one
/// compilation unit. Dropped with the `Compiler::begin_parse` state
/// that created it (SPEC_FULL.md's data-model note).
#[derive(Default)]
pub struct Graph {
    nodes: Vec<ComputationNode>,
}

impl Graph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn leaf(&mut self, literal: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ComputationNode::leaf(literal.into()));
        id
    }

    pub fn node(&mut self, handler: HandlerId, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ComputationNode::composite(handler, children));
        id
    }

    pub fn node_with_meta(
        &mut self,
        handler: HandlerId,
        children: Vec<NodeId>,
        metadata: HashMap<&'static str, String>,
    ) -> NodeId {
        let id = self.node(handler, children);
        self.nodes[id.0 as usize].metadata = metadata;
        id
    }

    pub fn get(&self, id: NodeId) -> &ComputationNode {
        &self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Context threaded through evaluation: compile options plus a counter
/// of how many times each node was actually rendered, so tests can
/// assert the single-evaluation invariant directly.
pub struct EvalContext<'a> {
    pub options: &'a CompileOptions,
    pub evaluations: HashMap<NodeId, u32>,
}

impl<'a> EvalContext<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options, evaluations: HashMap::new() }
    }
}

/// Render `node` (and, transitively, everything it depends on) to
/// text, post-order, each node evaluating at most once regardless of
/// how many parents reference it.
pub fn evaluate(graph: &Graph, node: NodeId, ctx: &mut EvalContext) -> Result<String, CoreError> {
    let n = graph.get(node);
    if let Some(cached) = n.cache.get() {
        return Ok(cached.clone());
    }

    let rendered = if let Some(literal) = &n.literal {
        literal.clone()
    } else {
        let mut child_text = Vec::with_capacity(n.children.len());
        for &child in &n.children {
            child_text.push(evaluate(graph, child, ctx)?);
        }
        crate::handlers::dispatch(n.handler, &child_text, &n.metadata, ctx.options)?
    };

    *ctx.evaluations.entry(node).or_insert(0) += 1;
    // OnceCell::set fails silently if already set by a concurrent path;
    // single-threaded evaluation here means that can't happen, but we
    // still prefer set() over get_or_init() so a logic error surfaces
    // as a mismatched cached value rather than being masked.
    let _ = n.cache.set(rendered.clone());
    Ok(rendered)
}
