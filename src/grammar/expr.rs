//! Expression Grammar
//!
//! A precedence-climbing (Pratt) parser over the token stream from
//! `lexer`. Most target-language binary/unary operators need no
//! rewriting at all, so they fall through to `HandlerId::Verbatim`
//! nodes; only the operators spec 4.4 calls out as needing semantic
//! lowering -- pipeline, compose, chain, partial application, lazy
//! lists, and backtick infix calls -- get dedicated handlers. This
//! mirrors the teacher's layered-precedence grammar style (one
//! production per binding level) generalized from a layout grammar to
//! an expression grammar.

use crate::error::{CoreError, Diagnostic, DiagnosticKind};
use crate::grammar::lexer::Token;
use crate::grammar::{Graph, HandlerId, NodeId};
use std::collections::HashMap;

pub struct ExprParser<'g> {
    tokens: Vec<Token>,
    pos: usize,
    graph: &'g mut Graph,
}

/// Binary operators that pass through unchanged, grouped low-to-high
/// precedence. Every operator at the same level is left-associative
/// except `**`, handled separately as it's right-associative.
const PRECEDENCE_LEVELS: &[&[&str]] = &[
    &["or"],
    &["and"],
    &["==", "!=", "<", ">", "<=", ">=", "in", "is"],
    &["|"],
    &["^"],
    &["&"],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "//", "%", "@"],
];

impl<'g> ExprParser<'g> {
    pub fn new(tokens: Vec<Token>, graph: &'g mut Graph) -> Self {
        Self { tokens, pos: 0, graph }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if matches!(self.peek(), Some(Token::Op(o)) if o == op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(w)) if w == word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Entry point: parse one full expression, lowest precedence first.
    pub fn parse_expr(&mut self) -> Result<NodeId, CoreError> {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> Result<NodeId, CoreError> {
        let body = self.parse_pipeline()?;
        if self.eat_ident("if") {
            let cond = self.parse_pipeline()?;
            if !self.eat_ident("else") {
                return Err(self.error("expected 'else' in conditional expression"));
            }
            let alt = self.parse_conditional()?;
            let kw_if = self.graph.leaf(" if ");
            let kw_else = self.graph.leaf(" else ");
            return Ok(self.graph.node(
                HandlerId::Verbatim,
                vec![body, kw_if, cond, kw_else, alt],
            ));
        }
        Ok(body)
    }

    /// `|>`, `<|`, `|*>`, `<*|` and their augmented-assignment variants
    /// are handled by `aug_assign`; here we only handle the expression
    /// forms. Left-associative, lowest precedence (spec 4.4/4.5.1).
    fn parse_pipeline(&mut self) -> Result<NodeId, CoreError> {
        let mut left = self.parse_compose()?;
        loop {
            let op = match self.peek() {
                Some(Token::Op(o)) if o == "|>" || o == "<|" || o == "|*>" || o == "<*|" => o.clone(),
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_compose()?;
            let (a, b) = if op == "<|" || op == "<*|" { (right, left) } else { (left, right) };
            let mut meta = HashMap::new();
            meta.insert("starred", (op == "|*>" || op == "<*|").to_string());
            left = self.graph.node_with_meta(HandlerId::Pipeline, vec![a, b], meta);
        }
        Ok(left)
    }

    /// `..` function composition, grounded on spec 4.4's composition
    /// operator, one level tighter than pipelines.
    fn parse_compose(&mut self) -> Result<NodeId, CoreError> {
        let mut left = self.parse_chain()?;
        while self.eat_op("..") {
            let right = self.parse_chain()?;
            left = self.graph.node(HandlerId::Compose, vec![left, right]);
        }
        Ok(left)
    }

    /// `::` lazy iterator chaining.
    fn parse_chain(&mut self) -> Result<NodeId, CoreError> {
        let mut left = self.parse_backtick()?;
        while self.eat_op("::") {
            let right = self.parse_backtick()?;
            left = self.graph.node(HandlerId::ChainCall, vec![left, right]);
        }
        Ok(left)
    }

    /// `` a`f`b `` infix-call sugar.
    fn parse_backtick(&mut self) -> Result<NodeId, CoreError> {
        let left = self.parse_level(0)?;
        if self.eat_op("`") {
            let func = self.parse_level(0)?;
            if !self.eat_op("`") {
                return Err(self.error("unterminated backtick infix call"));
            }
            let right = self.parse_level(0)?;
            return Ok(self.graph.node(HandlerId::BacktickInfix, vec![func, left, right]));
        }
        Ok(left)
    }

    fn parse_level(&mut self, level: usize) -> Result<NodeId, CoreError> {
        if level >= PRECEDENCE_LEVELS.len() {
            return self.parse_power();
        }
        let mut left = self.parse_level(level + 1)?;
        loop {
            let ops = PRECEDENCE_LEVELS[level];
            let matched = match self.peek() {
                Some(Token::Op(o)) if ops.contains(&o.as_str()) => Some(o.clone()),
                Some(Token::Ident(w)) if ops.contains(&w.as_str()) => Some(w.clone()),
                _ => None,
            };
            let Some(op) = matched else { break };
            self.pos += 1;
            // `not in` / `is not` two-word operators.
            let op = if op == "is" && self.eat_ident("not") {
                "is not".to_string()
            } else {
                op
            };
            let right = self.parse_level(level + 1)?;
            let lit = self.graph.leaf(format!(" {} ", op));
            left = self.graph.node(HandlerId::Verbatim, vec![left, lit, right]);
        }
        Ok(left)
    }

    /// `**` is right-associative and binds tighter than unary minus on
    /// its left operand but looser on its right (Python's rule:
    /// `-2**2 == -4`, `2**-2 == 0.25`), so it sits between the additive
    /// chain and unary.
    fn parse_power(&mut self) -> Result<NodeId, CoreError> {
        let left = self.parse_unary()?;
        if self.eat_op("**") {
            let right = self.parse_power()?;
            let op = self.graph.leaf(" ** ");
            return Ok(self.graph.node(HandlerId::Verbatim, vec![left, op, right]));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId, CoreError> {
        if let Some(Token::Op(o)) = self.peek() {
            if o == "+" || o == "-" || o == "~" {
                let op = o.clone();
                self.pos += 1;
                let operand = self.parse_unary()?;
                let lit = self.graph.leaf(op);
                return Ok(self.graph.node(HandlerId::Verbatim, vec![lit, operand]));
            }
        }
        if self.eat_ident("not") {
            let operand = self.parse_unary()?;
            let lit = self.graph.leaf("not ");
            return Ok(self.graph.node(HandlerId::Verbatim, vec![lit, operand]));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<NodeId, CoreError> {
        let mut node = self.parse_atom()?;
        loop {
            if self.eat_op(".") {
                let name = match self.advance() {
                    Some(Token::Ident(n)) => n,
                    _ => return Err(self.error("expected attribute name after '.'")),
                };
                let dot = self.graph.leaf(format!(".{}", name));
                node = self.graph.node(HandlerId::Verbatim, vec![node, dot]);
            } else if self.eat_op("(") {
                let args = self.parse_arg_list(")")?;
                let mut children = vec![node];
                children.extend(args);
                node = self.graph.node(HandlerId::Verbatim, wrap_call(self.graph, children));
            } else if self.eat_op("[") {
                let args = self.parse_arg_list("]")?;
                let open = self.graph.leaf("[");
                let close = self.graph.leaf("]");
                let mut children = vec![node, open];
                children.extend(intersperse_commas(self.graph, args));
                children.push(close);
                node = self.graph.node(HandlerId::Verbatim, children);
            } else if self.eat_op("$(") {
                let args = self.parse_arg_list(")")?;
                node = self.graph.node(HandlerId::Partial, std::iter::once(node).chain(args).collect());
            } else if self.eat_op("$[") {
                let args = self.parse_arg_list("]")?;
                node = self.graph.node(HandlerId::LazyList, std::iter::once(node).chain(args).collect());
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_arg_list(&mut self, close: &str) -> Result<Vec<NodeId>, CoreError> {
        let mut args = Vec::new();
        if self.eat_op(close) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat_op(",") {
                if self.eat_op(close) {
                    break;
                }
                continue;
            }
            if !self.eat_op(close) {
                return Err(self.error(&format!("expected ',' or '{}'", close)));
            }
            break;
        }
        Ok(args)
    }

    fn parse_atom(&mut self) -> Result<NodeId, CoreError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(self.graph.leaf(name)),
            Some(Token::Number(n)) => Ok(self.graph.leaf(n)),
            Some(Token::Marker(m)) => Ok(self.graph.leaf(m)),
            Some(Token::Op(o)) if o == "(" => {
                let inner = self.parse_expr()?;
                if !self.eat_op(")") {
                    return Err(self.error("unclosed '('"));
                }
                let open = self.graph.leaf("(");
                let close = self.graph.leaf(")");
                Ok(self.graph.node(HandlerId::Verbatim, vec![open, inner, close]))
            }
            Some(Token::Op(o)) if o == "[" => {
                let args = self.parse_arg_list("]")?;
                let open = self.graph.leaf("[");
                let close = self.graph.leaf("]");
                let mut children = vec![open];
                children.extend(intersperse_commas(self.graph, args));
                children.push(close);
                Ok(self.graph.node(HandlerId::Verbatim, children))
            }
            other => Err(self.error(&format!("unexpected token in expression: {:?}", other))),
        }
    }

    fn error(&self, message: &str) -> CoreError {
        CoreError::Diagnostic(Diagnostic::error(DiagnosticKind::Parse, message))
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

fn wrap_call(graph: &mut Graph, mut children: Vec<NodeId>) -> Vec<NodeId> {
    let callee = children.remove(0);
    let open = graph.leaf("(");
    let close = graph.leaf(")");
    let mut out = vec![callee, open];
    out.extend(intersperse_commas(graph, children));
    out.push(close);
    out
}

fn intersperse_commas(graph: &mut Graph, items: Vec<NodeId>) -> Vec<NodeId> {
    let mut out = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(graph.leaf(", "));
        }
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;
    use crate::grammar::{evaluate, lexer::tokenize, EvalContext};

    fn render(src: &str) -> String {
        let tokens = tokenize(src);
        let mut graph = Graph::new();
        let node = {
            let mut parser = ExprParser::new(tokens, &mut graph);
            let n = parser.parse_expr().unwrap();
            assert!(parser.at_end(), "leftover tokens after parsing {:?}", src);
            n
        };
        let options = CompileOptions::default();
        let mut ctx = EvalContext::new(&options);
        evaluate(&graph, node, &mut ctx).unwrap()
    }

    #[test]
    fn verbatim_arithmetic_passes_through() {
        assert_eq!(render("1 + 2 * 3"), "1 + 2 * 3");
    }

    #[test]
    fn pipeline_reverses_into_a_call() {
        let out = render("xs |> map$(f) |> list");
        assert!(out.contains("xs"));
        assert!(out.contains("map"));
    }

    #[test]
    fn reverse_pipeline_swaps_operands() {
        let out = render("f <| x");
        // reverse pipeline should end up calling f on x, x first in args
        assert!(out.starts_with("f(") || out.contains("f("));
    }

    #[test]
    fn compose_builds_a_function_composition() {
        let out = render("f..g");
        assert!(out.contains("compose") || out.contains("f") && out.contains("g"));
    }

    #[test]
    fn power_is_right_associative_around_unary() {
        let out = render("2**3**2");
        assert_eq!(out, "2 ** 3 ** 2");
    }

    #[test]
    fn attribute_and_call_chain() {
        assert_eq!(render("obj.method(1, 2)"), "obj.method(1, 2)");
    }

    #[test]
    fn backtick_infix_call() {
        let out = render("5 `add` 3");
        assert!(out.contains("add"));
    }
}
