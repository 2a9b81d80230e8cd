//! Statement Grammar
//!
//! Walks the token stream one logical line at a time, using the
//! `IndentOpen`/`IndentClose` markers S4 left behind to find suite
//! boundaries. Keyword-led constructs (`if`, `for`, `def`, `data`,
//! `match def`, decorators, imports, assignments) are recognized here
//! and lowered directly to rendered text or to a `HandlerId` node
//! with pre-compiled children, per the division of labor described in
//! `handlers::pattern_match`'s module doc comment: structural analysis
//! happens here, at parse time, over tokens; `grammar::evaluate` only
//! assembles the results, once, in post-order.
//!
//! Ordinary statements and compound-statement headers still run their
//! expression portions through `expr::ExprParser`, so pipeline/
//! compose/chain/partial/backtick rewriting applies inside an `if`
//! condition or a `return` value exactly as it does in a bare
//! expression statement.

use crate::grammar::expr::ExprParser;
use crate::grammar::lexer::Token;
use crate::grammar::packrat::{Packrat, ProductionId};
use crate::grammar::{Graph, HandlerId, NodeId};
use crate::error::{CoreError, Diagnostic, DiagnosticKind};
use crate::handlers::{name_check, pattern_match};
use std::collections::HashMap;

const BLOCK_KEYWORDS: &[&str] = &["if", "elif", "else", "for", "while", "with", "try", "except", "finally", "class"];
const SIMPLE_KEYWORDS: &[&str] = &[
    "return", "yield", "raise", "assert", "del", "pass", "break", "continue", "global", "nonlocal",
];
const AUG_OPS: &[&str] = &[
    "+=", "-=", "*=", "/=", "//=", "%=", "**=", "&=", "|=", "^=", "<<=", ">>=", "@=",
    "|>=", "<|=", "|*>=", "..=", "::=",
];

pub struct StmtParser<'g> {
    tokens: Vec<Token>,
    pos: usize,
    graph: &'g mut Graph,
    choice_cache: Packrat<NodeId>,
}

impl<'g> StmtParser<'g> {
    pub fn new(tokens: Vec<Token>, graph: &'g mut Graph) -> Self {
        Self { tokens, pos: 0, graph, choice_cache: Packrat::new() }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn skip_blank_lines(&mut self) {
        while matches!(self.peek(), Some(Token::Newline)) {
            self.pos += 1;
        }
    }

    fn error(&self, msg: &str) -> CoreError {
        CoreError::Diagnostic(Diagnostic::error(DiagnosticKind::Parse, msg.to_string()))
    }

    /// Parse a whole module: a top-level block with no enclosing
    /// `IndentClose` to stop at.
    pub fn parse_module(&mut self) -> Result<NodeId, CoreError> {
        self.parse_block()
    }

    fn parse_block(&mut self) -> Result<NodeId, CoreError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_blank_lines();
            match self.peek() {
                None | Some(Token::IndentClose) => break,
                _ => {}
            }
            // ProductionId(100) tags "one statement at top of block" for
            // packrat bookkeeping; failures here are genuine parse
            // errors (propagated), so there's nothing to memoize as a
            // failed alternative -- the cache just records successes to
            // avoid re-parsing a position reached by more than one path.
            if let Some(Some(cached)) = self.choice_cache.get(ProductionId(100), self.pos) {
                stmts.push(cached);
                // position already advanced by the original parse; a
                // cache hit at the same textual position only occurs on
                // pure re-entry, not on a position we've already moved
                // past, so nothing further to advance here.
                continue;
            }
            let start = self.pos;
            let stmt = self.parse_statement()?;
            self.choice_cache.record(ProductionId(100), start, Some(stmt));
            stmts.push(stmt);
        }
        Ok(self.join_lines(stmts))
    }

    fn join_lines(&mut self, stmts: Vec<NodeId>) -> NodeId {
        let mut children = Vec::new();
        for (i, s) in stmts.into_iter().enumerate() {
            if i > 0 {
                children.push(self.graph.leaf("\n"));
            }
            children.push(s);
        }
        self.graph.node(HandlerId::Verbatim, children)
    }

    fn parse_statement(&mut self) -> Result<NodeId, CoreError> {
        match self.peek() {
            Some(Token::Op(o)) if o == "@" => self.parse_decorated(),
            Some(Token::Ident(w)) if w == "data" => self.parse_data(),
            Some(Token::Ident(w)) if w == "match" && matches!(self.peek_n(1), Some(Token::Ident(w2)) if w2 == "def") => {
                self.parse_match_def()
            }
            Some(Token::Ident(w)) if w == "match" => self.parse_match_statement(),
            Some(Token::Ident(w)) if w == "def" => self.parse_def(),
            Some(Token::Ident(w)) if w == "async" && matches!(self.peek_n(1), Some(Token::Ident(w2)) if w2 == "def") => {
                self.parse_def()
            }
            Some(Token::Ident(w)) if w == "import" || w == "from" => self.parse_import(),
            Some(Token::Ident(w)) if BLOCK_KEYWORDS.contains(&w.as_str()) => self.parse_compound(),
            Some(Token::Ident(w)) if SIMPLE_KEYWORDS.contains(&w.as_str()) => self.parse_simple_keyword_stmt(),
            _ => self.parse_expr_or_assign_statement(),
        }
    }

    /// Collect this logical line's tokens up to (not including) the
    /// terminating `Newline`/EOF/`IndentClose`.
    fn line_tokens(&mut self) -> Vec<Token> {
        let start = self.pos;
        while !matches!(self.peek(), None | Some(Token::Newline) | Some(Token::IndentClose)) {
            self.pos += 1;
        }
        let line = self.tokens[start..self.pos].to_vec();
        if matches!(self.peek(), Some(Token::Newline)) {
            self.pos += 1;
        }
        line
    }

    fn parse_expr_tokens(&mut self, tokens: Vec<Token>) -> Result<NodeId, CoreError> {
        let mut parser = ExprParser::new(tokens, self.graph);
        let node = parser.parse_expr()?;
        if !parser.at_end() {
            return Err(self.error("unexpected trailing tokens in expression"));
        }
        Ok(node)
    }

    /// Plain expression statement or (possibly augmented) assignment.
    /// Scans the logical line for a top-level assignment operator
    /// (bracket-depth zero) before falling back to a bare expression.
    fn parse_expr_or_assign_statement(&mut self) -> Result<NodeId, CoreError> {
        let line = self.line_tokens();
        if let Some((op_idx, op)) = find_top_level_assign_op(&line) {
            let target_tokens = line[..op_idx].to_vec();
            let value_tokens = line[op_idx + 1..].to_vec();
            let target = self.parse_expr_tokens(target_tokens)?;
            let value = self.parse_expr_tokens(value_tokens)?;
            if op == "=" {
                let eq = self.graph.leaf(" = ");
                return Ok(self.graph.node(HandlerId::Verbatim, vec![target, eq, value]));
            }
            let mut meta = HashMap::new();
            meta.insert("op", op);
            return Ok(self.graph.node_with_meta(HandlerId::AugAssign, vec![target, value], meta));
        }
        self.parse_expr_tokens(line)
    }

    fn parse_simple_keyword_stmt(&mut self) -> Result<NodeId, CoreError> {
        let line = self.line_tokens();
        let keyword = match &line[0] {
            Token::Ident(w) => w.clone(),
            _ => unreachable!(),
        };
        let kw_leaf = self.graph.leaf(format!("{} ", keyword));
        if line.len() == 1 {
            return Ok(self.graph.node(HandlerId::Verbatim, vec![kw_leaf]));
        }
        let rest = self.parse_expr_tokens(line[1..].to_vec())?;
        Ok(self.graph.node(HandlerId::Verbatim, vec![kw_leaf, rest]))
    }

    /// `if`/`elif`/`else`/`for`/`while`/`with`/`try`/`except`/`finally`/`class`.
    fn parse_compound(&mut self) -> Result<NodeId, CoreError> {
        let header_tokens = self.collect_header_until_colon()?;
        let keyword = match &header_tokens[0] {
            Token::Ident(w) => w.clone(),
            _ => unreachable!(),
        };
        let kw_leaf = self.graph.leaf(format!("{} ", keyword));
        let header_body: Vec<Token> = header_tokens[1..].to_vec();
        let header_node = if header_body.is_empty() {
            self.graph.leaf("")
        } else {
            self.parse_expr_tokens(header_body)?
        };
        let colon = self.graph.leaf(":\n");
        let suite = self.parse_suite()?;
        Ok(self.graph.node(HandlerId::Verbatim, vec![kw_leaf, header_node, colon, suite]))
    }

    /// Consume tokens up to and including the logical line's trailing
    /// `:`, returning everything before it (keyword included).
    fn collect_header_until_colon(&mut self) -> Result<Vec<Token>, CoreError> {
        let start = self.pos;
        let mut depth = 0i32;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Op(o) if o == "(" || o == "[" || o == "{" || o == "$(" || o == "$[" => depth += 1,
                Token::Op(o) if o == ")" || o == "]" || o == "}" => depth -= 1,
                Token::Op(o) if o == ":" && depth == 0 => {
                    let header = self.tokens[start..self.pos].to_vec();
                    self.pos += 1; // consume ':'
                    return Ok(header);
                }
                Token::Newline | Token::IndentClose => break,
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("expected ':' to start a block"))
    }

    /// After a header's `:`, either a newline + indented block, or (for
    /// a single-line suite) the rest of the line rendered as one
    /// statement. Wrapped in `INDENT_OPEN`/`INDENT_CLOSE`.
    fn parse_suite(&mut self) -> Result<NodeId, CoreError> {
        let raw = self.parse_suite_raw()?;
        Ok(self.indent_node(raw))
    }

    /// Same as `parse_suite`, but without the indent-marker wrapping,
    /// for callers (`data`, `match def`) that need to splice extra
    /// lines in at the same indent level before wrapping once
    /// themselves.
    fn parse_suite_raw(&mut self) -> Result<NodeId, CoreError> {
        if matches!(self.peek(), Some(Token::Newline)) {
            self.pos += 1;
            if matches!(self.peek(), Some(Token::IndentOpen)) {
                self.pos += 1;
                let block = self.parse_block()?;
                if matches!(self.peek(), Some(Token::IndentClose)) {
                    self.pos += 1;
                }
                return Ok(block);
            }
            // Degenerate empty suite (shouldn't occur after IndentProc
            // validation, but fail soft rather than panic).
            return Ok(self.graph.leaf("pass\n"));
        }
        // Single-line suite: `if x: y = 1`.
        self.parse_statement()
    }

    /// Wrap a suite body in the same `INDENT_OPEN`/`INDENT_CLOSE`
    /// sentinels S4 uses, rather than literal spaces: S7 ReindProc
    /// turns these into real whitespace in one pass regardless of
    /// nesting depth, so a suite doesn't need to know how deeply
    /// nested it already is.
    fn indent_node(&mut self, body: NodeId) -> NodeId {
        let open = self.graph.leaf(crate::stages::indent_proc::INDENT_OPEN.to_string());
        let close = self.graph.leaf(crate::stages::indent_proc::INDENT_CLOSE.to_string());
        self.graph.node(HandlerId::Verbatim, vec![open, body, close])
    }

    fn parse_data(&mut self) -> Result<NodeId, CoreError> {
        self.advance(); // 'data'
        let name = match self.advance() {
            Some(Token::Ident(n)) => n,
            _ => return Err(self.error("expected name after 'data'")),
        };
        name_check::validate_bind_name(&name)?;
        if !matches!(self.advance(), Some(Token::Op(o)) if o == "(") {
            return Err(self.error("expected '(' after data name"));
        }
        let mut fields = Vec::new();
        while !matches!(self.peek(), Some(Token::Op(o)) if o == ")") {
            match self.advance() {
                Some(Token::Ident(f)) => fields.push(f),
                Some(Token::Op(o)) if o == "," => continue,
                other => return Err(self.error(&format!("expected field name in data pattern, got {:?}", other))),
            }
        }
        self.advance(); // ')'
        let mut has_bases = false;
        let mut bases_csv = String::new();
        if matches!(self.peek(), Some(Token::Ident(w)) if w == "from") {
            self.advance();
            has_bases = true;
            let mut parts = Vec::new();
            loop {
                match self.advance() {
                    Some(Token::Ident(b)) => parts.push(b),
                    Some(Token::Op(o)) if o == "," => continue,
                    Some(Token::Op(o)) if o == ":" => break,
                    other => return Err(self.error(&format!("expected base name in 'from' clause, got {:?}", other))),
                }
            }
            bases_csv = parts.join(", ");
        } else if !matches!(self.advance(), Some(Token::Op(o)) if o == ":") {
            return Err(self.error("expected ':' after data declaration"));
        }
        let raw_suite = self.parse_suite_raw()?;
        let slots_leaf = self.graph.leaf("__slots__ = ()\n");
        let combined = self.graph.node(HandlerId::Verbatim, vec![slots_leaf, raw_suite]);
        let body = self.indent_node(combined);

        let name_leaf = self.graph.leaf(name);
        let fields_leaf = self.graph.leaf(fields.join(", "));
        let mut children = vec![name_leaf, fields_leaf];
        let mut meta = HashMap::new();
        if has_bases {
            meta.insert("has_bases", "true".to_string());
            children.push(self.graph.leaf(bases_csv));
        }
        children.push(body);
        Ok(self.graph.node_with_meta(HandlerId::DataStatement, children, meta))
    }

    fn parse_import(&mut self) -> Result<NodeId, CoreError> {
        let line = self.line_tokens();
        let mut idx = 0;
        let kind = match &line[idx] {
            Token::Ident(w) if w == "import" => "import",
            Token::Ident(w) if w == "from" => "from",
            _ => unreachable!(),
        };
        idx += 1;
        let mut module = String::new();
        while let Some(Token::Ident(part)) = line.get(idx) {
            module.push_str(part);
            idx += 1;
            if matches!(line.get(idx), Some(Token::Op(o)) if o == ".") {
                module.push('.');
                idx += 1;
            } else {
                break;
            }
        }
        let mut meta = HashMap::new();
        meta.insert("kind", kind.to_string());
        let mut children = vec![self.graph.leaf(module)];

        if kind == "from" {
            if matches!(line.get(idx), Some(Token::Ident(w)) if w == "import") {
                idx += 1;
            }
            let imported = match line.get(idx) {
                Some(Token::Ident(n)) if n == "*" => "*".to_string(),
                Some(Token::Op(o)) if o == "*" => "*".to_string(),
                Some(Token::Ident(n)) => n.clone(),
                _ => return Err(self.error("expected imported name after 'from ... import'")),
            };
            idx += 1;
            meta.insert("imported_name", imported);
            let alias = if matches!(line.get(idx), Some(Token::Ident(w)) if w == "as") {
                idx += 1;
                match line.get(idx) {
                    Some(Token::Ident(a)) => a.clone(),
                    _ => return Err(self.error("expected alias after 'as'")),
                }
            } else {
                String::new()
            };
            children.push(self.graph.leaf(alias));
        } else {
            let alias = if matches!(line.get(idx), Some(Token::Ident(w)) if w == "as") {
                idx += 1;
                match line.get(idx) {
                    Some(Token::Ident(a)) => a.clone(),
                    _ => return Err(self.error("expected alias after 'as'")),
                }
            } else {
                String::new()
            };
            children.push(self.graph.leaf(alias));
        }
        Ok(self.graph.node_with_meta(HandlerId::ImportStatement, children, meta))
    }

    fn parse_decorated(&mut self) -> Result<NodeId, CoreError> {
        self.advance(); // '@'
        let expr_tokens = self.line_tokens();
        let simple = is_simple_decorator_tokens(&expr_tokens);
        let expr_node = self.parse_expr_tokens(expr_tokens)?;
        let def_node = self.parse_statement()?;
        let mut meta = HashMap::new();
        if !simple {
            meta.insert("needs_hoist", "true".to_string());
        }
        Ok(self.graph.node_with_meta(HandlerId::Decorator, vec![expr_node, def_node], meta))
    }

    /// Plain `def` (and `async def`), including the math-style
    /// one-liner `def f(x) = expr`.
    fn parse_def(&mut self) -> Result<NodeId, CoreError> {
        let is_async = matches!(self.peek(), Some(Token::Ident(w)) if w == "async");
        if is_async {
            self.advance();
        }
        self.advance(); // 'def'
        let name = match self.advance() {
            Some(Token::Ident(n)) => n,
            _ => return Err(self.error("expected function name after 'def'")),
        };
        name_check::validate_bind_name(&name)?;
        let params_tokens = self.collect_balanced_parens()?;
        let params_text = join_tokens_spaced(&params_tokens);

        let prefix = if is_async { "async def" } else { "def" };
        match self.peek() {
            Some(Token::Op(o)) if o == "=" => {
                self.advance();
                let body_tokens = self.line_tokens();
                let body = self.parse_expr_tokens(body_tokens)?;
                let header = self.graph.leaf(format!("{} {}({})", prefix, name, params_text));
                Ok(self.graph.node(HandlerId::MathDef, vec![header, body]))
            }
            Some(Token::Op(o)) if o == "->" => {
                // Return-type annotation before the colon; rendered
                // verbatim since annotations need no rewriting.
                self.advance();
                let annotation_tokens = self.collect_header_until_colon_from_arrow()?;
                let annotation_text = join_tokens_spaced(&annotation_tokens);
                let header = self.graph.leaf(format!("{} {}({}) -> {}:\n", prefix, name, params_text, annotation_text));
                let suite = self.parse_suite()?;
                Ok(self.graph.node(HandlerId::Verbatim, vec![header, suite]))
            }
            Some(Token::Op(o)) if o == ":" => {
                self.advance();
                let header = self.graph.leaf(format!("{} {}({}):\n", prefix, name, params_text));
                let suite = self.parse_suite()?;
                Ok(self.graph.node(HandlerId::Verbatim, vec![header, suite]))
            }
            other => Err(self.error(&format!("expected ':', '->', or '=' after def signature, got {:?}", other))),
        }
    }

    fn collect_header_until_colon_from_arrow(&mut self) -> Result<Vec<Token>, CoreError> {
        let start = self.pos;
        while let Some(tok) = self.peek() {
            if matches!(tok, Token::Op(o) if o == ":") {
                let out = self.tokens[start..self.pos].to_vec();
                self.pos += 1;
                return Ok(out);
            }
            if matches!(tok, Token::Newline | Token::IndentClose) {
                break;
            }
            self.pos += 1;
        }
        Err(self.error("expected ':' after return annotation"))
    }

    /// `match def NAME(patterns):` -- pattern-matching parameters.
    fn parse_match_def(&mut self) -> Result<NodeId, CoreError> {
        self.advance(); // 'match'
        self.advance(); // 'def'
        let name = match self.advance() {
            Some(Token::Ident(n)) => n,
            _ => return Err(self.error("expected function name after 'match def'")),
        };
        name_check::validate_bind_name(&name)?;
        let param_tokens = self.collect_balanced_parens()?;
        let patterns = split_top_level_commas(&param_tokens);

        let mut matcher = pattern_match::Matcher::new();
        let mut params_csv_parts = Vec::new();
        for (i, pat_tokens) in patterns.iter().enumerate() {
            let arg_name = format!("_coconut_match_arg_{}", i);
            params_csv_parts.push(arg_name.clone());
            let pattern = pattern_match::parse_pattern(pat_tokens)?;
            matcher.compile(&pattern, &arg_name);
        }
        for name in matcher.bound_names() {
            name_check::validate_bind_name(name)?;
        }

        if !matches!(self.advance(), Some(Token::Op(o)) if o == ":") {
            return Err(self.error("expected ':' after match-def signature"));
        }
        let suite = self.parse_suite_raw()?;

        let mut meta = HashMap::new();
        let mut steps_kind = String::new();
        let mut children = vec![self.graph.leaf(name), self.graph.leaf(params_csv_parts.join(", "))];
        for step in &matcher.steps {
            match step {
                pattern_match::Step::Check(check) => {
                    steps_kind.push('C');
                    children.push(self.graph.leaf(check.clone()));
                }
                pattern_match::Step::Bind(bind_name, bind_expr) => {
                    steps_kind.push('B');
                    children.push(self.graph.leaf(bind_name.clone()));
                    children.push(self.graph.leaf(bind_expr.clone()));
                }
            }
        }
        meta.insert("steps", steps_kind);
        // Raw (un-indented) suite text; `MatchDef`'s handler splices the
        // generated check/bind lines in ahead of it before wrapping the
        // whole thing in one indent level.
        children.push(suite);
        Ok(self.graph.node_with_meta(HandlerId::MatchDef, children, meta))
    }

    /// Standalone `match PATTERN in SUBJECT:` statement (spec 4.5.2),
    /// as distinct from the pattern-matching function signatures
    /// `parse_match_def` handles. The subject is bound once to
    /// `pattern_match::MATCH_SUBJECT_TMP` by the handler so pattern
    /// checks never re-evaluate it.
    fn parse_match_statement(&mut self) -> Result<NodeId, CoreError> {
        self.advance(); // 'match'
        let pattern_tokens = self.collect_balanced_until(|t| matches!(t, Token::Ident(w) if w == "in"))?;
        self.advance(); // 'in'
        let subject_tokens = self.collect_balanced_until(|t| matches!(t, Token::Op(o) if o == ":"))?;
        self.advance(); // ':'
        let subject = self.parse_expr_tokens(subject_tokens)?;

        let pattern = pattern_match::parse_pattern(&pattern_tokens)?;
        let mut matcher = pattern_match::Matcher::new();
        matcher.compile(&pattern, pattern_match::MATCH_SUBJECT_TMP);
        for name in matcher.bound_names() {
            name_check::validate_bind_name(name)?;
        }

        let body = self.parse_suite_raw()?;
        let has_else = matches!(self.peek(), Some(Token::Ident(w)) if w == "else");
        let else_body = if has_else {
            self.advance();
            if !matches!(self.advance(), Some(Token::Op(o)) if o == ":") {
                return Err(self.error("expected ':' after 'else'"));
            }
            Some(self.parse_suite_raw()?)
        } else {
            None
        };

        let mut meta = HashMap::new();
        let mut steps_kind = String::new();
        let mut children = vec![subject];
        for step in &matcher.steps {
            match step {
                pattern_match::Step::Check(check) => {
                    steps_kind.push('C');
                    children.push(self.graph.leaf(check.clone()));
                }
                pattern_match::Step::Bind(bind_name, bind_expr) => {
                    steps_kind.push('B');
                    children.push(self.graph.leaf(bind_name.clone()));
                    children.push(self.graph.leaf(bind_expr.clone()));
                }
            }
        }
        meta.insert("steps", steps_kind);
        meta.insert("has_else", has_else.to_string());

        children.push(body);
        if let Some(eb) = else_body {
            children.push(eb);
        }
        Ok(self.graph.node_with_meta(HandlerId::MatchStatement, children, meta))
    }

    /// Collect tokens (respecting bracket depth) up to, but not
    /// including, the first token at depth zero for which `is_stop`
    /// returns true. Leaves `self.pos` at the stop token.
    fn collect_balanced_until(&mut self, is_stop: impl Fn(&Token) -> bool) -> Result<Vec<Token>, CoreError> {
        let start = self.pos;
        let mut depth = 0i32;
        while let Some(tok) = self.peek() {
            if depth == 0 && is_stop(tok) {
                return Ok(self.tokens[start..self.pos].to_vec());
            }
            match tok {
                Token::Op(o) if o == "(" || o == "[" || o == "{" || o == "$(" || o == "$[" => depth += 1,
                Token::Op(o) if o == ")" || o == "]" || o == "}" => depth -= 1,
                Token::Newline | Token::IndentClose if depth == 0 => {
                    return Err(self.error("unexpected end of line while scanning match statement"))
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unexpected end of input while scanning match statement"))
    }

    fn collect_balanced_parens(&mut self) -> Result<Vec<Token>, CoreError> {
        if !matches!(self.advance(), Some(Token::Op(o)) if o == "(") {
            return Err(self.error("expected '(' in signature"));
        }
        let start = self.pos;
        let mut depth = 1i32;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Op(o) if o == "(" || o == "[" || o == "{" => depth += 1,
                Token::Op(o) if o == ")" || o == "]" || o == "}" => {
                    depth -= 1;
                    if depth == 0 {
                        let out = self.tokens[start..self.pos].to_vec();
                        self.pos += 1; // consume ')'
                        return Ok(out);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unbalanced parentheses in signature"))
    }
}

fn split_top_level_commas(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0i32;
    for tok in tokens {
        match tok {
            Token::Op(o) if o == "(" || o == "[" || o == "{" => {
                depth += 1;
                current.push(tok.clone());
            }
            Token::Op(o) if o == ")" || o == "]" || o == "}" => {
                depth -= 1;
                current.push(tok.clone());
            }
            Token::Op(o) if o == "," && depth == 0 => {
                groups.push(std::mem::take(&mut current));
            }
            _ => current.push(tok.clone()),
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn find_top_level_assign_op(tokens: &[Token]) -> Option<(usize, String)> {
    let mut depth = 0i32;
    for (i, tok) in tokens.iter().enumerate() {
        match tok {
            Token::Op(o) if o == "(" || o == "[" || o == "{" || o == "$(" || o == "$[" => depth += 1,
            Token::Op(o) if o == ")" || o == "]" || o == "}" => depth -= 1,
            Token::Op(o) if depth == 0 && (o == "=" || AUG_OPS.contains(&o.as_str())) => {
                // A bare '=' inside a call's keyword argument is caught
                // by the depth check above; a top-level '==' was already
                // tokenized as one Op("==") token, distinct from "=".
                return Some((i, o.clone()));
            }
            _ => {}
        }
    }
    None
}

fn is_simple_decorator_tokens(tokens: &[Token]) -> bool {
    const DEFERRED_OPS: &[&str] = &["|>", "<|", "|*>", "<*|", "..", "::", "`"];
    !tokens.iter().any(|t| matches!(t, Token::Op(o) if DEFERRED_OPS.contains(&o.as_str())))
}

fn join_tokens_spaced(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, tok) in tokens.iter().enumerate() {
        let text = match tok {
            Token::Ident(s) | Token::Number(s) | Token::Marker(s) | Token::Op(s) => s.clone(),
            Token::IndentOpen | Token::IndentClose | Token::Newline => String::new(),
        };
        let needs_space_before = i > 0
            && !matches!(tok, Token::Op(o) if o == "," || o == ")" || o == "]" || o == ":")
            && !matches!(&tokens[i - 1], Token::Op(o) if o == "(" || o == "[");
        if needs_space_before {
            out.push(' ');
        }
        out.push_str(&text);
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
            let mut parser = StmtParser::new(tokens, &mut graph);
            parser.parse_module().unwrap()
        };
        let options = CompileOptions::default();
        let mut ctx = EvalContext::new(&options);
        evaluate(&graph, node, &mut ctx).unwrap()
    }

    #[test]
    fn plain_assignment_round_trips() {
        assert_eq!(render("x = 1\n"), "x = 1\n");
    }

    #[test]
    fn assignment_rewrites_embedded_pipeline() {
        let out = render("y = x |> f\n");
        assert_eq!(out, "y = f(x)\n");
    }

    #[test]
    fn augmented_pipeline_assignment() {
        let out = render("x |>= f\n");
        assert_eq!(out, "x = f(x)\n");
    }

    #[test]
    fn if_block_renders_with_suite() {
        let out = render(&format!(
            "if x:{ind}    return 1{close}",
            ind = format!("\n{}", '\u{E002}'),
            close = format!("\n{}", '\u{E003}')
        ));
        assert!(out.starts_with("if x:\n"));
        assert!(out.contains("return 1"));
    }

    #[test]
    fn import_statement_renders() {
        let out = render("import sys\n");
        assert_eq!(out, "import sys\n");
    }

    #[test]
    fn from_import_with_alias_renders() {
        let out = render("from collections import Counter as C\n");
        assert_eq!(out, "from collections import Counter as C\n");
    }

    #[test]
    fn data_statement_renders_namedtuple_class() {
        let src = format!(
            "data Point(x, y):{ind}    pass{close}",
            ind = format!("\n{}", '\u{E002}'),
            close = format!("\n{}", '\u{E003}')
        );
        let out = render(&src);
        assert!(out.contains("class Point("));
        assert!(out.contains("namedtuple(\"Point\", \"x y\")"));
    }

    #[test]
    fn math_def_renders_return_statement() {
        let out = render("def square(x) = x ** 2\n");
        assert_eq!(out, "def square(x):\n    return x ** 2\n");
    }

    #[test]
    fn match_def_compiles_pattern_checks() {
        let src = format!(
            "match def f((a, b)):{ind}    return a{close}",
            ind = format!("\n{}", '\u{E002}'),
            close = format!("\n{}", '\u{E003}')
        );
        let out = render(&src);
        assert!(out.starts_with("def f(_coconut_match_arg_0):"));
        assert!(out.contains("raise _coconut_MatchError"));
    }

    #[test]
    fn match_statement_binds_subject_and_destructures() {
        let src = format!(
            "match (x, y) in lst:{ind}    return x{close}",
            ind = format!("\n{}", '\u{E002}'),
            close = format!("\n{}", '\u{E003}')
        );
        let out = render(&src);
        assert!(out.contains("_coconut_match_to = lst\n"));
        assert!(out.contains("isinstance(_coconut_match_to, _coconut.abc.Sequence)"));
        assert!(out.contains("_coconut.len("));
        assert!(out.contains("return x"));
    }

    #[test]
    fn match_statement_supports_else_clause() {
        let src = format!(
            "match x in lst:{ind}    return x{close}else:{ind2}    return None{close2}",
            ind = format!("\n{}", '\u{E002}'),
            close = format!("\n{}", '\u{E003}'),
            ind2 = format!("\n{}", '\u{E002}'),
            close2 = format!("\n{}", '\u{E003}'),
        );
        let out = render(&src);
        assert!(out.contains("else:"));
        assert!(out.contains("return None"));
    }

    #[test]
    fn simple_decorator_applies_directly() {
        let out = render("@staticmethod\ndef f():\n    pass\n");
        assert!(out.starts_with("@staticmethod\n"));
    }
}
