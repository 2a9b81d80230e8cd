//! Pattern Matching — `match`/`case` and Destructuring Assignment (spec 4.5.2)
//!
//! Grounded on `coconut/compiler/matching.py`'s `Matcher` class: pattern
//! compilation is a parse-time walk over the pattern text that emits an
//! ordered list of `Step`s (checks and binds), not a single regex or one
//! hand-nested `if`. `stmt` calls `parse_pattern` and `Matcher::compile`
//! while building the statement's children, so the heavy structural work
//! happens once, before the computation graph ever sees it; the
//! `HandlerId::MatchStatement`/`HandlerId::MatchDef` handlers here only
//! assemble the already-compiled steps into final text, honoring the same
//! single-evaluation discipline as every other node.
//!
//! A check and a bind are not interchangeable in emission order: a bind
//! that indexes or destructures the subject (`x = tmp[0]`) is only safe
//! once the checks that guarantee the subject's shape (`isinstance`,
//! `len`) have already passed, while an iterator pattern's binds must run
//! *before* the check that inspects what they produced. `Matcher` keeps
//! checks and binds interleaved in a single `steps` sequence for exactly
//! this reason; the renderer turns each `Check` into a nested `if` (so a
//! later step only runs once every earlier check passed) and leaves a
//! trailing `_coconut_match_check` flag to signal overall success, the
//! same shape spec 8's E4 scenario shows.
//!
//! Pattern coverage: wildcards, name bindings, const literals (`None`/
//! `True`/`False` compared with `is`, everything else with `==`),
//! tuple/list destructuring with an optional `*rest` capture at the
//! head, tail, or middle, iterator patterns (`(...) :: rest`), dict and
//! set patterns, `as`-bindings, `is`-trailers, constructor (class/data)
//! patterns, and `and`/`or` combinators. Guard clauses (`if cond` after
//! a pattern) are not modeled (recorded as a scope note in DESIGN.md).

use crate::config::CompileOptions;
use crate::error::CoreError;
use crate::grammar::lexer::Token;
use crate::handlers::missing_child;
use crate::stages::indent_proc::{INDENT_CLOSE, INDENT_OPEN};
use std::collections::HashMap;

/// Name the standalone `match` statement's subject is bound to before
/// any checks run, shared between `stmt::parse_match_statement` (which
/// compiles the `Matcher` against it) and `render_match_statement`
/// (which must emit the same name).
pub const MATCH_SUBJECT_TMP: &str = "_coconut_match_to";

/// Flag set once every check along a successful path has passed;
/// guards the match body the way spec 8's E4 scenario shows.
pub const MATCH_FLAG: &str = "_coconut_match_check";

const SINGLETON_CONSTS: [&str; 3] = ["None", "True", "False"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Wildcard,
    Bind(String),
    /// `None`/`True`/`False` -- compared with `is`, not `==`.
    Const(String),
    /// Any other literal (number, string) -- compared with `==`.
    Literal(String),
    /// `(p1,...,pk)` / `[p1,...,pk]`, with an optional `*rest` capture.
    /// `rest.is_none()` means a fixed-length sequence; otherwise `before`
    /// and `after` are the sub-patterns flanking the captured middle,
    /// covering the head/tail/middle forms spec 4.5.2 lists as one
    /// general shape.
    Sequence {
        list: bool,
        before: Vec<Pattern>,
        rest: Option<String>,
        after: Vec<Pattern>,
    },
    /// `(p1,...,pk) :: rest`.
    Iterator { items: Vec<Pattern>, rest: Option<String> },
    /// `{k1: p1, ...}`; keys are literal/const text, values recurse.
    Dict(Vec<(String, Pattern)>),
    /// `{c1, ..., cn}`; every element is a literal/const.
    Set(Vec<String>),
    /// `T(p1,...,pk)`.
    Class(String, Vec<Pattern>),
    As(Box<Pattern>, String),
    /// Standalone `is T` trailer, distinct from `as name`.
    Is(Box<Pattern>, String),
    And(Vec<Pattern>),
    Or(Vec<Pattern>),
}

pub struct PatternParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> PatternParser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn is_op(&self, s: &str) -> bool {
        matches!(self.peek(), Some(Token::Op(o)) if o == s)
    }

    fn is_kw(&self, s: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(w)) if w == s)
    }

    pub fn parse(&mut self) -> Result<Pattern, CoreError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Pattern, CoreError> {
        let mut alts = vec![self.parse_and()?];
        while self.is_kw("or") {
            self.advance();
            alts.push(self.parse_and()?);
        }
        if alts.len() == 1 {
            Ok(alts.pop().unwrap())
        } else {
            Ok(Pattern::Or(alts))
        }
    }

    fn parse_and(&mut self) -> Result<Pattern, CoreError> {
        let mut parts = vec![self.parse_trailer()?];
        while self.is_kw("and") {
            self.advance();
            parts.push(self.parse_trailer()?);
        }
        if parts.len() == 1 {
            Ok(parts.pop().unwrap())
        } else {
            Ok(Pattern::And(parts))
        }
    }

    /// Primary pattern plus its `::` (iterator), `as`, and `is` trailers.
    fn parse_trailer(&mut self) -> Result<Pattern, CoreError> {
        let mut node = self.parse_primary()?;

        if self.is_op("::") {
            self.advance();
            let items = match node {
                Pattern::Sequence { list: false, before, rest: None, after } if after.is_empty() => before,
                other => vec![other],
            };
            let rest = match self.advance() {
                Some(Token::Ident(w)) if w == "_" => None,
                Some(Token::Ident(w)) => Some(w.clone()),
                other => {
                    return Err(CoreError::internal(format!(
                        "expected a name after '::' in iterator pattern, got {:?}",
                        other
                    )))
                }
            };
            node = Pattern::Iterator { items, rest };
        }

        loop {
            if self.is_kw("as") {
                self.advance();
                match self.advance() {
                    Some(Token::Ident(name)) => node = Pattern::As(Box::new(node), name.clone()),
                    other => {
                        return Err(CoreError::internal(format!("expected name after 'as' in pattern, got {:?}", other)))
                    }
                }
            } else if self.is_kw("is") {
                self.advance();
                match self.advance() {
                    Some(Token::Ident(name)) => node = Pattern::Is(Box::new(node), name.clone()),
                    other => {
                        return Err(CoreError::internal(format!("expected type name after 'is' in pattern, got {:?}", other)))
                    }
                }
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Pattern, CoreError> {
        match self.advance() {
            Some(Token::Ident(name)) if name == "_" => Ok(Pattern::Wildcard),
            Some(Token::Ident(name)) if SINGLETON_CONSTS.contains(&name.as_str()) => Ok(Pattern::Const(name.clone())),
            Some(Token::Ident(name)) => {
                let name = name.clone();
                if self.is_op("(") {
                    self.advance();
                    let args = self.parse_seq(")")?;
                    Ok(Pattern::Class(name, args))
                } else {
                    Ok(Pattern::Bind(name))
                }
            }
            Some(Token::Number(n)) => Ok(Pattern::Literal(n.clone())),
            Some(Token::Marker(m)) => Ok(Pattern::Literal(m.clone())),
            Some(Token::Op(o)) if o == "(" => {
                let (before, rest, after) = self.parse_series(")")?;
                Ok(Pattern::Sequence { list: false, before, rest, after })
            }
            Some(Token::Op(o)) if o == "[" => {
                let (before, rest, after) = self.parse_series("]")?;
                Ok(Pattern::Sequence { list: true, before, rest, after })
            }
            Some(Token::Op(o)) if o == "{" => self.parse_brace_pattern(),
            other => Err(CoreError::internal(format!("unexpected token in pattern: {:?}", other))),
        }
    }

    fn parse_seq(&mut self, close: &str) -> Result<Vec<Pattern>, CoreError> {
        let mut items = Vec::new();
        if self.is_op(close) {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.parse()?);
            match self.peek() {
                Some(Token::Op(o)) if o == "," => {
                    self.advance();
                    if self.is_op(close) {
                        self.advance();
                        break;
                    }
                }
                Some(Token::Op(o)) if o == close => {
                    self.advance();
                    break;
                }
                other => return Err(CoreError::internal(format!("expected ',' or '{}', got {:?}", close, other))),
            }
        }
        Ok(items)
    }

    /// Parses a bracketed sequence pattern that may contain a single
    /// `*name` (or bare `*` for an unnamed rest) anywhere among its
    /// elements, splitting the result into the sub-patterns before and
    /// after the star.
    fn parse_series(&mut self, close: &str) -> Result<(Vec<Pattern>, Option<String>, Vec<Pattern>), CoreError> {
        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut rest: Option<String> = None;
        let mut seen_star = false;

        if self.is_op(close) {
            self.advance();
            return Ok((before, rest, after));
        }
        loop {
            if self.is_op("*") {
                if seen_star {
                    return Err(CoreError::internal("a sequence pattern may only have one '*rest' capture"));
                }
                self.advance();
                rest = match self.peek() {
                    Some(Token::Ident(w)) if w == "_" => {
                        self.advance();
                        None
                    }
                    Some(Token::Ident(w)) => {
                        let w = w.clone();
                        self.advance();
                        Some(w)
                    }
                    _ => None,
                };
                seen_star = true;
            } else {
                let item = self.parse()?;
                if seen_star {
                    after.push(item);
                } else {
                    before.push(item);
                }
            }
            match self.peek() {
                Some(Token::Op(o)) if o == "," => {
                    self.advance();
                    if self.is_op(close) {
                        self.advance();
                        break;
                    }
                }
                Some(Token::Op(o)) if o == close => {
                    self.advance();
                    break;
                }
                other => return Err(CoreError::internal(format!("expected ',' or '{}', got {:?}", close, other))),
            }
        }
        Ok((before, rest, after))
    }

    /// `{k1: p1, ...}` (dict) or `{c1, ..., cn}` (set); distinguished by
    /// whether the first entry is followed by `:`.
    fn parse_brace_pattern(&mut self) -> Result<Pattern, CoreError> {
        if self.is_op("}") {
            self.advance();
            return Ok(Pattern::Dict(Vec::new()));
        }
        let mut dict_entries = Vec::new();
        let mut set_entries = Vec::new();
        let mut is_dict: Option<bool> = None;
        loop {
            let key = self.parse_primary()?;
            if self.is_op(":") {
                self.advance();
                let value = self.parse()?;
                is_dict = Some(true);
                dict_entries.push((literal_text(&key)?, value));
            } else {
                is_dict = Some(is_dict.unwrap_or(false));
                set_entries.push(literal_text(&key)?);
            }
            match self.peek() {
                Some(Token::Op(o)) if o == "," => {
                    self.advance();
                    if self.is_op("}") {
                        self.advance();
                        break;
                    }
                }
                Some(Token::Op(o)) if o == "}" => {
                    self.advance();
                    break;
                }
                other => return Err(CoreError::internal(format!("expected ',' or '}}' in brace pattern, got {:?}", other))),
            }
        }
        if is_dict == Some(true) {
            Ok(Pattern::Dict(dict_entries))
        } else {
            Ok(Pattern::Set(set_entries))
        }
    }
}

fn literal_text(pattern: &Pattern) -> Result<String, CoreError> {
    match pattern {
        Pattern::Const(s) | Pattern::Literal(s) => Ok(s.clone()),
        _ => Err(CoreError::internal("dict/set pattern entries must be literal constants")),
    }
}

pub fn parse_pattern(tokens: &[Token]) -> Result<Pattern, CoreError> {
    PatternParser::new(tokens).parse()
}

/// One unit of compiled pattern code: either a boolean condition that
/// must hold for the match to continue, or a name binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Check(String),
    Bind(String, String),
}

/// Accumulates the ordered list of checks and binds one pattern
/// compiles to, mirroring `Matcher.match`'s incremental style. Checks
/// and binds interleave in emission order (see the module doc comment
/// for why that interleaving is load-bearing), and the renderer turns
/// each `Check` into a nested `if` so a later step only ever runs once
/// every earlier check has passed.
#[derive(Default)]
pub struct Matcher {
    pub steps: Vec<Step>,
    tmp_counter: u32,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All names this pattern binds, in emission order (may repeat if
    /// the same sub-pattern binds a name more than once via nested `as`).
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| match s {
            Step::Bind(name, _) => Some(name.as_str()),
            Step::Check(_) => None,
        })
    }

    fn fresh_tmp(&mut self, prefix: &str) -> String {
        self.tmp_counter += 1;
        format!("_coconut_match_{}_{}", prefix, self.tmp_counter)
    }

    pub fn compile(&mut self, pattern: &Pattern, subject: &str) {
        match pattern {
            Pattern::Wildcard => {}
            Pattern::Bind(name) => self.steps.push(Step::Bind(name.clone(), subject.to_string())),
            Pattern::Const(c) => self.steps.push(Step::Check(format!("{} is {}", subject, c))),
            Pattern::Literal(lit) => self.steps.push(Step::Check(format!("{} == {}", subject, lit))),
            Pattern::As(inner, name) => {
                self.compile(inner, subject);
                self.steps.push(Step::Bind(name.clone(), subject.to_string()));
            }
            Pattern::Is(inner, ty) => {
                self.steps.push(Step::Check(format!("isinstance({}, {})", subject, ty)));
                self.compile(inner, subject);
            }
            Pattern::And(parts) => {
                for part in parts {
                    self.compile(part, subject);
                }
            }
            Pattern::Or(alts) => self.compile_or(alts, subject),
            Pattern::Sequence { list, before, rest, after } => {
                self.steps.push(Step::Check(format!("isinstance({}, _coconut.abc.Sequence)", subject)));
                match rest {
                    None => {
                        self.steps.push(Step::Check(format!("_coconut.len({}) == {}", subject, before.len())));
                        for (i, item) in before.iter().enumerate() {
                            self.compile(item, &format!("{}[{}]", subject, i));
                        }
                    }
                    Some(rest_name) => {
                        let fixed = before.len() + after.len();
                        self.steps.push(Step::Check(format!("_coconut.len({}) >= {}", subject, fixed)));
                        for (i, item) in before.iter().enumerate() {
                            self.compile(item, &format!("{}[{}]", subject, i));
                        }
                        for (j, item) in after.iter().enumerate() {
                            let from_end = after.len() - j;
                            self.compile(item, &format!("{}[-{}]", subject, from_end));
                        }
                        let ctor = if *list { "list" } else { "tuple" };
                        let rest_expr = if after.is_empty() {
                            format!("{}({}[{}:])", ctor, subject, before.len())
                        } else {
                            format!("{}({}[{}:-{}])", ctor, subject, before.len(), after.len())
                        };
                        self.steps.push(Step::Bind(rest_name.clone(), rest_expr));
                    }
                }
            }
            Pattern::Iterator { items, rest } => {
                self.steps.push(Step::Check(format!("isinstance({}, _coconut.abc.Iterable)", subject)));
                let iter_tmp = self.fresh_tmp("iter");
                self.steps.push(Step::Bind(iter_tmp.clone(), format!("_coconut.iter({})", subject)));
                for item in items {
                    let elem_tmp = self.fresh_tmp("iter_elem");
                    self.steps.push(Step::Bind(elem_tmp.clone(), format!("_coconut.next({}, _coconut_sentinel)", iter_tmp)));
                    self.steps.push(Step::Check(format!("{} is not _coconut_sentinel", elem_tmp)));
                    self.compile(item, &elem_tmp);
                }
                if let Some(rest_name) = rest {
                    self.steps.push(Step::Bind(rest_name.clone(), iter_tmp));
                }
            }
            Pattern::Dict(entries) => {
                self.steps.push(Step::Check(format!("isinstance({}, _coconut.abc.Mapping)", subject)));
                self.steps.push(Step::Check(format!("_coconut.len({}) == {}", subject, entries.len())));
                for (key, value) in entries {
                    self.steps.push(Step::Check(format!("{} in {}", key, subject)));
                    self.compile(value, &format!("{}[{}]", subject, key));
                }
            }
            Pattern::Set(consts) => {
                self.steps.push(Step::Check(format!("isinstance({}, _coconut.abc.Set)", subject)));
                self.steps.push(Step::Check(format!("_coconut.len({}) == {}", subject, consts.len())));
                for c in consts {
                    self.steps.push(Step::Check(format!("{} in {}", c, subject)));
                }
            }
            Pattern::Class(name, args) => {
                self.steps.push(Step::Check(format!("isinstance({}, {})", subject, name)));
                self.steps.push(Step::Check(format!("_coconut.len({}) == {}", subject, args.len())));
                for (i, arg) in args.iter().enumerate() {
                    self.compile(arg, &format!("{}[{}]", subject, i));
                }
            }
        }
    }

    /// `or`-patterns fork: each alternative is compiled into its own
    /// sub-`Matcher` against the same subject, then woven into this
    /// one's step list as "if the previous alternative hasn't already
    /// matched, try this one", per spec 9's design note on `or`-pattern
    /// composition. The alternative's checks/binds collapse to a single
    /// flat condition here -- a simplification documented in
    /// DESIGN.md -- rather than preserving each alternative's own
    /// internal nesting.
    fn compile_or(&mut self, alts: &[Pattern], subject: &str) {
        let flag = self.fresh_tmp("or");
        self.steps.push(Step::Bind(flag.clone(), "False".to_string()));
        for alt in alts {
            let mut sub = Matcher::new();
            sub.tmp_counter = self.tmp_counter;
            sub.compile(alt, subject);
            self.tmp_counter = sub.tmp_counter;

            let mut checks = Vec::new();
            let mut binds = Vec::new();
            for step in sub.steps {
                match step {
                    Step::Check(c) => checks.push(c),
                    Step::Bind(n, e) => binds.push((n, e)),
                }
            }
            let mut guard = format!("not {}", flag);
            if !checks.is_empty() {
                guard.push_str(" and ");
                guard.push_str(&checks.join(" and "));
            }
            self.steps.push(Step::Check(guard));
            for (n, e) in binds {
                self.steps.push(Step::Bind(n, e));
            }
            self.steps.push(Step::Bind(flag.clone(), "True".to_string()));
        }
    }
}

/// Walks `kinds` (one char per compiled step -- `'C'` for a check,
/// `'B'` for a bind) and `children[start..]` in lockstep, emitting one
/// nested `if` per check and one assignment per bind. Returns the
/// generated code, how many `if` blocks were opened (so the caller
/// knows how many to close), and the index of the first child after
/// the consumed steps.
pub fn render_steps_block(kinds: &str, children: &[String], start: usize) -> Result<(String, usize, usize), CoreError> {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut idx = start;
    for kind in kinds.chars() {
        match kind {
            'C' => {
                let cond = children.get(idx).ok_or_else(|| missing_child("pattern check"))?;
                out.push_str(&format!("if {}:\n", cond));
                out.push(INDENT_OPEN);
                depth += 1;
                idx += 1;
            }
            'B' => {
                let name = children.get(idx).ok_or_else(|| missing_child("pattern bind name"))?;
                let expr = children.get(idx + 1).ok_or_else(|| missing_child("pattern bind expr"))?;
                out.push_str(&format!("{} = {}\n", name, expr));
                idx += 2;
            }
            other => return Err(CoreError::internal(format!("unknown pattern step kind '{}'", other))),
        }
    }
    Ok((out, depth, idx))
}

/// Assemble a match statement's already-compiled steps (passed as
/// rendered-text children, per the parent module's doc comment) into
/// final `if`/`else` text. The subject is bound to `MATCH_SUBJECT_TMP`
/// once up front so a complex subject expression is only ever
/// evaluated once; `MATCH_FLAG` starts `False` and is set `True` only
/// once every nested check along a path has passed, matching spec 8's
/// E4 scenario.
///
/// Expected children layout: `[subject, <steps...>, body, else_body?]`
/// where `metadata["steps"]` is a string of `'C'`/`'B'` characters
/// giving the shape of `<steps...>` (one child per `'C'`, two per
/// `'B'`) and `metadata["has_else"]` marks whether a trailing
/// else-body child is present. `body`/`else_body` arrive as raw suite
/// text (their own indent wrapping still pending), matching the
/// `parse_suite_raw` convention used by `DataStatement`/`MatchDef`.
pub fn render_match_statement(
    children: &[String],
    metadata: &HashMap<&'static str, String>,
    _options: &CompileOptions,
) -> Result<String, CoreError> {
    let subject = children.first().ok_or_else(|| missing_child("match subject"))?;
    let kinds = metadata.get("steps").map(|s| s.as_str()).unwrap_or("");
    let has_else = metadata.get("has_else").map(|s| s == "true").unwrap_or(false);

    let (steps_code, depth, idx) = render_steps_block(kinds, children, 1)?;
    let body = children.get(idx).ok_or_else(|| missing_child("match body"))?;
    let else_body = if has_else { children.get(idx + 1) } else { None };

    let mut out = format!("{} = False\n{} = {}\n", MATCH_FLAG, MATCH_SUBJECT_TMP, subject);
    out.push_str(&steps_code);
    out.push_str(&format!("{} = True\n", MATCH_FLAG));
    for _ in 0..depth {
        out.push(INDENT_CLOSE);
    }
    out.push_str(&format!("if {}:\n", MATCH_FLAG));
    out.push(INDENT_OPEN);
    out.push_str(body);
    out.push(INDENT_CLOSE);
    if let Some(else_body) = else_body {
        out.push_str("else:\n");
        out.push(INDENT_OPEN);
        out.push_str(else_body);
        out.push(INDENT_CLOSE);
    }
    Ok(out)
}
