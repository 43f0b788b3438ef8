//! JSON path evaluation.
//!
//! Supports `$`, `.name`, `['name']`, `["name"]`, `[n]` (negative indexes
//! count from the end), `[*]`, `.*`, recursive descent (`..name`, `..*`,
//! `..[0]`), slices (`[start:end:step]`), unions (`[0,2]`, `['a','b']`) and
//! filters (`[?(@.age >= 18 && @.id != 'b')]`).
//!
//! Matches are returned in document order, except that a union yields the
//! matches of its selectors in the order they are written.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// A path expression could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid JSON path '{path}' at position {position}: {reason}")]
pub struct JsonPathError {
    /// The offending expression.
    pub path: String,
    /// Character offset where parsing stopped.
    pub position: usize,
    /// What was wrong.
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Name(String),
    Index(i64),
    Wildcard,
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    Union(Vec<Selector>),
    Filter(Box<Filter>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    selector: Selector,
    descendant: bool,
}

/// A path inside a filter, relative to the current node (`@`) or the root (`$`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Query {
    absolute: bool,
    segments: Vec<Segment>,
}

impl Query {
    fn select<'a>(&self, current: &'a Value, root: &'a Value) -> Vec<&'a Value> {
        let start = if self.absolute { root } else { current };
        evaluate(&self.segments, start, root)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Query(Query),
    Literal(Value),
}

impl Operand {
    /// A query operand stands for its first match.
    fn resolve<'a>(&'a self, current: &'a Value, root: &'a Value) -> Option<&'a Value> {
        match self {
            Self::Query(query) => query.select(current, root).into_iter().next(),
            Self::Literal(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

const COMPARISONS: [(&str, Comparison); 6] = [
    ("==", Comparison::Eq),
    ("!=", Comparison::Ne),
    ("<=", Comparison::Le),
    (">=", Comparison::Ge),
    ("<", Comparison::Lt),
    (">", Comparison::Gt),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    Or(Box<Filter>, Box<Filter>),
    And(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    Exists(Query),
    Compare(Operand, Comparison, Operand),
}

impl Filter {
    fn test(&self, current: &Value, root: &Value) -> bool {
        match self {
            Self::Or(left, right) => left.test(current, root) || right.test(current, root),
            Self::And(left, right) => left.test(current, root) && right.test(current, root),
            Self::Not(inner) => !inner.test(current, root),
            Self::Exists(query) => !query.select(current, root).is_empty(),
            Self::Compare(left, op, right) => compare(
                left.resolve(current, root),
                *op,
                right.resolve(current, root),
            ),
        }
    }
}

fn compare(left: Option<&Value>, op: Comparison, right: Option<&Value>) -> bool {
    match op {
        Comparison::Eq => equal(left, right),
        Comparison::Ne => !equal(left, right),
        Comparison::Lt => less(left, right),
        Comparison::Le => less(left, right) || equal(left, right),
        Comparison::Gt => less(right, left),
        Comparison::Ge => less(right, left) || equal(left, right),
    }
}

#[allow(clippy::float_cmp)]
fn equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn less(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            matches!((a.as_f64(), b.as_f64()), (Some(a), Some(b)) if a < b)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a < b,
        _ => false,
    }
}

/// A parsed JSON path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    source: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns a [`JsonPathError`] describing the first syntax problem.
    pub fn parse(path: &str) -> Result<Self, JsonPathError> {
        Parser::new(path).parse()
    }

    /// Returns every node selected by this path.
    #[must_use]
    pub fn select<'a>(&self, document: &'a Value) -> Vec<&'a Value> {
        evaluate(&self.segments, document, document)
    }

    /// Returns the first selected node, if any.
    #[must_use]
    pub fn first<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.select(document).into_iter().next()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn evaluate<'a>(segments: &[Segment], start: &'a Value, root: &'a Value) -> Vec<&'a Value> {
    let mut current = vec![start];

    for segment in segments {
        let candidates = if segment.descendant {
            let mut all = Vec::new();
            for node in current {
                collect_descendants(node, &mut all);
            }
            all
        } else {
            current
        };

        current = candidates
            .into_iter()
            .flat_map(|node| apply(&segment.selector, node, root))
            .collect();
    }

    current
}

fn collect_descendants<'a>(node: &'a Value, out: &mut Vec<&'a Value>) {
    out.push(node);
    match node {
        Value::Object(map) => map.values().for_each(|child| collect_descendants(child, out)),
        Value::Array(items) => items.iter().for_each(|child| collect_descendants(child, out)),
        _ => {}
    }
}

fn apply<'a>(selector: &Selector, node: &'a Value, root: &'a Value) -> Vec<&'a Value> {
    match (selector, node) {
        (Selector::Name(name), Value::Object(map)) => map.get(name).into_iter().collect(),
        (Selector::Index(index), Value::Array(items)) => resolve_index(*index, items.len())
            .and_then(|i| items.get(i))
            .into_iter()
            .collect(),
        (Selector::Wildcard, Value::Object(map)) => map.values().collect(),
        (Selector::Wildcard, Value::Array(items)) => items.iter().collect(),
        (Selector::Slice { start, end, step }, Value::Array(items)) => {
            slice_indexes(*start, *end, *step, items.len())
                .into_iter()
                .filter_map(|i| items.get(i))
                .collect()
        }
        (Selector::Union(selectors), _) => selectors
            .iter()
            .flat_map(|selector| apply(selector, node, root))
            .collect(),
        (Selector::Filter(filter), Value::Object(map)) => map
            .values()
            .filter(|child| filter.test(child, root))
            .collect(),
        (Selector::Filter(filter), Value::Array(items)) => items
            .iter()
            .filter(|child| filter.test(child, root))
            .collect(),
        _ => Vec::new(),
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { len + index } else { index };
    usize::try_from(resolved).ok()
}

fn slice_indexes(
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
    len: usize,
) -> Vec<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let step = step.unwrap_or(1);
    let normalize = |i: i64| if i < 0 { len + i } else { i };

    let mut indexes = Vec::new();
    if step > 0 {
        let lower = start.map_or(0, normalize).clamp(0, len);
        let upper = end.map_or(len, normalize).clamp(0, len);
        let mut i = lower;
        while i < upper {
            indexes.push(i);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else if step < 0 {
        let upper = start.map_or(len - 1, normalize).clamp(-1, len - 1);
        let lower = end.map_or(-1, normalize).clamp(-1, len - 1);
        let mut i = upper;
        while i > lower {
            indexes.push(i);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }

    indexes
        .into_iter()
        .filter_map(|i| usize::try_from(i).ok())
        .collect()
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    filter_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.trim().chars().collect(),
            pos: 0,
            filter_depth: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> JsonPathError {
        JsonPathError {
            path: self.source.to_string(),
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn eat_str(&mut self, text: &str) -> bool {
        if self.starts_with(text) {
            self.pos += text.chars().count();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), JsonPathError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    fn parse(mut self) -> Result<JsonPath, JsonPathError> {
        if !self.eat('$') {
            return Err(self.error("JSON path must start with '$'"));
        }

        let segments = self.segments()?;
        if let Some(other) = self.peek() {
            return Err(self.error(format!("unexpected character '{other}'")));
        }

        Ok(JsonPath {
            source: self.source.trim().to_string(),
            segments,
        })
    }

    fn segments(&mut self) -> Result<Vec<Segment>, JsonPathError> {
        let mut segments = Vec::new();
        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    let descendant = self.eat('.');
                    let selector = if descendant && self.eat('[') {
                        self.bracket()?
                    } else {
                        self.dotted()?
                    };
                    segments.push(Segment {
                        selector,
                        descendant,
                    });
                }
                Some('[') => {
                    self.pos += 1;
                    let selector = self.bracket()?;
                    segments.push(Segment {
                        selector,
                        descendant: false,
                    });
                }
                _ => return Ok(segments),
            }
        }
    }

    fn ends_name(&self, ch: char) -> bool {
        ch == '.'
            || ch == '['
            || (self.filter_depth > 0 && (ch.is_whitespace() || "()]=!<>&|,".contains(ch)))
    }

    fn dotted(&mut self) -> Result<Selector, JsonPathError> {
        if self.eat('*') {
            return Ok(Selector::Wildcard);
        }
        let start = self.pos;
        while self.peek().is_some_and(|ch| !self.ends_name(ch)) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a member name"));
        }
        Ok(Selector::Name(self.chars[start..self.pos].iter().collect()))
    }

    fn bracket(&mut self) -> Result<Selector, JsonPathError> {
        self.skip_ws();
        if self.eat('?') {
            let filter = self.filter()?;
            self.skip_ws();
            self.expect(']')?;
            return Ok(Selector::Filter(Box::new(filter)));
        }

        let mut selectors = vec![self.bracket_item()?];
        self.skip_ws();
        while self.eat(',') {
            selectors.push(self.bracket_item()?);
            self.skip_ws();
        }
        self.expect(']')?;

        if selectors.len() == 1 {
            Ok(selectors.remove(0))
        } else {
            Ok(Selector::Union(selectors))
        }
    }

    fn bracket_item(&mut self) -> Result<Selector, JsonPathError> {
        self.skip_ws();
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                Ok(Selector::Wildcard)
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                Ok(Selector::Name(self.quoted(quote)?))
            }
            Some(_) => {
                let start = self.integer()?;
                self.skip_ws();
                if !self.eat(':') {
                    return start
                        .map(Selector::Index)
                        .ok_or_else(|| self.error("expected an array index, slice or name"));
                }
                self.skip_ws();
                let end = self.integer()?;
                self.skip_ws();
                let step = if self.eat(':') {
                    self.skip_ws();
                    self.integer()?
                } else {
                    None
                };
                Ok(Selector::Slice { start, end, step })
            }
            None => Err(self.error("unterminated '['")),
        }
    }

    fn integer(&mut self) -> Result<Option<i64>, JsonPathError> {
        let start = self.pos;
        self.eat('-');
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i64>()
            .map(Some)
            .map_err(|_| self.error(format!("invalid array index '{text}'")))
    }

    fn filter(&mut self) -> Result<Filter, JsonPathError> {
        self.filter_depth += 1;
        let filter = self.or_expr()?;
        self.filter_depth -= 1;
        Ok(filter)
    }

    fn or_expr(&mut self) -> Result<Filter, JsonPathError> {
        let mut left = self.and_expr()?;
        loop {
            self.skip_ws();
            if !self.eat_str("||") {
                return Ok(left);
            }
            let right = self.and_expr()?;
            left = Filter::Or(Box::new(left), Box::new(right));
        }
    }

    fn and_expr(&mut self) -> Result<Filter, JsonPathError> {
        let mut left = self.unary()?;
        loop {
            self.skip_ws();
            if !self.eat_str("&&") {
                return Ok(left);
            }
            let right = self.unary()?;
            left = Filter::And(Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Filter, JsonPathError> {
        self.skip_ws();
        if self.peek() == Some('!') && !self.starts_with("!=") {
            self.pos += 1;
            return Ok(Filter::Not(Box::new(self.unary()?)));
        }
        if self.eat('(') {
            let inner = self.or_expr()?;
            self.skip_ws();
            self.expect(')')?;
            return Ok(inner);
        }

        let left = self.operand()?;
        self.skip_ws();
        let Some(op) = self.comparison() else {
            return match left {
                Operand::Query(query) => Ok(Filter::Exists(query)),
                Operand::Literal(_) => Err(self.error("expected a comparison operator")),
            };
        };
        self.skip_ws();
        let right = self.operand()?;
        Ok(Filter::Compare(left, op, right))
    }

    fn comparison(&mut self) -> Option<Comparison> {
        let (text, op) = COMPARISONS
            .into_iter()
            .find(|(text, _)| self.starts_with(text))?;
        self.pos += text.len();
        Some(op)
    }

    fn operand(&mut self) -> Result<Operand, JsonPathError> {
        match self.peek() {
            Some(anchor @ ('@' | '$')) => {
                self.pos += 1;
                let segments = self.segments()?;
                Ok(Operand::Query(Query {
                    absolute: anchor == '$',
                    segments,
                }))
            }
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                Ok(Operand::Literal(Value::String(self.quoted(quote)?)))
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(_) => self.keyword(),
            None => Err(self.error("expected an operand")),
        }
    }

    fn number(&mut self) -> Result<Operand, JsonPathError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        serde_json::from_str::<Value>(&text)
            .ok()
            .filter(Value::is_number)
            .map(Operand::Literal)
            .ok_or_else(|| self.error(format!("invalid number '{text}'")))
    }

    fn keyword(&mut self) -> Result<Operand, JsonPathError> {
        for (word, value) in [
            ("true", Value::Bool(true)),
            ("false", Value::Bool(false)),
            ("null", Value::Null),
        ] {
            if self.eat_str(word) {
                return Ok(Operand::Literal(value));
            }
        }
        Err(self.error("expected an operand"))
    }

    fn quoted(&mut self, quote: char) -> Result<String, JsonPathError> {
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated quoted name")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(escaped) => {
                            name.push(escaped);
                            self.pos += 1;
                        }
                        None => return Err(self.error("dangling escape")),
                    }
                }
                Some(ch) if ch == quote => {
                    self.pos += 1;
                    return Ok(name);
                }
                Some(ch) => {
                    name.push(ch);
                    self.pos += 1;
                }
            }
        }
    }
}
