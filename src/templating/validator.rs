//! Static validation of template variables
//!
//! Before any file is written, every selected template is checked against the data
//! context: each variable a template reads must be bound, or the run stops with the
//! complete list. This catches a typo in `CLAUDE.md`'s template before it turns into a
//! render failure halfway through a run.
//!
//! # What is checked
//!
//! Every `{{ }}` and `{% %}` tag is scanned in order, after `{# #}` comments and
//! `{% raw %}` blocks are removed. Within a tag:
//!
//! - keywords, filter names, test names, function and macro names, named arguments,
//!   string and number literals are ignored
//! - engine-provided names (`loop`, `__tera_context`, `this`, `@index`, `../parent`) are
//!   ignored
//! - references guarded by `is defined` / `is undefined`, or piped through `default`,
//!   are optional and never reported
//! - every other reference is reduced to its root name and looked up in the context
//!
//! `{% for item in array %}` opens a scope. References rooted at `item` are checked
//! against the shape of the first element of `array`; bare names inside the block are
//! bound when that element has a property of the same name; an empty array binds
//! everything because the block never renders. `{% set x = ... %}` binds `x` for the
//! rest of the template.
//!
//! Unbound names from [`OPTIONAL_TEMPLATE_VARIABLES`] are reported as warnings instead
//! of failures.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use super::error::TemplateError;
use super::utils::{find_similar, flatten_paths};
use crate::constants::OPTIONAL_TEMPLATE_VARIABLES;

// Operators, literals and engine names. Statement keywords such as `block`, `include`
// or `missing` are only keywords in their statements and stay checkable elsewhere.
const IGNORED_WORDS: &[&str] = &[
    "and", "or", "not", "in", "is", "true", "false", "True", "False", "none", "None", "loop",
    "__tera_context", "this",
];

/// Outcome of validating one template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Unbound required names, first-seen order, no duplicates
    pub missing: Vec<String>,
    /// Unbound optional names
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether every required variable is bound
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Validate `template` against `ctx`.
///
/// # Examples
///
/// ```rust
/// use aikit_cli::templating::validator::validate;
/// use serde_json::json;
///
/// let ctx = json!({"project": {"name": "acme"}, "modules": [{"name": "tailwind"}]});
/// let report = validate("{{ project.name }}{% for m in modules %}{{ m.name }}{% endfor %}{{ foo }}", &ctx);
///
/// assert_eq!(report.missing, vec!["foo"]);
/// ```
#[must_use]
pub fn validate(template: &str, ctx: &Value) -> ValidationReport {
    let mut checker = Checker::new(ctx);

    for tag in scan_tags(template) {
        match tag {
            Tag::Expression(body) => checker.expression(&tokenize(body)),
            Tag::Statement(body) => checker.statement(body),
        }
    }

    checker.report
}

/// Validate and turn missing variables into an error.
///
/// # Errors
///
/// Returns [`TemplateError::UnboundVariables`] listing every missing name, with close
/// matches from the context as suggestions.
pub fn validate_or_err(
    name: &str,
    template: &str,
    ctx: &Value,
) -> Result<ValidationReport, TemplateError> {
    let report = validate(template, ctx);

    for warning in &report.warnings {
        debug!("Template '{}' uses optional variable '{}' which is not set", name, warning);
    }

    if report.is_valid() {
        return Ok(report);
    }

    let available = flatten_paths(ctx);
    let suggestions = report
        .missing
        .iter()
        .map(|missing| (missing.clone(), find_similar(missing, &available)))
        .collect();

    Err(TemplateError::UnboundVariables {
        template: name.to_string(),
        missing: report.missing,
        suggestions,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag<'a> {
    Expression(&'a str),
    Statement(&'a str),
}

/// Tags of the template in order, comments and raw blocks skipped
fn scan_tags(text: &str) -> Vec<Tag<'_>> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        let rest = &text[start..];

        if rest.starts_with("{#") {
            match text[start + 2..].find("#}") {
                Some(end) => pos = start + 2 + end + 2,
                None => break,
            }
        } else if rest.starts_with("{{") || rest.starts_with("{%") {
            let close = if rest.starts_with("{{") { "}}" } else { "%}" };
            let Some(end) = find_close(text, start + 2, close) else {
                break;
            };
            let body = trim_tag(&text[start + 2..end]);
            pos = end + 2;

            if close == "}}" {
                tags.push(Tag::Expression(body));
            } else if first_word(body) == "raw" {
                match find_endraw(text, pos) {
                    Some(after) => pos = after,
                    None => break,
                }
            } else {
                tags.push(Tag::Statement(body));
            }
        } else {
            pos = start + 1;
        }
    }

    tags
}

/// Position of `close`, skipping quoted strings
fn find_close(text: &str, from: usize, close: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' || b == b'`' => quote = Some(b),
            None if bytes[i..].starts_with(close.as_bytes()) => return Some(i),
            None => {}
        }
        i += 1;
    }

    None
}

/// Position right after the `{% endraw %}` tag following `from`
fn find_endraw(text: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(offset) = text[pos..].find("{%") {
        let start = pos + offset;
        let end = find_close(text, start + 2, "%}")?;
        if first_word(trim_tag(&text[start + 2..end])) == "endraw" {
            return Some(end + 2);
        }
        pos = end + 2;
    }
    None
}

fn trim_tag(body: &str) -> &str {
    let body = body.trim();
    let body = body.strip_prefix('-').unwrap_or(body);
    let body = body.strip_suffix('-').unwrap_or(body);
    body.trim()
}

fn first_word(body: &str) -> &str {
    body.split(|c: char| c.is_whitespace() || c == '(').next().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Identifier or dotted path; `::` joins namespaced macro calls
    Ident(String),
    /// `@index`, `../parent` and similar markers
    Marker,
    Str,
    Num,
    Punct(char),
    Op,
}

fn tokenize(expr: &str) -> Vec<Token> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
        } else if c == '"' || c == '\'' || c == '`' {
            i += 1;
            while i < chars.len() && chars[i] != c {
                i += 1;
            }
            i += 1;
            tokens.push(Token::Str);
        } else if c.is_ascii_digit() {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Num);
        } else if c == '@' || (c == '.' && chars.get(i + 1) == Some(&'.')) {
            while i < chars.len() && (is_ident_char(chars[i]) || matches!(chars[i], '@' | '.' | '/')) {
                i += 1;
            }
            tokens.push(Token::Marker);
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            loop {
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                let joins_path = chars.get(i) == Some(&'.')
                    && chars.get(i + 1).is_some_and(|n| is_ident_char(*n));
                let joins_namespace = chars.get(i) == Some(&':') && chars.get(i + 1) == Some(&':');
                if joins_path {
                    i += 1;
                } else if joins_namespace {
                    i += 2;
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if matches!(c, '=' | '!' | '<' | '>') && chars.get(i + 1) == Some(&'=') {
            i += 2;
            tokens.push(Token::Op);
        } else {
            i += 1;
            tokens.push(Token::Punct(c));
        }
    }

    tokens
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    /// Element shape unknown; any property is accepted
    Unknown,
    /// The iterated collection is empty; the block never renders
    Empty,
    /// First element of the iterated collection
    Element(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    For,
    Macro,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    vars: Vec<(String, Shape)>,
}

struct Checker<'a> {
    ctx: &'a Value,
    scopes: Vec<Scope>,
    bound: BTreeSet<String>,
    report: ValidationReport,
}

impl<'a> Checker<'a> {
    fn new(ctx: &'a Value) -> Self {
        Self {
            ctx,
            scopes: Vec::new(),
            bound: BTreeSet::new(),
            report: ValidationReport::default(),
        }
    }

    fn statement(&mut self, body: &str) {
        let keyword = first_word(body);
        let rest = body[keyword.len()..].trim();

        match keyword {
            "for" => self.open_for(rest),
            "endfor" => self.close(ScopeKind::For),
            "macro" => self.open_macro(rest),
            "endmacro" => self.close(ScopeKind::Macro),
            "set" | "set_global" => {
                let tokens = tokenize(rest);
                if let Some(Token::Ident(name)) = tokens.first() {
                    let name = name.clone();
                    self.expression(tokens.get(1..).unwrap_or_default());
                    self.bound.insert(name);
                }
            }
            "import" => {
                let tokens = tokenize(rest);
                if let Some(Token::Ident(alias)) = tokens.last() {
                    self.bound.insert(alias.clone());
                }
            }
            "if" | "elif" => self.expression(&tokenize(rest)),
            "else" | "endif" | "endset" | "block" | "endblock" | "filter" | "endfilter"
            | "include" | "extends" | "break" | "continue" | "endraw" => {}
            _ => self.expression(&tokenize(body)),
        }
    }

    fn open_for(&mut self, rest: &str) {
        let tokens = tokenize(rest);
        let Some(in_index) = tokens.iter().position(|t| *t == Token::Ident("in".to_string())) else {
            return;
        };

        let names: Vec<String> = tokens[..in_index]
            .iter()
            .filter_map(|t| match t {
                Token::Ident(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        let collection = &tokens[in_index + 1..];

        self.expression(collection);

        let iterated = match collection.first() {
            Some(Token::Ident(path)) => self.resolve_shape(path),
            _ => Shape::Unknown,
        };

        let vars = match (names.as_slice(), iterated) {
            ([single], shape) => vec![(single.clone(), element_of(&shape))],
            ([key, value], shape) => {
                let value_shape = element_of(&shape);
                let key_shape = if value_shape == Shape::Empty { Shape::Empty } else { Shape::Unknown };
                vec![(key.clone(), key_shape), (value.clone(), value_shape)]
            }
            _ => names.into_iter().map(|n| (n, Shape::Unknown)).collect(),
        };

        self.scopes.push(Scope {
            kind: ScopeKind::For,
            vars,
        });
    }

    fn open_macro(&mut self, rest: &str) {
        let tokens = tokenize(rest);
        let mut vars = Vec::new();
        let mut after_equals = false;

        for token in tokens.iter().skip(1) {
            match token {
                Token::Punct('=') => after_equals = true,
                Token::Punct(',') | Token::Punct(')') => after_equals = false,
                Token::Ident(name) if !after_equals => vars.push((name.clone(), Shape::Unknown)),
                _ => {}
            }
        }

        self.scopes.push(Scope {
            kind: ScopeKind::Macro,
            vars,
        });
    }

    fn close(&mut self, kind: ScopeKind) {
        if self.scopes.last().is_some_and(|scope| scope.kind == kind) {
            self.scopes.pop();
        }
    }

    fn expression(&mut self, tokens: &[Token]) {
        for (i, token) in tokens.iter().enumerate() {
            let Token::Ident(path) = token else {
                continue;
            };

            let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
            let prev2 = i.checked_sub(2).and_then(|p| tokens.get(p));
            let next = tokens.get(i + 1);

            let is_filter = prev == Some(&Token::Punct('|'));
            let is_member = prev == Some(&Token::Punct('.'));
            let is_test = matches!(prev, Some(Token::Ident(p)) if p == "is")
                || (matches!(prev, Some(Token::Ident(p)) if p == "not")
                    && matches!(prev2, Some(Token::Ident(p)) if p == "is"));
            let is_call = next == Some(&Token::Punct('('));
            let is_named_arg = next == Some(&Token::Punct('='));

            if is_filter || is_member || is_test || is_call || is_named_arg {
                continue;
            }
            let root = path.split('.').next().unwrap_or(path);
            if IGNORED_WORDS.contains(&root) {
                continue;
            }
            if is_optional(tokens, i + 1) {
                continue;
            }

            self.check_reference(path);
        }
    }

    fn check_reference(&mut self, path: &str) {
        let (root, rest) = match path.split_once('.') {
            Some((root, rest)) => (root, Some(rest)),
            None => (path, None),
        };

        if self.bound.contains(root) {
            return;
        }

        if let Some(shape) = self.loop_var(root) {
            if let (Shape::Element(element), Some(rest)) = (&shape, rest) {
                if !element_has(element, rest) {
                    let property = rest.split('.').next().unwrap_or(rest);
                    self.record_missing(format!("{root}.{property}"));
                }
            }
            return;
        }

        if self.ctx.get(root).is_some() {
            return;
        }

        if self.bound_by_scope(root) {
            return;
        }

        self.record_missing(root.to_string());
    }

    /// Shape bound to `name` by the innermost enclosing scope declaring it
    fn loop_var(&self, name: &str) -> Option<Shape> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.iter().find(|(var, _)| var == name).map(|(_, shape)| shape.clone()))
    }

    /// Bare names are bound inside a block over an empty collection, or when an enclosing
    /// element has a property of that name
    fn bound_by_scope(&self, name: &str) -> bool {
        self.scopes.iter().flat_map(|scope| scope.vars.iter()).any(|(_, shape)| match shape {
            Shape::Empty => true,
            Shape::Element(Value::Object(map)) => map.contains_key(name),
            _ => false,
        })
    }

    /// Shape of the value at `path`, seen through enclosing loop variables
    fn resolve_shape(&self, path: &str) -> Shape {
        let (root, rest) = match path.split_once('.') {
            Some((root, rest)) => (root, Some(rest)),
            None => (path, None),
        };

        let base = match self.loop_var(root) {
            Some(Shape::Element(element)) => element,
            Some(Shape::Empty) => return Shape::Empty,
            Some(Shape::Unknown) => return Shape::Unknown,
            None => match self.ctx.get(root) {
                Some(value) => value.clone(),
                None => return Shape::Unknown,
            },
        };

        let value = match rest {
            Some(rest) => match descend(&base, rest) {
                Some(value) => value.clone(),
                None => return Shape::Unknown,
            },
            None => base,
        };

        Shape::Element(value)
    }

    fn record_missing(&mut self, name: String) {
        let root = name.split('.').next().unwrap_or(&name);
        let list = if OPTIONAL_TEMPLATE_VARIABLES.contains(&root) {
            &mut self.report.warnings
        } else {
            &mut self.report.missing
        };

        if !list.contains(&name) {
            list.push(name);
        }
    }
}

/// Shape of one element of a collection value
fn element_of(collection: &Shape) -> Shape {
    match collection {
        Shape::Element(Value::Array(items)) => match items.first() {
            Some(first) => Shape::Element(first.clone()),
            None => Shape::Empty,
        },
        Shape::Element(Value::Object(map)) => match map.values().next() {
            Some(first) => Shape::Element(first.clone()),
            None => Shape::Empty,
        },
        Shape::Empty => Shape::Empty,
        _ => Shape::Unknown,
    }
}

/// Follow a dot path, stepping into the first element of arrays
fn descend<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => items.get(index),
            Err(_) => items.first().and_then(|first| first.get(segment)),
        },
        _ => None,
    })
}

fn element_has(element: &Value, rest: &str) -> bool {
    let first = rest.split('.').next().unwrap_or(rest);
    if first.parse::<usize>().is_ok() {
        return true;
    }
    descend(element, rest).is_some()
}

/// Whether the reference ending before `after` is guarded by `is defined` or `default`
fn is_optional(tokens: &[Token], after: usize) -> bool {
    let mut j = after;

    // member and index continuation: .x, [..]
    loop {
        match tokens.get(j) {
            Some(Token::Punct('.')) => j += 2,
            Some(Token::Punct('[')) => j = skip_group(tokens, j, '[', ']'),
            _ => break,
        }
    }

    if matches!(tokens.get(j), Some(Token::Ident(is)) if is == "is") {
        let mut k = j + 1;
        if matches!(tokens.get(k), Some(Token::Ident(not)) if not == "not") {
            k += 1;
        }
        return matches!(tokens.get(k), Some(Token::Ident(test)) if test == "defined" || test == "undefined");
    }

    while tokens.get(j) == Some(&Token::Punct('|')) {
        match tokens.get(j + 1) {
            Some(Token::Ident(filter)) if filter == "default" => return true,
            Some(Token::Ident(_)) => {
                j += 2;
                if tokens.get(j) == Some(&Token::Punct('(')) {
                    j = skip_group(tokens, j, '(', ')');
                }
            }
            _ => break,
        }
    }

    false
}

/// Index after the group opened at `open_at`
fn skip_group(tokens: &[Token], open_at: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    for (offset, token) in tokens[open_at..].iter().enumerate() {
        match token {
            Token::Punct(c) if *c == open => depth += 1,
            Token::Punct(c) if *c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return open_at + offset + 1;
                }
            }
            _ => {}
        }
    }
    tokens.len()
}
