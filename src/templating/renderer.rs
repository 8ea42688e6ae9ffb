//! Template rendering engine with Tera.
//!
//! Editor templates are compiled once per run into a [`CompiledTemplate`] (a private
//! `Tera` instance holding a single template) and rendered against the data context.
//! Autoescaping is off because every output is Markdown.
//!
//! Blocks fenced with ```` ```literal ```` are taken out before compilation and restored
//! as plain ```` ``` ```` fences after rendering, so templates can show Tera syntax
//! verbatim.
//!
//! [`substitute`] is the lightweight alternative used for module and agent bodies: it
//! only replaces `{{ dotted.path }}` placeholders that resolve in the context and leaves
//! everything else alone, so code samples in other template languages survive.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tera::{Context as TeraContext, Tera};

use super::error::{ErrorLocation, TemplateError};
use super::utils::{find_similar, flatten_paths, lookup_path, value_to_text};

static PLACEHOLDER: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
});

static LINE_COLUMN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)"));

static MISSING_VARIABLE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"Variable `([^`]+)` not found"));

const LITERAL_MARKER_PREFIX: &str = "__AIKIT_LITERAL_";

/// A template compiled for rendering
pub struct CompiledTemplate {
    name: String,
    source_path: Option<PathBuf>,
    protected_source: String,
    literals: LiteralBlocks,
    tera: Tera,
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .field("source_path", &self.source_path)
            .field("literal_blocks", &self.literals.len())
            .finish_non_exhaustive()
    }
}

impl CompiledTemplate {
    /// Compile `source` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::SyntaxError`] when the template does not parse.
    pub fn compile(name: &str, source: &str, path: &Path) -> Result<Self, TemplateError> {
        Self::compile_inner(name, source, Some(path.to_path_buf()))
    }

    /// Compile a template that did not come from a file
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::SyntaxError`] when the template does not parse.
    pub fn from_source(name: &str, source: &str) -> Result<Self, TemplateError> {
        Self::compile_inner(name, source, None)
    }

    fn compile_inner(
        name: &str,
        source: &str,
        source_path: Option<PathBuf>,
    ) -> Result<Self, TemplateError> {
        let (protected_source, literals) = LiteralBlocks::extract(source);

        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(name, &protected_source).map_err(|e| {
            let location = build_location(name, source_path.as_deref(), &protected_source, &e);
            TemplateError::SyntaxError {
                message: describe_tera_error(&e),
                location: Box::new(location),
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            source_path,
            protected_source,
            literals,
            tera,
        })
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the template was read from
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Template text with literal blocks replaced by placeholders, as seen by the engine
    pub fn validation_source(&self) -> &str {
        &self.protected_source
    }
}

/// Renders compiled templates against a JSON data context
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Create a renderer
    pub const fn new() -> Self {
        Self
    }

    /// Render `template` with `ctx` as its context.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::UnboundVariables`] when the engine hits an undefined variable
    /// - [`TemplateError::RenderFailed`] for any other engine failure
    pub fn render(&self, template: &CompiledTemplate, ctx: &Value) -> Result<String, TemplateError> {
        let context = TeraContext::from_value(ctx.clone()).map_err(|e| TemplateError::RenderFailed {
            message: format!("Data context must be a JSON object: {e}"),
            location: Box::new(ErrorLocation {
                template: template.name.clone(),
                file_path: template.source_path.clone(),
                ..ErrorLocation::default()
            }),
        })?;

        tracing::debug!("Rendering template '{}'", template.name);

        let rendered = template
            .tera
            .render(&template.name, &context)
            .map_err(|e| parse_tera_error(&e, template, ctx))?;

        Ok(template.literals.restore(&rendered))
    }

    /// Compile and render `source` in one step
    ///
    /// # Errors
    ///
    /// Returns the compile or render error.
    pub fn render_str(&self, name: &str, source: &str, ctx: &Value) -> Result<String, TemplateError> {
        let template = CompiledTemplate::from_source(name, source)?;
        self.render(&template, ctx)
    }
}

/// Replace `{{ dotted.path }}` placeholders that resolve in `ctx`.
///
/// Scalars are inserted as text, arrays of scalars joined with `, `, `null` as an empty
/// string. Placeholders that do not resolve, or resolve to objects, are left untouched.
///
/// # Examples
///
/// ```rust
/// use aikit_cli::templating::substitute;
/// use serde_json::json;
///
/// let ctx = json!({"paths": {"css": "src/css"}});
/// let text = substitute("Styles live in {{ paths.css }}; {{ craft.entry }} is Twig.", &ctx);
/// assert_eq!(text, "Styles live in src/css; {{ craft.entry }} is Twig.");
/// ```
#[must_use]
pub fn substitute(text: &str, ctx: &Value) -> String {
    let Ok(pattern) = PLACEHOLDER.as_ref() else {
        return text.to_string();
    };

    pattern
        .replace_all(text, |caps: &regex::Captures<'_>| {
            lookup_path(ctx, &caps[1])
                .and_then(value_to_text)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// ```` ```literal ```` fences taken out of a template before compilation
///
/// Each block is replaced by a marker line; the marker survives rendering and is
/// swapped back for a plain fence. Text after `literal` on the opening line is kept as
/// the fence's info string, so ```` ```literal twig ```` comes back as ```` ```twig ````.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct LiteralBlocks {
    /// `(info string, body)` per block, in source order
    blocks: Vec<(String, String)>,
}

impl LiteralBlocks {
    fn marker(index: usize) -> String {
        format!("{LITERAL_MARKER_PREFIX}{index}__")
    }

    /// Split `source` into engine-visible text and the literal blocks it contained
    fn extract(source: &str) -> (String, Self) {
        let mut visible: Vec<String> = Vec::new();
        let mut blocks = Vec::new();
        // (info string, body lines, opening line) of the fence being read
        let mut open: Option<(String, Vec<&str>, &str)> = None;

        for line in source.lines() {
            let trimmed = line.trim();

            if open.is_none() {
                match trimmed.strip_prefix("```literal") {
                    Some(info) => open = Some((info.trim().to_string(), Vec::new(), line)),
                    None => visible.push(line.to_string()),
                }
            } else if trimmed.starts_with("```") {
                if let Some((info, body, _)) = open.take() {
                    visible.push(Self::marker(blocks.len()));
                    blocks.push((info, body.join("\n")));
                }
            } else if let Some((_, body, _)) = open.as_mut() {
                body.push(line);
            }
        }

        // An unclosed fence is ordinary template text
        if let Some((_, body, opening)) = open {
            tracing::warn!("Unclosed literal fence, rendering it as template text");
            visible.push(opening.to_string());
            visible.extend(body.into_iter().map(str::to_string));
        }

        let mut text = visible.join("\n");
        if source.ends_with('\n') {
            text.push('\n');
        }

        (text, Self { blocks })
    }

    fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Put the blocks back into rendered output as plain fences
    fn restore(&self, rendered: &str) -> String {
        self.blocks.iter().enumerate().fold(rendered.to_string(), |text, (index, (info, body))| {
            text.replace(&Self::marker(index), &format!("```{info}\n{body}\n```"))
        })
    }
}

fn parse_tera_error(error: &tera::Error, template: &CompiledTemplate, ctx: &Value) -> TemplateError {
    let message = describe_tera_error(error);

    if let Some(variable) = extract_variable_name(&message) {
        let available = flatten_paths(ctx);
        let suggestions = find_similar(&variable, &available);
        return TemplateError::UnboundVariables {
            template: template.name.clone(),
            missing: vec![variable.clone()],
            suggestions: vec![(variable, suggestions)],
        };
    }

    TemplateError::RenderFailed {
        message,
        location: Box::new(build_location(
            &template.name,
            template.source_path.as_deref(),
            &template.protected_source,
            error,
        )),
    }
}

fn build_location(
    name: &str,
    path: Option<&Path>,
    source: &str,
    error: &tera::Error,
) -> ErrorLocation {
    let line_number = extract_line_from_tera_error(error);
    let context_lines = line_number.map(|line| snippet_around(source, line, 2)).filter(|l| !l.is_empty());

    ErrorLocation {
        template: name.to_string(),
        file_path: path.map(Path::to_path_buf),
        line_number,
        context_lines,
    }
}

fn extract_variable_name(error_msg: &str) -> Option<String> {
    let re = MISSING_VARIABLE.as_ref().ok()?;
    re.captures(error_msg).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
    let error_msg = format!("{error:?}");
    let re = LINE_COLUMN.as_ref().ok()?;
    re.captures(&error_msg).and_then(|caps| caps.get(1)).and_then(|m| m.as_str().parse().ok())
}

/// Numbered source lines within `radius` of the 1-based `line`
fn snippet_around(source: &str, line: usize, radius: usize) -> Vec<(usize, String)> {
    if line == 0 {
        return Vec::new();
    }
    let first = line.saturating_sub(radius).max(1);

    source
        .lines()
        .enumerate()
        .map(|(index, text)| (index + 1, text))
        .skip(first - 1)
        .take_while(|(number, _)| *number <= line + radius)
        .map(|(number, text)| (number, text.to_string()))
        .collect()
}

/// One message from a Tera error and its causes, outermost first.
///
/// Tera wraps the useful message in "Failed to render/parse ..." envelopes; those and
/// repeated messages are dropped.
pub(crate) fn describe_tera_error(error: &tera::Error) -> String {
    let mut messages: Vec<String> = Vec::new();
    let mut current: Option<&dyn std::error::Error> = Some(error);

    while let Some(err) = current {
        let message = err.to_string().trim().to_string();
        let envelope = message.starts_with("Failed to render") || message.starts_with("Failed to parse");
        if !message.is_empty() && !envelope && !messages.contains(&message) {
            messages.push(message);
        }
        current = err.source();
    }

    if messages.is_empty() { "Template syntax error".to_string() } else { messages.join("\n  -> ") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_basic() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .render_str(
                "claude.md",
                "# {{ project.name }}\n{% for m in modules %}- {{ m.name }}\n{% endfor %}",
                &json!({"project": {"name": "acme"}, "modules": [{"name": "a"}, {"name": "b"}]}),
            )
            .unwrap();

        assert_eq!(out, "# acme\n- a\n- b\n");
    }

    #[test]
    fn test_no_html_escaping() {
        let renderer = TemplateRenderer::new();
        let out = renderer.render_str("t.md", "{{ text }}", &json!({"text": "<b>&</b>"})).unwrap();
        assert_eq!(out, "<b>&</b>");
    }

    #[test]
    fn test_literal_blocks_are_not_rendered() {
        let renderer = TemplateRenderer::new();
        let source = "Before\n```literal\n{{ not_rendered }}\n```\nAfter {{ x }}\n";

        let out = renderer.render_str("t.md", source, &json!({"x": 1})).unwrap();

        assert_eq!(out, "Before\n```\n{{ not_rendered }}\n```\nAfter 1\n");
    }

    #[test]
    fn test_syntax_error_is_structured() {
        let err = CompiledTemplate::from_source("bad.md", "line one\n{% if %}\n").unwrap_err();
        assert!(matches!(err, TemplateError::SyntaxError { .. }));
    }

    #[test]
    fn test_undefined_variable_becomes_unbound_error() {
        let renderer = TemplateRenderer::new();
        let err = renderer.render_str("t.md", "{{ projct }}", &json!({"project": {}})).unwrap_err();

        match err {
            TemplateError::UnboundVariables {
                missing,
                suggestions,
                ..
            } => {
                assert_eq!(missing, vec!["projct"]);
                assert_eq!(suggestions[0].1, vec!["project"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_substitute_known_and_unknown() {
        let ctx = json!({"project": {"name": "acme"}, "standards": {"indentation": 2}, "editors": ["claude", "cursor"]});

        assert_eq!(
            substitute("{{project.name}} uses {{ standards.indentation }} spaces", &ctx),
            "acme uses 2 spaces"
        );
        assert_eq!(substitute("{{ editors }}", &ctx), "claude, cursor");
        assert_eq!(substitute("{{ entry.title }} and {% if x %}", &ctx), "{{ entry.title }} and {% if x %}");
        assert_eq!(substitute("{{ project }}", &ctx), "{{ project }}");
        assert_eq!(substitute("{{ project.name | upper }}", &ctx), "{{ project.name | upper }}");
    }

    #[test]
    fn test_substitute_is_deterministic() {
        let ctx = json!({"a": "x"});
        let text = "{{ a }} {{ b }} {{ a }}";
        assert_eq!(substitute(text, &ctx), substitute(text, &ctx));
        assert_eq!(substitute(text, &ctx), "x {{ b }} x");
    }

    #[test]
    fn test_unclosed_literal_fence_stays_template_text() {
        let (visible, literals) = LiteralBlocks::extract("a\n```literal\nb");
        assert_eq!(literals.len(), 0);
        assert_eq!(visible, "a\n```literal\nb");
    }

    #[test]
    fn test_literal_info_string_and_several_blocks() {
        let renderer = TemplateRenderer::new();
        let source = "```literal twig\n{{ entry.title }}\n```\n{{ x }}\n```literal\n{% raw %}\n```\n";

        let out = renderer.render_str("t.md", source, &json!({"x": "mid"})).unwrap();

        assert_eq!(out, "```twig\n{{ entry.title }}\n```\nmid\n```\n{% raw %}\n```\n");
    }

    #[test]
    fn test_snippet_around_clamps_to_source() {
        let source = "one\ntwo\nthree\nfour";
        assert_eq!(snippet_around(source, 1, 1), vec![(1, "one".to_string()), (2, "two".to_string())]);
        assert_eq!(snippet_around(source, 4, 2).first().map(|(n, _)| *n), Some(2));
        assert!(snippet_around(source, 0, 2).is_empty());
        assert!(snippet_around(source, 9, 1).is_empty());
    }
}
