//! Template error handling
//!
//! Structured errors for template validation and rendering, with a multi-line
//! diagnostic from [`TemplateError::format_with_context`] naming the template, the line
//! and the variables involved.

use std::fmt;
use std::path::PathBuf;

/// Errors from validating, compiling or rendering a template
#[derive(Debug)]
pub enum TemplateError {
    /// Variables referenced by the template are not bound by the data context
    UnboundVariables {
        /// Template name, e.g. `claude.md`
        template: String,
        /// Every unbound root name, first-seen order
        missing: Vec<String>,
        /// Close matches from the context, per missing name
        suggestions: Vec<(String, Vec<String>)>,
    },

    /// The template does not parse
    SyntaxError {
        /// Cleaned-up engine message
        message: String,
        /// Where the error happened
        location: Box<ErrorLocation>,
    },

    /// The template parsed but rendering failed
    RenderFailed {
        /// Cleaned-up engine message
        message: String,
        /// Where the error happened
        location: Box<ErrorLocation>,
    },
}

/// Location information attached to syntax and render errors
#[derive(Debug, Clone, Default)]
pub struct ErrorLocation {
    /// Template name
    pub template: String,
    /// Template file, when it came from disk
    pub file_path: Option<PathBuf>,
    /// 1-based line, when the engine reported one
    pub line_number: Option<usize>,
    /// Numbered lines around the error
    pub context_lines: Option<Vec<(usize, String)>>,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnboundVariables {
                template,
                missing,
                ..
            } => {
                write!(f, "Template '{}' references undefined variables: {}", template, missing.join(", "))
            }
            TemplateError::SyntaxError {
                message,
                location,
            } => {
                write!(f, "Template syntax error in '{}': {}", location.template, message)
            }
            TemplateError::RenderFailed {
                message,
                location,
            } => {
                write!(f, "Failed to render template '{}': {}", location.template, message)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

impl TemplateError {
    /// Multi-line diagnostic for terminal output
    pub fn format_with_context(&self) -> String {
        match self {
            TemplateError::UnboundVariables {
                template,
                missing,
                suggestions,
            } => format_unbound_variables(template, missing, suggestions),
            TemplateError::SyntaxError {
                message,
                location,
            } => format_located("Template Syntax Error", message, location),
            TemplateError::RenderFailed {
                message,
                location,
            } => format_located("Template Render Error", message, location),
        }
    }

    /// Missing variable names, empty for other variants
    pub fn missing_variables(&self) -> &[String] {
        match self {
            TemplateError::UnboundVariables {
                missing,
                ..
            } => missing,
            _ => &[],
        }
    }
}

fn format_unbound_variables(
    template: &str,
    missing: &[String],
    suggestions: &[(String, Vec<String>)],
) -> String {
    let mut msg = String::new();

    msg.push_str("ERROR: Undefined Template Variables\n\n");
    msg.push_str(&format!("Template: {}\n", template));
    msg.push_str("Missing:\n");

    for variable in missing {
        msg.push_str(&format!("  - {}", variable));
        let close = suggestions.iter().find(|(name, _)| name == variable).map(|(_, s)| s);
        if let Some(close) = close.filter(|s| !s.is_empty()) {
            msg.push_str(&format!(" (did you mean: {}?)", close.join(", ")));
        }
        msg.push('\n');
    }

    msg
}

fn format_located(title: &str, message: &str, location: &ErrorLocation) -> String {
    let mut msg = String::new();

    msg.push_str(&format!("ERROR: {}\n\n", title));
    msg.push_str(&format!("Template: {}\n", location.template));

    if let Some(path) = &location.file_path {
        msg.push_str(&format!("File: {}\n", path.display()));
    }

    if let Some(line) = location.line_number {
        msg.push_str(&format!("Line: {}\n", line));
    }

    msg.push_str(&format!("\n{}\n", message));

    if let Some(lines) = &location.context_lines {
        msg.push('\n');
        for (number, text) in lines {
            let marker = if Some(*number) == location.line_number { ">" } else { " " };
            msg.push_str(&format!("{} {:>4} | {}\n", marker, number, text));
        }
    }

    msg
}
