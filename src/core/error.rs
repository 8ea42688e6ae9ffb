//! Error handling for aikit
//!
//! This module provides the strongly-typed [`AikitError`] enum covering every failure
//! mode of a synthesis run, plus the [`ErrorContext`] wrapper used by the CLI to present
//! errors with details and actionable suggestions.
//!
//! # Error Taxonomy
//!
//! - **Configuration errors** ([`AikitError::ConfigNotFound`], [`AikitError::ConfigParse`],
//!   [`AikitError::ConfigValidation`], [`AikitError::UnknownEditor`],
//!   [`AikitError::ToolkitNotFound`]) are fatal and abort before any output is produced.
//! - **Conflict errors** ([`AikitError::ModuleConflicts`]) are fatal and carry every
//!   violation found, not just the first.
//! - **Template errors** ([`AikitError::TemplateNotFound`],
//!   [`AikitError::TemplateValidation`]) are fatal and enumerate every unbound variable.
//! - **Write errors** ([`AikitError::WriteFailed`]) are raised only after every output
//!   has been attempted.
//!
//! Missing modules and agents are not errors at all; they are logged as warnings by the
//! loader and excluded from the run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use aikit_cli::core::{AikitError, user_friendly_error};
//!
//! let error = AikitError::ModuleConflicts {
//!     messages: vec!["Module 'tailwind' conflicts with 'bootstrap'".to_string()],
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;

/// The main error type for aikit operations
#[derive(thiserror::Error, Debug)]
pub enum AikitError {
    /// No project configuration file was found in the project directory
    #[error("Project configuration not found in {path} (expected one of: {expected})")]
    ConfigNotFound {
        /// Directory that was searched
        path: String,
        /// Comma separated list of accepted file names
        expected: String,
    },

    /// A configuration document could not be parsed
    #[error("Invalid configuration syntax in {file}")]
    ConfigParse {
        /// Path to the offending file
        file: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The merged configuration violates one or more constraints
    #[error("Configuration validation failed:\n{}", format_list(issues))]
    ConfigValidation {
        /// Every violation found in the merged configuration
        issues: Vec<String>,
    },

    /// An editor id in the configuration or on the command line is not known
    #[error("Unknown editor '{editor}'")]
    UnknownEditor {
        /// The unrecognized editor id
        editor: String,
        /// Comma separated list of supported ids
        valid: String,
    },

    /// The toolkit directory does not exist
    #[error("Toolkit directory not found: {path}")]
    ToolkitNotFound {
        /// The resolved toolkit path
        path: String,
    },

    /// The project rules file referenced by `context` cannot be read
    #[error("Project rules file '{path}' could not be read: {reason}")]
    ProjectRulesUnreadable {
        /// Path as configured
        path: String,
        /// Underlying IO failure
        reason: String,
    },

    /// Two or more resolved modules are mutually exclusive, or a requirement is missing
    #[error("Module resolution failed:\n{}", format_list(messages))]
    ModuleConflicts {
        /// One message per conflicting pair or missing requirement
        messages: Vec<String>,
    },

    /// A selected output binding has no template in any template root
    #[error("Template '{template}' not found (searched: {searched})")]
    TemplateNotFound {
        /// Template identifier from the output table
        template: String,
        /// Directories that were searched
        searched: String,
    },

    /// One or more templates reference variables missing from the data context
    #[error("Template validation failed:\n{}", format_list(failures))]
    TemplateValidation {
        /// One diagnostic per failing template
        failures: Vec<String>,
    },

    /// Some output files could not be written
    #[error("Failed to write {failed} output file(s)")]
    WriteFailed {
        /// Number of failed writes
        failed: usize,
        /// One message per failure
        errors: Vec<String>,
    },

    /// IO error from the standard library
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error with a message
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

fn format_list(items: &[String]) -> String {
    items.iter().map(|item| format!("  - {item}")).collect::<Vec<_>>().join("\n")
}

impl Clone for AikitError {
    fn clone(&self) -> Self {
        match self {
            Self::ConfigNotFound {
                path,
                expected,
            } => Self::ConfigNotFound {
                path: path.clone(),
                expected: expected.clone(),
            },
            Self::ConfigParse {
                file,
                reason,
            } => Self::ConfigParse {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigValidation {
                issues,
            } => Self::ConfigValidation {
                issues: issues.clone(),
            },
            Self::UnknownEditor {
                editor,
                valid,
            } => Self::UnknownEditor {
                editor: editor.clone(),
                valid: valid.clone(),
            },
            Self::ToolkitNotFound {
                path,
            } => Self::ToolkitNotFound {
                path: path.clone(),
            },
            Self::ProjectRulesUnreadable {
                path,
                reason,
            } => Self::ProjectRulesUnreadable {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::ModuleConflicts {
                messages,
            } => Self::ModuleConflicts {
                messages: messages.clone(),
            },
            Self::TemplateNotFound {
                template,
                searched,
            } => Self::TemplateNotFound {
                template: template.clone(),
                searched: searched.clone(),
            },
            Self::TemplateValidation {
                failures,
            } => Self::TemplateValidation {
                failures: failures.clone(),
            },
            Self::WriteFailed {
                failed,
                errors,
            } => Self::WriteFailed {
                failed: *failed,
                errors: errors.clone(),
            },
            // io::Error is not Clone, keep its message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps an [`AikitError`] and adds optional details and a suggestion.
/// When displayed on a terminal the error is red, details yellow and the suggestion
/// green.
///
/// # Examples
///
/// ```rust,no_run
/// use aikit_cli::core::{AikitError, ErrorContext};
///
/// let context = ErrorContext::new(AikitError::ToolkitNotFound {
///     path: "/opt/aikit".to_string(),
/// })
/// .with_suggestion("Pass --toolkit or set AIKIT_TOOLKIT")
/// .with_details("The toolkit holds modules, agents and templates");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: AikitError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without details or suggestion
    #[must_use]
    pub const fn new(error: AikitError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`AikitError`] variants, template errors, IO errors and parse errors
/// from the configuration formats. Anything else is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(aikit_error) = error.downcast_ref::<AikitError>() {
        return create_error_context(aikit_error.clone());
    }

    if let Some(template_error) = error.downcast_ref::<crate::templating::TemplateError>() {
        return ErrorContext::new(AikitError::Other {
            message: template_error.format_with_context(),
        })
        .with_suggestion(
            "Check template syntax: variables use {{ var }}, comments use {# #}, control flow uses {% %}",
        );
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(AikitError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check ownership and permissions of the project directory");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(AikitError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(AikitError::Other {
        message,
    })
}

/// Map each [`AikitError`] variant to a context with tailored suggestions
fn create_error_context(error: AikitError) -> ErrorContext {
    match &error {
        AikitError::ConfigNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Create an aikit.json file in the project root, or pass --project-dir")
            .with_details("aikit reads the project configuration before anything else"),

        AikitError::ConfigParse { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check the file syntax: quotes, brackets and indentation")
        }

        AikitError::ConfigValidation { .. } => ErrorContext::new(error)
            .with_suggestion("Fix every listed value in aikit.json and run the command again"),

        AikitError::UnknownEditor { valid, .. } => {
            let suggestion = format!("Supported editors: {valid}");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        AikitError::ToolkitNotFound { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Pass --toolkit <dir>, set AIKIT_TOOLKIT, or set toolkit.path in aikit.json",
            )
            .with_details("The toolkit directory holds config/, modules/, agents/ and templates/"),

        AikitError::ProjectRulesUnreadable { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the 'context' path in aikit.json or set it to null"),

        AikitError::ModuleConflicts { .. } => ErrorContext::new(error)
            .with_suggestion("Remove one module of each conflicting pair from 'modules'")
            .with_details("No files were written"),

        AikitError::TemplateNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Add the template to the toolkit or deselect the editor"),

        AikitError::TemplateValidation { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Add the missing values to aikit.json or guard them with `is defined` in the template",
            )
            .with_details("No files were written"),

        AikitError::WriteFailed { errors, .. } => {
            let details = errors.join("\n");
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check permissions of the listed paths; other outputs were written")
        }

        _ => ErrorContext::new(error),
    }
}
