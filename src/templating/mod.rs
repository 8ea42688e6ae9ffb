//! Templating for generated editor files.
//!
//! Each output binding renders one toolkit template (`templates/<id>.md`) with
//! [Tera](https://keats.github.io/tera/) against the run's data context.
//!
//! # Template Context
//!
//! - `project`: `name`, `description`, `type`
//! - `standards`: `indentation`, `lineLength`, `language`
//! - `paths`, `naming`: the configured tables
//! - `framework`: `enabled` plus the individual parts
//! - `modules`, `agents`: `name`, `slug`, `description`, `version`, `category`, `content`
//! - `hasCssFramework`, `hasCms`, `hasFrontend`, `hasTypescript`
//! - `editors`, `projectRules`, `toolkit.path`
//!
//! # Validation
//!
//! Every selected template is checked with [`validator::validate_or_err`] before
//! anything is rendered, so a typo is reported with every other unbound variable in one
//! pass instead of failing the run halfway.
//!
//! # Literal Blocks
//!
//! Fenced blocks tagged `literal` are not rendered and come out as plain fences:
//!
//! ````markdown
//! ```literal
//! {{ this.is.shown.as.written }}
//! ```
//! ````
//!
//! Autoescaping is off; output is Markdown.

pub mod context;
pub mod error;
pub mod renderer;
pub mod utils;
pub mod validator;

pub use context::{ArtifactDescriptor, ContextAssembler, DataContext, ProjectMeta};
pub use error::{ErrorLocation, TemplateError};
pub use renderer::{CompiledTemplate, TemplateRenderer, substitute};
pub use validator::{ValidationReport, validate, validate_or_err};
