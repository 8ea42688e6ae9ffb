//! Data context assembly.
//!
//! One [`DataContext`] is built per run from the validated configuration, the resolved
//! modules (dependency order) and the selected agents. Every template is validated and
//! rendered against the same context.
//!
//! Module and agent bodies are not templates in their own right: only their
//! `{{ dotted.path }}` placeholders are expanded, against the project-level part of the
//! context, through [`substitute`]. Placeholders that do not resolve are left as written
//! so code samples in other template languages survive.

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;

use super::renderer::substitute;
use crate::config::{ProjectConfig, Standards};
use crate::core::Artifact;

/// Module name fragments that mark a CSS framework
const CSS_FRAMEWORK_MARKERS: &[&str] = &["tailwind", "bootstrap", "bulma", "sass", "scss", "css"];

/// Module name fragments that mark a CMS
const CMS_MARKERS: &[&str] = &["craft", "cms", "wordpress", "drupal", "strapi", "sanity", "contentful"];

/// Module name fragments that mark frontend work, besides the `frontend` category
const FRONTEND_MARKERS: &[&str] = &["react", "vue", "svelte", "alpine", "angular", "htmx", "frontend"];

/// Module name fragments that mark TypeScript
const TYPESCRIPT_MARKERS: &[&str] = &["typescript"];

/// Run-level facts that are not part of the configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMeta {
    /// Project name, already defaulted to the directory name
    pub name: String,
    /// Project root
    pub root: PathBuf,
    /// Resolved toolkit directory
    pub toolkit: PathBuf,
}

/// `project` entry of the context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectContext {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub project_type: String,
}

/// `framework` entry of the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameworkContext {
    pub enabled: bool,
    pub doctrine: bool,
    pub directives: bool,
    pub playbooks: bool,
    pub enhancements: bool,
}

/// `toolkit` entry of the context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolkitContext {
    pub path: String,
}

/// One module or agent as templates see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub version: String,
    pub category: String,
    /// Body with project-level placeholders expanded
    pub content: String,
}

/// Everything a template can reference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataContext {
    pub project: ProjectContext,
    pub standards: Standards,
    pub paths: Map<String, Value>,
    pub naming: Map<String, Value>,
    pub framework: FrameworkContext,
    pub modules: Vec<ArtifactDescriptor>,
    pub agents: Vec<ArtifactDescriptor>,
    pub has_css_framework: bool,
    pub has_cms: bool,
    pub has_frontend: bool,
    pub has_typescript: bool,
    pub editors: Vec<String>,
    /// Contents of the configured `context` file, verbatim
    pub project_rules: String,
    pub toolkit: ToolkitContext,
}

impl DataContext {
    /// The context as a JSON tree, the form templates are rendered against.
    ///
    /// # Errors
    ///
    /// Fails only if a configuration map holds a value JSON cannot represent.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Project-level part of the context: everything except modules, agents and
    /// project rules. Artifact bodies are expanded against this.
    #[must_use]
    pub fn project_scope(&self) -> Value {
        json!({
            "project": {
                "name": self.project.name,
                "description": self.project.description,
                "type": self.project.project_type,
            },
            "standards": {
                "indentation": self.standards.indentation,
                "lineLength": self.standards.line_length,
                "language": self.standards.language,
            },
            "paths": self.paths,
            "naming": self.naming,
            "framework": {
                "enabled": self.framework.enabled,
                "doctrine": self.framework.doctrine,
                "directives": self.framework.directives,
                "playbooks": self.framework.playbooks,
                "enhancements": self.framework.enhancements,
            },
            "hasCssFramework": self.has_css_framework,
            "hasCms": self.has_cms,
            "hasFrontend": self.has_frontend,
            "hasTypescript": self.has_typescript,
            "editors": self.editors,
            "toolkit": { "path": self.toolkit.path },
        })
    }
}

/// Builds the [`DataContext`] of a run
pub struct ContextAssembler;

impl ContextAssembler {
    /// Assemble the context. Pure: no I/O, same inputs give the same context.
    ///
    /// `modules` is expected in dependency order; it is kept as given.
    #[must_use]
    pub fn assemble(
        config: &ProjectConfig,
        modules: &[Arc<Artifact>],
        agents: &[Arc<Artifact>],
        meta: &ProjectMeta,
        project_rules: &str,
    ) -> DataContext {
        let flags = config.framework;

        let mut ctx = DataContext {
            project: ProjectContext {
                name: meta.name.clone(),
                description: config.project.description.clone(),
                project_type: config.project.project_type.clone(),
            },
            standards: config.standards.clone(),
            paths: config.paths.clone(),
            naming: config.naming.clone(),
            framework: FrameworkContext {
                enabled: flags.enabled(),
                doctrine: flags.doctrine,
                directives: flags.directives,
                playbooks: flags.playbooks,
                enhancements: flags.enhancements,
            },
            modules: Vec::new(),
            agents: Vec::new(),
            has_css_framework: any_name_contains(modules, CSS_FRAMEWORK_MARKERS),
            has_cms: any_name_contains(modules, CMS_MARKERS),
            has_frontend: any_name_contains(modules, FRONTEND_MARKERS)
                || modules.iter().any(|m| m.category == "frontend"),
            has_typescript: any_name_contains(modules, TYPESCRIPT_MARKERS),
            editors: config.editors.iter().map(|e| e.id().to_string()).collect(),
            project_rules: project_rules.to_string(),
            toolkit: ToolkitContext {
                path: meta.toolkit.display().to_string(),
            },
        };

        let scope = ctx.project_scope();
        ctx.modules = modules.iter().map(|m| describe(m, &scope)).collect();
        ctx.agents = agents.iter().map(|a| describe(a, &scope)).collect();

        ctx
    }
}

fn describe(artifact: &Artifact, scope: &Value) -> ArtifactDescriptor {
    ArtifactDescriptor {
        name: artifact.name.clone(),
        slug: artifact.slug(),
        description: artifact.description().to_string(),
        version: artifact.version().to_string(),
        category: artifact.category.clone(),
        content: substitute(&artifact.body, scope),
    }
}

fn any_name_contains(modules: &[Arc<Artifact>], markers: &[&str]) -> bool {
    modules.iter().any(|module| {
        let name = module.name.to_lowercase();
        markers.iter().any(|marker| name.contains(marker))
    })
}
