//! The synthesis pipeline.
//!
//! One run, top to bottom:
//!
//! 1. load and merge the configuration layers
//! 2. expand module patterns and resolve `requires` transitively
//! 3. load the resolved modules, check conflicts, order dependencies first
//! 4. load the selected agents and the project rules file
//! 5. assemble the data context
//! 6. load every selected template and validate all of them
//! 7. render, add agent files and skill rules
//! 8. remove directories owned by editors that are not selected
//! 9. write everything incrementally
//!
//! Every fatal error (configuration, conflicts, missing templates, unbound variables)
//! happens before step 8, so a failing run leaves the project untouched. Write failures
//! are collected and reported after every output was attempted.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::ArtifactCache;
use crate::config::{LoadedConfig, load_config, project_name};
use crate::core::{AikitError, Artifact, ArtifactKind};
use crate::loader::{ArtifactLoader, CachedModules};
use crate::markdown::compose_document;
use crate::outputs::skill_rules::{SKILL_RULES_OUTPUT, collect_skill_rules, render_skill_rules};
use crate::outputs::{Editor, OutputBinding, bindings_for, cleanup_dirs};
use crate::pattern::{expand_requests, is_pattern};
use crate::resolver::{check_conflicts, order_by_requirements, resolve};
use crate::templating::{
    CompiledTemplate, ContextAssembler, DataContext, ProjectMeta, TemplateError, TemplateRenderer,
    substitute, validate_or_err,
};
use crate::utils::remove_dir_all;
use crate::writer::{IncrementalWriter, WriteStats};

/// Per-run options from the command line
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    /// Replaces the configured editors when not empty
    pub editors: Vec<Editor>,
    /// Report what would change without touching the filesystem
    pub dry_run: bool,
}

/// Modules after pattern expansion, resolution and conflict checking
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Requests after pattern expansion
    pub requested: Vec<String>,
    /// Resolved names, resolution order
    pub resolved: Vec<String>,
    /// Loaded modules, dependencies first
    pub modules: Vec<Arc<Artifact>>,
    /// Resolved names that could not be loaded
    pub missing: Vec<String>,
    /// Conflict and missing-dependency messages
    pub conflicts: Vec<String>,
}

/// Everything needed to render, validated
#[derive(Debug)]
pub struct SynthesisPlan {
    pub resolution: Resolution,
    pub agents: Vec<Arc<Artifact>>,
    pub context: DataContext,
    pub context_value: Value,
    pub templates: Vec<(OutputBinding, Arc<CompiledTemplate>)>,
    /// Optional variables templates use but the context does not set
    pub warnings: Vec<String>,
}

/// Outcome of [`Synthesizer::run`]
#[derive(Debug, Clone, Default)]
pub struct SynthesisReport {
    /// Every generated output, relative to the project root
    pub outputs: Vec<PathBuf>,
    /// Editor directories removed (or, in dry-run mode, that would be removed)
    pub removed_dirs: Vec<PathBuf>,
    pub stats: WriteStats,
    pub modules: Vec<String>,
    pub agents: Vec<String>,
    pub dry_run: bool,
}

/// Drives one synthesis run. Owns the run's artifact cache.
#[derive(Debug)]
pub struct Synthesizer {
    loaded: LoadedConfig,
    loader: ArtifactLoader,
    cache: ArtifactCache,
    renderer: TemplateRenderer,
    dry_run: bool,
}

impl Synthesizer {
    /// Load the configuration of `project_dir` and set up a run.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from [`load_config`].
    pub fn from_project(
        project_dir: &Path,
        toolkit_override: Option<&Path>,
        options: SynthesisOptions,
    ) -> Result<Self> {
        let loaded = load_config(project_dir, toolkit_override)?;
        Ok(Self::new(loaded, options))
    }

    /// Set up a run over an already loaded configuration
    #[must_use]
    pub fn new(mut loaded: LoadedConfig, options: SynthesisOptions) -> Self {
        if !options.editors.is_empty() {
            loaded.config.override_editors(options.editors);
        }
        let loader = ArtifactLoader::new(&loaded.project_dir, &loaded.toolkit_dir);

        Self {
            loaded,
            loader,
            cache: ArtifactCache::new(),
            renderer: TemplateRenderer::new(),
            dry_run: options.dry_run,
        }
    }

    /// Loaded configuration of this run
    pub fn loaded(&self) -> &LoadedConfig {
        &self.loaded
    }

    /// The run's loader
    pub fn loader(&self) -> &ArtifactLoader {
        &self.loader
    }

    /// Expand, resolve, load, check and order the configured modules.
    ///
    /// Conflicts are reported in the result, not raised.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid module patterns or unreadable module files.
    pub fn resolve_modules(&mut self) -> Result<Resolution> {
        let requests = &self.loaded.config.modules;

        // `category/name` requests need the listing too
        let requested = if requests.iter().any(|r| is_pattern(r) || r.contains('/')) {
            let available = self.loader.list_available(ArtifactKind::Module);
            expand_requests(requests, &available)?
        } else {
            expand_requests(requests, &[])?
        };

        let resolved = {
            let mut provider = CachedModules::new(&self.loader, &mut self.cache);
            resolve(&requested, &mut provider)?
        };
        debug!("Resolved modules: {}", resolved.join(", "));

        let mut loaded = Vec::with_capacity(resolved.len());
        let mut missing = Vec::new();
        for name in &resolved {
            match self.loader.load(&mut self.cache, ArtifactKind::Module, name)? {
                Some(module) => loaded.push(module),
                None => missing.push(name.clone()),
            }
        }

        let conflicts = check_conflicts(&loaded);
        let modules = order_by_requirements(&loaded);

        Ok(Resolution {
            requested,
            resolved,
            modules,
            missing,
            conflicts,
        })
    }

    /// Load the agents selected for the configured editors. Missing agents are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing agent file cannot be read.
    pub fn load_agents(&mut self) -> Result<Vec<Arc<Artifact>>> {
        let mut agents = Vec::new();
        for name in self.loaded.config.selected_agents() {
            if let Some(agent) = self.loader.load(&mut self.cache, ArtifactKind::Agent, &name)? {
                agents.push(agent);
            }
        }
        Ok(agents)
    }

    /// Contents of the configured project rules file, or empty when none is configured
    ///
    /// # Errors
    ///
    /// Returns [`AikitError::ProjectRulesUnreadable`] when the file cannot be read.
    pub fn read_project_rules(&self) -> Result<String> {
        let Some(configured) = self.loaded.config.context.as_deref().filter(|c| !c.is_empty()) else {
            return Ok(String::new());
        };

        let path = self.loaded.project_dir.join(configured);
        std::fs::read_to_string(&path).map_err(|e| {
            AikitError::ProjectRulesUnreadable {
                path: configured.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Run everything up to rendering: resolution, conflicts, context, template
    /// loading and validation of every selected template.
    ///
    /// # Errors
    ///
    /// - [`AikitError::ModuleConflicts`] with every conflict
    /// - [`AikitError::ProjectRulesUnreadable`]
    /// - [`AikitError::TemplateNotFound`] for the first missing template
    /// - [`AikitError::TemplateValidation`] with every failing template
    pub fn prepare(&mut self) -> Result<SynthesisPlan> {
        let resolution = self.resolve_modules()?;
        if !resolution.conflicts.is_empty() {
            return Err(AikitError::ModuleConflicts {
                messages: resolution.conflicts,
            }
            .into());
        }
        info!("Using {} module(s)", resolution.modules.len());

        let agents = self.load_agents()?;
        let project_rules = self.read_project_rules()?;

        let meta = ProjectMeta {
            name: project_name(&self.loaded.config, &self.loaded.project_dir),
            root: self.loaded.project_dir.clone(),
            toolkit: self.loaded.toolkit_dir.clone(),
        };
        let context = ContextAssembler::assemble(
            &self.loaded.config,
            &resolution.modules,
            &agents,
            &meta,
            &project_rules,
        );
        let context_value = context.to_value().context("Failed to serialize the template context")?;

        let templates = self.load_templates()?;

        let mut failures = Vec::new();
        let mut warnings = Vec::new();
        for (_, template) in &templates {
            match validate_or_err(template.name(), template.validation_source(), &context_value) {
                Ok(report) => {
                    for name in report.warnings {
                        if !warnings.contains(&name) {
                            warnings.push(name);
                        }
                    }
                }
                Err(e) => failures.push(describe_failure(&e)),
            }
        }

        if !failures.is_empty() {
            return Err(AikitError::TemplateValidation {
                failures,
            }
            .into());
        }

        Ok(SynthesisPlan {
            resolution,
            agents,
            context,
            context_value,
            templates,
            warnings,
        })
    }

    fn load_templates(&mut self) -> Result<Vec<(OutputBinding, Arc<CompiledTemplate>)>> {
        let mut templates = Vec::new();

        for binding in bindings_for(&self.loaded.config.editors) {
            let file_name = binding.template_file();
            let template = self.loader.load_template(&mut self.cache, &file_name)?.ok_or_else(|| {
                AikitError::TemplateNotFound {
                    template: file_name.clone(),
                    searched: self
                        .loader
                        .template_dirs()
                        .iter()
                        .map(|d| d.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                }
            })?;
            templates.push((binding, template));
        }

        Ok(templates)
    }

    /// Render every output of a validated plan, keyed by path relative to the project
    ///
    /// # Errors
    ///
    /// Returns the first render failure.
    pub fn render(&mut self, plan: &SynthesisPlan) -> Result<BTreeMap<PathBuf, String>> {
        let mut outputs = BTreeMap::new();

        for (binding, template) in &plan.templates {
            let text = self.renderer.render(template, &plan.context_value)?;
            outputs.insert(PathBuf::from(binding.output_path), text);
        }

        let scope = plan.context.project_scope();
        for editor in self.loaded.config.editors.clone() {
            let Some(dir) = editor.agents_dir() else {
                continue;
            };
            for name in self.loaded.config.agents_for(editor) {
                let Some(agent) = self.loader.load(&mut self.cache, ArtifactKind::Agent, &name)? else {
                    continue;
                };
                let body = substitute(&agent.body, &scope);
                let document = compose_document(agent.raw_frontmatter.as_deref(), &body);
                outputs.insert(dir.join(format!("{}.md", agent.name)), document);
            }
        }

        if self.loaded.config.editors.contains(&Editor::Claude) {
            if let Some(rules) = collect_skill_rules(&plan.resolution.modules) {
                let text = render_skill_rules(&rules).context("Failed to serialize skill rules")?;
                outputs.insert(PathBuf::from(SKILL_RULES_OUTPUT), text);
            }
        }

        Ok(outputs)
    }

    /// Remove directories owned by editors that are not selected.
    /// In dry-run mode, only report them.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing directory cannot be removed.
    pub fn cleanup(&self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();

        for rel in cleanup_dirs(&self.loaded.config.editors) {
            let path = self.loaded.project_dir.join(&rel);
            if !path.is_dir() {
                continue;
            }
            if self.dry_run {
                info!("Would remove {}", rel.display());
            } else {
                remove_dir_all(&path)?;
                info!("Removed {}", rel.display());
            }
            removed.push(rel);
        }

        Ok(removed)
    }

    /// Run the whole pipeline.
    ///
    /// # Errors
    ///
    /// Any error of [`prepare`](Self::prepare) or [`render`](Self::render), or
    /// [`AikitError::WriteFailed`] after every output was attempted.
    pub fn run(&mut self) -> Result<SynthesisReport> {
        let plan = self.prepare()?;
        for name in &plan.warnings {
            debug!("Optional template variable '{}' is not set", name);
        }

        let outputs = self.render(&plan)?;
        let removed_dirs = self.cleanup()?;

        let writer = IncrementalWriter::new(&self.loaded.project_dir).dry_run(self.dry_run);
        let stats = writer.write_many(&outputs);

        debug!(
            "Artifact cache: {} entries, {} templates, {}",
            self.cache.artifact_count(),
            self.cache.template_count(),
            self.cache.stats()
        );

        if !stats.is_success() {
            warn!("{} written, {} unchanged, {} failed", stats.written, stats.skipped, stats.failed);
            return Err(AikitError::WriteFailed {
                failed: stats.failed,
                errors: stats
                    .errors
                    .iter()
                    .map(|f| format!("{}: {}", f.path.display(), f.message))
                    .collect(),
            }
            .into());
        }

        Ok(SynthesisReport {
            outputs: outputs.into_keys().collect(),
            removed_dirs,
            stats,
            modules: plan.resolution.modules.iter().map(|m| m.name.clone()).collect(),
            agents: plan.agents.iter().map(|a| a.name.clone()).collect(),
            dry_run: self.dry_run,
        })
    }
}

/// One line per failing template, with suggestions
fn describe_failure(error: &TemplateError) -> String {
    let TemplateError::UnboundVariables {
        suggestions,
        ..
    } = error
    else {
        return error.to_string();
    };

    let hints: Vec<String> = suggestions
        .iter()
        .filter_map(|(name, close)| close.first().map(|c| format!("'{name}' -> '{c}'")))
        .collect();

    if hints.is_empty() {
        error.to_string()
    } else {
        format!("{} (did you mean: {})", error, hints.join(", "))
    }
}
