//! Artifact and template loading
//!
//! Artifacts are looked up in two search roots, in order:
//!
//! 1. the project override directory `<project>/.aikit`
//! 2. the toolkit root
//!
//! Within a root the legacy flat location `<root>/<modules|agents>/<name>.md` is tried
//! first, then the categorized locations `core/` and `frontend/`, and for agents also
//! `tools/`. The first existing file wins, so a project can shadow any toolkit module by
//! dropping a file of the same name into `.aikit/modules/`.
//!
//! Templates are looked up the same way in `<project>/.aikit/templates` and then
//! `<toolkit>/templates`.
//!
//! All lookups go through the per-run [`ArtifactCache`].

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::cache::{ArtifactCache, ArtifactKey};
use crate::constants::{
    AGENT_TOOLS_CATEGORY, ARTIFACT_CATEGORIES, ARTIFACT_EXTENSION, DEFAULT_CATEGORY,
    PROJECT_OVERRIDE_DIR, SKILL_RULES_SUFFIX, TEMPLATES_DIR,
};
use crate::core::{Artifact, ArtifactKind, ArtifactMetadata, ArtifactRef};
use crate::markdown::FrontmatterParser;
use crate::resolver::ArtifactProvider;
use crate::templating::CompiledTemplate;
use crate::utils::is_safe_artifact_name;

/// Loads modules, agents and templates from the search roots
#[derive(Debug)]
pub struct ArtifactLoader {
    roots: Vec<PathBuf>,
    parser: FrontmatterParser,
}

impl ArtifactLoader {
    /// Loader searching `<project_dir>/.aikit`, then `toolkit_dir`
    #[must_use]
    pub fn new(project_dir: &Path, toolkit_dir: &Path) -> Self {
        Self::with_roots(vec![project_dir.join(PROJECT_OVERRIDE_DIR), toolkit_dir.to_path_buf()])
    }

    /// Loader over explicit search roots, highest precedence first
    #[must_use]
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            parser: FrontmatterParser::new(),
        }
    }

    /// Search roots, highest precedence first
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Load an artifact by name.
    ///
    /// Returns `Ok(None)` when no search root has it; that case is logged as a warning
    /// the first time it is seen in a run. Unsafe names (empty, with separators or `..`)
    /// are treated as missing.
    ///
    /// # Errors
    ///
    /// Returns an error when an existing artifact file cannot be read.
    pub fn load(
        &self,
        cache: &mut ArtifactCache,
        kind: ArtifactKind,
        name: &str,
    ) -> Result<Option<Arc<Artifact>>> {
        if !is_safe_artifact_name(name) {
            warn!("Ignoring {} with invalid name '{}'", kind, name);
            return Ok(None);
        }

        let mut searched = false;

        for root in &self.roots {
            let key = ArtifactKey::new(kind, name, root);
            match cache.get_artifact(&key) {
                Some(Some(artifact)) => return Ok(Some(artifact)),
                Some(None) => continue,
                None => {}
            }

            let found = self.load_from_root(root, kind, name)?;
            debug!("Cache fill {} -> {}", key, if found.is_some() { "found" } else { "missing" });
            cache.insert_artifact(key, found.clone());
            searched = true;

            if found.is_some() {
                return Ok(found);
            }
        }

        if searched {
            warn!("{} '{}' not found in any search root, skipping it", capitalize(kind.as_str()), name);
        }

        Ok(None)
    }

    fn load_from_root(
        &self,
        root: &Path,
        kind: ArtifactKind,
        name: &str,
    ) -> Result<Option<Arc<Artifact>>> {
        for (path, category) in candidate_paths(root, kind, name) {
            if !path.is_file() {
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {} file: {}", kind, path.display()))?;

            return Ok(Some(Arc::new(self.parse_artifact(kind, name, &content, &path, category))));
        }

        Ok(None)
    }

    fn parse_artifact(
        &self,
        kind: ArtifactKind,
        name: &str,
        content: &str,
        path: &Path,
        dir_category: Option<&str>,
    ) -> Artifact {
        let parsed = self.parser.parse(content);

        if let Some(error) = &parsed.parse_error {
            warn!(
                "Unable to parse front matter of {}; using it without metadata: {}",
                path.display(),
                error
            );
        }

        let metadata = parsed
            .data
            .as_ref()
            .map(|data| ArtifactMetadata::from_yaml(data, name))
            .unwrap_or_default();

        let category = metadata
            .category
            .clone()
            .or_else(|| dir_category.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Artifact {
            kind,
            name: name.to_string(),
            metadata,
            category,
            body: parsed.content,
            raw_frontmatter: parsed.raw_frontmatter,
            source_path: path.to_path_buf(),
        }
    }

    /// Every artifact file of `kind` under every search root.
    ///
    /// Only locations [`load`](Self::load) would search are listed. When a name exists in
    /// several places, the one `load` would pick is listed. Sorted by qualified name.
    pub fn list_available(&self, kind: ArtifactKind) -> Vec<ArtifactRef> {
        let mut found: Vec<ArtifactRef> = Vec::new();

        for root in &self.roots {
            let base = root.join(kind.dir_name());
            if !base.is_dir() {
                continue;
            }

            let mut in_root: Vec<ArtifactRef> = WalkDir::new(&base)
                .min_depth(1)
                .max_depth(2)
                .follow_links(false)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| artifact_ref(&base, entry.path(), kind))
                .collect();

            // Same precedence as candidate_paths: flat first, then category order
            in_root.sort_by_key(|r| category_rank(kind, r.category.as_deref()));

            for reference in in_root {
                if !found.iter().any(|existing| existing.name == reference.name) {
                    found.push(reference);
                }
            }
        }

        found.sort_by_key(ArtifactRef::qualified_name);
        found
    }

    /// Template search directories, highest precedence first
    #[must_use]
    pub fn template_dirs(&self) -> Vec<PathBuf> {
        self.roots.iter().map(|root| root.join(TEMPLATES_DIR)).collect()
    }

    /// Find and compile a template file such as `claude.md`.
    ///
    /// Returns `Ok(None)` when no template directory has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to compile.
    pub fn load_template(
        &self,
        cache: &mut ArtifactCache,
        file_name: &str,
    ) -> Result<Option<Arc<CompiledTemplate>>> {
        let Some(path) = self.template_dirs().into_iter().map(|dir| dir.join(file_name)).find(|p| p.is_file())
        else {
            return Ok(None);
        };

        let absolute = path.canonicalize().unwrap_or_else(|_| path.clone());
        if let Some(template) = cache.get_template(&absolute) {
            return Ok(Some(template));
        }

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;
        let template = Arc::new(CompiledTemplate::compile(file_name, &source, &path)?);
        debug!("Compiled template {}", path.display());

        cache.insert_template(absolute, Arc::clone(&template));
        Ok(Some(template))
    }
}

/// Candidate files for `name` in `root`, in precedence order, with their category
fn candidate_paths(root: &Path, kind: ArtifactKind, name: &str) -> Vec<(PathBuf, Option<&'static str>)> {
    let base = root.join(kind.dir_name());
    let file_name = format!("{name}.{ARTIFACT_EXTENSION}");

    let mut candidates = vec![(base.join(&file_name), None)];
    for category in searched_categories(kind) {
        candidates.push((base.join(category).join(&file_name), Some(category)));
    }
    candidates
}

fn searched_categories(kind: ArtifactKind) -> Vec<&'static str> {
    let mut categories = ARTIFACT_CATEGORIES.to_vec();
    if kind == ArtifactKind::Agent {
        categories.push(AGENT_TOOLS_CATEGORY);
    }
    categories
}

fn category_rank(kind: ArtifactKind, category: Option<&str>) -> usize {
    match category {
        None => 0,
        Some(category) => {
            searched_categories(kind).iter().position(|c| *c == category).map_or(usize::MAX, |i| i + 1)
        }
    }
}

fn artifact_ref(base: &Path, path: &Path, kind: ArtifactKind) -> Option<ArtifactRef> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.ends_with(SKILL_RULES_SUFFIX) {
        return None;
    }
    if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXTENSION) {
        return None;
    }

    let name = path.file_stem()?.to_str()?.to_string();
    let relative = path.strip_prefix(base).ok()?;
    let category = match relative.parent().and_then(|p| p.to_str()) {
        None | Some("") => None,
        Some(dir) if searched_categories(kind).contains(&dir) => Some(dir.to_string()),
        Some(_) => return None,
    };

    Some(ArtifactRef {
        kind,
        name,
        category,
        path: path.to_path_buf(),
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// An [`ArtifactProvider`] serving modules through a loader and a run's cache
#[derive(Debug)]
pub struct CachedModules<'a> {
    loader: &'a ArtifactLoader,
    cache: &'a mut ArtifactCache,
}

impl<'a> CachedModules<'a> {
    /// Wrap a loader and a cache
    pub fn new(loader: &'a ArtifactLoader, cache: &'a mut ArtifactCache) -> Self {
        Self {
            loader,
            cache,
        }
    }
}

impl ArtifactProvider for CachedModules<'_> {
    fn load_module(&mut self, name: &str) -> Result<Option<Arc<Artifact>>> {
        self.loader.load(self.cache, ArtifactKind::Module, name)
    }
}
