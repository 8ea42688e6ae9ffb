//! Configuration management for aikit
//!
//! aikit reads its configuration from three layers, merged lowest precedence first:
//!
//! 1. **Built-in defaults** compiled into the binary ([`builtin_defaults`])
//! 2. **Toolkit defaults** from `<toolkit>/config/defaults.{json,yaml,yml,toml}`
//! 3. **Project configuration** from `aikit.{json,yaml,yml,toml}` in the project root
//!
//! The merge is a deep merge (see [`merge`]): objects merge by key, arrays and scalars
//! replace, `null` clears. The merged document is then validated into a typed
//! [`ProjectConfig`].
//!
//! # Project Configuration
//!
//! ```json
//! {
//!   "project": { "name": "acme-site", "type": "web" },
//!   "modules": ["tailwind", "frontend/*"],
//!   "agents": ["reviewer"],
//!   "editors": ["claude", "cursor"],
//!   "standards": { "indentation": 2, "lineLength": 100 },
//!   "framework": { "doctrine": true },
//!   "context": "docs/PROJECT_RULES.md"
//! }
//! ```
//!
//! # Toolkit Location
//!
//! The toolkit directory is resolved in this order:
//!
//! 1. `--toolkit` on the command line (or the `AIKIT_TOOLKIT` environment variable,
//!    which clap maps onto the same flag)
//! 2. `toolkit.path` in the project configuration, relative to the project root, with
//!    `~` and `$VAR` expanded
//! 3. `<data dir>/aikit/toolkit` (e.g. `~/.local/share/aikit/toolkit` on Linux)
//!
//! A toolkit directory that does not exist is a fatal configuration error.

pub mod merge;
pub mod parser;
pub mod project;

pub use merge::{deep_merge, merge_layers};
pub use parser::{find_document, parse_document};
pub use project::{AgentSelection, FrameworkFlags, ProjectConfig, Standards};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{
    PROJECT_CONFIG_FILES, TOOLKIT_CONFIG_DIR, TOOLKIT_DEFAULTS_FILES,
};
use crate::core::AikitError;

/// Built-in defaults, the lowest configuration layer
#[must_use]
pub fn builtin_defaults() -> Value {
    json!({
        "project": {
            "name": null,
            "description": "",
            "type": "web"
        },
        "toolkit": {
            "path": null
        },
        "modules": [],
        "agents": [],
        "editors": ["claude"],
        "paths": {
            "css": "src/css",
            "typescript": "src/ts",
            "javascript": "src/js",
            "components": "templates/_components",
            "views": "templates",
            "layouts": "templates/_layouts",
            "filters": "src/filters",
            "forms": "src/forms",
            "public": "web"
        },
        "standards": {
            "indentation": 4,
            "language": "english",
            "lineLength": 120
        },
        "naming": {
            "variables": "camelCase",
            "functions": "camelCase",
            "classes": "PascalCase",
            "files": "kebab-case",
            "database": "snake_case"
        },
        "framework": false,
        "context": null
    })
}

/// Configuration loaded for one run
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Merged configuration document, all layers applied
    pub merged: Value,
    /// Validated, typed configuration
    pub config: ProjectConfig,
    /// Project root directory
    pub project_dir: PathBuf,
    /// Project configuration file that was read
    pub project_file: PathBuf,
    /// Toolkit defaults file, when the toolkit ships one
    pub toolkit_defaults_file: Option<PathBuf>,
    /// Resolved toolkit directory
    pub toolkit_dir: PathBuf,
}

/// Load, merge and validate the configuration of the project in `project_dir`.
///
/// `toolkit_override` is the `--toolkit` flag (or `AIKIT_TOOLKIT`).
///
/// # Errors
///
/// - [`AikitError::ConfigNotFound`] when the project has no configuration file
/// - [`AikitError::ConfigParse`] when a layer is not valid JSON, YAML or TOML
/// - [`AikitError::ToolkitNotFound`] when the resolved toolkit does not exist
/// - [`AikitError::ConfigValidation`] / [`AikitError::UnknownEditor`] from validation
pub fn load_config(project_dir: &Path, toolkit_override: Option<&Path>) -> Result<LoadedConfig> {
    let project_file = find_document(project_dir, PROJECT_CONFIG_FILES).ok_or_else(|| {
        AikitError::ConfigNotFound {
            path: project_dir.display().to_string(),
            expected: PROJECT_CONFIG_FILES.join(", "),
        }
    })?;
    debug!("Reading project configuration from {}", project_file.display());
    let project_layer = parse_document(&project_file)?;

    let toolkit_dir = resolve_toolkit_dir(toolkit_override, project_dir, &project_layer)?;
    info!("Using toolkit at {}", toolkit_dir.display());

    let defaults_dir = toolkit_dir.join(TOOLKIT_CONFIG_DIR);
    let toolkit_defaults_file = find_document(&defaults_dir, TOOLKIT_DEFAULTS_FILES);

    let mut layers = vec![builtin_defaults()];
    if let Some(path) = &toolkit_defaults_file {
        debug!("Reading toolkit defaults from {}", path.display());
        layers.push(parse_document(path)?);
    }
    layers.push(project_layer);

    let merged = merge_layers(&layers);
    let config = ProjectConfig::from_value(&merged)?;

    Ok(LoadedConfig {
        merged,
        config,
        project_dir: project_dir.to_path_buf(),
        project_file,
        toolkit_defaults_file,
        toolkit_dir,
    })
}

/// Resolve the toolkit directory.
///
/// `project_layer` is the project document before merging, so only the project can
/// point at a toolkit.
///
/// # Errors
///
/// Returns [`AikitError::ToolkitNotFound`] if the resolved directory does not exist, or
/// an error if `toolkit.path` references an undefined environment variable.
pub fn resolve_toolkit_dir(
    toolkit_override: Option<&Path>,
    project_dir: &Path,
    project_layer: &Value,
) -> Result<PathBuf> {
    let candidate = if let Some(path) = toolkit_override {
        debug!("Toolkit from command line or AIKIT_TOOLKIT: {}", path.display());
        path.to_path_buf()
    } else if let Some(configured) =
        project_layer.pointer("/toolkit/path").and_then(Value::as_str).filter(|p| !p.is_empty())
    {
        let expanded = shellexpand::full(configured)
            .with_context(|| format!("Failed to expand toolkit.path '{configured}'"))?;
        let path = PathBuf::from(expanded.as_ref());
        debug!("Toolkit from toolkit.path: {}", path.display());
        if path.is_absolute() { path } else { project_dir.join(path) }
    } else {
        default_toolkit_dir()?
    };

    if !candidate.is_dir() {
        return Err(AikitError::ToolkitNotFound {
            path: candidate.display().to_string(),
        }
        .into());
    }

    Ok(candidate)
}

/// `<data dir>/aikit/toolkit`
///
/// # Errors
///
/// Returns an error on platforms without a data directory.
pub fn default_toolkit_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("aikit").join("toolkit"))
        .ok_or_else(|| anyhow::anyhow!("Unable to determine the user data directory"))
}

/// Project name: `project.name` when set, else the directory name
#[must_use]
pub fn project_name(config: &ProjectConfig, project_dir: &Path) -> String {
    config
        .project
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| {
            let canonical = project_dir.canonicalize().unwrap_or_else(|_| project_dir.to_path_buf());
            canonical.file_name().map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::Editor;
    use tempfile::tempdir;

    #[test]
    fn test_load_three_layers() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("site");
        let toolkit = temp.path().join("toolkit");
        std::fs::create_dir_all(toolkit.join("config")).unwrap();
        std::fs::create_dir_all(&project).unwrap();

        std::fs::write(
            toolkit.join("config/defaults.json"),
            r#"{"standards": {"indentation": 2, "lineLength": 100}, "editors": ["cursor"]}"#,
        )
        .unwrap();
        std::fs::write(
            project.join("aikit.json"),
            r#"{"standards": {"lineLength": 90}, "toolkit": {"path": "../toolkit"}}"#,
        )
        .unwrap();

        let loaded = load_config(&project, None).unwrap();

        assert_eq!(loaded.config.standards.indentation, 2);
        assert_eq!(loaded.config.standards.line_length, 90);
        assert_eq!(loaded.config.standards.language, "english");
        assert_eq!(loaded.config.editors, vec![Editor::Cursor]);
        assert!(loaded.toolkit_defaults_file.is_some());
    }

    #[test]
    fn test_missing_project_config() {
        let temp = tempdir().unwrap();
        let err = load_config(temp.path(), Some(temp.path())).unwrap_err();
        assert!(matches!(err.downcast_ref::<AikitError>(), Some(AikitError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_override_beats_configured_path() {
        let temp = tempdir().unwrap();
        let explicit = temp.path().join("explicit");
        std::fs::create_dir_all(&explicit).unwrap();

        let resolved = resolve_toolkit_dir(
            Some(&explicit),
            temp.path(),
            &json!({"toolkit": {"path": "does-not-exist"}}),
        )
        .unwrap();

        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_missing_toolkit_is_fatal() {
        let temp = tempdir().unwrap();
        let err = resolve_toolkit_dir(None, temp.path(), &json!({"toolkit": {"path": "nope"}}))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<AikitError>(), Some(AikitError::ToolkitNotFound { .. })));
    }

    #[test]
    fn test_project_name_defaults_to_directory() {
        let temp = tempdir().unwrap();
        let project = temp.path().join("acme-site");
        std::fs::create_dir_all(&project).unwrap();

        let config = ProjectConfig::from_value(&builtin_defaults()).unwrap();
        assert_eq!(project_name(&config, &project), "acme-site");

        let named = ProjectConfig::from_value(&deep_merge(
            &builtin_defaults(),
            &json!({"project": {"name": "Acme"}}),
        ))
        .unwrap();
        assert_eq!(project_name(&named, &project), "Acme");
    }
}
