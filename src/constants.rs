//! Global constants used throughout the aikit codebase.
//!
//! File names, directory layout of a toolkit and the optional-variable allow-list live
//! here so the loader, the pipeline and the tests agree on them.

/// Project configuration file names, tried in this order.
pub const PROJECT_CONFIG_FILES: &[&str] = &["aikit.json", "aikit.yaml", "aikit.yml", "aikit.toml"];

/// Toolkit defaults file stems under `<toolkit>/config/`, tried with the same extensions.
pub const TOOLKIT_DEFAULTS_FILES: &[&str] =
    &["defaults.json", "defaults.yaml", "defaults.yml", "defaults.toml"];

/// Directory (relative to the toolkit root) holding the defaults document.
pub const TOOLKIT_CONFIG_DIR: &str = "config";

/// Project-local override directory, searched before the toolkit.
pub const PROJECT_OVERRIDE_DIR: &str = ".aikit";

/// Directory holding editor templates inside a search root.
pub const TEMPLATES_DIR: &str = "templates";

/// Template file extension.
pub const TEMPLATE_EXTENSION: &str = "md";

/// Artifact file extension.
pub const ARTIFACT_EXTENSION: &str = "md";

/// Categorized subdirectories searched after the legacy flat location.
pub const ARTIFACT_CATEGORIES: &[&str] = &["core", "frontend"];

/// Extra categorized subdirectory searched for agents only.
pub const AGENT_TOOLS_CATEGORY: &str = "tools";

/// Category used when neither metadata nor directory provides one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Suffix of skill-rule side-car files next to module files.
pub const SKILL_RULES_SUFFIX: &str = ".skill-rules.json";

/// Environment variable overriding the toolkit location.
pub const TOOLKIT_ENV_VAR: &str = "AIKIT_TOOLKIT";

/// Template variables that only produce a warning when unbound.
pub const OPTIONAL_TEMPLATE_VARIABLES: &[&str] =
    &["projectRules", "customInstructions", "toolkitVersion"];
