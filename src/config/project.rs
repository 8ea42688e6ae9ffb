//! Typed view of the merged project configuration
//!
//! The merged document is deserialized with serde and then checked against the value
//! ranges aikit supports. Every range violation is collected so the user can fix them
//! all at once.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::AikitError;
use crate::outputs::Editor;

/// Naming conventions accepted in `naming`
pub const NAMING_CONVENTIONS: &[&str] = &["snake_case", "camelCase", "PascalCase", "kebab-case"];

/// Accepted `standards.indentation` range
pub const INDENTATION_RANGE: std::ops::RangeInclusive<i64> = 1..=8;

/// Accepted `standards.lineLength` range
pub const LINE_LENGTH_RANGE: std::ops::RangeInclusive<i64> = 80..=200;

/// Accepted `standards.language` values
pub const LANGUAGES: &[&str] = &["english"];

/// `project` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    /// Project name, defaults to the project directory name
    pub name: Option<String>,
    /// Free-form description
    pub description: String,
    /// Project type, e.g. `web`
    #[serde(rename = "type")]
    pub project_type: String,
}

/// `toolkit` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitSettings {
    /// Toolkit directory, relative to the project root; `~` and `$VAR` are expanded
    pub path: Option<String>,
}

/// `standards` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Standards {
    /// Spaces per indentation level
    pub indentation: i64,
    /// Maximum line length
    pub line_length: i64,
    /// Documentation language
    pub language: String,
}

impl Default for Standards {
    fn default() -> Self {
        Self {
            indentation: 4,
            line_length: 120,
            language: "english".to_string(),
        }
    }
}

/// Agent selection: one list for every agent-capable editor, or a list per editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentSelection {
    /// Same agents for every editor with agent support
    All(Vec<String>),
    /// Agents per editor id
    PerEditor(Map<String, Value>),
}

impl Default for AgentSelection {
    fn default() -> Self {
        Self::All(Vec::new())
    }
}

/// Editor selection: a list of ids, or a map of id to enabled flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditorSelection {
    /// Selected ids
    List(Vec<String>),
    /// `id → bool`
    Flags(Map<String, Value>),
}

impl Default for EditorSelection {
    fn default() -> Self {
        Self::List(vec!["claude".to_string()])
    }
}

/// `framework` as written: a switch, or individual parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameworkSetting {
    /// `true` enables every part
    Switch(bool),
    /// Individual parts; missing parts are off
    Parts(FrameworkFlags),
}

impl Default for FrameworkSetting {
    fn default() -> Self {
        Self::Switch(false)
    }
}

/// Resolved framework flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkFlags {
    /// Doctrine documents
    pub doctrine: bool,
    /// Directives
    pub directives: bool,
    /// Playbooks
    pub playbooks: bool,
    /// Enhancements
    pub enhancements: bool,
}

impl FrameworkFlags {
    /// Whether any part is enabled
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.doctrine || self.directives || self.playbooks || self.enhancements
    }
}

impl FrameworkSetting {
    /// Flags with the switch form expanded
    #[must_use]
    pub const fn flags(&self) -> FrameworkFlags {
        match self {
            Self::Switch(on) => FrameworkFlags {
                doctrine: *on,
                directives: *on,
                playbooks: *on,
                enhancements: *on,
            },
            Self::Parts(flags) => *flags,
        }
    }
}

// A `null` layer clears a section, so every section reads `null` as empty
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProjectConfig {
    #[serde(deserialize_with = "null_as_default")]
    project: ProjectInfo,
    #[serde(deserialize_with = "null_as_default")]
    toolkit: ToolkitSettings,
    #[serde(deserialize_with = "null_as_default")]
    modules: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    agents: AgentSelection,
    #[serde(deserialize_with = "null_as_no_editors")]
    editors: EditorSelection,
    #[serde(deserialize_with = "null_as_default")]
    paths: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    standards: Standards,
    #[serde(deserialize_with = "null_as_default")]
    naming: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    framework: FrameworkSetting,
    context: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_no_editors<'de, D>(deserializer: D) -> Result<EditorSelection, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EditorSelection>::deserialize(deserializer)?
        .unwrap_or_else(|| EditorSelection::List(Vec::new())))
}

/// Validated project configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    /// `project` section
    pub project: ProjectInfo,
    /// `toolkit` section
    pub toolkit: ToolkitSettings,
    /// Requested module names or glob patterns
    pub modules: Vec<String>,
    /// Agent selection as configured
    pub agents: AgentSelection,
    /// Selected editors, deduplicated, in configuration order
    pub editors: Vec<Editor>,
    /// Project paths, passed through to templates
    pub paths: Map<String, Value>,
    /// Coding standards
    pub standards: Standards,
    /// Naming conventions, passed through to templates
    pub naming: Map<String, Value>,
    /// Framework flags
    pub framework: FrameworkFlags,
    /// Project rules file, relative to the project root
    pub context: Option<String>,
}

impl ProjectConfig {
    /// Deserialize and validate a merged configuration document.
    ///
    /// # Errors
    ///
    /// - [`AikitError::UnknownEditor`] for an editor id that is not supported
    /// - [`AikitError::ConfigValidation`] listing every type or range violation
    pub fn from_value(value: &Value) -> Result<Self, AikitError> {
        let raw: RawProjectConfig =
            serde_json::from_value(value.clone()).map_err(|e| AikitError::ConfigValidation {
                issues: vec![e.to_string()],
            })?;

        let editors = parse_editors(&raw.editors)?;

        let mut issues = Vec::new();

        if let AgentSelection::PerEditor(map) = &raw.agents {
            for (editor_id, names) in map {
                Editor::parse(editor_id)?;
                if !names.is_array() {
                    issues.push(format!("agents.{editor_id} must be a list of agent names"));
                }
            }
        }

        if !INDENTATION_RANGE.contains(&raw.standards.indentation) {
            issues.push(format!(
                "standards.indentation must be between {} and {} (got {})",
                INDENTATION_RANGE.start(),
                INDENTATION_RANGE.end(),
                raw.standards.indentation
            ));
        }

        if !LINE_LENGTH_RANGE.contains(&raw.standards.line_length) {
            issues.push(format!(
                "standards.lineLength must be between {} and {} (got {})",
                LINE_LENGTH_RANGE.start(),
                LINE_LENGTH_RANGE.end(),
                raw.standards.line_length
            ));
        }

        if !LANGUAGES.contains(&raw.standards.language.as_str()) {
            issues.push(format!(
                "standards.language must be one of: {} (got '{}')",
                LANGUAGES.join(", "),
                raw.standards.language
            ));
        }

        for (key, convention) in &raw.naming {
            let valid = convention.as_str().is_some_and(|c| NAMING_CONVENTIONS.contains(&c));
            if !valid {
                issues.push(format!(
                    "naming.{key} must be one of: {} (got {convention})",
                    NAMING_CONVENTIONS.join(", ")
                ));
            }
        }

        if !issues.is_empty() {
            return Err(AikitError::ConfigValidation {
                issues,
            });
        }

        Ok(Self {
            project: raw.project,
            toolkit: raw.toolkit,
            modules: raw.modules,
            agents: raw.agents,
            editors,
            paths: raw.paths,
            standards: raw.standards,
            naming: raw.naming,
            framework: raw.framework.flags(),
            context: raw.context.filter(|c| !c.trim().is_empty()),
        })
    }

    /// Agents to write for `editor`
    ///
    /// Empty for editors without agent support.
    #[must_use]
    pub fn agents_for(&self, editor: Editor) -> Vec<String> {
        if !editor.supports_agents() {
            return Vec::new();
        }

        match &self.agents {
            AgentSelection::All(names) => names.clone(),
            AgentSelection::PerEditor(map) => map
                .iter()
                .filter(|(id, _)| Editor::from_id(id) == Some(editor))
                .flat_map(|(_, names)| string_list(names))
                .collect(),
        }
    }

    /// Union of the agents of every selected editor, in first-seen order
    #[must_use]
    pub fn selected_agents(&self) -> Vec<String> {
        let mut agents: Vec<String> = Vec::new();
        for editor in &self.editors {
            for name in self.agents_for(*editor) {
                if !agents.contains(&name) {
                    agents.push(name);
                }
            }
        }
        agents
    }

    /// Replace the editor selection, e.g. from `--editor` flags
    pub fn override_editors(&mut self, editors: Vec<Editor>) {
        let mut unique = Vec::with_capacity(editors.len());
        for editor in editors {
            if !unique.contains(&editor) {
                unique.push(editor);
            }
        }
        self.editors = unique;
    }
}

fn parse_editors(selection: &EditorSelection) -> Result<Vec<Editor>, AikitError> {
    let ids: Vec<&str> = match selection {
        EditorSelection::List(ids) => ids.iter().map(String::as_str).collect(),
        EditorSelection::Flags(flags) => flags
            .iter()
            .filter(|(_, enabled)| enabled.as_bool().unwrap_or(false))
            .map(|(id, _)| id.as_str())
            .collect(),
    };

    // Disabled entries in the map form must still name real editors
    if let EditorSelection::Flags(flags) = selection {
        for id in flags.keys() {
            Editor::parse(id)?;
        }
    }

    let mut editors = Vec::with_capacity(ids.len());
    for id in ids {
        let editor = Editor::parse(id)?;
        if !editors.contains(&editor) {
            editors.push(editor);
        }
    }
    Ok(editors)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_defaults;
    use crate::config::merge::deep_merge;
    use serde_json::json;

    fn config(overrides: Value) -> Result<ProjectConfig, AikitError> {
        ProjectConfig::from_value(&deep_merge(&builtin_defaults(), &overrides))
    }

    #[test]
    fn test_builtin_defaults_are_valid() {
        let config = config(json!({})).unwrap();
        assert_eq!(config.editors, vec![Editor::Claude]);
        assert_eq!(config.standards.indentation, 4);
        assert!(!config.framework.enabled());
    }

    #[test]
    fn test_collects_every_range_violation() {
        let err = config(json!({
            "standards": {"indentation": 12, "lineLength": 40, "language": "klingon"},
            "naming": {"files": "SCREAMING"}
        }))
        .unwrap_err();

        match err {
            AikitError::ConfigValidation {
                issues,
            } => {
                assert_eq!(issues.len(), 4, "{issues:?}");
                assert!(issues.iter().any(|i| i.contains("indentation")));
                assert!(issues.iter().any(|i| i.contains("lineLength")));
                assert!(issues.iter().any(|i| i.contains("language")));
                assert!(issues.iter().any(|i| i.contains("naming.files")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_editor_is_error() {
        let err = config(json!({"editors": ["claude", "notepad"]})).unwrap_err();
        assert!(matches!(err, AikitError::UnknownEditor { ref editor, .. } if editor == "notepad"));
    }

    #[test]
    fn test_editor_flag_map() {
        let config = config(json!({"editors": {"cursor": true, "claude": false, "codex": true}})).unwrap();
        assert_eq!(config.editors, vec![Editor::Cursor, Editor::Codex]);
    }

    #[test]
    fn test_agents_list_applies_to_agent_editors() {
        let config = config(json!({"editors": ["claude", "cursor"], "agents": ["reviewer"]})).unwrap();
        assert_eq!(config.agents_for(Editor::Claude), vec!["reviewer"]);
        assert!(config.agents_for(Editor::Cursor).is_empty());
        assert_eq!(config.selected_agents(), vec!["reviewer"]);
    }

    #[test]
    fn test_agents_map_per_editor() {
        let config = config(json!({"agents": {"claude": ["reviewer", "planner"]}})).unwrap();
        assert_eq!(config.selected_agents(), vec!["reviewer", "planner"]);
    }

    #[test]
    fn test_framework_forms() {
        assert!(config(json!({"framework": true})).unwrap().framework.playbooks);

        let parts = config(json!({"framework": {"doctrine": true}})).unwrap().framework;
        assert!(parts.enabled());
        assert!(parts.doctrine);
        assert!(!parts.playbooks);
    }

    #[test]
    fn test_type_error_is_validation_error() {
        let err = config(json!({"standards": {"indentation": "four"}})).unwrap_err();
        assert!(matches!(err, AikitError::ConfigValidation { .. }));
    }

    #[test]
    fn test_null_clears_modules() {
        let config = config(json!({"modules": null})).unwrap();
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_null_clears_paths() {
        let config = config(json!({"paths": null})).unwrap();
        assert!(config.paths.is_empty());
    }

    #[test]
    fn test_null_clears_naming() {
        let config = config(json!({"naming": null})).unwrap();
        assert!(config.naming.is_empty());
    }

    #[test]
    fn test_null_clears_agents() {
        let config = config(json!({"agents": null})).unwrap();
        assert_eq!(config.agents, AgentSelection::All(Vec::new()));
        assert!(config.selected_agents().is_empty());
    }

    #[test]
    fn test_null_clears_editors_and_sections() {
        let config = config(json!({
            "editors": null,
            "project": null,
            "standards": null,
            "framework": null,
            "toolkit": null
        }))
        .unwrap();
        assert!(config.editors.is_empty());
        assert_eq!(config.project, ProjectInfo::default());
        assert_eq!(config.standards, Standards::default());
        assert!(!config.framework.enabled());
    }

    #[test]
    fn test_override_editors_dedups() {
        let mut config = config(json!({})).unwrap();
        config.override_editors(vec![Editor::Cursor, Editor::Cursor, Editor::Claude]);
        assert_eq!(config.editors, vec![Editor::Cursor, Editor::Claude]);
    }
}
