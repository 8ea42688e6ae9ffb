//! Editor targets and the output binding table
//!
//! Each supported editor owns one template and one output path, and some own
//! directories that aikit manages wholesale (agent files, skill rules, rule folders).
//! The table is static; a run filters it by the selected editors.
//!
//! | Editor | Template | Output |
//! |---|---|---|
//! | `claude` | `claude` | `CLAUDE.md` |
//! | `cursor` | `cursor` | `.cursor/rules/project.mdc` |
//! | `copilot` | `copilot` | `.github/copilot-instructions.md` |
//! | `windsurf` | `windsurf` | `.windsurf/rules/project.md` |
//! | `codex` | `agents` | `AGENTS.md` |

pub mod skill_rules;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::AikitError;

/// A supported AI coding assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Editor {
    /// Claude Code
    Claude,
    /// Cursor
    Cursor,
    /// GitHub Copilot
    Copilot,
    /// Windsurf
    Windsurf,
    /// OpenAI Codex (reads `AGENTS.md`)
    Codex,
}

impl Editor {
    /// Every editor, in table order
    pub const ALL: [Self; 5] = [Self::Claude, Self::Cursor, Self::Copilot, Self::Windsurf, Self::Codex];

    /// Identifier used in configuration files and on the command line
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Cursor => "cursor",
            Self::Copilot => "copilot",
            Self::Windsurf => "windsurf",
            Self::Codex => "codex",
        }
    }

    /// Look up an editor by id or alias
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        let normalized = id.trim().to_ascii_lowercase();
        let canonical = match normalized.as_str() {
            "claude-code" => "claude",
            "cursor-ai" => "cursor",
            "github-copilot" => "copilot",
            "openai-codex" | "agents" => "codex",
            other => other,
        };
        Self::ALL.into_iter().find(|editor| editor.id() == canonical)
    }

    /// Parse an id, failing with the list of valid ids
    ///
    /// # Errors
    ///
    /// Returns [`AikitError::UnknownEditor`] for an unrecognized id.
    pub fn parse(id: &str) -> Result<Self, AikitError> {
        Self::from_id(id).ok_or_else(|| AikitError::UnknownEditor {
            editor: id.to_string(),
            valid: valid_ids(),
        })
    }

    /// Whether agent files are written for this editor
    #[must_use]
    pub const fn supports_agents(self) -> bool {
        matches!(self, Self::Claude)
    }

    /// Directory agent files are written to, relative to the project root
    #[must_use]
    pub fn agents_dir(self) -> Option<PathBuf> {
        match self {
            Self::Claude => Some(PathBuf::from(".claude").join("agents")),
            _ => None,
        }
    }

    /// Directories owned by this editor, removed when the editor is not selected
    #[must_use]
    pub fn owned_dirs(self) -> Vec<PathBuf> {
        match self {
            Self::Claude => {
                vec![PathBuf::from(".claude").join("agents"), PathBuf::from(".claude").join("skills")]
            }
            Self::Cursor => vec![PathBuf::from(".cursor").join("rules")],
            Self::Windsurf => vec![PathBuf::from(".windsurf").join("rules")],
            Self::Copilot | Self::Codex => Vec::new(),
        }
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Comma separated list of every valid editor id
#[must_use]
pub fn valid_ids() -> String {
    Editor::ALL.iter().map(|e| e.id()).collect::<Vec<_>>().join(", ")
}

/// Binds one template to one output file for one editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBinding {
    /// Template identifier (`templates/<id>.md`)
    pub template_id: &'static str,
    /// Editor that must be selected for this output to be produced
    pub editor: Editor,
    /// Output file path relative to the project root
    pub output_path: &'static str,
}

impl OutputBinding {
    /// Output path under `base_dir`
    #[must_use]
    pub fn resolve(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(self.output_path)
    }

    /// Template file name
    #[must_use]
    pub fn template_file(&self) -> String {
        format!("{}.{}", self.template_id, crate::constants::TEMPLATE_EXTENSION)
    }
}

/// The static output table
pub const OUTPUT_BINDINGS: &[OutputBinding] = &[
    OutputBinding {
        template_id: "claude",
        editor: Editor::Claude,
        output_path: "CLAUDE.md",
    },
    OutputBinding {
        template_id: "cursor",
        editor: Editor::Cursor,
        output_path: ".cursor/rules/project.mdc",
    },
    OutputBinding {
        template_id: "copilot",
        editor: Editor::Copilot,
        output_path: ".github/copilot-instructions.md",
    },
    OutputBinding {
        template_id: "windsurf",
        editor: Editor::Windsurf,
        output_path: ".windsurf/rules/project.md",
    },
    OutputBinding {
        template_id: "agents",
        editor: Editor::Codex,
        output_path: "AGENTS.md",
    },
];

/// Bindings for the selected editors, in table order
#[must_use]
pub fn bindings_for(editors: &[Editor]) -> Vec<OutputBinding> {
    OUTPUT_BINDINGS.iter().filter(|binding| editors.contains(&binding.editor)).copied().collect()
}

/// Owned directories of every editor that is not selected
#[must_use]
pub fn cleanup_dirs(selected: &[Editor]) -> Vec<PathBuf> {
    Editor::ALL
        .into_iter()
        .filter(|editor| !selected.contains(editor))
        .flat_map(Editor::owned_dirs)
        .collect()
}
