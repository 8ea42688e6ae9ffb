//! Skill-rule side-car files
//!
//! A module may ship `<stem>.skill-rules.json` next to its Markdown file: a JSON object
//! mapping rule keys to rule objects. The side-cars of every resolved module are
//! combined into `.claude/skills/skill-rules.json`. On a key collision the module later
//! in dependency order wins.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::SKILL_RULES_SUFFIX;
use crate::core::Artifact;
use crate::utils::fs::formats::read_json_file;

/// Output path of the combined rules file, relative to the project root
pub const SKILL_RULES_OUTPUT: &str = ".claude/skills/skill-rules.json";

/// Side-car path for an artifact file
#[must_use]
pub fn sidecar_path(artifact_path: &Path) -> PathBuf {
    let stem = artifact_path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    artifact_path.with_file_name(format!("{stem}{SKILL_RULES_SUFFIX}"))
}

/// Union the side-car rules of `modules`.
///
/// Returns `None` when no module ships any rule. Unreadable or non-object side-cars are
/// skipped with a warning.
#[must_use]
pub fn collect_skill_rules(modules: &[Arc<Artifact>]) -> Option<Map<String, Value>> {
    let mut combined = Map::new();

    for module in modules {
        let path = sidecar_path(&module.source_path);
        if !path.is_file() {
            continue;
        }

        let rules = match read_json_file::<Value>(&path) {
            Ok(Value::Object(rules)) => rules,
            Ok(_) => {
                warn!("Skill rules in {} are not a JSON object, skipping", path.display());
                continue;
            }
            Err(e) => {
                warn!("Skipping skill rules of '{}': {:#}", module.name, e);
                continue;
            }
        };

        for (key, rule) in rules {
            if combined.contains_key(&key) {
                debug!("Skill rule '{}' from '{}' overrides an earlier definition", key, module.name);
            }
            combined.insert(key, rule);
        }
    }

    if combined.is_empty() { None } else { Some(combined) }
}

/// Serialize combined rules the way they are written to disk
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_skill_rules(rules: &Map<String, Value>) -> serde_json::Result<String> {
    let mut text = serde_json::to_string_pretty(rules)?;
    text.push('\n');
    Ok(text)
}
