//! Knowledge modules and agents
//!
//! An artifact is a Markdown file whose YAML front matter declares metadata and whose
//! body is free text that ends up in generated configuration files:
//!
//! ```markdown
//! ---
//! description: Utility-first CSS
//! version: 2.1.0
//! requires: css-base
//! conflicts: [bootstrap, bulma]
//! ---
//! # Tailwind
//!
//! Use {{ paths.css }} for stylesheets.
//! ```
//!
//! `requires` and `conflicts` may be written as a single scalar, a sequence, or left out.
//! They are normalized to `Vec<String>` here, at the loading boundary, so nothing
//! downstream has to care about the shape the author chose.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// The two kinds of artifact a toolkit provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Knowledge module: documentation merged into editor configuration files
    Module,
    /// Agent: a standalone persona file written per editor
    Agent,
}

impl ArtifactKind {
    /// Directory name holding artifacts of this kind inside a search root
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Module => "modules",
            Self::Agent => "agents",
        }
    }

    /// Lowercase identifier used in cache keys and log output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative metadata from an artifact's front matter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtifactMetadata {
    /// One line summary
    pub description: Option<String>,
    /// Free-form version string
    pub version: Option<String>,
    /// Category declared in front matter, if any
    pub category: Option<String>,
    /// Names of modules this one depends on
    pub requires: Vec<String>,
    /// Names of modules that cannot be selected together with this one
    pub conflicts: Vec<String>,
    /// Every other front matter key, preserved for agents and templates
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ArtifactMetadata {
    /// Build metadata from a parsed YAML front matter document.
    ///
    /// `artifact` is only used to attribute warnings. A document that is not a mapping
    /// yields default metadata.
    #[must_use]
    pub fn from_yaml(value: &serde_yaml::Value, artifact: &str) -> Self {
        let Some(mapping) = value.as_mapping() else {
            if !value.is_null() {
                warn!("Front matter of '{}' is not a mapping, ignoring it", artifact);
            }
            return Self::default();
        };

        let mut metadata = Self::default();

        for (key, entry) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };

            match key {
                "description" => metadata.description = scalar_to_string(entry),
                "version" => metadata.version = scalar_to_string(entry),
                "category" => metadata.category = scalar_to_string(entry),
                "requires" => metadata.requires = normalize_name_list(entry, key, artifact),
                "conflicts" => metadata.conflicts = normalize_name_list(entry, key, artifact),
                other => {
                    if let Ok(json) = serde_json::to_value(entry) {
                        metadata.extra.insert(other.to_string(), json);
                    }
                }
            }
        }

        metadata
    }
}

/// Normalize a `requires`/`conflicts` value to a list of names.
///
/// - string → one-element list
/// - sequence → every element converted to its string form
/// - number or bool → its string form
/// - null → empty
/// - mapping → empty, with a warning
#[must_use]
pub fn normalize_name_list(value: &serde_yaml::Value, field: &str, artifact: &str) -> Vec<String> {
    match value {
        serde_yaml::Value::Null => Vec::new(),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .filter_map(|item| {
                let name = scalar_to_string(item);
                if name.is_none() && !item.is_null() {
                    warn!(
                        "Ignoring non-scalar entry in '{}' of '{}'",
                        field, artifact
                    );
                }
                name
            })
            .collect(),
        serde_yaml::Value::Mapping(_) => {
            warn!(
                "Field '{}' of '{}' is a mapping; expected a name or a list of names",
                field, artifact
            );
            Vec::new()
        }
        other => scalar_to_string(other).into_iter().collect(),
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

/// A loaded module or agent
///
/// Immutable after loading; shared as `Arc<Artifact>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    /// Module or agent
    pub kind: ArtifactKind,
    /// Name the artifact was requested by (file stem)
    pub name: String,
    /// Parsed front matter
    pub metadata: ArtifactMetadata,
    /// Effective category: metadata, else categorized directory, else `general`
    pub category: String,
    /// Markdown body after the front matter
    pub body: String,
    /// Front matter text exactly as written, without delimiters
    pub raw_frontmatter: Option<String>,
    /// File the artifact was read from
    pub source_path: PathBuf,
}

impl Artifact {
    /// Names this artifact requires
    #[must_use]
    pub fn requires(&self) -> &[String] {
        &self.metadata.requires
    }

    /// Names this artifact conflicts with
    #[must_use]
    pub fn conflicts(&self) -> &[String] {
        &self.metadata.conflicts
    }

    /// Description, or an empty string
    #[must_use]
    pub fn description(&self) -> &str {
        self.metadata.description.as_deref().unwrap_or_default()
    }

    /// Version, or an empty string
    #[must_use]
    pub fn version(&self) -> &str {
        self.metadata.version.as_deref().unwrap_or_default()
    }

    /// URL and identifier friendly form of the name
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Lowercase the name and collapse every run of non-alphanumerics into one dash
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// An artifact file discovered by listing, not yet loaded
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ArtifactRef {
    /// Module or agent
    pub kind: ArtifactKind,
    /// File stem
    pub name: String,
    /// Categorized directory name, `None` for the legacy flat location
    pub category: Option<String>,
    /// Full path to the file
    pub path: PathBuf,
}

impl ArtifactRef {
    /// `category/name` for categorized artifacts, `name` otherwise
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.category {
            Some(category) => format!("{category}/{}", self.name),
            None => self.name.clone(),
        }
    }
}
