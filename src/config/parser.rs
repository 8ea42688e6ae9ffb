//! Configuration document parsing
//!
//! Project and toolkit documents may be JSON, YAML or TOML; the format is chosen by file
//! extension. Every format is parsed into a `serde_json::Value` so the layers can be
//! merged uniformly.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::core::AikitError;

/// Parse a configuration document into a JSON value.
///
/// An empty YAML document parses to an empty object.
///
/// # Errors
///
/// Returns [`AikitError::ConfigParse`] when the content is not valid for its format, and
/// an IO error (with the path attached) when the file cannot be read.
pub fn parse_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_document_str(&content, path)
}

/// Parse `content` as the format implied by `path`'s extension.
///
/// # Errors
///
/// Returns [`AikitError::ConfigParse`] on invalid content or an unsupported extension.
pub fn parse_document_str(content: &str, path: &Path) -> Result<Value> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    let parsed: std::result::Result<Value, String> = match extension {
        "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        "toml" => toml::from_str(content).map_err(|e| e.to_string()),
        other => Err(format!("unsupported configuration format '{other}'")),
    };

    match parsed {
        Ok(Value::Null) => Ok(Value::Object(serde_json::Map::new())),
        Ok(value) => Ok(value),
        Err(reason) => Err(AikitError::ConfigParse {
            file: path.display().to_string(),
            reason,
        }
        .into()),
    }
}

/// First file from `candidates` that exists in `dir`.
#[must_use]
pub fn find_document(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_json_yaml_toml() {
        let temp = tempdir().unwrap();

        let json_path = temp.path().join("aikit.json");
        std::fs::write(&json_path, r#"{"modules": ["tailwind"]}"#).unwrap();
        assert_eq!(parse_document(&json_path).unwrap()["modules"][0], "tailwind");

        let yaml_path = temp.path().join("aikit.yaml");
        std::fs::write(&yaml_path, "modules:\n  - alpine\n").unwrap();
        assert_eq!(parse_document(&yaml_path).unwrap()["modules"][0], "alpine");

        let toml_path = temp.path().join("aikit.toml");
        std::fs::write(&toml_path, "modules = [\"craft\"]\n[standards]\nindentation = 2\n").unwrap();
        let value = parse_document(&toml_path).unwrap();
        assert_eq!(value["modules"][0], "craft");
        assert_eq!(value["standards"]["indentation"], 2);
    }

    #[test]
    fn test_empty_yaml_is_empty_object() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("aikit.yml");
        std::fs::write(&path, "").unwrap();

        assert_eq!(parse_document(&path).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_parse_error_is_typed() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("aikit.json");
        std::fs::write(&path, "{ \"modules\": [").unwrap();

        let err = parse_document(&path).unwrap_err();
        assert!(matches!(err.downcast_ref::<AikitError>(), Some(AikitError::ConfigParse { .. })));
    }

    #[test]
    fn test_find_document_order() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("aikit.toml"), "").unwrap();
        std::fs::write(temp.path().join("aikit.yaml"), "").unwrap();

        let found = find_document(temp.path(), crate::constants::PROJECT_CONFIG_FILES).unwrap();
        assert!(found.ends_with("aikit.yaml"));
    }
}
