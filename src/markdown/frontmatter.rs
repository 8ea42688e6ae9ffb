//! Front matter parsing with a raw gray_matter engine.
//!
//! gray_matter finds the `---` delimited block; a pass-through [`Engine`] hands the block
//! back untouched so the exact text can be preserved (agent files are rewritten with
//! their original front matter) and then parsed as YAML with `serde_yaml`.
//!
//! Malformed YAML is not an error: the document is kept, without metadata, and its
//! whole text becomes the body.
//!
//! # Example
//!
//! ```rust
//! use aikit_cli::markdown::FrontmatterParser;
//!
//! let parser = FrontmatterParser::new();
//! let parsed = parser.parse("---\nversion: 1.0.0\n---\n# Tailwind\n");
//!
//! assert!(parsed.has_frontmatter());
//! assert_eq!(parsed.data.unwrap()["version"], "1.0.0");
//! assert_eq!(parsed.content.trim(), "# Tailwind");
//! ```

use gray_matter::{Matter, Pod, engine::Engine};
use std::fmt::Debug;

struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// Result of splitting a document into front matter and body
#[derive(Debug, Clone)]
pub struct ParsedFrontmatter {
    /// Parsed YAML, `None` when absent or malformed
    pub data: Option<serde_yaml::Value>,

    /// Body after the front matter (the whole document when YAML is malformed)
    pub content: String,

    /// Front matter text exactly as written
    pub raw_frontmatter: Option<String>,

    /// YAML parser diagnostic when the front matter is malformed
    pub parse_error: Option<String>,
}

impl ParsedFrontmatter {
    /// Whether the document carried a front matter block
    pub fn has_frontmatter(&self) -> bool {
        self.raw_frontmatter.is_some()
    }
}

/// Splits Markdown documents into YAML front matter and body
pub struct FrontmatterParser {
    raw_matter: Matter<RawFrontmatter>,
}

impl Debug for FrontmatterParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontmatterParser").finish()
    }
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontmatterParser {
    /// Create a parser
    pub fn new() -> Self {
        Self {
            raw_matter: Matter::new(),
        }
    }

    /// Split `content` and parse its front matter.
    ///
    /// Never fails; see [`ParsedFrontmatter::parse_error`] for malformed YAML.
    pub fn parse(&self, content: &str) -> ParsedFrontmatter {
        let Some(raw) = self.extract_raw_frontmatter(content) else {
            return ParsedFrontmatter {
                data: None,
                content: content.to_string(),
                raw_frontmatter: None,
                parse_error: None,
            };
        };

        match serde_yaml::from_str::<serde_yaml::Value>(&raw) {
            Ok(data) => ParsedFrontmatter {
                data: Some(data),
                content: self.strip_frontmatter(content),
                raw_frontmatter: Some(raw),
                parse_error: None,
            },
            Err(e) => ParsedFrontmatter {
                data: None,
                content: content.to_string(),
                raw_frontmatter: None,
                parse_error: Some(e.to_string()),
            },
        }
    }

    /// Check for a front matter block without parsing it
    pub fn has_frontmatter(&self, content: &str) -> bool {
        self.extract_raw_frontmatter(content).is_some()
    }

    /// Body of the document with the front matter block removed
    pub fn strip_frontmatter(&self, content: &str) -> String {
        self.raw_matter
            .parse::<String>(content)
            .map(|result| result.content)
            .unwrap_or_else(|_| content.to_string())
    }

    /// Raw front matter text, `None` when the block is absent or empty
    pub fn extract_raw_frontmatter(&self, content: &str) -> Option<String> {
        match self.raw_matter.parse::<String>(content) {
            Ok(result) => result.data.filter(|frontmatter_text| !frontmatter_text.trim().is_empty()),
            Err(_) => None,
        }
    }
}
