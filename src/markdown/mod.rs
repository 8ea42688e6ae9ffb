//! Markdown handling for artifact files
//!
//! Modules and agents are Markdown documents with an optional YAML front matter block
//! delimited by `---` lines. [`frontmatter::FrontmatterParser`] splits the two and
//! parses the metadata; [`compose_document`] puts a front matter block and a body back
//! together when agent files are written for an editor.

pub mod frontmatter;

pub use frontmatter::{FrontmatterParser, ParsedFrontmatter};

/// Reassemble a Markdown document from raw front matter text and a body.
///
/// With no front matter the body is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use aikit_cli::markdown::compose_document;
///
/// let doc = compose_document(Some("name: reviewer"), "# Reviewer\n");
/// assert_eq!(doc, "---\nname: reviewer\n---\n# Reviewer\n");
/// ```
#[must_use]
pub fn compose_document(raw_frontmatter: Option<&str>, body: &str) -> String {
    match raw_frontmatter.map(str::trim).filter(|fm| !fm.is_empty()) {
        Some(frontmatter) => format!("---\n{frontmatter}\n---\n{body}"),
        None => body.to_string(),
    }
}
