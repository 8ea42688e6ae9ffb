//! Test fixtures for toolkits
//!
//! [`ToolkitFixture`] collects files in memory and writes them into a fresh temporary
//! directory on [`build`](ToolkitFixture::build), following the toolkit layout:
//!
//! ```text
//! <toolkit>/
//!   config/defaults.json
//!   modules/<name>.md
//!   modules/<category>/<name>.md
//!   agents/<name>.md
//!   agents/<category>/<name>.md
//!   templates/<id>.md
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::{TEMPLATES_DIR, TOOLKIT_CONFIG_DIR};
use crate::core::ArtifactKind;

/// Builder for a temporary toolkit directory
#[derive(Clone, Debug, Default)]
pub struct ToolkitFixture {
    files: Vec<(PathBuf, String)>,
}

impl ToolkitFixture {
    /// Empty toolkit
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat module, `modules/<name>.md`
    pub fn module(self, name: &str, content: &str) -> Self {
        self.artifact(ArtifactKind::Module, None, name, content)
    }

    /// Module in a category directory, `modules/<category>/<name>.md`
    pub fn categorized_module(self, category: &str, name: &str, content: &str) -> Self {
        self.artifact(ArtifactKind::Module, Some(category), name, content)
    }

    /// Flat agent, `agents/<name>.md`
    pub fn agent(self, name: &str, content: &str) -> Self {
        self.artifact(ArtifactKind::Agent, None, name, content)
    }

    /// Agent in a category directory, `agents/<category>/<name>.md`
    pub fn categorized_agent(self, category: &str, name: &str, content: &str) -> Self {
        self.artifact(ArtifactKind::Agent, Some(category), name, content)
    }

    /// Template, `templates/<id>.md`
    pub fn template(self, id: &str, content: &str) -> Self {
        self.file(Path::new(TEMPLATES_DIR).join(format!("{id}.md")), content)
    }

    /// Toolkit defaults, `config/defaults.json`
    pub fn defaults(self, json: &str) -> Self {
        self.file(Path::new(TOOLKIT_CONFIG_DIR).join("defaults.json"), json)
    }

    /// Any file, relative to the toolkit root
    pub fn file(mut self, rel: impl AsRef<Path>, content: &str) -> Self {
        self.files.push((rel.as_ref().to_path_buf(), content.to_string()));
        self
    }

    fn artifact(self, kind: ArtifactKind, category: Option<&str>, name: &str, content: &str) -> Self {
        let mut rel = PathBuf::from(kind.dir_name());
        if let Some(category) = category {
            rel.push(category);
        }
        rel.push(format!("{name}.md"));
        self.file(rel, content)
    }

    /// Write every file into a new temporary directory.
    ///
    /// The kind directories always exist, even when empty. Test logging is set up on
    /// first use, so `RUST_LOG` works for every test that builds a toolkit.
    ///
    /// # Panics
    ///
    /// Panics when the temporary directory cannot be created or written.
    pub fn build(&self) -> TempDir {
        super::init_test_logging(None);
        let dir = tempfile::tempdir().expect("create toolkit temp dir");
        self.write_into(dir.path());
        dir
    }

    /// Write every file below `root`, which is created if needed
    ///
    /// # Panics
    ///
    /// Panics when a file cannot be written.
    pub fn write_into(&self, root: &Path) {
        for kind in [ArtifactKind::Module, ArtifactKind::Agent] {
            fs::create_dir_all(root.join(kind.dir_name())).expect("create kind directory");
        }
        fs::create_dir_all(root.join(TEMPLATES_DIR)).expect("create templates directory");

        for (rel, content) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create fixture directory");
            }
            fs::write(&path, content).expect("write fixture file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let toolkit = ToolkitFixture::new()
            .module("tailwind", "# Tailwind")
            .categorized_agent("tools", "linter", "# Linter")
            .template("claude", "# Claude")
            .defaults(r#"{"editors": ["cursor"]}"#)
            .build();

        let root = toolkit.path();
        assert!(root.join("modules/tailwind.md").is_file());
        assert!(root.join("agents/tools/linter.md").is_file());
        assert!(root.join("templates/claude.md").is_file());
        assert!(root.join("config/defaults.json").is_file());
    }
}
