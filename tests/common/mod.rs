//! Common test utilities and fixtures for aikit integration tests

// Not every helper is used by every test file
#![allow(dead_code)]

use aikit_cli::test_utils::ToolkitFixture;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project and a toolkit side by side in one temporary directory
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    toolkit_dir: PathBuf,
}

impl TestProject {
    /// Empty project and empty toolkit
    pub fn new() -> Result<Self> {
        aikit_cli::test_utils::init_test_logging(None);
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let toolkit_dir = temp_dir.path().join("toolkit");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&toolkit_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            toolkit_dir,
        })
    }

    /// Project with `aikit.json` and a toolkit built from `toolkit`
    pub fn with(config: &str, toolkit: &ToolkitFixture) -> Result<Self> {
        let project = Self::new()?;
        project.write_config(config)?;
        toolkit.write_into(&project.toolkit_dir);
        Ok(project)
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn toolkit_path(&self) -> &Path {
        &self.toolkit_dir
    }

    /// Write `aikit.json`
    pub fn write_config(&self, content: &str) -> Result<()> {
        self.write_file("aikit.json", content)
    }

    /// Write a file relative to the project root
    pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.project_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Read a file relative to the project root
    pub fn read_file(&self, rel: &str) -> Result<String> {
        let path = self.project_dir.join(rel);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// `aikit` command pointed at this project and toolkit
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_aikit"));
        cmd.arg("--project-dir")
            .arg(&self.project_dir)
            .env("AIKIT_TOOLKIT", &self.toolkit_dir)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run `aikit` with `args` and capture its output
    pub fn run_aikit(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.command().args(args).output().context("Failed to run aikit")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(self.success, "Command failed with code {:?}\nStderr: {}", self.code, self.stderr);
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file contains specific content
    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{}'\nActual content: {}",
            path.display(),
            expected,
            content
        );
    }
}

/// A toolkit with a template for every editor and a few modules
pub fn standard_toolkit() -> ToolkitFixture {
    ToolkitFixture::new()
        .defaults(r#"{"standards": {"indentation": 2}}"#)
        .module("base", "---\ndescription: House rules\nversion: 1.0.0\n---\nIndent with {{ standards.indentation }} spaces.\n")
        .categorized_module(
            "frontend",
            "tailwind",
            "---\ndescription: Utility-first CSS\nversion: 3.4.0\nrequires: base\nconflicts: [bootstrap]\n---\nStyles live in {{ paths.css }}.\n",
        )
        .categorized_module("frontend", "bootstrap", "---\ndescription: Component CSS\n---\nBootstrap rules.\n")
        .categorized_module("core", "craft-cms", "---\ndescription: Craft CMS\nrequires: [base]\n---\nTwig: {{ entry.title }}\n")
        .agent("reviewer", "---\nname: reviewer\ndescription: Reviews changes\n---\nReview {{ project.name }} carefully.\n")
        .template("claude", CLAUDE_TEMPLATE)
        .template("cursor", "---\nalwaysApply: true\n---\n{% for m in modules %}- {{ m.name }}\n{% endfor %}")
        .template("copilot", "# {{ project.name }} for Copilot\n")
        .template("windsurf", "# {{ project.name }} for Windsurf\n")
        .template("agents", "# AGENTS for {{ project.name }}\n{% for m in modules %}{{ m.content }}{% endfor %}")
}

pub const CLAUDE_TEMPLATE: &str = "# {{ project.name }}\n\
{% if hasCssFramework %}Uses a CSS framework.\n{% endif %}\
{% for m in modules %}## {{ m.name }} ({{ m.version }})\n{{ m.content }}\n{% endfor %}\
{% if projectRules %}## Project rules\n{{ projectRules }}\n{% endif %}";
