//! Incremental output writing.
//!
//! A generated file is only written when its bytes differ from what is already on disk,
//! so running `aikit generate` twice in a row leaves every modification time alone.
//! Writes go through [`atomic_write`](crate::utils::atomic_write): a half-written
//! `CLAUDE.md` is never observable.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::utils::atomic_write;

/// A write that failed, kept so the remaining writes can still happen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// Path relative to the output root
    pub path: PathBuf,
    /// Error with its cause chain
    pub message: String,
}

/// Outcome of [`IncrementalWriter::write_many`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Files created or changed
    pub written: usize,
    /// Files whose content was already up to date
    pub skipped: usize,
    /// Files that could not be written
    pub failed: usize,
    /// One entry per failed file
    pub errors: Vec<WriteFailure>,
    /// Paths counted in `written`, in write order
    pub written_paths: Vec<PathBuf>,
}

impl WriteStats {
    /// Whether every write succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Writes generated files below one root directory
#[derive(Debug, Clone)]
pub struct IncrementalWriter {
    root: PathBuf,
    dry_run: bool,
}

impl IncrementalWriter {
    /// Writer for files below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    /// In dry-run mode nothing is touched; the return values report what would happen.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `root/rel` unless it already holds exactly those bytes.
    ///
    /// Returns `true` when the file was (or, in dry-run mode, would be) written.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing file cannot be read or the new content cannot
    /// be written.
    pub fn write_one(&self, rel: &Path, content: &str) -> Result<bool> {
        let path = self.root.join(rel);

        if path.is_file() {
            let existing = std::fs::read(&path)
                .with_context(|| format!("Failed to read existing file: {}", path.display()))?;
            if existing == content.as_bytes() {
                debug!("Unchanged: {}", rel.display());
                return Ok(false);
            }
        }

        if self.dry_run {
            debug!("Would write: {}", rel.display());
            return Ok(true);
        }

        atomic_write(&path, content.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote: {}", rel.display());

        Ok(true)
    }

    /// Write every output, in path order. A failure is recorded and the remaining
    /// outputs are still written.
    pub fn write_many(&self, outputs: &BTreeMap<PathBuf, String>) -> WriteStats {
        let mut stats = WriteStats::default();

        for (rel, content) in outputs {
            match self.write_one(rel, content) {
                Ok(true) => {
                    stats.written += 1;
                    stats.written_paths.push(rel.clone());
                }
                Ok(false) => stats.skipped += 1,
                Err(e) => {
                    warn!("Failed to write {}: {:#}", rel.display(), e);
                    stats.failed += 1;
                    stats.errors.push(WriteFailure {
                        path: rel.clone(),
                        message: format!("{e:#}"),
                    });
                }
            }
        }

        stats
    }
}
