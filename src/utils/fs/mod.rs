//! File system utilities used by the synthesis pipeline
//!
//! Output files are written atomically (temp file + rename) so an interrupted run never
//! leaves a half-written `CLAUDE.md` behind. Directory helpers create parent
//! directories on demand and remove editor-owned directories during cleanup.
//!
//! # Examples
//!
//! ```rust,no_run
//! use aikit_cli::utils::fs::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new(".claude/agents"))?;
//! atomic_write(Path::new("CLAUDE.md"), b"# Project\n")?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod formats;

pub use atomic::atomic_write;
pub use dirs::{ensure_dir, ensure_parent_dir, remove_dir_all};
pub use formats::read_text_file;
