//! Cross-cutting utilities for aikit
//!
//! - [`fs`]: atomic writes, directory helpers and document readers
//! - [`paths`]: artifact name validation and project-relative path display

pub mod fs;
pub mod paths;

pub use fs::{atomic_write, ensure_dir, remove_dir_all};
pub use paths::{display_relative, is_safe_artifact_name};
