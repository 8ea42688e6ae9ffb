//! Test utilities for aikit
//!
//! Helpers shared by unit tests and the integration suite: one-time logging setup and
//! fixtures that lay out a temporary toolkit.
//!
//! # Example
//!
//! ```rust,no_run
//! use aikit_cli::test_utils::ToolkitFixture;
//!
//! let toolkit = ToolkitFixture::new()
//!     .module("tailwind", "---\nversion: 3.0.0\n---\n# Tailwind\n")
//!     .template("claude", "# {{ project.name }}\n")
//!     .build();
//!
//! assert!(toolkit.path().join("modules/tailwind.md").exists());
//! ```

pub mod fixtures;

pub use fixtures::ToolkitFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise `RUST_LOG`;
/// with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=aikit_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
