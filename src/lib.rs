//! aikit - configuration synthesis for AI coding assistants
//!
//! A project declares knowledge modules, agents and editor targets in `aikit.json`.
//! aikit turns that declaration, plus a shared toolkit of modules, agents and templates,
//! into the configuration files each assistant reads: `CLAUDE.md`,
//! `.cursor/rules/project.mdc`, `.github/copilot-instructions.md`,
//! `.windsurf/rules/project.md` and `AGENTS.md`.
//!
//! # Pipeline
//!
//! 1. [`config`] merges built-in defaults, toolkit defaults and the project file
//! 2. [`pattern`] expands module globs; [`resolver`] closes the set under `requires`
//! 3. [`loader`] reads modules and agents through the per-run [`cache`]
//! 4. [`resolver::conflict`] rejects incompatible modules
//! 5. [`templating::context`] assembles one data context
//! 6. [`templating::validator`] checks every template before any is rendered
//! 7. [`templating::renderer`] renders with Tera
//! 8. [`writer`] writes only what changed
//!
//! [`synthesis`] drives the whole run; [`cli`] exposes it as `aikit`.
//!
//! # Toolkit Layout
//!
//! ```text
//! toolkit/
//! ├── config/defaults.json
//! ├── modules/
//! │   ├── tailwind.md
//! │   ├── core/<name>.md
//! │   └── frontend/<name>.md
//! ├── agents/
//! │   ├── <name>.md
//! │   └── tools/<name>.md
//! └── templates/
//!     ├── claude.md
//!     ├── cursor.md
//!     ├── copilot.md
//!     ├── windsurf.md
//!     └── agents.md
//! ```
//!
//! A project can shadow any toolkit file from its own `.aikit/` directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use aikit_cli::synthesis::{SynthesisOptions, Synthesizer};
//! use std::path::Path;
//!
//! let mut synthesizer = Synthesizer::from_project(Path::new("."), None, SynthesisOptions::default())?;
//! let report = synthesizer.run()?;
//! println!("{} written, {} unchanged", report.stats.written, report.stats.skipped);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod loader;
pub mod markdown;
pub mod outputs;
pub mod pattern;
pub mod resolver;
pub mod synthesis;
pub mod templating;
pub mod utils;
pub mod writer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
