//! Core types and error handling for aikit
//!
//! This module holds the vocabulary shared by every stage of the synthesis pipeline:
//!
//! - [`AikitError`], [`ErrorContext`] and [`user_friendly_error`] for typed errors and
//!   their terminal presentation
//! - [`Artifact`], [`ArtifactKind`] and [`ArtifactMetadata`] for knowledge modules and
//!   agents loaded from Markdown files with YAML front matter
//!
//! Artifacts are immutable once loaded and are shared as `Arc<Artifact>` between the
//! cache, the resolver, the conflict checker and the context assembler.

pub mod artifact;
pub mod error;

pub use artifact::{Artifact, ArtifactKind, ArtifactMetadata, ArtifactRef};
pub use error::{AikitError, ErrorContext, user_friendly_error};
