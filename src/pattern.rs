//! Glob patterns in module requests.
//!
//! Entries of `modules` may be glob patterns instead of plain names. A pattern is
//! matched against both the bare name and the `category/name` form of every available
//! artifact, so `frontend/*` selects a whole category and `*css*` selects by name.
//!
//! # Pattern Syntax
//!
//! - `*` matches any sequence of characters within a single path component
//! - `?` matches any single character
//! - `[abc]` matches any character in the set
//! - `[a-z]` matches any character in the range
//!
//! Plain entries pass through unchanged, except that `category/name` is reduced to
//! `name` when such an artifact exists.

use anyhow::{Context, Result};
use glob::Pattern;
use tracing::{debug, warn};

use crate::core::ArtifactRef;

/// A compiled module request pattern
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Pattern,
    original_pattern: String,
}

impl PatternMatcher {
    /// Compile a pattern
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid glob.
    pub fn new(pattern_str: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern_str)
            .with_context(|| format!("Invalid glob pattern: {pattern_str}"))?;

        Ok(Self {
            pattern,
            original_pattern: pattern_str.to_string(),
        })
    }

    /// Whether the artifact matches by name or by `category/name`
    pub fn matches(&self, artifact: &ArtifactRef) -> bool {
        self.pattern.matches(&artifact.name) || self.pattern.matches(&artifact.qualified_name())
    }

    /// The pattern as written
    pub fn pattern(&self) -> &str {
        &self.original_pattern
    }
}

/// Whether a request contains glob metacharacters
#[must_use]
pub fn is_pattern(request: &str) -> bool {
    request.contains(['*', '?', '['])
}

/// Expand module requests into names.
///
/// Order follows the requests; the matches of one pattern are ordered by name. The
/// result has no duplicates. A pattern matching nothing is a warning.
///
/// # Errors
///
/// Returns an error for a syntactically invalid pattern.
pub fn expand_requests(requests: &[String], available: &[ArtifactRef]) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: String| {
        if !names.contains(&name) {
            names.push(name);
        }
    };

    for request in requests {
        let request = request.trim();
        if request.is_empty() {
            continue;
        }

        if is_pattern(request) {
            let matcher = PatternMatcher::new(request)?;
            let mut matched: Vec<&str> = available
                .iter()
                .filter(|artifact| matcher.matches(artifact))
                .map(|artifact| artifact.name.as_str())
                .collect();
            matched.sort_unstable();
            matched.dedup();

            if matched.is_empty() {
                warn!("Module pattern '{}' matched nothing", matcher.pattern());
            } else {
                debug!("Module pattern '{}' matched {:?}", matcher.pattern(), matched);
            }
            for name in matched {
                push(name.to_string());
            }
        } else if let Some(artifact) =
            available.iter().find(|artifact| artifact.category.is_some() && artifact.qualified_name() == request)
        {
            push(artifact.name.clone());
        } else {
            push(request.to_string());
        }
    }

    Ok(names)
}
