//! Conflict checking over a resolved module set
//!
//! Two checks run over the loaded modules:
//!
//! - **Conflicts**: when a module lists another present module under `conflicts`, the
//!   pair is reported. Each unordered pair is reported once, whether one side declared
//!   it or both did.
//! - **Missing requirements**: a `requires` entry with no loaded module. Resolution adds
//!   every requirement to the set, so this only fires when the required module could
//!   not be loaded.
//!
//! The check is pure; an empty result means the set is consistent.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::Artifact;

/// Every conflict and missing requirement among `artifacts`, in discovery order
#[must_use]
pub fn check_conflicts(artifacts: &[Arc<Artifact>]) -> Vec<String> {
    let present: HashSet<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
    let mut reported: HashSet<(&str, &str)> = HashSet::new();
    let mut messages = Vec::new();

    for artifact in artifacts {
        for conflict in artifact.conflicts() {
            let other = conflict.as_str();
            if other == artifact.name || !present.contains(other) {
                continue;
            }

            let pair = if artifact.name.as_str() < other {
                (artifact.name.as_str(), other)
            } else {
                (other, artifact.name.as_str())
            };

            if reported.insert(pair) {
                messages.push(format!("Module '{}' conflicts with '{}'", artifact.name, other));
            }
        }
    }

    for artifact in artifacts {
        for requirement in artifact.requires() {
            if !present.contains(requirement.as_str()) {
                messages.push(format!(
                    "Module '{}' requires '{}', which could not be loaded (missing dependency)",
                    artifact.name, requirement
                ));
            }
        }
    }

    messages
}
