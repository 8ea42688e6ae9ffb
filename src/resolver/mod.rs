//! Module dependency resolution
//!
//! Resolution computes the transitive closure of the requested modules under their
//! `requires` metadata:
//!
//! 1. Start with the requested names, in request order.
//! 2. Take the next unprocessed name from the queue and load it.
//! 3. Append every requirement that is not resolved yet, and queue it.
//!
//! The result keeps insertion order and has no duplicates. Cycles terminate because
//! every name is processed once. A module that cannot be loaded stays in the result but
//! contributes no requirements; the conflict checker reports anything that requires it.
//!
//! After loading, [`dependency_graph::order_by_requirements`] puts dependencies before
//! their dependents, and [`conflict::check_conflicts`] verifies the set.

pub mod conflict;
pub mod dependency_graph;

pub use conflict::check_conflicts;
pub use dependency_graph::order_by_requirements;

use anyhow::Result;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

use crate::core::Artifact;

/// Source of modules for [`resolve`]
///
/// The pipeline serves modules through the loader and the run's cache; tests can serve
/// them from memory.
pub trait ArtifactProvider {
    /// Load a module by name, `Ok(None)` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error when an existing module cannot be read.
    fn load_module(&mut self, name: &str) -> Result<Option<Arc<Artifact>>>;
}

/// Transitive closure of `initial` under `requires`, in insertion order.
///
/// # Errors
///
/// Propagates provider IO errors. Missing modules are not errors.
///
/// # Examples
///
/// ```rust,no_run
/// use aikit_cli::cache::ArtifactCache;
/// use aikit_cli::loader::{ArtifactLoader, CachedModules};
/// use aikit_cli::resolver::resolve;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let loader = ArtifactLoader::new(Path::new("."), Path::new("/opt/aikit"));
/// let mut cache = ArtifactCache::new();
/// let resolved = resolve(&["tailwind".to_string()], &mut CachedModules::new(&loader, &mut cache))?;
/// println!("{resolved:?}");
/// # Ok(())
/// # }
/// ```
pub fn resolve<P>(initial: &[String], provider: &mut P) -> Result<Vec<String>>
where
    P: ArtifactProvider + ?Sized,
{
    let mut resolved: Vec<String> = Vec::with_capacity(initial.len());
    let mut members: HashSet<String> = HashSet::new();
    for name in initial {
        if members.insert(name.clone()) {
            resolved.push(name.clone());
        }
    }

    let mut queue: VecDeque<String> = resolved.iter().cloned().collect();
    let mut processed: HashSet<String> = HashSet::new();

    while let Some(name) = queue.pop_front() {
        if !processed.insert(name.clone()) {
            continue;
        }

        let Some(artifact) = provider.load_module(&name)? else {
            continue;
        };

        for requirement in artifact.requires() {
            if members.insert(requirement.clone()) {
                debug!("'{}' requires '{}', adding it", name, requirement);
                resolved.push(requirement.clone());
                queue.push_back(requirement.clone());
            }
        }
    }

    Ok(resolved)
}
