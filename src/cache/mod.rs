//! Per-run artifact and template cache
//!
//! One [`ArtifactCache`] lives for one synthesis run. The resolver, the loader and the
//! pipeline all go through it, so each artifact file is read and parsed at most once
//! and each template is compiled at most once.
//!
//! Lookups that found nothing are cached too: a module that exists in no search root is
//! searched for, and warned about, once per run no matter how many modules require it.
//!
//! The cache is owned by the pipeline and passed by `&mut`; it is never shared between
//! runs and has no eviction.
//!
//! # Examples
//!
//! ```rust
//! use aikit_cli::cache::{ArtifactCache, ArtifactKey};
//! use aikit_cli::core::ArtifactKind;
//! use std::path::Path;
//!
//! let mut cache = ArtifactCache::new();
//! let key = ArtifactKey::new(ArtifactKind::Module, "tailwind", Path::new("/toolkit"));
//! assert_eq!(key.to_string(), "module:tailwind:/toolkit");
//!
//! assert!(cache.get_artifact(&key).is_none());
//! cache.insert_artifact(key.clone(), None);
//! assert_eq!(cache.get_artifact(&key), Some(None));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{Artifact, ArtifactKind};
use crate::templating::CompiledTemplate;

/// Cache key of an artifact lookup in one search root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    /// Module or agent
    pub kind: ArtifactKind,
    /// Requested name
    pub name: String,
    /// Search root the lookup ran against
    pub root: PathBuf,
}

impl ArtifactKey {
    /// Create a key
    pub fn new(kind: ArtifactKind, name: impl Into<String>, root: &Path) -> Self {
        Self {
            kind,
            name: name.into(),
            root: root.to_path_buf(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.name, self.root.display())
    }
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: usize,
    /// Lookups that had to go to disk
    pub misses: usize,
}

impl CacheStats {
    /// Percentage of lookups answered from the cache
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hits, {} misses ({:.0}% hit rate)", self.hits, self.misses, self.hit_rate())
    }
}

/// Memoizes loaded artifacts (including misses) and compiled templates
#[derive(Debug, Default)]
pub struct ArtifactCache {
    artifacts: HashMap<ArtifactKey, Option<Arc<Artifact>>>,
    templates: HashMap<PathBuf, Arc<CompiledTemplate>>,
    stats: CacheStats,
}

impl ArtifactCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an artifact.
    ///
    /// `None` means the lookup has not happened yet; `Some(None)` is a remembered miss.
    pub fn get_artifact(&mut self, key: &ArtifactKey) -> Option<Option<Arc<Artifact>>> {
        match self.artifacts.get(key) {
            Some(entry) => {
                self.stats.hits += 1;
                Some(entry.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Remember the result of a lookup, hit or miss
    pub fn insert_artifact(&mut self, key: ArtifactKey, artifact: Option<Arc<Artifact>>) {
        self.artifacts.insert(key, artifact);
    }

    /// Look up a compiled template by absolute path
    pub fn get_template(&mut self, path: &Path) -> Option<Arc<CompiledTemplate>> {
        match self.templates.get(path) {
            Some(template) => {
                self.stats.hits += 1;
                Some(Arc::clone(template))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Remember a compiled template
    pub fn insert_template(&mut self, path: PathBuf, template: Arc<CompiledTemplate>) {
        self.templates.insert(path, template);
    }

    /// Number of cached artifact lookups, misses included
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Number of cached templates
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Hit and miss counters
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArtifactMetadata;

    fn artifact(name: &str) -> Arc<Artifact> {
        Arc::new(Artifact {
            kind: ArtifactKind::Module,
            name: name.to_string(),
            metadata: ArtifactMetadata::default(),
            category: "general".to_string(),
            body: "body".to_string(),
            raw_frontmatter: None,
            source_path: PathBuf::from(format!("/tk/modules/{name}.md")),
        })
    }

    #[test]
    fn test_key_display() {
        let key = ArtifactKey::new(ArtifactKind::Agent, "reviewer", Path::new("/p/.aikit"));
        assert_eq!(key.to_string(), "agent:reviewer:/p/.aikit");
    }

    #[test]
    fn test_hit_and_miss_counting() {
        let mut cache = ArtifactCache::new();
        let key = ArtifactKey::new(ArtifactKind::Module, "tailwind", Path::new("/tk"));

        assert!(cache.get_artifact(&key).is_none());
        cache.insert_artifact(key.clone(), Some(artifact("tailwind")));
        let cached = cache.get_artifact(&key).unwrap().unwrap();

        assert_eq!(cached.name, "tailwind");
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert!((cache.stats().hit_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_entries_are_remembered() {
        let mut cache = ArtifactCache::new();
        let key = ArtifactKey::new(ArtifactKind::Module, "ghost", Path::new("/tk"));

        cache.insert_artifact(key.clone(), None);

        assert_eq!(cache.get_artifact(&key), Some(None));
        assert_eq!(cache.artifact_count(), 1);
    }

    #[test]
    fn test_keys_distinguish_kind_and_root() {
        let mut cache = ArtifactCache::new();
        cache.insert_artifact(ArtifactKey::new(ArtifactKind::Module, "x", Path::new("/a")), None);

        assert!(cache.get_artifact(&ArtifactKey::new(ArtifactKind::Agent, "x", Path::new("/a"))).is_none());
        assert!(cache.get_artifact(&ArtifactKey::new(ArtifactKind::Module, "x", Path::new("/b"))).is_none());
    }

    #[test]
    fn test_stats_display_reports_percentage_once() {
        let stats = CacheStats { hits: 1, misses: 1 };
        assert_eq!(stats.to_string(), "1 hits, 1 misses (50% hit rate)");
    }

    #[test]
    fn test_empty_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
