//! Utility functions for the templating system.

use serde_json::Value;
use std::collections::BTreeSet;
use strsim::levenshtein;

/// Maximum edit distance for a suggestion, as a percentage of the name length
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Every dot path bound by `ctx`.
///
/// Objects contribute their keys at every depth. Arrays are represented by their first
/// element, so `modules.name` is bound when the first module has a `name`. An empty
/// array binds only its own path.
///
/// # Examples
///
/// ```rust
/// use aikit_cli::templating::utils::flatten_paths;
/// use serde_json::json;
///
/// let paths = flatten_paths(&json!({"project": {"name": "acme"}, "modules": [{"slug": "a"}]}));
/// assert!(paths.contains("project"));
/// assert!(paths.contains("project.name"));
/// assert!(paths.contains("modules.slug"));
/// ```
#[must_use]
pub fn flatten_paths(ctx: &Value) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    collect_paths(ctx, "", &mut paths);
    paths
}

fn collect_paths(value: &Value, prefix: &str, paths: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                paths.insert(path.clone());
                collect_paths(child, &path, paths);
            }
        }
        Value::Array(items) => {
            if let Some(first) = items.first() {
                collect_paths(first, prefix, paths);
            }
        }
        _ => {}
    }
}

/// Look up a dot path, stepping into objects by key and arrays by index
#[must_use]
pub fn lookup_path<'a>(ctx: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(ctx, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Text form of a value for substitution, `None` for objects and nested arrays
#[must_use]
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => None,
                scalar => value_to_text(scalar),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(", ")),
        Value::Object(_) => None,
    }
}

/// Up to three candidates within [`SIMILARITY_THRESHOLD_PERCENT`] of `target`
#[must_use]
pub fn find_similar<'a, I>(target: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let limit = (target.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);

    let mut scored: Vec<(usize, &String)> = candidates
        .into_iter()
        .map(|candidate| (levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= limit)
        .collect();

    scored.sort();
    scored.into_iter().take(3).map(|(_, candidate)| candidate.clone()).collect()
}
