//! Path validation helpers.
//!
//! Artifact names come straight from user configuration and are joined onto search
//! roots, so they are checked before any filesystem access.

use std::path::{Component, Path};

/// Returns `true` when `name` can be joined onto a search root without escaping it.
///
/// Rejects empty names, absolute paths, `..` components and path separators. Category
/// prefixes such as `core/tailwind` are not names; callers strip them first.
///
/// # Examples
///
/// ```rust
/// use aikit_cli::utils::is_safe_artifact_name;
///
/// assert!(is_safe_artifact_name("tailwind"));
/// assert!(!is_safe_artifact_name("../secrets"));
/// assert!(!is_safe_artifact_name(""));
/// ```
#[must_use]
pub fn is_safe_artifact_name(name: &str) -> bool {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') || name.contains("..")
    {
        return false;
    }

    let path = Path::new(name);
    path.components().count() == 1 && matches!(path.components().next(), Some(Component::Normal(_)))
}

/// Renders `path` relative to `base` with forward slashes, for log and report output.
///
/// Falls back to the full path when `path` is not under `base`.
#[must_use]
pub fn display_relative(path: &Path, base: &Path) -> String {
    let shown = path.strip_prefix(base).unwrap_or(path);
    shown.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_names() {
        assert!(is_safe_artifact_name("tailwind"));
        assert!(is_safe_artifact_name("craft-cms"));
        assert!(is_safe_artifact_name("alpine.js"));
    }

    #[test]
    fn test_unsafe_names() {
        assert!(!is_safe_artifact_name(""));
        assert!(!is_safe_artifact_name("   "));
        assert!(!is_safe_artifact_name(".."));
        assert!(!is_safe_artifact_name("../etc"));
        assert!(!is_safe_artifact_name("core/tailwind"));
        assert!(!is_safe_artifact_name("a\\b"));
        assert!(!is_safe_artifact_name("/abs"));
    }

    #[test]
    fn test_display_relative() {
        let base = Path::new("/work/site");
        assert_eq!(display_relative(Path::new("/work/site/.cursor/rules/project.mdc"), base), ".cursor/rules/project.mdc");
        assert_eq!(display_relative(Path::new("/elsewhere/x.md"), base), "/elsewhere/x.md");
    }
}
