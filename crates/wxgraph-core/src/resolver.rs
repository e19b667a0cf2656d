//! Component Path Resolution
//!
//! Manifest reference paths come in two shapes: rooted (`/components/card`,
//! relative to the project's component root) and relative (`../card/card`,
//! relative to the directory of the referencing manifest). Either may point
//! at a component directory or at a file stem inside one; resolution is
//! best-effort and downstream validation rejects bad candidates.

use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;

/// Resolves manifest reference strings to candidate component directories
/// and derives graph keys from markup paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Project-wide component root; anchors `/`-prefixed references and
    /// graph keys.
    component_root: PathBuf,
}

impl PathResolver {
    /// Create a resolver anchored at the given component root.
    pub fn new(component_root: impl Into<PathBuf>) -> Self {
        Self {
            component_root: component_root.into().clean(),
        }
    }

    /// The component root this resolver is anchored at.
    pub fn component_root(&self) -> &Path {
        &self.component_root
    }

    /// Resolve a reference string to a candidate component directory.
    ///
    /// A `/`-prefixed reference is rooted at the component root; anything
    /// else resolves relative to `base_dir` (the directory containing the
    /// referencing manifest). When the resolved path does not exist but its
    /// parent is an existing directory, the parent is returned — references
    /// frequently name a file stem rather than the directory itself. A
    /// not-found path is still returned as a best-effort candidate for the
    /// classifier to reject.
    pub fn resolve(&self, reference: &str, base_dir: &Path) -> Option<PathBuf> {
        if reference.is_empty() {
            return None;
        }

        let candidate = if let Some(rooted) = reference.strip_prefix('/') {
            self.component_root.join(rooted)
        } else {
            base_dir.join(reference)
        }
        .clean();

        if !candidate.exists() {
            if let Some(parent) = candidate.parent() {
                if parent.is_dir() {
                    return Some(parent.to_path_buf());
                }
            }
        } else if candidate.is_dir() {
            return Some(candidate);
        }

        Some(candidate)
    }

    /// Canonical form for equality and prefix comparisons, never for display.
    ///
    /// Lexically cleans the path and strips any trailing separator; does not
    /// touch the filesystem, so nonexistent paths normalize too.
    pub fn normalize(path: &Path) -> PathBuf {
        path.clean()
    }

    /// Graph key for a markup file: root-relative, `/`-prefixed, forward
    /// slashes, markup extension stripped (`/pages/home/home`).
    ///
    /// A markup path outside the component root keeps its full shape minus
    /// the extension, so the key stays stable rather than panicking.
    pub fn markup_key(&self, markup_path: &Path) -> String {
        let stem = markup_path.with_extension("");
        let relative = stem.strip_prefix(&self.component_root).unwrap_or(&stem);

        let mut key = String::new();
        for component in relative.components() {
            if let Component::Normal(part) = component {
                key.push('/');
                key.push_str(&part.to_string_lossy());
            }
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PathResolver) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("components/card")).unwrap();
        std::fs::write(temp.path().join("components/card/card.json"), "{}").unwrap();
        let resolver = PathResolver::new(temp.path());
        (temp, resolver)
    }

    #[test]
    fn test_rooted_reference_resolves_from_component_root() {
        let (temp, resolver) = fixture();
        let base = temp.path().join("pages/home");

        let resolved = resolver.resolve("/components/card", &base).unwrap();
        assert_eq!(resolved, temp.path().join("components/card"));
    }

    #[test]
    fn test_relative_reference_resolves_from_base_dir() {
        let (temp, resolver) = fixture();
        std::fs::create_dir_all(temp.path().join("components/banner")).unwrap();
        let base = temp.path().join("components/card");

        let resolved = resolver.resolve("../banner", &base).unwrap();
        assert_eq!(resolved, temp.path().join("components/banner"));
    }

    #[test]
    fn test_file_stem_reference_falls_back_to_parent_directory() {
        let (temp, resolver) = fixture();
        let base = temp.path().join("pages/home");

        // "/components/card/card" names the file stem, not the directory
        let resolved = resolver.resolve("/components/card/card", &base).unwrap();
        assert_eq!(resolved, temp.path().join("components/card"));
    }

    #[test]
    fn test_missing_path_is_still_returned_as_candidate() {
        let (temp, resolver) = fixture();
        let base = temp.path().join("pages/home");

        let resolved = resolver.resolve("/nowhere/at/all", &base).unwrap();
        assert_eq!(resolved, temp.path().join("nowhere/at/all"));
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        let (temp, resolver) = fixture();
        assert!(resolver.resolve("", temp.path()).is_none());
    }

    #[test]
    fn test_markup_key_strips_root_and_extension() {
        let (temp, resolver) = fixture();
        let markup = temp.path().join("pages/home/home.wxml");
        assert_eq!(resolver.markup_key(&markup), "/pages/home/home");
    }

    #[test]
    fn test_normalize_cleans_dot_segments() {
        let normalized = PathResolver::normalize(Path::new("/a/b/../c/"));
        assert_eq!(normalized, PathBuf::from("/a/c"));
    }
}
