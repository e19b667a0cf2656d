//! Dependency Graph Builder
//!
//! Orchestrates the resolver pipeline: enumerate page directories under a
//! pages root, read each page's manifest and markup, keep only the declared
//! components that actually appear in the markup, and recurse into every
//! resolved component directory. A visited set keyed by graph key guards
//! against reprocessing and terminates dependency cycles.
//!
//! Failures inside a single directory's expansion are absorbed (whatever was
//! already recorded stands); only an unusable pages root errors out of
//! [`GraphBuilder::build`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classifier::ComponentClassifier;
use crate::graph::{ComponentDependency, DependencyGraph};
use crate::manifest::ManifestConfig;
use crate::matcher::{MatchStrategy, UsageMatcher};
use crate::resolver::PathResolver;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during graph building.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Pages root does not exist or is not a directory
    #[error("Pages root not found: {0}")]
    PagesRootNotFound(PathBuf),

    /// IO error reading the pages root
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Graph Builder
// ============================================================================

/// Builds component dependency graphs from a pages directory.
///
/// The builder owns its visited set and graph exclusively; both are reset at
/// the start of every [`build`](Self::build) call. Concurrent builds must
/// use independent builder instances.
///
/// ## Example
///
/// ```ignore
/// use wxgraph_core::builder::GraphBuilder;
/// use std::path::Path;
///
/// let mut builder = GraphBuilder::new("/project/src/miniprogram");
/// let graph = builder.build(Path::new("/project/src/miniprogram/pages"))?;
/// println!("Resolved {} files", graph.node_count());
/// ```
pub struct GraphBuilder {
    resolver: PathResolver,
    classifier: ComponentClassifier,
    matcher: UsageMatcher,
    visited: HashSet<String>,
    graph: DependencyGraph,
}

impl GraphBuilder {
    /// Create a builder anchored at the project's component root (the
    /// directory `/`-prefixed references and graph keys are relative to).
    pub fn new(component_root: impl Into<PathBuf>) -> Self {
        Self::with_matcher(component_root, UsageMatcher::new())
    }

    /// Create a builder with an explicit matching strategy.
    pub fn with_strategy(component_root: impl Into<PathBuf>, strategy: MatchStrategy) -> Self {
        Self::with_matcher(component_root, UsageMatcher::with_strategy(strategy))
    }

    /// Create a builder with a pre-configured matcher (custom observer).
    pub fn with_matcher(component_root: impl Into<PathBuf>, matcher: UsageMatcher) -> Self {
        Self {
            resolver: PathResolver::new(component_root),
            classifier: ComponentClassifier::new(),
            matcher,
            visited: HashSet::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Build the dependency graph for every page under `pages_dir`.
    ///
    /// Enumerates immediate subdirectories, keeps those classified as pages,
    /// and expands each recursively. Page directories are processed in name
    /// order so repeated builds over an unchanged tree produce identical
    /// graphs.
    pub fn build(&mut self, pages_dir: &Path) -> Result<DependencyGraph, BuilderError> {
        if !pages_dir.is_dir() {
            return Err(BuilderError::PagesRootNotFound(pages_dir.to_path_buf()));
        }

        self.visited.clear();
        self.graph = DependencyGraph::new();

        info!("Resolving pages under {}", pages_dir.display());

        let mut page_dirs = Vec::new();
        for entry in fs::read_dir(pages_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && self.classifier.is_page_directory(&path) {
                page_dirs.push(path);
            }
        }
        page_dirs.sort();

        info!("Found {} page director{}", page_dirs.len(), if page_dirs.len() == 1 { "y" } else { "ies" });

        for page_dir in &page_dirs {
            self.expand(page_dir);
        }

        let graph = std::mem::take(&mut self.graph);
        info!(
            "Graph summary: {} files, {} dependency edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Expand one page or component directory into the graph.
    ///
    /// Inserts the directory's key with an empty dependency list first, so
    /// leaves and cycle-stopped nodes still appear, then records an edge for
    /// every declared component with at least one real markup occurrence and
    /// recurses into it. Errors abort only this directory's expansion.
    fn expand(&mut self, dir: &Path) {
        let Some(markup_path) = self.classifier.markup_path(dir) else {
            debug!("No markup file in {}, skipping", dir.display());
            return;
        };
        let key = self.resolver.markup_key(&markup_path);

        // Cycle / duplicate-work guard: at most one expansion per key
        if !self.visited.insert(key.clone()) {
            return;
        }
        self.graph.insert_node(key.clone());

        let Some(manifest_path) = self.classifier.manifest_path(dir) else {
            return;
        };
        let config = match ManifestConfig::load(&manifest_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Unreadable manifest {}: {}", manifest_path.display(), e);
                return;
            }
        };
        if config.using_components.is_none() {
            debug!("{key} declares no component usages");
            return;
        }

        let markup = match fs::read_to_string(&markup_path) {
            Ok(markup) => markup,
            Err(e) => {
                warn!("Unreadable markup {}: {}", markup_path.display(), e);
                return;
            }
        };

        // Collect targets first: recursion needs &mut self and the manifest
        // borrow must end before it
        let declared: Vec<(String, String)> = config
            .declared_components()
            .map(|(name, reference)| (name.clone(), reference.clone()))
            .collect();

        for (component_name, reference) in declared {
            if !self.matcher.is_used(&markup, &component_name) {
                debug!("{key}: declared component {component_name} never used in markup");
                continue;
            }

            let Some(target_dir) = self.resolver.resolve(&reference, dir) else {
                continue;
            };
            if !self.classifier.is_valid_component(&target_dir) {
                debug!("{key}: {reference} did not resolve to a valid component");
                continue;
            }
            let Some(target_markup) = self.classifier.markup_path(&target_dir) else {
                continue;
            };
            let target_key = self.resolver.markup_key(&target_markup);

            let references = self.matcher.find_positions(&markup, &component_name);
            if references.is_empty() {
                // Existence check passed but position extraction found
                // nothing; an edge without references is never recorded
                continue;
            }

            debug!(
                "{key} -> {target_key} ({} reference{})",
                references.len(),
                if references.len() == 1 { "" } else { "s" }
            );
            self.graph
                .add_dependency(&key, ComponentDependency::new(target_key, references));

            self.expand(&target_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn make_page(root: &Path, rel: &str, manifest: &str, markup: &str) {
        let name = Path::new(rel).file_name().unwrap().to_str().unwrap().to_string();
        let dir = root.join(rel);
        write(&dir.join(format!("{name}.json")), manifest);
        write(&dir.join(format!("{name}.ts")), "Page({})");
        write(&dir.join(format!("{name}.wxml")), markup);
    }

    fn make_component(root: &Path, rel: &str, manifest: &str, markup: &str) {
        let name = Path::new(rel).file_name().unwrap().to_str().unwrap().to_string();
        let dir = root.join(rel);
        write(&dir.join(format!("{name}.json")), manifest);
        write(&dir.join(format!("{name}.wxml")), markup);
    }

    #[test]
    fn test_missing_pages_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut builder = GraphBuilder::new(temp.path());
        let result = builder.build(&temp.path().join("pages"));
        assert!(matches!(result, Err(BuilderError::PagesRootNotFound(_))));
    }

    #[test]
    fn test_single_page_with_used_component() {
        let temp = TempDir::new().unwrap();
        make_page(
            temp.path(),
            "pages/home",
            r#"{"usingComponents": {"card": "/components/card"}}"#,
            "<card/>",
        );
        make_component(
            temp.path(),
            "components/card",
            r#"{"component": true}"#,
            "<view/>",
        );

        let mut builder = GraphBuilder::new(temp.path());
        let graph = builder.build(&temp.path().join("pages")).unwrap();

        assert_eq!(graph.node_count(), 2);
        let deps = graph.dependencies("/pages/home/home").unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].target_path, "/components/card/card");
        assert_eq!(deps[0].reference_list.len(), 1);
        assert_eq!(graph.dependencies("/components/card/card").unwrap(), &[]);
    }

    #[test]
    fn test_declared_but_unused_component_is_omitted() {
        let temp = TempDir::new().unwrap();
        make_page(
            temp.path(),
            "pages/home",
            r#"{"usingComponents": {"card": "/components/card"}}"#,
            "<view/>",
        );
        make_component(
            temp.path(),
            "components/card",
            r#"{"component": true}"#,
            "<view/>",
        );

        let mut builder = GraphBuilder::new(temp.path());
        let graph = builder.build(&temp.path().join("pages")).unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.dependencies("/pages/home/home").unwrap(), &[]);
        assert!(!graph.contains_key("/components/card/card"));
    }

    #[test]
    fn test_invalid_component_target_is_skipped() {
        let temp = TempDir::new().unwrap();
        make_page(
            temp.path(),
            "pages/home",
            r#"{"usingComponents": {"card": "/components/card"}}"#,
            "<card/>",
        );
        // Manifest lacks component: true, so the target must be rejected
        make_component(temp.path(), "components/card", "{}", "<view/>");

        let mut builder = GraphBuilder::new(temp.path());
        let graph = builder.build(&temp.path().join("pages")).unwrap();

        assert_eq!(graph.dependencies("/pages/home/home").unwrap(), &[]);
    }

    #[test]
    fn test_component_cycle_terminates() {
        let temp = TempDir::new().unwrap();
        make_page(
            temp.path(),
            "pages/home",
            r#"{"usingComponents": {"a": "/components/a"}}"#,
            "<a/>",
        );
        make_component(
            temp.path(),
            "components/a",
            r#"{"component": true, "usingComponents": {"b": "/components/b"}}"#,
            "<b/>",
        );
        make_component(
            temp.path(),
            "components/b",
            r#"{"component": true, "usingComponents": {"a": "/components/a"}}"#,
            "<a/>",
        );

        let mut builder = GraphBuilder::new(temp.path());
        let graph = builder.build(&temp.path().join("pages")).unwrap();

        // a and b each appear exactly once, each with one edge to the other
        assert_eq!(graph.dependencies("/components/a/a").unwrap().len(), 1);
        assert_eq!(graph.dependencies("/components/b/b").unwrap().len(), 1);
        assert_eq!(
            graph.dependencies("/components/a/a").unwrap()[0].target_path,
            "/components/b/b"
        );
        assert_eq!(
            graph.dependencies("/components/b/b").unwrap()[0].target_path,
            "/components/a/a"
        );
    }

    #[test]
    fn test_shared_component_is_expanded_once() {
        let temp = TempDir::new().unwrap();
        for page in ["home", "detail"] {
            make_page(
                temp.path(),
                &format!("pages/{page}"),
                r#"{"usingComponents": {"card": "/components/card"}}"#,
                "<card/>",
            );
        }
        make_component(
            temp.path(),
            "components/card",
            r#"{"component": true}"#,
            "<view/>",
        );

        let mut builder = GraphBuilder::new(temp.path());
        let graph = builder.build(&temp.path().join("pages")).unwrap();

        // Both pages point at the same single card entry
        assert_eq!(graph.node_count(), 3);
        assert_eq!(
            graph.dependencies("/pages/home/home").unwrap()[0].target_path,
            "/components/card/card"
        );
        assert_eq!(
            graph.dependencies("/pages/detail/detail").unwrap()[0].target_path,
            "/components/card/card"
        );
    }

    #[test]
    fn test_malformed_manifest_stops_only_that_directory() {
        let temp = TempDir::new().unwrap();
        make_page(
            temp.path(),
            "pages/home",
            r#"{"usingComponents": {"card": "/components/card"}}"#,
            "<card/>",
        );
        make_component(
            temp.path(),
            "components/card",
            r#"{"component": true, "usingComponents": {"#,
            "<view/>",
        );

        // card's manifest is broken: is_valid_component rejects it, so home
        // simply ends up with no edges, and the build succeeds
        let mut builder = GraphBuilder::new(temp.path());
        let graph = builder.build(&temp.path().join("pages")).unwrap();
        assert_eq!(graph.dependencies("/pages/home/home").unwrap(), &[]);
    }

    #[test]
    fn test_builds_are_idempotent() {
        let temp = TempDir::new().unwrap();
        make_page(
            temp.path(),
            "pages/home",
            r#"{"usingComponents": {"card": "/components/card"}}"#,
            "<card/>\n<card/>",
        );
        make_component(
            temp.path(),
            "components/card",
            r#"{"component": true}"#,
            "<view/>",
        );

        let mut builder = GraphBuilder::new(temp.path());
        let first = builder.build(&temp.path().join("pages")).unwrap();
        let second = builder.build(&temp.path().join("pages")).unwrap();
        assert_eq!(first, second);
    }
}
