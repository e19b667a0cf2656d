//! Dependency Graph Data Model
//!
//! The graph is an adjacency mapping from a source file key (root-relative
//! markup path with the extension stripped, e.g. `/pages/home/home`) to the
//! ordered list of component dependencies that file actually uses. Each
//! dependency carries every start-tag occurrence of the component in the
//! source file's markup, in document order.
//!
//! A key mapped to an empty list is a leaf: the file was expanded but uses
//! no further components (or its expansion was stopped by the cycle guard).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Component Reference
// ============================================================================

/// A single textual occurrence of a component start tag.
///
/// Both coordinates are 1-based. Created during matching, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentReference {
    /// 1-based line number of the `<` opening the start tag
    pub line: usize,
    /// 1-based column number of the `<` opening the start tag
    pub column: usize,
}

impl ComponentReference {
    /// Create a reference at the given 1-based coordinates.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ============================================================================
// Component Dependency
// ============================================================================

/// Directed edge payload: one component used by a source file.
///
/// A single edge may carry multiple references when the same component
/// appears several times in one document. `reference_list` is never empty:
/// an edge is only recorded after at least one real occurrence was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDependency {
    /// Graph key of the target component (normalized, slash-separated)
    #[serde(rename = "targetPath")]
    pub target_path: String,
    /// Start-tag occurrences in the source document, in document order
    #[serde(rename = "referenceList")]
    pub reference_list: Vec<ComponentReference>,
}

impl ComponentDependency {
    /// Create a dependency edge to `target_path` with its occurrences.
    pub fn new(target_path: String, reference_list: Vec<ComponentReference>) -> Self {
        Self {
            target_path,
            reference_list,
        }
    }

    /// Number of occurrences this edge carries.
    pub fn reference_count(&self) -> usize {
        self.reference_list.len()
    }
}

// ============================================================================
// Dependency Graph
// ============================================================================

/// Adjacency mapping from source file key to its component dependencies.
///
/// Keys are unique, root-relative, `/`-prefixed and slash-separated. Key
/// insertion order is preserved so repeated builds over an unchanged tree
/// serialize identically. The graph is built fresh per build invocation and
/// exclusively owned by the builder that constructs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    entries: IndexMap<String, Vec<ComponentDependency>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key with an empty dependency list if not already present.
    ///
    /// Leaf and cycle-stopped nodes still appear in the graph this way.
    pub fn insert_node(&mut self, key: String) {
        self.entries.entry(key).or_default();
    }

    /// Append a dependency edge to an existing key's list.
    pub fn add_dependency(&mut self, key: &str, dependency: ComponentDependency) {
        self.entries.entry(key.to_string()).or_default().push(dependency);
    }

    /// Whether the graph contains the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Dependencies recorded for a key, if present.
    pub fn dependencies(&self, key: &str) -> Option<&[ComponentDependency]> {
        self.entries.get(key).map(|deps| deps.as_slice())
    }

    /// Number of keys in the graph.
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of dependency edges across all keys.
    pub fn edge_count(&self) -> usize {
        self.entries.values().map(|deps| deps.len()).sum()
    }

    /// Whether the graph has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, dependencies)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<ComponentDependency>)> {
        self.entries.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}
