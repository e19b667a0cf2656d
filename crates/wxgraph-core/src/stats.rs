//! Graph Statistics
//!
//! Pure aggregation over a completed dependency graph. Nothing here touches
//! the filesystem; statistics can be recomputed from a deserialized graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;

/// The target accumulating the highest summed reference count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MostReferencedTarget {
    /// Graph key of the target; empty when the graph has no edges
    pub path: String,
    /// Summed reference count across all edges pointing at the target
    pub count: usize,
}

/// Aggregate counts over a built dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    /// Number of keys (files) in the graph
    pub total_files: usize,
    /// Sum of dependency-list lengths
    pub total_dependencies: usize,
    /// Sum of all reference-list lengths
    pub total_references: usize,
    /// Target with the highest summed reference count (first seen wins ties)
    pub most_referenced_target: MostReferencedTarget,
    /// `total_references / total_dependencies`, 0 when there are no edges
    pub average_references_per_dependency: f64,
}

impl GraphStatistics {
    /// Compute statistics over a completed graph in a single pass.
    pub fn compute(graph: &DependencyGraph) -> Self {
        let mut total_dependencies = 0;
        let mut total_references = 0;
        // Insertion order decides ties: the first target to reach the
        // maximum count stays the maximum
        let mut per_target: IndexMap<&str, usize> = IndexMap::new();

        for (_, dependencies) in graph.iter() {
            total_dependencies += dependencies.len();
            for dependency in dependencies {
                let count = dependency.reference_count();
                total_references += count;
                *per_target.entry(dependency.target_path.as_str()).or_default() += count;
            }
        }

        let mut most_referenced = MostReferencedTarget::default();
        for (path, count) in &per_target {
            if *count > most_referenced.count {
                most_referenced = MostReferencedTarget {
                    path: (*path).to_string(),
                    count: *count,
                };
            }
        }

        let average = if total_dependencies > 0 {
            total_references as f64 / total_dependencies as f64
        } else {
            0.0
        };

        Self {
            total_files: graph.node_count(),
            total_dependencies,
            total_references,
            most_referenced_target: most_referenced,
            average_references_per_dependency: average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ComponentDependency, ComponentReference};
    use pretty_assertions::assert_eq;

    fn dep(target: &str, references: usize) -> ComponentDependency {
        ComponentDependency::new(
            target.to_string(),
            (1..=references).map(|line| ComponentReference::new(line, 1)).collect(),
        )
    }

    #[test]
    fn test_empty_graph_has_zero_stats() {
        let stats = GraphStatistics::compute(&DependencyGraph::new());
        assert_eq!(stats, GraphStatistics::default());
    }

    #[test]
    fn test_counts_files_dependencies_and_references() {
        let mut graph = DependencyGraph::new();
        graph.insert_node("/pages/home/home".to_string());
        graph.add_dependency("/pages/home/home", dep("/components/card/card", 2));
        graph.add_dependency("/pages/home/home", dep("/components/banner/banner", 1));
        graph.insert_node("/components/card/card".to_string());

        let stats = GraphStatistics::compute(&graph);
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_dependencies, 2);
        assert_eq!(stats.total_references, 3);
        assert_eq!(stats.most_referenced_target.path, "/components/card/card");
        assert_eq!(stats.most_referenced_target.count, 2);
        assert_eq!(stats.average_references_per_dependency, 1.5);
    }

    #[test]
    fn test_reference_counts_sum_across_sources() {
        let mut graph = DependencyGraph::new();
        graph.insert_node("/pages/a/a".to_string());
        graph.insert_node("/pages/b/b".to_string());
        graph.add_dependency("/pages/a/a", dep("/components/card/card", 1));
        graph.add_dependency("/pages/b/b", dep("/components/card/card", 3));

        let stats = GraphStatistics::compute(&graph);
        assert_eq!(stats.most_referenced_target.count, 4);
    }

    #[test]
    fn test_ties_resolve_to_first_seen() {
        let mut graph = DependencyGraph::new();
        graph.insert_node("/pages/a/a".to_string());
        graph.add_dependency("/pages/a/a", dep("/components/first/first", 2));
        graph.add_dependency("/pages/a/a", dep("/components/second/second", 2));

        let stats = GraphStatistics::compute(&graph);
        assert_eq!(stats.most_referenced_target.path, "/components/first/first");
    }

    #[test]
    fn test_no_dependencies_means_zero_average() {
        let mut graph = DependencyGraph::new();
        graph.insert_node("/pages/a/a".to_string());

        let stats = GraphStatistics::compute(&graph);
        assert_eq!(stats.average_references_per_dependency, 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = GraphStatistics::compute(&DependencyGraph::new());
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("totalFiles").is_some());
        assert!(json.get("mostReferencedTarget").is_some());
        assert!(json.get("averageReferencesPerDependency").is_some());
    }
}
