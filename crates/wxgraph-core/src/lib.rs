//! wxgraph-core - Component dependency graph resolution for Mini Program projects
//!
//! This crate provides the resolver pipeline:
//! - Page/component directory classification by naming convention and manifest
//! - Declared-vs-actual usage matching over markup text (regex and
//!   tree-walk strategies with automatic fallback)
//! - Recursive dependency graph construction with cycle guarding
//! - Position mapping of every component usage to 1-based line/column
//! - Statistics and JSON export for downstream visualization

pub mod builder;
pub mod classifier;
pub mod graph;
pub mod manifest;
pub mod markup;
pub mod matcher;
pub mod report;
pub mod resolver;
pub mod stats;
pub mod usage;

// Re-exports for convenience
pub use builder::{BuilderError, GraphBuilder};
pub use classifier::ComponentClassifier;
pub use graph::{ComponentDependency, ComponentReference, DependencyGraph};
pub use manifest::{ManifestConfig, ManifestError};
pub use markup::{MarkupError, MarkupParser};
pub use matcher::{MatchObserver, MatchStrategy, TracingObserver, UsageMatcher};
pub use report::{GraphReport, ReportError, ReportMetadata};
pub use resolver::PathResolver;
pub use stats::{GraphStatistics, MostReferencedTarget};
pub use usage::{find_component_usages, ComponentUsage};
