//! Graph Export
//!
//! Serializes a built graph plus scan metadata into the JSON artifact the
//! downstream visualization consumes as a static data source.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::DependencyGraph;
use crate::stats::GraphStatistics;

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Metadata block accompanying an exported graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Pages directory the build scanned
    pub scan_path: String,
    /// When the report was generated (RFC 3339)
    pub timestamp: DateTime<Utc>,
    /// Statistics computed over the exported graph
    pub statistics: GraphStatistics,
}

/// The exported graph artifact: `{ metadata, dependencyGraph }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReport {
    pub metadata: ReportMetadata,
    pub dependency_graph: DependencyGraph,
}

impl GraphReport {
    /// Assemble a report for a graph built from `scan_path`.
    pub fn new(scan_path: &Path, graph: DependencyGraph) -> Self {
        let statistics = GraphStatistics::compute(&graph);
        Self {
            metadata: ReportMetadata {
                scan_path: scan_path.display().to_string(),
                timestamp: Utc::now(),
                statistics,
            },
            dependency_graph: graph,
        }
    }

    /// Pretty-printed JSON form.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to a file.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Load a previously written report.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
