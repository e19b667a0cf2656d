//! Manifest Parsing
//!
//! Every page or component directory carries a JSON manifest declaring
//! whether the directory is a component (`component: true`) and which named
//! components its markup may use (`usingComponents`). Only those two fields
//! matter here; unknown fields are ignored.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur while loading a manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest content is not valid JSON
    #[error("Malformed manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Manifest Config
// ============================================================================

/// Parsed attribute bag from a directory's manifest file.
///
/// Read-only snapshot per file. `using_components` preserves declaration
/// order, which in turn fixes the order of dependency edges in the graph.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestConfig {
    /// `component: true` marks the directory as a reusable component
    #[serde(default)]
    pub component: Option<bool>,

    /// Declared component usages: name -> reference path
    #[serde(default, rename = "usingComponents")]
    pub using_components: Option<IndexMap<String, String>>,
}

impl ManifestConfig {
    /// Parse a manifest from raw JSON text.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load and parse a manifest file from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Whether the manifest marks its directory as a component.
    ///
    /// Only a strict boolean `true` counts; absent or `false` means page.
    pub fn is_component(&self) -> bool {
        self.component == Some(true)
    }

    /// Declared usages in declaration order, empty when none were declared.
    pub fn declared_components(&self) -> impl Iterator<Item = (&String, &String)> {
        self.using_components.iter().flat_map(|map| map.iter())
    }
}
