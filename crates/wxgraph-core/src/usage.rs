//! Component Usage Query
//!
//! Answers "where is the component containing this file used?" — a scoped
//! query over the same matching and resolution logic as the full graph
//! build, consumed by editor integrations. It never errors: any failure or
//! absence of matches yields an empty result list, and parse-fallback
//! details stay internal.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::graph::ComponentReference;
use crate::manifest::ManifestConfig;
use crate::matcher::UsageMatcher;
use crate::resolver::PathResolver;

/// Directories probed, in order, for the scan root under a project root.
const SCAN_ROOT_CANDIDATES: &[&str] = &["src", "miniprogram", "app"];

/// One manifest that declares and actually uses the queried component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUsage {
    /// Name the using manifest declares the component under
    pub component_name: String,
    /// Absolute path of the declaring manifest file
    pub used_in_file: PathBuf,
    /// Raw reference path as written in the manifest
    pub reference_path: String,
    /// Manifest path relative to the project root
    pub relative_file_path: String,
    /// Absolute path of the sibling markup file
    pub markup_file_path: PathBuf,
    /// Markup path relative to the project root
    pub markup_relative_path: String,
    /// Start-tag occurrences in the using markup, in document order
    pub positions: Vec<ComponentReference>,
}

/// Find every usage of the component containing `current_file`.
///
/// `project_root` defaults to the current working directory. Returns an
/// empty list when the component cannot be located, nothing uses it, or any
/// internal step fails.
pub fn find_component_usages(
    current_file: &Path,
    project_root: Option<&Path>,
) -> Vec<ComponentUsage> {
    let root = match project_root {
        Some(root) => root.to_path_buf(),
        None => match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(_) => return Vec::new(),
        },
    };

    let scan_root = find_scan_root(&root);
    let Some(target_dir) = target_component_dir(&root, current_file) else {
        debug!("No component directory found for {}", current_file.display());
        return Vec::new();
    };
    let target = PathResolver::normalize(&target_dir);

    debug!(
        "Searching {} for usages of {}",
        scan_root.display(),
        target.display()
    );

    let mut matcher = UsageMatcher::new();
    let mut results = Vec::new();

    for entry in WalkDir::new(&scan_root).into_iter().filter_map(Result::ok) {
        let manifest_path = entry.path();
        if !entry.file_type().is_file()
            || manifest_path.extension().is_none_or(|ext| ext != "json")
        {
            continue;
        }
        let Ok(config) = ManifestConfig::load(manifest_path) else {
            continue;
        };

        let manifest_dir = match manifest_path.parent() {
            Some(dir) => dir,
            None => continue,
        };

        for (component_name, reference) in config.declared_components() {
            let resolved = resolve_reference(&root, manifest_dir, reference);
            if !references_target(&resolved, &target) {
                continue;
            }

            let markup_path = manifest_path.with_extension("wxml");
            let Ok(markup) = std::fs::read_to_string(&markup_path) else {
                continue;
            };

            // Declared but unused entries are dropped
            let positions = matcher.find_positions(&markup, component_name);
            if positions.is_empty() {
                continue;
            }

            results.push(ComponentUsage {
                component_name: component_name.clone(),
                used_in_file: manifest_path.to_path_buf(),
                reference_path: reference.clone(),
                relative_file_path: relative_display(&root, manifest_path),
                markup_file_path: markup_path.clone(),
                markup_relative_path: relative_display(&root, &markup_path),
                positions,
            });
        }
    }

    results
}

/// First existing of `{root}/src`, `{root}/miniprogram`, `{root}/app`,
/// falling back to the root itself.
fn find_scan_root(root: &Path) -> PathBuf {
    for candidate in SCAN_ROOT_CANDIDATES {
        let dir = root.join(candidate);
        if dir.is_dir() {
            return dir;
        }
    }
    root.to_path_buf()
}

/// Walk up from `current_file` to the first ancestor directory that holds a
/// manifest named after itself; that directory is the queried component.
fn target_component_dir(root: &Path, current_file: &Path) -> Option<PathBuf> {
    let absolute = if current_file.is_absolute() {
        current_file.to_path_buf()
    } else {
        root.join(current_file)
    };

    let mut dir = absolute.parent()?.to_path_buf();
    while dir.starts_with(root) {
        if let Some(name) = dir.file_name() {
            let manifest = dir.join(format!("{}.json", name.to_string_lossy()));
            if manifest.is_file() {
                return Some(dir);
            }
        }
        if !dir.pop() {
            break;
        }
    }
    // No self-named manifest anywhere above: fall back to the file's own
    // directory
    absolute.parent().map(Path::to_path_buf)
}

/// Resolve a declared reference the way the original build does: rooted
/// references anchor at `{root}/src/miniprogram`, relative ones at the
/// declaring manifest's directory.
fn resolve_reference(root: &Path, manifest_dir: &Path, reference: &str) -> PathBuf {
    let candidate = if let Some(rooted) = reference.strip_prefix('/') {
        root.join("src").join("miniprogram").join(rooted)
    } else {
        manifest_dir.join(reference)
    };
    PathResolver::normalize(&candidate)
}

/// Whether a resolved reference points at the target component directory.
///
/// Containment on normalized paths, with a basename-equality fallback: a
/// reference whose final component matches the target's directory name
/// still counts. The fallback trades precision for recall — two unrelated
/// components sharing a basename under different parents can false-positive.
fn references_target(resolved: &Path, target: &Path) -> bool {
    if resolved.starts_with(target) || target.starts_with(resolved) {
        return true;
    }
    match (resolved.file_name(), target.file_name()) {
        (Some(resolved_name), Some(target_name)) => resolved_name == target_name,
        _ => false,
    }
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
