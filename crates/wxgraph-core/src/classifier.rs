//! Page / Component Directory Classification
//!
//! Mini Program directories follow one of two naming conventions: files named
//! after the directory (`card/card.json`, `card/card.ts`, `card/card.wxml`)
//! or `index.*` files. A directory is a page when a complete
//! manifest/script/markup triple exists and the manifest does not carry
//! `component: true`; it is a valid component when its manifest carries
//! exactly that flag.
//!
//! Classification never errors: unreadable or malformed manifests simply
//! classify the directory as neither page nor component.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::manifest::ManifestConfig;

/// Manifest file extension
const MANIFEST_EXT: &str = "json";
/// Markup file extension
const MARKUP_EXT: &str = "wxml";
/// Accepted script extensions (the original tooling emits TypeScript, plain
/// JavaScript projects exist too)
const SCRIPT_EXTS: &[&str] = &["ts", "js"];

/// Classifies directories as pages or components by naming convention
/// and manifest content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentClassifier;

impl ComponentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Whether `dir` is a page directory.
    ///
    /// True iff one of the naming conventions yields a complete
    /// manifest/script/markup triple whose manifest lacks `component: true`.
    /// A manifest that fails to parse fails that convention and the next one
    /// is tried; nothing is raised to the caller.
    pub fn is_page_directory(&self, dir: &Path) -> bool {
        for stem in Self::candidate_stems(dir) {
            let manifest = dir.join(format!("{stem}.{MANIFEST_EXT}"));
            let markup = dir.join(format!("{stem}.{MARKUP_EXT}"));
            let has_script = SCRIPT_EXTS
                .iter()
                .any(|ext| dir.join(format!("{stem}.{ext}")).is_file());

            if !manifest.is_file() || !markup.is_file() || !has_script {
                continue;
            }

            match ManifestConfig::load(&manifest) {
                Ok(config) => return !config.is_component(),
                Err(e) => {
                    warn!("Unreadable manifest {}: {}", manifest.display(), e);
                    continue;
                }
            }
        }
        false
    }

    /// Whether `dir` is a valid component directory.
    ///
    /// True iff the directory exists, a manifest is found via the dual
    /// naming lookup, and its `component` field is strictly boolean `true`.
    /// Any read or parse failure yields false.
    pub fn is_valid_component(&self, dir: &Path) -> bool {
        if !dir.is_dir() {
            return false;
        }

        let Some(manifest) = self.manifest_path(dir) else {
            return false;
        };

        match ManifestConfig::load(&manifest) {
            Ok(config) => config.is_component(),
            Err(e) => {
                debug!("Rejecting {}: {}", manifest.display(), e);
                false
            }
        }
    }

    /// Path to the directory's manifest file, `{dirname}.json` first,
    /// then `index.json`.
    pub fn manifest_path(&self, dir: &Path) -> Option<PathBuf> {
        self.conventional_file(dir, MANIFEST_EXT)
    }

    /// Path to the directory's markup file, `{dirname}.wxml` first,
    /// then `index.wxml`.
    pub fn markup_path(&self, dir: &Path) -> Option<PathBuf> {
        self.conventional_file(dir, MARKUP_EXT)
    }

    fn conventional_file(&self, dir: &Path, ext: &str) -> Option<PathBuf> {
        for stem in Self::candidate_stems(dir) {
            let path = dir.join(format!("{stem}.{ext}"));
            if path.is_file() {
                return Some(path);
            }
        }
        None
    }

    /// Naming-convention stems in lookup order: the directory's own base
    /// name, then `index`.
    fn candidate_stems(dir: &Path) -> impl Iterator<Item = String> + '_ {
        dir.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .into_iter()
            .chain(std::iter::once("index".to_string()))
    }
}
