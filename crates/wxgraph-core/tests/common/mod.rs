//! Shared fixture builders for integration tests.
//!
//! Fixtures are real directory trees under a `TempDir`, laid out the way a
//! Mini Program project is: a component root containing `pages/` and
//! `components/`, each directory holding its manifest/script/markup files.

use std::path::Path;

use tempfile::TempDir;

/// A temporary Mini Program project rooted at its component root.
pub struct ProjectFixture {
    temp: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("create temp project"),
        }
    }

    /// The component root (anchor for `/`-prefixed references).
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// The conventional pages directory.
    pub fn pages_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("pages")
    }

    /// Add a page directory with the full manifest/script/markup triple.
    pub fn page(&self, rel: &str, manifest: &str, markup: &str) -> &Self {
        let name = basename(rel);
        self.write(&format!("{rel}/{name}.json"), manifest);
        self.write(&format!("{rel}/{name}.ts"), "Page({})");
        self.write(&format!("{rel}/{name}.wxml"), markup);
        self
    }

    /// Add a component directory (manifest + markup, `component: true`
    /// expected in the manifest).
    pub fn component(&self, rel: &str, manifest: &str, markup: &str) -> &Self {
        let name = basename(rel);
        self.write(&format!("{rel}/{name}.json"), manifest);
        self.write(&format!("{rel}/{name}.wxml"), markup);
        self
    }

    /// Write an arbitrary file relative to the root.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.temp.path().join(rel);
        std::fs::create_dir_all(path.parent().expect("fixture path has parent"))
            .expect("create fixture dirs");
        std::fs::write(path, content).expect("write fixture file");
        self
    }
}

fn basename(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}
