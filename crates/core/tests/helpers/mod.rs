//! Shared test harness: builds throwaway project trees in a tempdir.

use std::fs;
use std::path::{Path, PathBuf};

use solgen_core::types::GenConfig;
use tempfile::TempDir;

pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().expect("could not create tempdir") }
    }

    #[allow(dead_code)]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file under the project root, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.dir.path().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.dir.path().join(rel).exists()
    }

    pub fn config(&self) -> GenConfig {
        GenConfig::new(self.dir.path().to_path_buf())
    }
}
