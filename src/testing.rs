//! Testing utilities for tagsmith
//!
//! Provides `TestDataset`, a temporary dataset folder that is removed on drop,
//! with helpers for creating image/tag pairs.
//!
//! Only available when compiled with `cfg(test)`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Placeholder image bytes; no code path decodes them
const FAKE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Temporary dataset folder
///
/// The directory and everything in it is deleted when the value is dropped.
pub struct TestDataset {
    dir: TempDir,
}

impl TestDataset {
    /// Create an empty dataset folder
    ///
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dataset dir"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an arbitrary file into the folder
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Create `<stem>.png`
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn add_image(&self, stem: &str) -> PathBuf {
        let path = self.dir.path().join(format!("{stem}.png"));
        fs::write(&path, FAKE_IMAGE).expect("Failed to write test image");
        path
    }

    /// Create `<stem>.png` and `<stem>.txt` holding `tags`
    pub fn add_item(&self, stem: &str, tags: &str) -> PathBuf {
        self.write_file(&format!("{stem}.txt"), tags);
        self.add_image(stem)
    }

    /// Contents of `<stem>.txt`
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read_tags(&self, stem: &str) -> String {
        fs::read_to_string(self.dir.path().join(format!("{stem}.txt")))
            .expect("Failed to read tag file")
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Sorted file names in the folder
    ///
    /// # Panics
    /// Panics if the folder cannot be listed.
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .expect("Failed to list test dir")
            .filter_map(std::result::Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for TestDataset {
    fn default() -> Self {
        Self::new()
    }
}
