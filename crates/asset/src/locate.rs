//! Resolving asset names to files on disk.

use std::path::{Path, PathBuf};

pub const MODELS_DIR: &str = "models";

/// Root directory holding one sub-directory per asset category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRoot {
    root: PathBuf,
}

impl Default for AssetRoot {
    fn default() -> Self {
        Self::new("resources")
    }
}

impl AssetRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<category>/<file>`.
    pub fn path(&self, category: &str, file: &str) -> PathBuf {
        self.root.join(category).join(file)
    }

    pub fn model_path(&self, file: &str) -> PathBuf {
        self.path(MODELS_DIR, file)
    }
}
