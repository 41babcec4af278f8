//! Destination tree lifecycle.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scan::ArtifactKind;

/// Executables area, relative to the package root.
pub const BIN_DIR: &str = "bin";
/// Shared-library area, relative to the package root.
pub const LIB_DIR: &str = "lib";
/// Package descriptor written at the package root.
pub const MANIFEST_FILE: &str = "package.json";

/// The package being assembled: a root holding `bin/` and `lib/`.
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
}

impl OutputTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join(LIB_DIR)
    }

    /// Directory an artifact of `kind` is installed into.
    pub fn area_for(&self, kind: ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::SharedLibrary => self.lib_dir(),
            ArtifactKind::Executable => self.bin_dir(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Delete any previous package at the root and recreate it empty.
    ///
    /// A root that does not exist yet is not an error. Afterwards the root
    /// holds exactly two empty directories, `bin/` and `lib/`.
    pub fn reset(&self) -> Result<()> {
        if self.root.exists() || self.root.is_symlink() {
            let removed = if self.root.is_dir() && !self.root.is_symlink() {
                fs::remove_dir_all(&self.root)
            } else {
                fs::remove_file(&self.root)
            };
            removed.with_context(|| {
                format!("Failed to remove old package: {}", self.root.display())
            })?;
        }

        for dir in [self.bin_dir(), self.lib_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_reset_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let tree = OutputTree::new(temp.path().join("nested/dist"));

        tree.reset().unwrap();

        assert_eq!(entries(tree.root()), ["bin", "lib"]);
        assert!(entries(&tree.bin_dir()).is_empty());
        assert!(entries(&tree.lib_dir()).is_empty());
    }

    #[test]
    fn test_reset_discards_previous_package() {
        let temp = TempDir::new().unwrap();
        let tree = OutputTree::new(temp.path().join("dist"));
        tree.reset().unwrap();
        fs::write(tree.bin_dir().join("stale"), "old").unwrap();
        fs::write(tree.lib_dir().join("libstale.so"), "old").unwrap();
        fs::write(tree.manifest_path(), "{}").unwrap();
        fs::create_dir_all(tree.root().join("extra/deep")).unwrap();

        tree.reset().unwrap();

        assert_eq!(entries(tree.root()), ["bin", "lib"]);
        assert!(entries(&tree.bin_dir()).is_empty());
        assert!(entries(&tree.lib_dir()).is_empty());
        assert!(!tree.manifest_path().exists());
    }

    #[test]
    fn test_area_for_kind() {
        let tree = OutputTree::new("/pkg");
        assert_eq!(tree.area_for(ArtifactKind::SharedLibrary), Path::new("/pkg/lib"));
        assert_eq!(tree.area_for(ArtifactKind::Executable), Path::new("/pkg/bin"));
    }

    #[test]
    fn test_reset_replaces_plain_file_at_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("dist");
        fs::write(&root, "not a directory").unwrap();

        let tree = OutputTree::new(&root);
        tree.reset().unwrap();

        assert!(tree.bin_dir().is_dir());
        assert!(tree.lib_dir().is_dir());
    }
}
