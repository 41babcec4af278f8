//! Build-tree artifact discovery.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File suffix identifying shared libraries in the build output.
pub const SHARED_LIBRARY_EXT: &str = ".so";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    SharedLibrary,
    Executable,
}

/// A file found in one of the upstream build trees.
///
/// Artifacts are only ever copied out of the build tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub source: PathBuf,
    pub name: String,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn new(source: PathBuf, name: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            source,
            name: name.into(),
            kind,
        }
    }
}

/// List the files directly inside `source_dir` whose name ends with `extension`.
///
/// Matching is case-sensitive and does not descend into subdirectories. A
/// missing `source_dir` yields an empty list: a build tree may legitimately
/// produce no libraries at all. Order follows the directory listing.
pub fn scan(source_dir: &Path, extension: &str) -> Result<Vec<String>> {
    if !source_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let listing = fs::read_dir(source_dir)
        .with_context(|| format!("Failed to list directory: {}", source_dir.display()))?;
    for entry in listing {
        let entry = entry
            .with_context(|| format!("Failed to read entry in {}", source_dir.display()))?;
        // Follows symlinks, so a link to a library still counts.
        if entry.path().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!("Skipping file with non UTF-8 name: {}", entry.path().display());
            continue;
        };
        if name.ends_with(extension) {
            names.push(name);
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let names = scan(&temp.path().join("absent"), ".so").unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_scan_matches_suffix_only() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        for f in ["libace.so", "libz.so", "libz.so.1", "README", "libcaps.SO"] {
            fs::write(dir.join(f), "").unwrap();
        }

        let names = sorted(scan(dir, ".so").unwrap());
        assert_eq!(names, ["libace.so", "libz.so"]);
    }

    #[test]
    fn test_scan_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join(OsStr::from_bytes(b"lib\xff.so")), "").unwrap();
        fs::write(dir.join("libok.so"), "").unwrap();

        let names = scan(dir, ".so").unwrap();
        assert_eq!(names, ["libok.so"]);
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/libdeep.so"), "").unwrap();
        fs::create_dir_all(dir.join("plugins.so")).unwrap();
        fs::write(dir.join("libtop.so"), "").unwrap();

        let names = scan(dir, ".so").unwrap();
        assert_eq!(names, ["libtop.so"]);
    }
}
