//! ELF search-path rewriting through `patchelf`.
//!
//! Installed files get a search path relative to their own location at load
//! time (`$ORIGIN`), so the package keeps working wherever it is unpacked.
//! Libraries look in their own directory; executables look one level up in
//! the sibling `lib/` directory.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::scan::ArtifactKind;

/// Search path for shared libraries: their own directory.
pub const LIB_RPATH: &str = "$ORIGIN";
/// Search path for executables in `bin/`: the sibling `lib/` directory.
pub const BIN_RPATH: &str = "$ORIGIN/../lib";

impl ArtifactKind {
    /// Search path an installed artifact of this kind gets.
    pub fn search_path(self) -> &'static str {
        match self {
            ArtifactKind::SharedLibrary => LIB_RPATH,
            ArtifactKind::Executable => BIN_RPATH,
        }
    }
}

#[derive(Debug, Error)]
pub enum RpathError {
    #[error("search-path tool '{tool}' not found - install patchelf")]
    ToolNotFound {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("search-path tool {} is not runnable: {reason}", .path.display())]
    ToolNotRunnable { path: PathBuf, reason: String },

    #[error("file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to launch {}", .tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("--set-rpath failed on {}: {stderr}", .path.display())]
    PatchFailed { path: PathBuf, stderr: String },
}

/// A located, runnable search-path rewriting tool.
#[derive(Debug, Clone)]
pub struct RpathTool {
    path: PathBuf,
}

impl RpathTool {
    /// Resolve `tool` (a bare name looked up on `PATH`, or a path) and check
    /// that it actually runs.
    ///
    /// # Errors
    ///
    /// Returns [`RpathError::ToolNotFound`] if the tool cannot be resolved and
    /// [`RpathError::ToolNotRunnable`] if `<tool> --version` fails.
    pub fn locate(tool: &Path) -> Result<Self, RpathError> {
        let path = which::which(tool).map_err(|source| RpathError::ToolNotFound {
            tool: tool.display().to_string(),
            source,
        })?;

        let output = Command::new(&path)
            .arg("--version")
            .output()
            .map_err(|e| RpathError::ToolNotRunnable {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(RpathError::ToolNotRunnable {
                path,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout);
        debug!("Using {} ({})", path.display(), version.trim());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `<tool> --set-rpath <rpath> <file>`, rewriting `file` in place.
    pub fn set_rpath(&self, file: &Path, rpath: &str) -> Result<(), RpathError> {
        if !file.exists() {
            return Err(RpathError::MissingFile(file.to_path_buf()));
        }

        let output = Command::new(&self.path)
            .arg("--set-rpath")
            .arg(rpath)
            .arg(file)
            .output()
            .map_err(|source| RpathError::Spawn {
                tool: self.path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RpathError::PatchFailed {
                path: file.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Rewrite every installed file of `kind`, logging and skipping failures.
    ///
    /// Returns the files left unpatched.
    pub fn patch_all(&self, files: &[PathBuf], kind: ArtifactKind) -> Vec<PathBuf> {
        let rpath = kind.search_path();
        let mut degraded = Vec::new();
        for file in files {
            match self.set_rpath(file, rpath) {
                Ok(()) => info!("Patched rpath of {} to {}", file.display(), rpath),
                Err(err) => {
                    warn!("Leaving {} unpatched: {}", file.display(), err);
                    degraded.push(file.clone());
                }
            }
        }
        degraded
    }
}
