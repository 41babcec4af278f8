//! End-to-end package assembly.
//!
//! Stages run strictly in order, each finishing before the next starts:
//!
//! 1. reset the destination tree
//! 2. locate the search-path tool (rpath strategy only; fatal if absent)
//! 3. collect shared libraries, then patch them to `$ORIGIN`
//! 4. install executables, then patch them to `$ORIGIN/../lib`
//! 5. write the manifest
//!
//! Per-artifact problems are logged and skipped. Only configuration, I/O
//! on the package itself, a missing tool, or the manifest write abort the run.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::collect::{collect_libraries, Collision};
use crate::config::{BuildConfiguration, InstallStrategy};
use crate::install::{install_binaries, BinaryMap};
use crate::layout::{OutputTree, MANIFEST_FILE};
use crate::manifest::{generate_manifest, write_manifest};
use crate::rpath::RpathTool;
use crate::scan::ArtifactKind;

/// What a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    pub dist_dir: PathBuf,
    pub binaries: BinaryMap,
    /// Declared executables that were not installed.
    pub missing: Vec<String>,
    /// Number of distinct libraries in `lib/`.
    pub libraries: usize,
    pub collisions: Vec<Collision>,
    /// Installed files whose search path could not be rewritten.
    pub degraded: Vec<PathBuf>,
}

impl RunReport {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Assemble the package described by `config` from scratch.
///
/// Any previous package at the destination is deleted first.
pub fn run(config: &BuildConfiguration) -> Result<RunReport> {
    info!("Starting build...");
    let tree = OutputTree::new(config.dist_dir());
    tree.reset()?;

    let strategy = config.strategy();
    let tool = match strategy {
        InstallStrategy::Rpath => Some(
            RpathTool::locate(config.patch_tool())
                .context("Cannot make installed binaries relocatable")?,
        ),
        InstallStrategy::Wrapper => None,
    };

    if let Some(tool) = &tool {
        info!("Rewriting search paths with {}", tool.path().display());
    }

    info!("Copying libraries...");
    let libraries = collect_libraries(config, &tree)?;
    let mut degraded = Vec::new();
    if let Some(tool) = &tool {
        degraded.extend(tool.patch_all(&libraries.installed, ArtifactKind::SharedLibrary));
    }

    info!("Processing binaries...");
    let outcome = install_binaries(config, &tree, strategy, &libraries)?;
    if let Some(tool) = &tool {
        degraded.extend(tool.patch_all(&outcome.installed, ArtifactKind::Executable));
    }

    info!("Generating {}...", MANIFEST_FILE);
    let manifest = generate_manifest(config.package_metadata(), &outcome.binaries);
    write_manifest(&tree.manifest_path(), &manifest)?;

    Ok(RunReport {
        dist_dir: tree.root().to_path_buf(),
        binaries: outcome.binaries,
        missing: outcome.missing,
        libraries: libraries.installed.len(),
        collisions: libraries.collisions.into_iter().chain(outcome.collisions).collect(),
        degraded,
    })
}
