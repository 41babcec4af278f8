//! Executable lookup and installation.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::collect::{Collision, LibraryCollection};
use crate::config::{BuildConfiguration, InstallStrategy};
use crate::copy::{copy_artifact, make_executable};
use crate::layout::{OutputTree, BIN_DIR};
use crate::paths::find_binary;
use crate::scan::{Artifact, ArtifactKind};
use crate::wrapper::{load_template, render_wrapper, write_wrapper};

/// One installed executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableEntry {
    pub name: String,
    /// Entry point relative to the package root, e.g. `./bin/es2abc`.
    pub entry_point: String,
}

/// Executable name to entry point, in install order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryMap {
    entries: Vec<ExecutableEntry>,
}

impl BinaryMap {
    /// Add an entry, replacing any entry with the same name in place.
    pub fn insert(&mut self, entry: ExecutableEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.entry_point.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExecutableEntry> {
        self.entries.iter()
    }

    /// JSON object form used for the manifest's `bin` field.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.name.clone(), Value::String(e.entry_point.clone())))
            .collect();
        Value::Object(map)
    }
}

#[derive(Debug, Default)]
pub struct InstallOutcome {
    pub binaries: BinaryMap,
    /// Declared names found in neither the frontend nor the runtime tree.
    pub missing: Vec<String>,
    /// Installed ELF files. Under the rpath strategy these still need patching.
    pub installed: Vec<PathBuf>,
    /// Hidden wrapper-strategy binaries that overwrote a collected library.
    pub collisions: Vec<Collision>,
}

/// Install every declared executable, frontend tree first, runtime second.
///
/// Names found in neither tree are logged and left out of the map. Under
/// [`InstallStrategy::Rpath`] the binary is copied to `bin/<name>`; under
/// [`InstallStrategy::Wrapper`] it is copied to `lib/<name>` and `bin/<name>`
/// becomes a launcher script. A hidden binary that lands on a library
/// already in `libraries` replaces it and is reported as a [`Collision`].
pub fn install_binaries(
    config: &BuildConfiguration,
    tree: &OutputTree,
    strategy: InstallStrategy,
    libraries: &LibraryCollection,
) -> Result<InstallOutcome> {
    let frontend = config.frontend_dir();
    let runtime = config.runtime_dir();
    let template = match strategy {
        InstallStrategy::Wrapper => Some(load_template(config.wrapper_template())?),
        InstallStrategy::Rpath => None,
    };

    let mut outcome = InstallOutcome::default();
    for name in config.binaries() {
        let Some(source) = find_binary(&[&frontend, &runtime], name) else {
            warn!("Binary not found in frontend or runtime dirs: {}", name);
            outcome.missing.push(name.clone());
            continue;
        };
        let artifact = Artifact::new(source, name.as_str(), ArtifactKind::Executable);

        let installed = match &template {
            None => install_direct(&artifact, tree)?,
            Some(template) => {
                if let Some(library) = libraries.origin(name) {
                    warn!(
                        "Binary {} from {} overwrites the library copied from {}",
                        name,
                        artifact.source.display(),
                        library.display()
                    );
                    outcome.collisions.push(Collision {
                        name: name.clone(),
                        replaced: library.to_path_buf(),
                        winner: artifact.source.clone(),
                    });
                }
                install_wrapped(&artifact, tree, template)?
            }
        };
        let Some(installed) = installed else {
            outcome.missing.push(name.clone());
            continue;
        };

        outcome.binaries.insert(ExecutableEntry {
            name: name.clone(),
            entry_point: format!("./{}/{}", BIN_DIR, name),
        });
        outcome.installed.push(installed);
    }

    Ok(outcome)
}

fn install_direct(artifact: &Artifact, tree: &OutputTree) -> Result<Option<PathBuf>> {
    let dest = tree.area_for(artifact.kind).join(&artifact.name);
    if !copy_artifact(&artifact.source, &dest)? {
        return Ok(None);
    }
    make_executable(&dest)?;
    Ok(Some(dest))
}

fn install_wrapped(
    artifact: &Artifact,
    tree: &OutputTree,
    template: &str,
) -> Result<Option<PathBuf>> {
    let hidden = tree.lib_dir().join(&artifact.name);
    if !copy_artifact(&artifact.source, &hidden)? {
        return Ok(None);
    }
    make_executable(&hidden)?;

    let launcher = tree.bin_dir().join(&artifact.name);
    write_wrapper(&launcher, &render_wrapper(template, &artifact.name))
        .with_context(|| format!("Failed to install launcher for {}", artifact.name))?;
    info!("Created wrapper: {}", display_rel(&launcher, tree.root()));
    Ok(Some(hidden))
}

fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
