//! Shared-library collection into the package's `lib/` directory.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::BuildConfiguration;
use crate::copy::copy_artifact;
use crate::layout::OutputTree;
use crate::scan::{scan, Artifact, ArtifactKind, SHARED_LIBRARY_EXT};

/// Two artifacts were installed under the same file name in `lib/`.
///
/// The later copy (`winner`) is the one installed; `replaced` is where the
/// overwritten copy came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub name: String,
    pub replaced: PathBuf,
    pub winner: PathBuf,
}

#[derive(Debug, Default)]
pub struct LibraryCollection {
    /// Installed library paths, one per distinct file name.
    pub installed: Vec<PathBuf>,
    pub collisions: Vec<Collision>,
    origins: HashMap<String, PathBuf>,
}

impl LibraryCollection {
    /// Build-tree path the installed `lib/<name>` was copied from.
    pub fn origin(&self, name: &str) -> Option<&Path> {
        self.origins.get(name).map(PathBuf::as_path)
    }
}

/// Copy every `.so` from the frontend, runtime and third-party trees into
/// `lib/`, in that order.
///
/// Missing trees are skipped. A name already installed from an earlier tree
/// is overwritten and reported as a [`Collision`].
pub fn collect_libraries(
    config: &BuildConfiguration,
    tree: &OutputTree,
) -> Result<LibraryCollection> {
    let mut sources = vec![
        ("frontend".to_string(), config.frontend_dir()),
        ("runtime".to_string(), config.runtime_dir()),
    ];
    for (name, dir) in config.thirdparty_dirs() {
        sources.push((format!("thirdparty '{name}'"), dir));
    }

    let mut collection = LibraryCollection::default();

    for (label, dir) in sources {
        if !dir.is_dir() {
            debug!("No {} library directory at {}", label, dir.display());
            continue;
        }

        // Listing order is filesystem-defined; sort so logs and collisions are stable.
        let mut names = scan(&dir, SHARED_LIBRARY_EXT)?;
        names.sort();

        for name in names {
            let artifact = Artifact::new(dir.join(&name), name, ArtifactKind::SharedLibrary);
            let dest = tree.area_for(artifact.kind).join(&artifact.name);
            if !copy_artifact(&artifact.source, &dest)? {
                continue;
            }

            match collection.origins.insert(artifact.name.clone(), artifact.source.clone()) {
                None => collection.installed.push(dest),
                Some(previous) if previous == artifact.source => {}
                Some(previous) => {
                    warn!(
                        "Library {} from {} overwrites the copy from {}",
                        artifact.name,
                        artifact.source.display(),
                        previous.display()
                    );
                    collection.collisions.push(Collision {
                        name: artifact.name,
                        replaced: previous,
                        winner: artifact.source,
                    });
                }
            }
        }
    }

    Ok(collection)
}
