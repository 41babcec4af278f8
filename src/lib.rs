//! Relocatable package assembly for native build output.
//!
//! Collects shared libraries and executables from a "frontend" and a
//! "runtime" build tree (plus any third-party library directories) into one
//! flat package:
//!
//! ```text
//! dist/
//!   bin/           installed executables
//!   lib/           collected shared libraries
//!   package.json   base metadata + {bin, files}
//! ```
//!
//! Executables and libraries get their ELF search path rewritten with
//! `patchelf --set-rpath` so they resolve siblings through `$ORIGIN`, never
//! through the build machine's paths. When the rewriting tool is not an
//! option, the wrapper strategy installs shell launchers that set
//! `LD_LIBRARY_PATH` instead.

mod collect;
mod config;
mod copy;
mod install;
mod layout;
mod manifest;
mod paths;
mod pipeline;
mod rpath;
mod scan;
mod wrapper;

pub use collect::{collect_libraries, Collision, LibraryCollection};
pub use config::{BuildConfiguration, InstallStrategy, DEFAULT_CONFIG_FILE};
pub use copy::{copy_artifact, make_executable};
pub use install::{install_binaries, BinaryMap, ExecutableEntry, InstallOutcome};
pub use layout::{OutputTree, BIN_DIR, LIB_DIR, MANIFEST_FILE};
pub use manifest::{generate_manifest, write_manifest};
pub use paths::find_binary;
pub use pipeline::{run, RunReport};
pub use rpath::{RpathError, RpathTool, BIN_RPATH, LIB_RPATH};
pub use scan::{scan, Artifact, ArtifactKind, SHARED_LIBRARY_EXT};
pub use wrapper::{render_wrapper, DEFAULT_WRAPPER_TEMPLATE};
