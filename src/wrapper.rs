//! Shell launchers for the wrapper install strategy.
//!
//! Used where ELF search paths cannot be rewritten: the real binary sits in
//! `lib/` and `bin/<name>` is a script that points `LD_LIBRARY_PATH` at the
//! package's `lib/` before handing over to it.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::copy::make_executable;

const NAME_PLACEHOLDER: &str = "%BINARY_NAME%";

/// Launcher used when no template file is configured.
pub const DEFAULT_WRAPPER_TEMPLATE: &str = r#"#!/bin/sh
SELF="$(readlink -f "$0")"
LIB_DIR="$(dirname "$SELF")/../lib"
export LD_LIBRARY_PATH="$LIB_DIR${LD_LIBRARY_PATH:+:$LD_LIBRARY_PATH}"
exec "$LIB_DIR/%BINARY_NAME%" "$@"
"#;

/// Substitute every `%BINARY_NAME%` in `template` with `binary`.
pub fn render_wrapper(template: &str, binary: &str) -> String {
    template.replace(NAME_PLACEHOLDER, binary)
}

pub(crate) fn load_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read wrapper template: {}", path.display())),
        None => Ok(DEFAULT_WRAPPER_TEMPLATE.to_string()),
    }
}

pub(crate) fn write_wrapper(dest: &Path, contents: &str) -> Result<()> {
    fs::write(dest, contents)
        .with_context(|| format!("Failed to write wrapper: {}", dest.display()))?;
    make_executable(dest)
}
