//! File copying utilities.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{info, warn};

/// Make a file executable (chmod 755).
pub fn make_executable(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to set permissions: {}", path.display()))?;
    Ok(())
}

/// Copy one artifact out of the build tree.
///
/// Returns `Ok(false)` if the source vanished before it could be copied;
/// that is logged and left to the caller to skip. Any other I/O failure is
/// an error. An existing file at `dest` is replaced, even if read-only, and
/// the copy is always owner-writable so it can be patched in place.
pub fn copy_artifact(src: &Path, dest: &Path) -> Result<bool> {
    if src.exists() && (dest.exists() || dest.is_symlink()) {
        fs::remove_file(dest)
            .with_context(|| format!("Failed to replace {}", dest.display()))?;
    }

    match fs::copy(src, dest) {
        Ok(_) => {
            make_owner_writable(dest)?;
            info!("Copied: {} -> {}", src.display(), dest.display());
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound && !src.exists() => {
            warn!("Source file not found: {}", src.display());
            Ok(false)
        }
        Err(err) => Err(err)
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display())),
    }
}

fn make_owner_writable(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?
        .permissions();
    if perms.mode() & 0o200 == 0 {
        perms.set_mode(perms.mode() | 0o200);
        fs::set_permissions(path, perms)
            .with_context(|| format!("Failed to set permissions: {}", path.display()))?;
    }
    Ok(())
}
