//! File read and write-back helpers for the check/fix pipeline.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a source file into a String with a contextual error.
pub fn read_source<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    fs::read_to_string(path)
}

/// Overwrite `path` with `bytes`, keeping the original permission bits.
///
/// goimports re-applies permissions after a rewrite (golang/go#38225);
/// fix mode does the same so in-place repair never widens or narrows
/// access on the target file.
pub fn write_preserving_permissions(path: &Path, bytes: &[u8]) -> Result<()> {
    let perms = fs::metadata(path)
        .map(|m| m.permissions())
        .with_context(|| format!("stat {}", path.display()))?;

    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    fs::set_permissions(path, perms)
        .with_context(|| format!("restore permissions on {}", path.display()))?;

    Ok(())
}
