//! Path helpers shared by every task.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first, falls back to joining with the current
/// directory for paths that do not exist yet.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Copy `from` to `to`, creating parent directories.
pub fn copy_output(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(from, to)
        .with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}

/// Lowercased extension, empty when missing.
pub fn extension_lower(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Map a source file below `base` to the same relative place below `dest`.
///
/// Files outside `base` keep only their file name.
pub fn mirror_path(source: &Path, base: &Path, dest: &Path) -> PathBuf {
    match source.strip_prefix(base) {
        Ok(rel) => dest.join(rel),
        Err(_) => dest.join(source.file_name().unwrap_or_default()),
    }
}

/// Path relative to `root` for display, falling back to the full path.
pub fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
