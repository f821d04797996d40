//! Atomic file writes.
//!
//! Composed output is flushed with write-temp/fsync/rename so a crash mid-run
//! never leaves a half-written file at a final path:
//!
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename over the target path
//!
//! Source and target must live on the same filesystem for the rename to be
//! atomic. On crash, a stray `.{filename}.tmp` may remain in the target
//! directory.

use crate::error::{Result, SprigError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories as needed.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SprigError::User(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;
    replace(&temp_path, path)?;

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SprigError::User(format!("invalid file path '{}'", target.display())))?;
    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        SprigError::User(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        SprigError::User(format!("failed to write temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        SprigError::User(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(())
}

#[cfg(unix)]
fn replace(source: &Path, target: &Path) -> Result<()> {
    // rename() is atomic on POSIX and replaces an existing destination.
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        SprigError::User(format!("failed to replace '{}': {}", target.display(), e))
    })?;

    // Persist the directory entry as well.
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(windows)]
fn replace(source: &Path, target: &Path) -> Result<()> {
    // Windows rename fails if the target exists; drop it first. Not fully
    // atomic, but the temp file always carries the complete content.
    if target.exists() {
        fs::remove_file(target).map_err(|e| {
            let _ = fs::remove_file(source);
            SprigError::User(format!("failed to remove '{}': {}", target.display(), e))
        })?;
    }
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        SprigError::User(format!("failed to replace '{}': {}", target.display(), e))
    })
}
