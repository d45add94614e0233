//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file.
///
/// The content goes to a sibling temp file which is flushed and then renamed
/// over the target, so readers see either the old or the new document.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    if let Err(e) = write_locked(&temp_path, content, &native_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, &native_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(&native_path, e)
    })?;

    tracing::trace!(path = %path, bytes = content.len(), "atomic write");
    Ok(())
}

fn write_locked(temp_path: &Path, content: &[u8], target: &Path) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: target.to_path_buf(),
    })?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a directory tree if it exists. Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::symlink_metadata(&native_path) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(&native_path).map_err(|e| Error::io(&native_path, e))?;
            Ok(true)
        }
        Ok(_) => {
            // A submodule's `.git` is a gitlink file, not a directory
            fs::remove_file(&native_path).map_err(|e| Error::io(&native_path, e))?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Remove a single file if it exists. Returns whether it was removed.
pub fn remove_file_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::remove_file(&native_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Recursively copy a directory tree. Symlinks are recreated as links, not
/// followed. Returns the number of files and links copied.
pub fn copy_dir_all(from: &NormalizedPath, to: &NormalizedPath) -> Result<usize> {
    copy_dir_native(&from.to_native(), &to.to_native())
}

fn copy_dir_native(from: &Path, to: &Path) -> Result<usize> {
    fs::create_dir_all(to).map_err(|e| Error::io(to, e))?;

    let mut copied = 0;
    let entries = fs::read_dir(from).map_err(|e| Error::io(from, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(from, e))?;
        let source = entry.path();
        let dest = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| Error::io(&source, e))?;
        if file_type.is_symlink() {
            copied += copy_symlink(&source, &dest)?;
        } else if file_type.is_dir() {
            copied += copy_dir_native(&source, &dest)?;
        } else {
            fs::copy(&source, &dest).map_err(|e| Error::io(&source, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> Result<usize> {
    let target = fs::read_link(source).map_err(|e| Error::io(source, e))?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| Error::io(dest, e))?;
    Ok(1)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, _dest: &Path) -> Result<usize> {
    tracing::warn!(path = %source.display(), "skipping symlink during copy");
    Ok(0)
}
