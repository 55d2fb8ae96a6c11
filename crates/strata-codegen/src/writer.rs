//! Compare-then-write file output.

use std::fs;
use std::path::Path;
use strata_core::{Error, Result};
use tracing::{debug, info};

use crate::types::FileStatus;

/// Writes `content` to `path` unless the file already holds it.
///
/// Parent directories are created as needed. In a dry run the status is
/// computed but nothing touches the disk.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read or written.
pub fn write_if_changed(path: &Path, content: &str, dry_run: bool) -> Result<FileStatus> {
    let status = match fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(FileStatus::Unchanged),
        Ok(_) => FileStatus::Changed,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileStatus::Created,
        Err(e) => return Err(Error::io(path, e)),
    };

    if dry_run {
        debug!("dry run: {} would be {status}", path.display());
        return Ok(status);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))?;
    info!("{status} {}", path.display());
    Ok(status)
}
