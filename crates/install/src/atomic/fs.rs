//! Filesystem primitives for the swap protocol

use std::io;
use std::path::Path;
use tokio::fs;

/// Remove a file, symlink or directory tree
///
/// Returns `Ok(false)` when nothing existed at `path`, including when a
/// parent component is not a directory.
pub(crate) async fn remove_path(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if is_absent(&e) => return Ok(false),
        Err(e) => return Err(e),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
