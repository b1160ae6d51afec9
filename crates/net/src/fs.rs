//! Filesystem helpers shared by transports

use artifetch_errors::{Error, InstallError};
use std::path::{Path, PathBuf};
use tokio::fs;

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    InstallError::FilesystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Copy a directory tree, recreating symlinks instead of following them
pub(crate) async fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<(), Error> {
    fs::create_dir_all(dest)
        .await
        .map_err(|e| fs_error("create_dir", dest, &e))?;

    let mut entries = fs::read_dir(source)
        .await
        .map_err(|e| fs_error("read_dir", source, &e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| fs_error("read_dir", source, &e))?
    {
        let entry_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| fs_error("stat", &entry_path, &e))?;

        if file_type.is_symlink() {
            copy_symlink(&entry_path, &dest_path).await?;
        } else if file_type.is_dir() {
            Box::pin(copy_dir_recursive(&entry_path, &dest_path)).await?;
        } else {
            fs::copy(&entry_path, &dest_path)
                .await
                .map_err(|e| fs_error("copy", &entry_path, &e))?;
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn copy_symlink(source: &Path, dest: &Path) -> Result<(), Error> {
    let target = fs::read_link(source)
        .await
        .map_err(|e| fs_error("read_link", source, &e))?;
    fs::symlink(&target, dest)
        .await
        .map_err(|e| fs_error("symlink", dest, &e))
}

#[cfg(not(unix))]
async fn copy_symlink(source: &Path, dest: &Path) -> Result<(), Error> {
    let metadata = fs::metadata(source)
        .await
        .map_err(|e| fs_error("stat", source, &e))?;
    if metadata.is_dir() {
        Box::pin(copy_dir_recursive(source, dest)).await
    } else {
        fs::copy(source, dest)
            .await
            .map(|_| ())
            .map_err(|e| fs_error("copy", source, &e))
    }
}

/// Create `dest` and copy a single file into it under `name`
pub(crate) async fn copy_file_into(source: &Path, dest: &Path, name: &str) -> Result<(), Error> {
    fs::create_dir_all(dest)
        .await
        .map_err(|e| fs_error("create_dir", dest, &e))?;
    let target = dest.join(name);
    fs::copy(source, &target)
        .await
        .map_err(|e| fs_error("copy", source, &e))?;
    Ok(())
}

/// Absolute form of a path that may not exist yet
///
/// The longest existing ancestor is canonicalized and the missing
/// components are appended unchanged.
pub(crate) async fn resolve_path(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        let candidate = if existing.as_os_str().is_empty() {
            Path::new(".")
        } else {
            existing
        };
        if let Ok(resolved) = fs::canonicalize(candidate).await {
            return missing
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Parent directory used for scratch files next to `path`
pub(crate) fn scratch_parent(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_resolve_path_appends_missing_components() {
        let temp = TempDir::new().unwrap();
        let root = fs::canonicalize(temp.path()).await.unwrap();

        let resolved = resolve_path(&temp.path().join("vendor/x.tmp")).await;
        assert_eq!(resolved, root.join("vendor/x.tmp"));
        assert_eq!(resolve_path(temp.path()).await, root);
    }

    #[tokio::test]
    async fn test_copy_dir_recursive_copies_nested_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("a/b")).await.unwrap();
        fs::write(src.join("top.txt"), "top").await.unwrap();
        fs::write(src.join("a/b/deep.txt"), "deep").await.unwrap();

        let dest = temp.path().join("dest");
        copy_dir_recursive(&src, &dest).await.unwrap();

        assert_eq!(fs::read_to_string(dest.join("top.txt")).await.unwrap(), "top");
        assert_eq!(
            fs::read_to_string(dest.join("a/b/deep.txt")).await.unwrap(),
            "deep"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_dir_recursive_keeps_symlinks() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).await.unwrap();
        fs::write(src.join("real.txt"), "x").await.unwrap();
        fs::symlink("real.txt", src.join("link.txt")).await.unwrap();

        let dest = temp.path().join("dest");
        copy_dir_recursive(&src, &dest).await.unwrap();

        let target = fs::read_link(dest.join("link.txt")).await.unwrap();
        assert_eq!(target, Path::new("real.txt"));
    }

    #[test]
    fn test_scratch_parent() {
        assert_eq!(scratch_parent(Path::new("vendor/a.tmp")), Path::new("vendor"));
        assert_eq!(scratch_parent(Path::new("a.tmp")), Path::new("."));
    }
}
