//! Local filesystem transport

use crate::archive;
use crate::fs::{copy_dir_recursive, copy_file_into, resolve_path};
use crate::locator::Locator;
use crate::Transport;
use artifetch_errors::{Error, FetchError};
use artifetch_types::FetchMode;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Copies directories, single files and tar or zip archives from local paths
#[derive(Debug, Clone)]
pub struct LocalTransport {
    base_dir: PathBuf,
}

impl LocalTransport {
    /// Resolve relative sources against the process working directory
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn new() -> Result<Self, Error> {
        let base_dir = std::env::current_dir()?;
        Ok(Self { base_dir })
    }

    /// Resolve relative sources against `base_dir`
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Copy the content behind a parsed local locator into `destination`
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, a single file is
    /// requested in directory mode, or copying fails.
    pub async fn fetch_locator(
        &self,
        locator: &Locator,
        destination: &Path,
        mode: FetchMode,
    ) -> Result<(), Error> {
        let root = self.base_dir.join(locator.location());
        let root_meta = tokio::fs::metadata(&root)
            .await
            .map_err(|_| FetchError::SourceNotFound {
                path: root.display().to_string(),
            })?;

        let file_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if root_meta.is_file() && archive::is_archive(&file_name) {
            return archive::unpack(&root, &file_name, destination, locator.subdir(), locator.raw())
                .await;
        }

        let path = match locator.subdir() {
            Some(subdir) => {
                let path = root.join(subdir);
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Err(FetchError::SubdirNotFound {
                        source_str: locator.raw().to_string(),
                        subdir: subdir.to_string(),
                    }
                    .into());
                }
                path
            }
            None => root,
        };

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;

        if metadata.is_dir() {
            let source_root = tokio::fs::canonicalize(&path)
                .await
                .map_err(|e| Error::io_with_path(&e, &path))?;
            if resolve_path(destination).await.starts_with(&source_root) {
                return Err(FetchError::DestinationInsideSource {
                    source_str: locator.raw().to_string(),
                    destination: destination.display().to_string(),
                }
                .into());
            }
            return copy_dir_recursive(&path, destination).await;
        }

        match mode {
            FetchMode::Any => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "artifact".to_string());
                copy_file_into(&path, destination, &name).await
            }
            FetchMode::Directory => Err(FetchError::ModeMismatch {
                source_str: locator.raw().to_string(),
                mode: mode.to_string(),
                reason: "source is a single file".to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn fetch(
        &self,
        source: &str,
        destination: &Path,
        mode: FetchMode,
    ) -> Result<(), Error> {
        let locator = Locator::parse(source)?;
        self.fetch_locator(&locator, destination, mode).await
    }
}
