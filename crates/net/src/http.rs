//! HTTP transport for archives and single files

use crate::archive;
use crate::client::NetClient;
use crate::fs::scratch_parent;
use crate::locator::Locator;
use crate::Transport;
use artifetch_errors::{Error, FetchError, NetworkError};
use artifetch_types::FetchMode;
use async_trait::async_trait;
use std::path::Path;

/// Downloads over HTTP(S)
///
/// Tar and zip archives are unpacked into the destination in either mode. Other
/// files are only accepted in [`FetchMode::Any`] and land at
/// `destination/<last url segment>`.
#[derive(Clone)]
pub struct HttpTransport {
    client: NetClient,
}

impl HttpTransport {
    #[must_use]
    pub fn new(client: NetClient) -> Self {
        Self { client }
    }

    /// Download the content behind a parsed HTTP locator into `destination`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the request fails, the
    /// content does not fit `mode`, or unpacking fails.
    pub async fn fetch_locator(
        &self,
        locator: &Locator,
        destination: &Path,
        mode: FetchMode,
    ) -> Result<(), Error> {
        let url = url::Url::parse(locator.location())
            .map_err(|e| NetworkError::InvalidUrl(format!("{}: {e}", locator.location())))?;
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or("download")
            .to_string();

        if archive::is_archive(&file_name) {
            let scratch = tempfile::Builder::new()
                .prefix(".artifetch-download-")
                .tempfile_in(scratch_parent(destination))
                .map_err(|e| Error::io_with_path(&e, scratch_parent(destination)))?;
            self.client.download_to(url.as_str(), scratch.path()).await?;
            return archive::unpack(
                scratch.path(),
                &file_name,
                destination,
                locator.subdir(),
                locator.raw(),
            )
            .await;
        }

        let reason = match (mode, locator.subdir()) {
            (_, Some(_)) => Some("a subdirectory can only be selected inside an archive"),
            (FetchMode::Directory, None) => Some("source is not an archive"),
            (FetchMode::Any, None) => None,
        };
        if let Some(reason) = reason {
            return Err(FetchError::ModeMismatch {
                source_str: locator.raw().to_string(),
                mode: mode.to_string(),
                reason: reason.to_string(),
            }
            .into());
        }

        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|e| Error::io_with_path(&e, destination))?;
        self.client
            .download_to(url.as_str(), &destination.join(&file_name))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_plain_file_rejected_in_directory_mode() {
        let temp = TempDir::new().unwrap();
        let transport = HttpTransport::new(NetClient::with_defaults().unwrap());
        let dest = temp.path().join("out");

        let err = transport
            .fetch("https://example.invalid/install.sh", &dest, FetchMode::Directory)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch(FetchError::ModeMismatch { .. })));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_subdir_requires_archive() {
        let temp = TempDir::new().unwrap();
        let transport = HttpTransport::new(NetClient::with_defaults().unwrap());

        let err = transport
            .fetch(
                "https://example.invalid/install.sh//scripts",
                &temp.path().join("out"),
                FetchMode::Any,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch(FetchError::ModeMismatch { .. })));
    }
}
