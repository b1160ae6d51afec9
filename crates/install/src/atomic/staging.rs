//! Staged artifacts awaiting the swap into their destination

use super::fs::remove_path;
use artifetch_errors::{Error, InstallError};
use artifetch_events::{AppEvent, EventEmitter, EventSender, FetchEvent};
use std::path::{Path, PathBuf};

pub use artifetch_types::staging_path;

/// Fully fetched content sitting at the staging path
///
/// Dropping a staged artifact leaves the staging directory on disk; the
/// next install of the same destination clears it during preflight.
#[derive(Debug)]
pub struct StagedArtifact {
    destination: PathBuf,
    staging: PathBuf,
    event_sender: Option<EventSender>,
}

impl EventEmitter for StagedArtifact {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl StagedArtifact {
    pub(crate) fn new(
        destination: PathBuf,
        staging: PathBuf,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            destination,
            staging,
            event_sender,
        }
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[must_use]
    pub fn staging_path(&self) -> &Path {
        &self.staging
    }

    /// Replace the destination with the staged content
    ///
    /// An existing destination is removed first, then the staging path is
    /// renamed into place. If the removal fails both the old destination
    /// and the staged content are left on disk.
    ///
    /// # Errors
    ///
    /// Returns `DestinationRemovalFailed` or `SwapFailed`.
    pub async fn commit(self) -> Result<(), Error> {
        let replaced =
            remove_path(&self.destination)
                .await
                .map_err(|e| InstallError::DestinationRemovalFailed {
                    path: self.destination.display().to_string(),
                    message: e.to_string(),
                })?;

        tokio::fs::rename(&self.staging, &self.destination)
            .await
            .map_err(|e| InstallError::SwapFailed {
                from: self.staging.display().to_string(),
                to: self.destination.display().to_string(),
                message: e.to_string(),
            })?;

        self.emit(AppEvent::Fetch(FetchEvent::Swapped {
            destination: self.destination.clone(),
            replaced,
        }));
        Ok(())
    }
}
