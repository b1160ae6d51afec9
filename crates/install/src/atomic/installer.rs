//! Atomic installer wrapping one transport fetch per job

use super::fs::remove_path;
use super::staging::{staging_path, StagedArtifact};
use artifetch_errors::{Error, InstallError};
use artifetch_events::{AppEvent, EventEmitter, EventSender, FetchEvent};
use artifetch_net::Transport;
use artifetch_types::{Job, VCS_METADATA_DIR};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Installs jobs through a transport using the temp-then-swap protocol
///
/// Cloning is cheap; clones share the transport.
pub struct AtomicInstaller<T: ?Sized> {
    transport: Arc<T>,
    event_sender: Option<EventSender>,
}

impl<T: ?Sized> Clone for AtomicInstaller<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            event_sender: self.event_sender.clone(),
        }
    }
}

impl<T: ?Sized> EventEmitter for AtomicInstaller<T> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl<T: Transport> AtomicInstaller<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }
}

impl<T: Transport + ?Sized> AtomicInstaller<T> {
    /// Create an installer around a transport that is shared elsewhere
    #[must_use]
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            event_sender: None,
        }
    }

    /// Set the event sender for installer progress
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch, swap and optionally strip VCS metadata for one job
    ///
    /// On any failure before the swap the destination is left exactly as
    /// it was. A metadata cleanup failure is reported even though the
    /// content is already installed.
    ///
    /// # Errors
    ///
    /// Returns the first error from preflight, the transport, the swap or
    /// metadata cleanup.
    pub async fn install(&self, job: &Job) -> Result<(), Error> {
        let staged = self.stage(job).await?;
        staged.commit().await?;

        if job.strip_vcs() {
            self.strip_vcs_metadata(job.destination()).await?;
        }

        Ok(())
    }

    /// Fetch a job into its staging path without touching the destination
    ///
    /// # Errors
    ///
    /// Returns `StagingCleanupFailed` if a stale staging path cannot be
    /// removed, or the transport's error if the fetch fails. A failed fetch
    /// removes whatever it left in the staging path on a best-effort basis.
    pub async fn stage(&self, job: &Job) -> Result<StagedArtifact, Error> {
        let destination = job.destination();
        let staging = staging_path(destination);

        let cleared =
            remove_path(&staging)
                .await
                .map_err(|e| InstallError::StagingCleanupFailed {
                    path: staging.display().to_string(),
                    message: e.to_string(),
                })?;
        if cleared {
            self.emit(AppEvent::Fetch(FetchEvent::StagingCleared {
                path: staging.clone(),
            }));
        }

        if let Some(parent) = staging.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallError::FilesystemError {
                    operation: "create_parent".to_string(),
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
        }

        self.emit_debug_with_context(
            "fetching into staging path",
            HashMap::from([
                ("source".to_string(), job.source().to_string()),
                ("staging".to_string(), staging.display().to_string()),
                ("mode".to_string(), job.mode().to_string()),
            ]),
        );

        if let Err(err) = self
            .transport
            .fetch(job.source(), &staging, job.mode())
            .await
        {
            if let Err(cleanup) = remove_path(&staging).await {
                self.emit_warning(format!(
                    "failed to clean staging path {}: {cleanup}",
                    staging.display()
                ));
            }
            return Err(err);
        }

        Ok(StagedArtifact::new(
            destination.to_path_buf(),
            staging,
            self.event_sender.clone(),
        ))
    }

    /// Remove the VCS metadata directory below an installed destination
    ///
    /// A destination without metadata is left alone.
    ///
    /// # Errors
    ///
    /// Returns `MetadataCleanupFailed` if the directory exists but cannot be removed.
    pub async fn strip_vcs_metadata(&self, destination: &Path) -> Result<(), Error> {
        let metadata_dir = destination.join(VCS_METADATA_DIR);
        let removed =
            remove_path(&metadata_dir)
                .await
                .map_err(|e| InstallError::MetadataCleanupFailed {
                    path: metadata_dir.display().to_string(),
                    message: e.to_string(),
                })?;

        if removed {
            self.emit(AppEvent::Fetch(FetchEvent::MetadataStripped {
                path: metadata_dir,
            }));
        }
        Ok(())
    }
}
