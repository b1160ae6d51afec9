//! Installation error types

use std::borrow::Cow;

use crate::{FailureStage, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstallError {
    #[error("failed to remove stale staging path {path}: {message}")]
    StagingCleanupFailed { path: String, message: String },

    #[error("failed to remove existing destination {path}: {message}")]
    DestinationRemovalFailed { path: String, message: String },

    #[error("failed to move {from} into {to}: {message}")]
    SwapFailed {
        from: String,
        to: String,
        message: String,
    },

    #[error("failed to remove metadata directory {path}: {message}")]
    MetadataCleanupFailed { path: String, message: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("worker panicked while installing {destination}: {message}")]
    TaskPanicked {
        destination: String,
        message: String,
    },

    #[error("no outcome recorded for {destination}: {message}")]
    OutcomeDropped {
        destination: String,
        message: String,
    },

    #[error("{failed} of {total} artifacts failed to install")]
    PartialFailure { failed: usize, total: usize },
}

impl InstallError {
    /// Lifecycle stage this error belongs to
    #[must_use]
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::StagingCleanupFailed { .. } => FailureStage::Preflight,
            Self::DestinationRemovalFailed { .. } | Self::SwapFailed { .. } => FailureStage::Swap,
            Self::MetadataCleanupFailed { .. } => FailureStage::Cleanup,
            Self::FilesystemError { .. }
            | Self::TaskPanicked { .. }
            | Self::OutcomeDropped { .. }
            | Self::PartialFailure { .. } => FailureStage::Transport,
        }
    }
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::StagingCleanupFailed { .. } => {
                Some("Remove the leftover .tmp directory by hand and retry.")
            }
            Self::DestinationRemovalFailed { .. } => Some(
                "The previous artifact and the fetched copy were both kept; check permissions on the destination.",
            ),
            Self::MetadataCleanupFailed { .. } => {
                Some("The artifact is installed; only the metadata directory was left behind.")
            }
            Self::PartialFailure { .. } => Some("See the failure list above for each artifact."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StagingCleanupFailed { .. }
                | Self::DestinationRemovalFailed { .. }
                | Self::SwapFailed { .. }
                | Self::PartialFailure { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::StagingCleanupFailed { .. } => "install.staging_cleanup_failed",
            Self::DestinationRemovalFailed { .. } => "install.destination_removal_failed",
            Self::SwapFailed { .. } => "install.swap_failed",
            Self::MetadataCleanupFailed { .. } => "install.metadata_cleanup_failed",
            Self::FilesystemError { .. } => "install.filesystem",
            Self::TaskPanicked { .. } => "install.task_panicked",
            Self::OutcomeDropped { .. } => "install.outcome_dropped",
            Self::PartialFailure { .. } => "install.partial_failure",
        })
    }
}
