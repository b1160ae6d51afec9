//! Transport error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchError {
    #[error("invalid source locator {source_str}: {reason}")]
    InvalidLocator { source_str: String, reason: String },

    #[error("unsupported source scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("source not found: {path}")]
    SourceNotFound { path: String },

    #[error("{source_str} cannot be fetched in {mode} mode: {reason}")]
    ModeMismatch {
        source_str: String,
        mode: String,
        reason: String,
    },

    #[error("subdirectory {subdir} not found in {source_str}")]
    SubdirNotFound { source_str: String, subdir: String },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("destination {destination} lies inside source {source_str}")]
    DestinationInsideSource {
        source_str: String,
        destination: String,
    },

    #[error("archive extraction failed for {source_str}: {message}")]
    ArchiveFailed { source_str: String, message: String },
}

impl UserFacingError for FetchError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidLocator { .. } | Self::UnsupportedScheme { .. } => {
                Some("Use a git::, http(s):// or local path source.")
            }
            Self::ModeMismatch { .. } => {
                Some("Set mode = \"any\" for single files or point at an archive or directory.")
            }
            Self::DestinationInsideSource { .. } => {
                Some("Install local directories to a destination outside the source tree.")
            }
            Self::CommandFailed { program, .. } if program == "git" => {
                Some("Check that git is installed and the repository is reachable.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidLocator { .. } => "fetch.invalid_locator",
            Self::UnsupportedScheme { .. } => "fetch.unsupported_scheme",
            Self::SourceNotFound { .. } => "fetch.source_not_found",
            Self::ModeMismatch { .. } => "fetch.mode_mismatch",
            Self::SubdirNotFound { .. } => "fetch.subdir_not_found",
            Self::CommandFailed { .. } => "fetch.command_failed",
            Self::DestinationInsideSource { .. } => "fetch.destination_inside_source",
            Self::ArchiveFailed { .. } => "fetch.archive_failed",
        })
    }
}
