//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("invalid job: {field} must not be empty")]
    InvalidJob { field: String },

    #[error("duplicate destination {destination} (artifacts {first} and {second})")]
    DuplicateDestination {
        destination: String,
        first: String,
        second: String,
    },

    #[error("destination {destination} of artifact {second} overlaps {other} of artifact {first}")]
    OverlappingDestination {
        destination: String,
        other: String,
        first: String,
        second: String,
    },

    #[error("invalid fetch mode: {value}")]
    InvalidMode { value: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Create a Fetchfile.toml in the working directory or pass --config.")
            }
            Self::InvalidValue { .. } | Self::ParseError { .. } | Self::InvalidMode { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
            Self::InvalidJob { .. } => Some("Every artifact needs a source and a destination."),
            Self::DuplicateDestination { .. } => {
                Some("Give each artifact its own destination directory.")
            }
            Self::OverlappingDestination { .. } => Some(
                "Destinations must not nest inside each other or sit at another destination's .tmp staging path.",
            ),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::InvalidJob { .. } => "config.invalid_job",
            Self::DuplicateDestination { .. } => "config.duplicate_destination",
            Self::OverlappingDestination { .. } => "config.overlapping_destination",
            Self::InvalidMode { .. } => "config.invalid_mode",
        })
    }
}
