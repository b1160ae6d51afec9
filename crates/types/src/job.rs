//! Fetch job definition

use artifetch_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Version-control bookkeeping directory removed by `strip_vcs`
pub const VCS_METADATA_DIR: &str = ".git";

/// Suffix appended to a destination to form its staging path
pub const STAGING_SUFFIX: &str = ".tmp";

/// Deterministic staging path for a destination
///
/// Trailing separators are ignored, so `vendor/a/` stages at `vendor/a.tmp`.
#[must_use]
pub fn staging_path(destination: &Path) -> PathBuf {
    let normalized: PathBuf = destination.components().collect();
    let mut name = normalized.into_os_string();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

/// How the transport should interpret the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// The source must resolve to a directory tree
    #[default]
    Directory,
    /// The source may be a single file or a directory tree
    Any,
}

impl FetchMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directory" | "dir" => Ok(Self::Directory),
            "any" => Ok(Self::Any),
            other => Err(ConfigError::InvalidMode {
                value: other.to_string(),
            }
            .into()),
        }
    }
}

/// One fetch-and-install request
///
/// A job is validated on construction and cannot be changed once it has
/// been handed to the worker pool; the builder methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    source: String,
    destination: PathBuf,
    mode: FetchMode,
    strip_vcs: bool,
}

impl Job {
    /// Create a job in directory mode with metadata stripping disabled
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidJob` if the source or destination is empty.
    pub fn new(source: impl Into<String>, destination: impl Into<PathBuf>) -> Result<Self, Error> {
        let source = source.into();
        let destination = destination.into();

        if source.trim().is_empty() {
            return Err(ConfigError::InvalidJob {
                field: "source".to_string(),
            }
            .into());
        }
        if destination.as_os_str().is_empty() {
            return Err(ConfigError::InvalidJob {
                field: "destination".to_string(),
            }
            .into());
        }

        Ok(Self {
            source,
            destination,
            mode: FetchMode::Directory,
            strip_vcs: false,
        })
    }

    #[must_use]
    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_strip_vcs(mut self, strip_vcs: bool) -> Self {
        self.strip_vcs = strip_vcs;
        self
    }

    /// Source locator, opaque to the installer
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[must_use]
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Whether the VCS metadata directory is removed after install
    #[must_use]
    pub fn strip_vcs(&self) -> bool {
        self.strip_vcs
    }
}
