#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for artifetch
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - The Fetchfile (`Fetchfile.toml` in the working directory)
//! - Environment variables
//! - CLI flags
//!
//! It also turns the merged configuration into the validated job list and
//! pool sizing handed to the installer.

use artifetch_errors::{ConfigError, Error};
use artifetch_types::{staging_path, FetchMode, Job, PoolConfig};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// File name looked up in the working directory when no path is given
pub const DEFAULT_FETCHFILE: &str = "Fetchfile.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub artifacts: Vec<ArtifactConfig>,
}

/// Run-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_strip_vcs")]
    pub strip_vcs: bool,
    #[serde(default)]
    pub mode: FetchMode,
}

/// One `[[artifacts]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub name: String,
    pub source: String,
    pub destination: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FetchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_vcs: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parallel: false,
            strip_vcs: default_strip_vcs(),
            mode: FetchMode::Directory,
        }
    }
}

fn default_strip_vcs() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the contents are not a valid Fetchfile.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from an optional path or use default
    ///
    /// An explicit path must exist. Without one, `Fetchfile.toml` in the
    /// working directory is used when present, otherwise an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path).await;
        }

        let default_path = Path::new(DEFAULT_FETCHFILE);
        if fs::try_exists(default_path).await.unwrap_or(false) {
            Self::load_from_file(default_path).await
        } else {
            tracing::debug!(path = DEFAULT_FETCHFILE, "no fetchfile found, using defaults");
            Ok(Self::default())
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // ARTIFETCH_PARALLEL
        if let Ok(parallel) = std::env::var("ARTIFETCH_PARALLEL") {
            self.settings.parallel = parse_bool("ARTIFETCH_PARALLEL", parallel)?;
        }

        // ARTIFETCH_STRIP_VCS
        if let Ok(strip) = std::env::var("ARTIFETCH_STRIP_VCS") {
            self.settings.strip_vcs = parse_bool("ARTIFETCH_STRIP_VCS", strip)?;
        }

        Ok(())
    }

    /// Apply the `--parallel` flag; an unset flag keeps the merged value
    pub fn apply_parallel_flag(&mut self, parallel: bool) {
        if parallel {
            self.settings.parallel = true;
        }
    }

    /// Worker pool sizing for this run
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::detect(self.settings.parallel)
    }

    /// Build the validated job list, keeping artifacts whose name starts with `prefix`
    ///
    /// # Errors
    ///
    /// Returns an error if an artifact has an empty source or destination,
    /// if two selected artifacts share a destination, or if one destination
    /// lies inside another or at another's staging path.
    pub fn jobs(&self, prefix: Option<&str>) -> Result<Vec<Job>, Error> {
        let mut seen: Vec<(PathBuf, &str)> = Vec::new();
        let mut jobs = Vec::new();

        for artifact in &self.artifacts {
            if let Some(prefix) = prefix {
                if !artifact.name.starts_with(prefix) {
                    continue;
                }
            }

            let job = Job::new(artifact.source.clone(), artifact.destination.clone())?
                .with_mode(artifact.mode.unwrap_or(self.settings.mode))
                .with_strip_vcs(artifact.strip_vcs.unwrap_or(self.settings.strip_vcs));

            let key = normalize_destination(job.destination());
            for (other, first) in &seen {
                if *other == key {
                    return Err(ConfigError::DuplicateDestination {
                        destination: job.destination().display().to_string(),
                        first: (*first).to_string(),
                        second: artifact.name.clone(),
                    }
                    .into());
                }
                if destinations_overlap(other, &key) {
                    return Err(ConfigError::OverlappingDestination {
                        destination: job.destination().display().to_string(),
                        other: other.display().to_string(),
                        first: (*first).to_string(),
                        second: artifact.name.clone(),
                    }
                    .into());
                }
            }
            seen.push((key, &artifact.name));

            jobs.push(job);
        }

        Ok(jobs)
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

/// Two distinct destinations whose installs would touch each other's paths
///
/// Installing `a` clears `a.tmp` and replaces everything under `a`, so a
/// second destination nested under either one would be destroyed.
fn destinations_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b)
        || b.starts_with(a)
        || a.starts_with(staging_path(b))
        || b.starts_with(staging_path(a))
}

/// `vendor/a`, `./vendor/a` and `vendor/a/` name the same directory
fn normalize_destination(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str, destination: &str) -> ArtifactConfig {
        ArtifactConfig {
            name: name.to_string(),
            source: format!("./sources/{name}"),
            destination: PathBuf::from(destination),
            mode: None,
            strip_vcs: None,
        }
    }

    #[test]
    fn test_default_settings() {
        let config = Config::default();
        assert!(!config.settings.parallel);
        assert!(config.settings.strip_vcs);
        assert_eq!(config.settings.mode, FetchMode::Directory);
        assert!(config.artifacts.is_empty());
    }

    #[test]
    fn test_jobs_inherit_settings() {
        let mut config = Config::default();
        config.artifacts.push(artifact("modules/a", "vendor/a"));
        let mut b = artifact("modules/b", "vendor/b");
        b.mode = Some(FetchMode::Any);
        b.strip_vcs = Some(false);
        config.artifacts.push(b);

        let jobs = config.jobs(None).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].mode(), FetchMode::Directory);
        assert!(jobs[0].strip_vcs());
        assert_eq!(jobs[1].mode(), FetchMode::Any);
        assert!(!jobs[1].strip_vcs());
    }

    #[test]
    fn test_jobs_prefix_filter_keeps_order() {
        let mut config = Config::default();
        config.artifacts.push(artifact("modules/a", "vendor/a"));
        config.artifacts.push(artifact("roles/x", "vendor/x"));
        config.artifacts.push(artifact("modules/b", "vendor/b"));

        let jobs = config.jobs(Some("modules/")).unwrap();
        let destinations: Vec<_> = jobs.iter().map(|j| j.destination().to_path_buf()).collect();
        assert_eq!(
            destinations,
            vec![PathBuf::from("vendor/a"), PathBuf::from("vendor/b")]
        );
    }

    #[test]
    fn test_duplicate_destination_rejected() {
        let mut config = Config::default();
        config.artifacts.push(artifact("one", "vendor/a"));
        config.artifacts.push(artifact("two", "./vendor/a/"));

        let err = config.jobs(None).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::DuplicateDestination { ref first, ref second, .. })
                if first == "one" && second == "two"
        ));
    }

    #[test]
    fn test_destination_at_staging_path_rejected() {
        let mut config = Config::default();
        config.artifacts.push(artifact("b", "vendor/x.tmp"));
        config.artifacts.push(artifact("a", "vendor/x"));

        let err = config.jobs(None).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::OverlappingDestination { ref first, ref second, .. })
                if first == "b" && second == "a"
        ));

        let mut config = Config::default();
        config.artifacts.push(artifact("a", "./vendor/x/"));
        config.artifacts.push(artifact("b", "vendor/x.tmp/inner"));
        assert!(matches!(
            config.jobs(None),
            Err(Error::Config(ConfigError::OverlappingDestination { .. }))
        ));
    }

    #[test]
    fn test_nested_destinations_rejected() {
        let mut config = Config::default();
        config.artifacts.push(artifact("inner", "vendor/a/b"));
        config.artifacts.push(artifact("outer", "vendor/a"));

        let err = config.jobs(None).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::OverlappingDestination { ref other, .. })
                if other == "vendor/a/b"
        ));

        let mut config = Config::default();
        config.artifacts.push(artifact("outer", "vendor/a"));
        config.artifacts.push(artifact("inner", "vendor/a/b"));
        assert!(config.jobs(None).is_err());
    }

    #[test]
    fn test_sibling_destinations_with_shared_prefix_allowed() {
        let mut config = Config::default();
        config.artifacts.push(artifact("a", "vendor/a"));
        config.artifacts.push(artifact("ab", "vendor/ab"));
        config.artifacts.push(artifact("atmp", "vendor/a.tmpl"));

        assert_eq!(config.jobs(None).unwrap().len(), 3);
    }

    #[test]
    fn test_filtered_out_duplicates_are_ignored() {
        let mut config = Config::default();
        config.artifacts.push(artifact("modules/one", "vendor/a"));
        config.artifacts.push(artifact("roles/two", "vendor/a"));

        assert_eq!(config.jobs(Some("modules")).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_source_is_invalid_job() {
        let mut config = Config::default();
        let mut bad = artifact("bad", "vendor/bad");
        bad.source = "  ".to_string();
        config.artifacts.push(bad);

        assert!(matches!(
            config.jobs(None),
            Err(Error::Config(ConfigError::InvalidJob { .. }))
        ));
    }

    #[test]
    fn test_parallel_flag_only_enables() {
        let mut config = Config::default();
        config.settings.parallel = true;
        config.apply_parallel_flag(false);
        assert!(config.settings.parallel);

        let mut config = Config::default();
        config.apply_parallel_flag(true);
        assert!(config.settings.parallel);
        assert!(config.pool_config().is_parallel());
    }
}
