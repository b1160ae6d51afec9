//! Git transport backed by the `git` command line client

use crate::fs::scratch_parent;
use crate::locator::Locator;
use crate::Transport;
use artifetch_errors::{Error, FetchError};
use artifetch_types::FetchMode;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Shallow-clones repositories, optionally keeping a single subdirectory
#[derive(Debug, Clone)]
pub struct GitTransport {
    program: String,
}

impl GitTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Use a specific git executable
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Clone the repository behind a parsed git locator into `destination`
    ///
    /// Without a subdirectory the full working tree, including `.git`, lands
    /// at `destination`. With one, only that subdirectory is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails or the subdirectory does not exist.
    pub async fn fetch_locator(&self, locator: &Locator, destination: &Path) -> Result<(), Error> {
        let Some(subdir) = locator.subdir() else {
            return self
                .clone_into(locator.location(), locator.reference(), destination)
                .await;
        };

        // Clone next to the destination so the final move is a rename
        let scratch = tempfile::Builder::new()
            .prefix(".artifetch-git-")
            .tempdir_in(scratch_parent(destination))
            .map_err(|e| Error::io_with_path(&e, scratch_parent(destination)))?;
        let checkout = scratch.path().join("checkout");

        self.clone_into(locator.location(), locator.reference(), &checkout)
            .await?;

        let selected = checkout.join(subdir);
        if !tokio::fs::metadata(&selected)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(FetchError::SubdirNotFound {
                source_str: locator.raw().to_string(),
                subdir: subdir.to_string(),
            }
            .into());
        }

        tokio::fs::rename(&selected, destination)
            .await
            .map_err(|e| Error::io_with_path(&e, destination))?;
        Ok(())
    }

    async fn clone_into(
        &self,
        url: &str,
        reference: Option<&str>,
        destination: &Path,
    ) -> Result<(), Error> {
        let dest = destination.to_string_lossy().into_owned();
        for args in clone_commands(url, reference, &dest) {
            self.run(&args).await?;
        }
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<(), Error> {
        let output = Command::new(&self.program)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| FetchError::CommandFailed {
                program: self.program.clone(),
                status: "not started".to_string(),
                stderr: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(FetchError::CommandFailed {
            program: self.program.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into())
    }
}

impl Default for GitTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for GitTransport {
    async fn fetch(
        &self,
        source: &str,
        destination: &Path,
        _mode: FetchMode,
    ) -> Result<(), Error> {
        let locator = Locator::parse(source)?;
        self.fetch_locator(&locator, destination).await
    }
}

/// Git invocations that materialize `url` at `dest`
///
/// `--` ends option parsing so a locator can never be read as a flag.
fn clone_commands<'a>(
    url: &'a str,
    reference: Option<&'a str>,
    dest: &'a str,
) -> Vec<Vec<&'a str>> {
    match reference {
        Some(commit) if is_commit_sha(commit) => vec![
            vec!["clone", "--quiet", "--", url, dest],
            vec!["-C", dest, "checkout", "--quiet", commit],
        ],
        Some(branch) => vec![vec![
            "clone", "--quiet", "--depth", "1", "--branch", branch, "--", url, dest,
        ]],
        None => vec![vec!["clone", "--quiet", "--depth", "1", "--", url, dest]],
    }
}

/// Full 40-character hex object names cannot be passed to `--branch`
fn is_commit_sha(reference: &str) -> bool {
    reference.len() == 40 && reference.chars().all(|c| c.is_ascii_hexdigit())
}
