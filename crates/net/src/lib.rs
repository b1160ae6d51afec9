#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Transport clients for artifetch
//!
//! A transport materializes the content behind a source locator at a
//! filesystem path. The installer treats transports as an opaque
//! capability through the [`Transport`] trait; this crate ships the
//! concrete git, HTTP archive and local path implementations plus a
//! router that picks one per locator.

mod archive;
mod client;
mod fs;
mod git;
mod http;
mod local;
mod locator;

pub use client::{NetClient, NetConfig};
pub use git::GitTransport;
pub use http::HttpTransport;
pub use local::LocalTransport;
pub use locator::{display_source, Locator, LocatorKind};

use artifetch_errors::Error;
use artifetch_types::FetchMode;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Capability that fetches a source into a destination path
///
/// Implementations create `destination` themselves; callers guarantee it
/// does not exist beforehand.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Materialize `source` at `destination`
    ///
    /// # Errors
    ///
    /// Returns an error if the locator cannot be resolved, the transfer
    /// fails, or the content cannot be written.
    async fn fetch(&self, source: &str, destination: &Path, mode: FetchMode)
        -> Result<(), Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(
        &self,
        source: &str,
        destination: &Path,
        mode: FetchMode,
    ) -> Result<(), Error> {
        (**self).fetch(source, destination, mode).await
    }
}

/// Routes each locator to the git, HTTP or local transport
#[derive(Clone)]
pub struct DefaultTransport {
    local: LocalTransport,
    git: GitTransport,
    http: HttpTransport,
}

impl DefaultTransport {
    /// Create a router resolving relative paths against the working directory
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or the
    /// HTTP client fails to initialize.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            local: LocalTransport::new()?,
            git: GitTransport::new(),
            http: HttpTransport::new(NetClient::with_defaults()?),
        })
    }

    /// Create a router from explicitly configured transports
    #[must_use]
    pub fn from_parts(local: LocalTransport, git: GitTransport, http: HttpTransport) -> Self {
        Self { local, git, http }
    }
}

#[async_trait]
impl Transport for DefaultTransport {
    async fn fetch(
        &self,
        source: &str,
        destination: &Path,
        mode: FetchMode,
    ) -> Result<(), Error> {
        let locator = Locator::parse(source)?;
        match locator.kind() {
            LocatorKind::Local => self.local.fetch_locator(&locator, destination, mode).await,
            LocatorKind::Git => self.git.fetch_locator(&locator, destination).await,
            LocatorKind::Http => self.http.fetch_locator(&locator, destination, mode).await,
        }
    }
}
