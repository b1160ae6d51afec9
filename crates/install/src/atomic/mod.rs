//! Temp-then-swap installation
//!
//! An artifact is fetched into `<destination>.tmp` and only renamed into
//! place once the transport has fully succeeded, so a destination is seen
//! either in its previous state or fully installed.

mod fs;
pub mod installer;
pub mod staging;

pub use installer::AtomicInstaller;
pub use staging::{staging_path, StagedArtifact};
