#![warn(clippy::pedantic)]
#![deny(clippy::all)]

//! Atomic artifact installation with bounded parallelism for artifetch
//!
//! This crate installs fetched artifacts with a temp-then-swap protocol,
//! fans jobs out over a fixed-size worker pool, and collects exactly one
//! outcome per job into a consolidated report.

mod atomic;
mod parallel;
mod report;

pub use atomic::{staging_path, AtomicInstaller, StagedArtifact};
pub use parallel::{OutcomeSink, WorkerPool};
pub use report::{sanitize_message, FetchReport, ResultAggregator};

// Re-export EventSender for callers wiring up the pool
pub use artifetch_events::EventSender;
