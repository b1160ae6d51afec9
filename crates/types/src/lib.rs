#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for artifetch
//!
//! This crate provides the data model shared by the scheduler, the
//! installer and the configuration layer: fetch jobs, their outcomes and
//! the worker pool sizing.

pub mod job;
pub mod outcome;
pub mod pool;

pub use job::{staging_path, FetchMode, Job, STAGING_SUFFIX, VCS_METADATA_DIR};
pub use outcome::Outcome;
pub use pool::PoolConfig;
