use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Worker pool and atomic installer events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FetchEvent {
    /// Jobs enqueued and workers about to start
    RunStarted { jobs: usize, workers: usize },

    /// A worker began draining the queue
    WorkerStarted { worker: usize },

    /// A worker picked up a job
    JobStarted {
        worker: usize,
        source: String,
        destination: PathBuf,
    },

    /// A stale staging path from an earlier run was removed
    StagingCleared { path: PathBuf },

    /// Staged content was renamed into the destination
    Swapped {
        destination: PathBuf,
        replaced: bool,
    },

    /// VCS metadata was removed from an installed destination
    MetadataStripped { path: PathBuf },

    /// A job finished without error
    JobCompleted { worker: usize, destination: PathBuf },

    /// A job finished with an error
    JobFailed {
        worker: usize,
        destination: PathBuf,
        error: String,
    },

    /// A worker observed an exhausted queue and stopped
    WorkerFinished { worker: usize, processed: usize },

    /// Every worker has stopped and all outcomes are accounted for
    RunCompleted { succeeded: usize, failed: usize },
}
