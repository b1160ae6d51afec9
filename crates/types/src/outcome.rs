//! Per-job result produced by a worker

use crate::Job;
use artifetch_errors::Error;
use std::path::Path;

/// Result of processing one job
///
/// Exactly one outcome exists per submitted job. Outcomes are created by
/// the worker that ran the install and are never modified afterwards.
#[derive(Debug, Clone)]
pub struct Outcome {
    job: Job,
    index: usize,
    worker: Option<usize>,
    error: Option<Error>,
}

impl Outcome {
    #[must_use]
    pub fn new(job: Job, index: usize, worker: usize, result: Result<(), Error>) -> Self {
        Self {
            job,
            index,
            worker: Some(worker),
            error: result.err(),
        }
    }

    /// Failed outcome for a job no worker reported on
    #[must_use]
    pub fn unprocessed(job: Job, index: usize, error: Error) -> Self {
        Self {
            job,
            index,
            worker: None,
            error: Some(error),
        }
    }

    /// The job this outcome belongs to
    #[must_use]
    pub fn job(&self) -> &Job {
        &self.job
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        self.job.destination()
    }

    /// Position of the job in the submitted list
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Id of the worker that processed the job, `None` if no worker did
    #[must_use]
    pub fn worker(&self) -> Option<usize> {
        self.worker
    }

    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
