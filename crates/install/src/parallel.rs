//! Fixed-size worker pool draining a pre-filled job queue

use crate::atomic::AtomicInstaller;
use crate::report::{sanitize_message, FetchReport, ResultAggregator};
use artifetch_errors::{Error, InstallError};
use artifetch_events::{AppEvent, EventEmitter, EventSender, FetchEvent};
use artifetch_net::Transport;
use artifetch_types::{Job, Outcome, PoolConfig};
use crossbeam::queue::SegQueue;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Receives each outcome as soon as its worker produces it
///
/// Implementations must not block; they are called from worker tasks.
pub trait OutcomeSink: Send + Sync {
    fn accept(&self, outcome: Outcome);
}

impl<F> OutcomeSink for F
where
    F: Fn(Outcome) + Send + Sync,
{
    fn accept(&self, outcome: Outcome) {
        self(outcome);
    }
}

/// Per-worker tallies returned through the join handle
#[derive(Debug, Default, Clone, Copy)]
struct WorkerStats {
    processed: usize,
    failed: usize,
}

/// Runs install jobs over a fixed number of workers
///
/// Every job is enqueued before the first worker starts, so an empty queue
/// means the run is exhausted. Each worker produces exactly one outcome per
/// job it pops, including when the install step panics.
pub struct WorkerPool<T: ?Sized> {
    installer: AtomicInstaller<T>,
    event_sender: Option<EventSender>,
}

impl<T: ?Sized> EventEmitter for WorkerPool<T> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl<T: Transport + ?Sized + 'static> WorkerPool<T> {
    #[must_use]
    pub fn new(installer: AtomicInstaller<T>) -> Self {
        Self {
            installer,
            event_sender: None,
        }
    }

    /// Set the event sender for pool and installer progress
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.installer = self.installer.with_event_sender(event_sender.clone());
        self.event_sender = Some(event_sender);
        self
    }

    /// Install every job and return the consolidated report
    ///
    /// Blocks until all workers have been joined. A failing job never
    /// stops the others.
    pub async fn run(&self, jobs: Vec<Job>, config: &PoolConfig) -> FetchReport {
        let aggregator = ResultAggregator::new(jobs.len());
        let submitted = jobs.clone();

        self.run_streaming(jobs, config, aggregator.sink()).await;

        aggregator.finish(&submitted)
    }

    /// Install every job, handing each outcome straight to `sink`
    ///
    /// Nothing is buffered. Jobs left in the queue by a worker task that
    /// died are delivered to the sink with an `OutcomeDropped` error.
    pub async fn run_streaming<S>(&self, jobs: Vec<Job>, config: &PoolConfig, sink: S)
    where
        S: OutcomeSink + 'static,
    {
        let total = jobs.len();
        let workers = config.worker_count().max(1);

        let queue = Arc::new(SegQueue::new());
        for (index, job) in jobs.into_iter().enumerate() {
            queue.push((index, job));
        }

        self.emit(AppEvent::Fetch(FetchEvent::RunStarted {
            jobs: total,
            workers,
        }));

        let sink = Arc::new(sink);
        let handles: Vec<JoinHandle<WorkerStats>> = (0..workers)
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    Arc::clone(&queue),
                    self.installer.clone(),
                    Arc::clone(&sink),
                    self.event_sender.clone(),
                ))
            })
            .collect();

        let mut totals = WorkerStats::default();
        for handle in handles {
            match handle.await {
                Ok(stats) => {
                    totals.processed += stats.processed;
                    totals.failed += stats.failed;
                }
                Err(e) => self.emit_error(format!("worker task failed: {e}")),
            }
        }

        if !queue.is_empty() {
            self.emit_debug(format!("{} jobs left in the queue after join", queue.len()));
        }
        while let Some((index, job)) = queue.pop() {
            let err = InstallError::OutcomeDropped {
                destination: job.destination().display().to_string(),
                message: "no worker left to process the job".to_string(),
            };
            sink.accept(Outcome::unprocessed(job, index, err.into()));
            totals.processed += 1;
            totals.failed += 1;
        }

        self.emit(AppEvent::Fetch(FetchEvent::RunCompleted {
            succeeded: totals.processed - totals.failed,
            failed: totals.failed,
        }));
    }
}

async fn worker_loop<T, S>(
    worker: usize,
    queue: Arc<SegQueue<(usize, Job)>>,
    installer: AtomicInstaller<T>,
    sink: Arc<S>,
    events: Option<EventSender>,
) -> WorkerStats
where
    T: Transport + ?Sized,
    S: OutcomeSink + ?Sized,
{
    events.emit(AppEvent::Fetch(FetchEvent::WorkerStarted { worker }));

    let mut stats = WorkerStats::default();
    while let Some((index, job)) = queue.pop() {
        events.emit_job_started(worker, job.source(), job.destination());

        let result = match AssertUnwindSafe(installer.install(&job))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(Error::from(InstallError::TaskPanicked {
                destination: job.destination().display().to_string(),
                message: panic_message(payload.as_ref()),
            })),
        };

        match &result {
            Ok(()) => events.emit_job_completed(worker, job.destination()),
            Err(err) => {
                stats.failed += 1;
                events.emit_job_failed(
                    worker,
                    job.destination(),
                    sanitize_message(&err.to_string()),
                );
            }
        }

        sink.accept(Outcome::new(job, index, worker, result));
        stats.processed += 1;
    }

    events.emit(AppEvent::Fetch(FetchEvent::WorkerFinished {
        worker,
        processed: stats.processed,
    }));
    stats
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extracts_text() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(payload.as_ref()), "kaboom");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_closure_is_outcome_sink() {
        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |outcome: Outcome| seen.lock().unwrap().push(outcome.index());
        let job = Job::new("./a", "vendor/a").unwrap();
        sink.accept(Outcome::new(job, 7, 0, Ok(())));
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }
}
