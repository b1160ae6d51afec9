//! Outcome collection and the consolidated run report

use crate::parallel::OutcomeSink;
use artifetch_errors::{Error, InstallError};
use artifetch_types::{Job, Outcome};
use tokio::sync::mpsc;

/// Collapse control characters so an error message renders on one line
///
/// Each run of control characters (newlines, tabs, carriage returns)
/// becomes a single space and surrounding whitespace is trimmed.
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut in_control = false;
    for c in message.chars() {
        if c.is_control() {
            if !in_control {
                out.push(' ');
            }
            in_control = true;
        } else {
            out.push(c);
            in_control = false;
        }
    }
    out.trim().to_string()
}

/// Collects one outcome per job without ever blocking a worker
///
/// The outcome channel is sized to the job count before any worker starts,
/// so every handoff is a non-blocking `try_send`. Outcomes are drained
/// only after all workers have been joined.
pub struct ResultAggregator {
    sender: mpsc::Sender<Outcome>,
    receiver: mpsc::Receiver<Outcome>,
}

/// Sink handed to workers; forwards outcomes into the aggregator channel
pub(crate) struct ChannelSink {
    sender: mpsc::Sender<Outcome>,
}

impl OutcomeSink for ChannelSink {
    fn accept(&self, outcome: Outcome) {
        // Capacity equals the job count; a rejected outcome shows up as a
        // gap in `finish` and is reported there.
        let _ = self.sender.try_send(outcome);
    }
}

impl ResultAggregator {
    /// Create an aggregator able to hold `jobs` outcomes
    #[must_use]
    pub fn new(jobs: usize) -> Self {
        let (sender, receiver) = mpsc::channel(jobs.max(1));
        Self { sender, receiver }
    }

    pub(crate) fn sink(&self) -> ChannelSink {
        ChannelSink {
            sender: self.sender.clone(),
        }
    }

    /// Drain every buffered outcome into a report for `jobs`
    ///
    /// A job without an outcome, which only happens if a worker task died
    /// outside the install step, is reported with `OutcomeDropped`.
    #[must_use]
    pub fn finish(mut self, jobs: &[Job]) -> FetchReport {
        drop(self.sender);
        self.receiver.close();

        let mut slots: Vec<Option<Outcome>> = vec![None; jobs.len()];
        while let Ok(outcome) = self.receiver.try_recv() {
            let index = outcome.index();
            if let Some(slot) = slots.get_mut(index) {
                if slot.is_none() {
                    *slot = Some(outcome);
                }
            }
        }

        let outcomes = slots
            .into_iter()
            .zip(jobs)
            .enumerate()
            .map(|(index, (slot, job))| {
                slot.unwrap_or_else(|| {
                    let err = InstallError::OutcomeDropped {
                        destination: job.destination().display().to_string(),
                        message: "worker stopped before reporting".to_string(),
                    };
                    Outcome::unprocessed(job.clone(), index, err.into())
                })
            })
            .collect();

        FetchReport::new(outcomes)
    }
}

/// Consolidated result of one run
///
/// Holds exactly one outcome per submitted job, ordered by submission
/// index. A run always completes; use [`FetchReport::into_result`] to turn
/// failures into an error.
#[derive(Debug, Clone)]
pub struct FetchReport {
    outcomes: Vec<Outcome>,
}

impl FetchReport {
    #[must_use]
    pub fn new(mut outcomes: Vec<Outcome>) -> Self {
        outcomes.sort_by_key(Outcome::index);
        Self { outcomes }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of jobs that installed without error
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// One `<destination>: <message>` line per failed job
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        self.failures()
            .filter_map(|outcome| {
                outcome.error().map(|err| {
                    format!(
                        "{}: {}",
                        outcome.destination().display(),
                        sanitize_message(&err.to_string())
                    )
                })
            })
            .collect()
    }

    /// Turn any failure into a run-level error
    ///
    /// # Errors
    ///
    /// Returns `InstallError::PartialFailure` if at least one job failed.
    pub fn into_result(self) -> Result<Self, Error> {
        let failed = self.failed_count();
        if failed == 0 {
            Ok(self)
        } else {
            Err(InstallError::PartialFailure {
                failed,
                total: self.total(),
            }
            .into())
        }
    }
}
