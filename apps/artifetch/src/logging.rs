//! Tracing setup and structured logging of domain events
//!
//! Library crates report progress as `AppEvent`s; this module turns each
//! one into a tracing record with structured fields.

use artifetch_events::{AppEvent, FetchEvent, GeneralEvent, FETCH_TARGET, GENERAL_TARGET};
use artifetch_net::display_source;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber
///
/// `RUST_LOG` wins when set. Otherwise `--debug` raises the default filter
/// from `info` to `debug`. Logs go to stderr so stdout carries only the
/// report.
pub fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,artifetch=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(debug_enabled)
            .with_env_filter(filter)
            .init();
    }
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event(event: &AppEvent) {
    match event {
        AppEvent::General(general) => log_general(general, event.log_level()),
        AppEvent::Fetch(fetch) => log_fetch(fetch),
    }
}

fn log_general(event: &GeneralEvent, level: Level) {
    let (message, detail) = match event {
        GeneralEvent::Warning { message, context } => (message, context.clone()),
        GeneralEvent::Error { message, details } => (message, details.clone()),
        GeneralEvent::DebugLog { message, context } => {
            (message, (!context.is_empty()).then(|| format!("{context:?}")))
        }
    };

    if level == Level::ERROR {
        error!(target: GENERAL_TARGET, detail = ?detail, "{message}");
    } else if level == Level::WARN {
        warn!(target: GENERAL_TARGET, detail = ?detail, "{message}");
    } else if level == Level::DEBUG {
        debug!(target: GENERAL_TARGET, detail = ?detail, "{message}");
    } else {
        info!(target: GENERAL_TARGET, detail = ?detail, "{message}");
    }
}

fn log_fetch(event: &FetchEvent) {
    match event {
        FetchEvent::RunStarted { jobs, workers } => {
            info!(
                target: FETCH_TARGET,
                jobs = jobs,
                workers = workers,
                "fetching {jobs} artifacts with {workers} workers"
            );
        }
        FetchEvent::WorkerStarted { worker } => {
            debug!(target: FETCH_TARGET, worker = worker, "worker started");
        }
        FetchEvent::JobStarted {
            worker,
            source,
            destination,
        } => {
            info!(
                target: FETCH_TARGET,
                worker = worker,
                source = %source,
                destination = %destination.display(),
                "downloading {} into {}",
                display_source(source),
                destination.display()
            );
        }
        FetchEvent::StagingCleared { path } => {
            debug!(
                target: FETCH_TARGET,
                path = %path.display(),
                "removed stale staging directory"
            );
        }
        FetchEvent::Swapped {
            destination,
            replaced,
        } => {
            debug!(
                target: FETCH_TARGET,
                destination = %destination.display(),
                replaced = replaced,
                "installed"
            );
        }
        FetchEvent::MetadataStripped { path } => {
            info!(
                target: FETCH_TARGET,
                path = %path.display(),
                "removed VCS metadata"
            );
        }
        FetchEvent::JobCompleted {
            worker,
            destination,
        } => {
            debug!(
                target: FETCH_TARGET,
                worker = worker,
                destination = %destination.display(),
                "artifact ready"
            );
        }
        FetchEvent::JobFailed {
            worker,
            destination,
            error,
        } => {
            error!(
                target: FETCH_TARGET,
                worker = worker,
                destination = %destination.display(),
                error = %error,
                "failed to fetch artifact"
            );
        }
        FetchEvent::WorkerFinished { worker, processed } => {
            debug!(
                target: FETCH_TARGET,
                worker = worker,
                processed = processed,
                "worker finished"
            );
        }
        FetchEvent::RunCompleted { succeeded, failed } => {
            if *failed > 0 {
                warn!(
                    target: FETCH_TARGET,
                    succeeded = succeeded,
                    failed = failed,
                    "run completed with failures"
                );
            } else {
                info!(
                    target: FETCH_TARGET,
                    succeeded = succeeded,
                    "run completed"
                );
            }
        }
    }
}
