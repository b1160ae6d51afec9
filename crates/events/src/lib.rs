#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in artifetch
//!
//! Library crates never print or log directly. They emit domain events
//! through an optional `EventSender`; the CLI drains the channel and turns
//! each event into a structured tracing record.

pub mod events;
pub use events::{AppEvent, FetchEvent, GeneralEvent, FETCH_TARGET, GENERAL_TARGET};

use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout artifetch
///
/// This trait provides a single, consistent API for emitting events regardless of
/// whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a debug log event with context
    fn emit_debug_with_context(
        &self,
        message: impl Into<String>,
        context: std::collections::HashMap<String, String>,
    ) {
        self.emit(AppEvent::General(GeneralEvent::debug_with_context(
            message, context,
        )));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit a job started event
    fn emit_job_started(&self, worker: usize, source: &str, destination: &Path) {
        self.emit(AppEvent::Fetch(FetchEvent::JobStarted {
            worker,
            source: source.to_string(),
            destination: destination.to_path_buf(),
        }));
    }

    /// Emit a job completed event
    fn emit_job_completed(&self, worker: usize, destination: &Path) {
        self.emit(AppEvent::Fetch(FetchEvent::JobCompleted {
            worker,
            destination: destination.to_path_buf(),
        }));
    }

    /// Emit a job failed event
    fn emit_job_failed(&self, worker: usize, destination: &Path, error: impl Into<String>) {
        self.emit(AppEvent::Fetch(FetchEvent::JobFailed {
            worker,
            destination: destination.to_path_buf(),
            error: error.into(),
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
/// This allows `EventSender` to be used directly where `EventEmitter` is expected
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
