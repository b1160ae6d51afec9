use serde::{Deserialize, Serialize};

pub mod fetch;
pub mod general;

pub use fetch::FetchEvent;
pub use general::GeneralEvent;

/// Tracing target for general events
pub const GENERAL_TARGET: &str = "artifetch::events::general";

/// Tracing target for worker pool and installer events
pub const FETCH_TARGET: &str = "artifetch::events::fetch";

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, debug output)
    General(GeneralEvent),

    /// Worker pool and installer events
    Fetch(FetchEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            // Error-level events
            Self::General(GeneralEvent::Error { .. })
            | Self::Fetch(FetchEvent::JobFailed { .. }) => Level::ERROR,

            // Warning-level events
            Self::Fetch(FetchEvent::RunCompleted { failed, .. }) if *failed > 0 => Level::WARN,
            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            // Debug-level events (worker bookkeeping, internal steps)
            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Fetch(
                FetchEvent::WorkerStarted { .. }
                | FetchEvent::WorkerFinished { .. }
                | FetchEvent::StagingCleared { .. }
                | FetchEvent::Swapped { .. }
                | FetchEvent::JobCompleted { .. },
            ) => Level::DEBUG,

            // Default to INFO for most events
            _ => Level::INFO,
        }
    }
}
