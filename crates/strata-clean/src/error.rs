//! Error types for `strata-clean`.

use strata_timeline::TimelineError;

/// Result type for clean-planning operations.
pub type Result<T> = std::result::Result<T, CleanError>;

/// Clean-planning errors.
///
/// Recoverable crash artifacts (empty instants, empty plan payloads) are
/// handled inside the orchestrator and never surface here; everything
/// below is fatal for the current planning attempt.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// Invalid or unsupported configuration. Never retried.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A timeline or plan-store operation failed.
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// A retention-planner call failed.
    #[error("retention planner failed ({context}): {source}")]
    Planner {
        /// Which partition or planning phase was being processed.
        context: String,
        /// The underlying planner failure.
        #[source]
        source: strata_core::Error,
    },
}

impl CleanError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wraps a planner failure with the phase or partition being processed.
    #[must_use]
    pub fn planner(context: impl Into<String>, source: strata_core::Error) -> Self {
        Self::Planner {
            context: context.into(),
            source,
        }
    }
}
