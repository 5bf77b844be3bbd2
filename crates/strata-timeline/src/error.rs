//! Error types for `strata-timeline`.

/// Result type for timeline operations.
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Timeline-specific errors.
///
/// Crash artifacts are reported distinctly from corruption: an empty plan
/// payload ([`TimelineError::EmptyContent`]) or a missing one
/// ([`TimelineError::PlanMissing`]) means a writer crashed mid-request and
/// the caller may repair, while [`TimelineError::CorruptPlan`] must never
/// be repaired away silently.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// No plan payload exists for the given instant timestamp.
    #[error("no plan found for instant {timestamp}")]
    PlanMissing {
        /// Timestamp of the instant whose plan was requested.
        timestamp: String,
    },

    /// The backing object exists but holds zero bytes.
    #[error("empty content at {path}")]
    EmptyContent {
        /// Scope-relative path of the empty object.
        path: String,
    },

    /// The plan payload exists but cannot be decoded.
    #[error("corrupt plan for instant {timestamp}: {message}")]
    CorruptPlan {
        /// Timestamp of the instant whose plan failed to decode.
        timestamp: String,
        /// Decoder error details.
        message: String,
    },

    /// An instant file name or reference could not be interpreted.
    #[error("invalid instant: {message}")]
    InvalidInstant {
        /// Details of what made the instant invalid.
        message: String,
    },

    /// A plan was already persisted for this timestamp (exactly-once writes).
    #[error("plan already exists for instant {timestamp}")]
    PlanAlreadyExists {
        /// Timestamp of the conflicting instant.
        timestamp: String,
    },

    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] strata_core::Error),
}

impl TimelineError {
    pub(crate) fn invalid_instant(message: impl Into<String>) -> Self {
        Self::InvalidInstant {
            message: message.into(),
        }
    }

    /// Returns true if this error is a recoverable crash artifact rather
    /// than a genuine failure (missing or zero-byte plan payload).
    #[must_use]
    pub const fn is_crash_artifact(&self) -> bool {
        matches!(self, Self::PlanMissing { .. } | Self::EmptyContent { .. })
    }
}
