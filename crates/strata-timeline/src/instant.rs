//! Instant model: actions, lifecycle states, and the file-name codec.
//!
//! An instant identifies one table action. Its identity is the
//! `(timestamp, action)` pair; its lifecycle state advances monotonically
//! `Requested -> Inflight -> Completed` and never regresses. Each
//! `(timestamp, action, state)` triple maps to exactly one object key (see
//! [`strata_core::TimelinePaths`]).

use serde::{Deserialize, Serialize};
use std::fmt;

use strata_core::TimelinePaths;

use crate::error::{Result, TimelineError};

/// The kind of table action an instant records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// A regular write commit.
    Commit,
    /// An incremental (delta) write commit.
    DeltaCommit,
    /// A clean (file retention) action.
    Clean,
    /// A savepoint protecting an instant from cleaning.
    Savepoint,
    /// A rollback of a failed write.
    Rollback,
}

impl ActionKind {
    /// Returns the file-name token for this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::DeltaCommit => "deltacommit",
            Self::Clean => "clean",
            Self::Savepoint => "savepoint",
            Self::Rollback => "rollback",
        }
    }

    /// Parses a file-name token into an action kind.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "commit" => Some(Self::Commit),
            "deltacommit" => Some(Self::DeltaCommit),
            "clean" => Some(Self::Clean),
            "savepoint" => Some(Self::Savepoint),
            "rollback" => Some(Self::Rollback),
            _ => None,
        }
    }

    /// Returns true for actions that represent completed writes
    /// (the "commits view" of a timeline).
    #[must_use]
    pub const fn is_commit_kind(&self) -> bool {
        matches!(self, Self::Commit | Self::DeltaCommit)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an instant.
///
/// States are ordered: `Requested < Inflight < Completed`. Transitions are
/// monotonic and never regress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstantState {
    /// The action has been requested but not started.
    Requested,
    /// The action is executing.
    Inflight,
    /// The action finished and its payload is durable.
    Completed,
}

impl InstantState {
    /// Returns the lowercase name of this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Inflight => "inflight",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for InstantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded table action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instant {
    /// Creation timestamp; monotonically comparable, totally ordered.
    pub timestamp: String,
    /// The action this instant records.
    pub action: ActionKind,
    /// Current lifecycle state.
    pub state: InstantState,
}

impl Instant {
    /// Creates an instant in the given state.
    #[must_use]
    pub fn new(timestamp: impl Into<String>, action: ActionKind, state: InstantState) -> Self {
        Self {
            timestamp: timestamp.into(),
            action,
            state,
        }
    }

    /// Creates a requested instant.
    #[must_use]
    pub fn requested(timestamp: impl Into<String>, action: ActionKind) -> Self {
        Self::new(timestamp, action, InstantState::Requested)
    }

    /// Creates an inflight instant.
    #[must_use]
    pub fn inflight(timestamp: impl Into<String>, action: ActionKind) -> Self {
        Self::new(timestamp, action, InstantState::Inflight)
    }

    /// Creates a completed instant.
    #[must_use]
    pub fn completed(timestamp: impl Into<String>, action: ActionKind) -> Self {
        Self::new(timestamp, action, InstantState::Completed)
    }

    /// Returns true if this instant reached `Completed`.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.state, InstantState::Completed)
    }

    /// Returns the scope-relative object key backing this instant.
    #[must_use]
    pub fn file_path(&self) -> String {
        match self.state {
            InstantState::Completed => TimelinePaths::completed(&self.timestamp, self.action.as_str()),
            InstantState::Inflight => TimelinePaths::inflight(&self.timestamp, self.action.as_str()),
            InstantState::Requested => {
                TimelinePaths::requested(&self.timestamp, self.action.as_str())
            }
        }
    }

    /// Parses a timeline file name (without directory) into an instant.
    ///
    /// File names are `{timestamp}.{action}` for completed instants and
    /// `{timestamp}.{action}.{inflight|requested}` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::InvalidInstant`] if the name has the wrong
    /// shape or an unknown state suffix. Unknown *action* tokens also fail
    /// here; timeline loading skips them before calling this.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let mut parts = name.split('.');
        let timestamp = parts
            .next()
            .filter(|ts| !ts.is_empty())
            .ok_or_else(|| TimelineError::invalid_instant(format!("missing timestamp: {name}")))?;
        let action_token = parts
            .next()
            .ok_or_else(|| TimelineError::invalid_instant(format!("missing action: {name}")))?;
        let action = ActionKind::parse(action_token).ok_or_else(|| {
            TimelineError::invalid_instant(format!("unknown action {action_token:?}: {name}"))
        })?;

        let state = match parts.next() {
            None => InstantState::Completed,
            Some("inflight") => InstantState::Inflight,
            Some("requested") => InstantState::Requested,
            Some(other) => {
                return Err(TimelineError::invalid_instant(format!(
                    "unknown state suffix {other:?}: {name}"
                )))
            }
        };

        if parts.next().is_some() {
            return Err(TimelineError::invalid_instant(format!(
                "trailing segments: {name}"
            )));
        }

        Ok(Self::new(timestamp, action, state))
    }

    /// Returns a reference record for embedding into persisted plans.
    #[must_use]
    pub fn to_ref(&self) -> InstantRef {
        InstantRef {
            timestamp: self.timestamp.clone(),
            action: self.action,
            state: self.state,
        }
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]", self.timestamp, self.action, self.state)
    }
}

/// A serializable reference to an instant (timestamp + action + state).
///
/// Embedded in persisted plans to name the earliest instant to retain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantRef {
    /// Timestamp of the referenced instant.
    pub timestamp: String,
    /// Action of the referenced instant.
    pub action: ActionKind,
    /// Lifecycle state at reference time.
    pub state: InstantState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_codec_round_trips() {
        let cases = [
            Instant::completed("20240101000000", ActionKind::Commit),
            Instant::inflight("20240101000001", ActionKind::Clean),
            Instant::requested("20240101000002", ActionKind::Clean),
            Instant::completed("20240101000003", ActionKind::DeltaCommit),
            Instant::completed("20240101000004", ActionKind::Savepoint),
        ];

        for instant in cases {
            let path = instant.file_path();
            let name = path.strip_prefix("timeline/").expect("timeline prefix");
            let parsed = Instant::from_file_name(name).expect("parse");
            assert_eq!(parsed, instant);
        }
    }

    #[test]
    fn rejects_malformed_file_names() {
        for name in [
            "",
            "20240101000000",
            "20240101000000.unknown",
            "20240101000000.clean.pending",
            "20240101000000.clean.requested.extra",
            ".clean",
        ] {
            assert!(
                Instant::from_file_name(name).is_err(),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[test]
    fn states_are_monotonically_ordered() {
        assert!(InstantState::Requested < InstantState::Inflight);
        assert!(InstantState::Inflight < InstantState::Completed);
    }

    #[test]
    fn commit_view_covers_both_commit_kinds() {
        assert!(ActionKind::Commit.is_commit_kind());
        assert!(ActionKind::DeltaCommit.is_commit_kind());
        assert!(!ActionKind::Clean.is_commit_kind());
        assert!(!ActionKind::Savepoint.is_commit_kind());
    }

    #[test]
    fn instant_ref_serializes_camel_case() {
        let instant = Instant::completed("20240101000000", ActionKind::Commit);
        let json = serde_json::to_value(instant.to_ref()).expect("serialize");
        assert_eq!(json["timestamp"], "20240101000000");
        assert_eq!(json["action"], "commit");
        assert_eq!(json["state"], "completed");
    }
}
