//! Clean configuration: retention policy name, trigger strategy, and
//! planning parallelism.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CleanError;

/// Named retention policies.
///
/// The policy's internal heuristics live in the retention planner; the
/// orchestrator only records the name in force into the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CleaningPolicy {
    /// Keep the last N completed commits' file versions.
    KeepLatestCommits,
    /// Keep the last N versions of each file group.
    KeepLatestFileVersions,
    /// Keep all file versions written within the last N hours.
    KeepLatestByHours,
}

impl CleaningPolicy {
    /// Returns the policy name recorded into plans.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeepLatestCommits => "keepLatestCommits",
            Self::KeepLatestFileVersions => "keepLatestFileVersions",
            Self::KeepLatestByHours => "keepLatestByHours",
        }
    }
}

impl fmt::Display for CleaningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for *when* a clean cycle should start.
///
/// Unknown strategy strings are a fatal configuration error, not a silent
/// no-op: a typo must never quietly disable cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum CleaningTriggerStrategy {
    /// Trigger once completed commits since the last successful clean
    /// reach the configured threshold.
    NumCommits,
}

impl CleaningTriggerStrategy {
    /// Returns the canonical name of this strategy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NumCommits => "num_commits",
        }
    }
}

impl fmt::Display for CleaningTriggerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningTriggerStrategy {
    type Err = CleanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "num_commits" | "NUM_COMMITS" => Ok(Self::NumCommits),
            other => Err(CleanError::config(format!(
                "unsupported cleaning trigger strategy: {other}"
            ))),
        }
    }
}

/// Configuration for the clean-planning core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanConfig {
    /// Retention policy whose name is recorded into plans.
    pub policy: CleaningPolicy,
    /// When to start a clean cycle.
    pub trigger_strategy: CleaningTriggerStrategy,
    /// Trigger threshold: clean once this many completed commits have
    /// accumulated since the last successful clean.
    pub max_commits_before_clean: u32,
    /// Upper bound on partitions processed concurrently in one batch.
    ///
    /// Batching caps the number of file-listing round trips held in memory
    /// at once on wide tables; a larger value trades memory for wall-clock
    /// time. Values below 1 are floored to 1 at use.
    pub parallelism: usize,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            policy: CleaningPolicy::KeepLatestCommits,
            trigger_strategy: CleaningTriggerStrategy::NumCommits,
            max_commits_before_clean: 4,
            parallelism: 8,
        }
    }
}

impl CleanConfig {
    /// Effective per-batch bound: configured parallelism with a defensive
    /// floor of 1.
    #[must_use]
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.max(1)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any setting is unusable.
    pub fn validate(&self) -> Result<(), CleanError> {
        if self.max_commits_before_clean == 0 {
            return Err(CleanError::config(
                "max_commits_before_clean must be at least 1",
            ));
        }
        Ok(())
    }
}
