//! Trigger evaluation: should a clean cycle start?
//!
//! The only supported strategy counts completed commits since the last
//! successful clean. "Successful" means the completed clean instant is
//! non-empty and its metadata is readable; a clean that crashed before
//! writing metadata contributes nothing and the count falls back to the
//! full commit history.

use strata_timeline::{ActionKind, ActiveTimeline, PlanStore};

use crate::config::{CleanConfig, CleaningTriggerStrategy};
use crate::error::Result;

/// Number of completed commits strictly after the last successful clean's
/// recorded `last_completed_commit_timestamp`; all completed commits when
/// no successful clean exists.
///
/// # Errors
///
/// Fails if the last completed clean's metadata exists but cannot be read.
/// That is surfaced rather than treated as "no prior clean": guessing
/// would make the trigger fire (or not) off corrupt state.
pub async fn commits_since_last_clean(
    timeline: &ActiveTimeline,
    plan_store: &PlanStore,
) -> Result<usize> {
    let commits = timeline.timeline().commits().completed();
    let cleans = timeline.timeline().filter_action(ActionKind::Clean).completed();

    let Some(last_clean) = cleans.last() else {
        return Ok(commits.count());
    };
    if timeline.is_instant_empty(last_clean).await? {
        return Ok(commits.count());
    }

    let metadata = plan_store.read_clean_metadata(&last_clean.timestamp).await?;
    Ok(commits
        .find_after(&metadata.last_completed_commit_timestamp)
        .count())
}

/// Decides whether a new clean cycle should start.
///
/// # Errors
///
/// Fails if reading the last clean's metadata fails (see
/// [`commits_since_last_clean`]). Unsupported strategies are rejected when
/// configuration is parsed, before evaluation is ever reached.
pub async fn needs_cleaning(
    timeline: &ActiveTimeline,
    plan_store: &PlanStore,
    config: &CleanConfig,
) -> Result<bool> {
    match config.trigger_strategy {
        CleaningTriggerStrategy::NumCommits => {
            let commits = commits_since_last_clean(timeline, plan_store).await?;
            let threshold = config.max_commits_before_clean as usize;
            let due = commits >= threshold;
            tracing::debug!(
                table = %timeline.storage().table_id(),
                commits_since_last_clean = commits,
                threshold,
                due,
                "evaluated clean trigger"
            );
            Ok(due)
        }
    }
}
