//! Timeline views and the storage-backed active timeline.
//!
//! A [`Timeline`] is an ordered, in-memory sequence of instants plus pure
//! filter combinators. Filters return new `Timeline` values, so views
//! compose (`timeline.commits().completed().find_after(ts)`) and are
//! testable without storage.
//!
//! [`ActiveTimeline`] binds a `Timeline` to a table's storage. It can
//! reload from durable state and perform the two repair mutations the
//! maintenance layer is allowed: probing an instant's backing content for
//! emptiness and deleting an empty (crashed) instant file.

use strata_core::{TableStorage, TimelinePaths};

use crate::error::{Result, TimelineError};
use crate::instant::{ActionKind, Instant, InstantState};

/// An ordered, append-only collection of instants for one table.
///
/// Ordering is by `(timestamp, action, state)`. Views are cheap clones of
/// the filtered subset; the sequence itself is never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    instants: Vec<Instant>,
}

impl Timeline {
    /// Builds a timeline from an unordered set of instants.
    #[must_use]
    pub fn new(mut instants: Vec<Instant>) -> Self {
        instants.sort();
        instants.dedup();
        Self { instants }
    }

    /// Returns the instants in order.
    #[must_use]
    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    /// Number of instants in this view.
    #[must_use]
    pub fn count(&self) -> usize {
        self.instants.len()
    }

    /// Returns true if this view holds no instants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    /// The last instant of this view, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Instant> {
        self.instants.last()
    }

    /// View containing only instants of the given action.
    #[must_use]
    pub fn filter_action(&self, action: ActionKind) -> Self {
        self.retain(|i| i.action == action)
    }

    /// View containing only instants in the given state.
    #[must_use]
    pub fn filter_state(&self, state: InstantState) -> Self {
        self.retain(|i| i.state == state)
    }

    /// View containing only completed instants.
    #[must_use]
    pub fn completed(&self) -> Self {
        self.filter_state(InstantState::Completed)
    }

    /// View containing write commits (regular and delta).
    #[must_use]
    pub fn commits(&self) -> Self {
        self.retain(|i| i.action.is_commit_kind())
    }

    /// View containing instants strictly after the given timestamp.
    #[must_use]
    pub fn find_after(&self, timestamp: &str) -> Self {
        self.retain(|i| i.timestamp.as_str() > timestamp)
    }

    fn retain(&self, keep: impl Fn(&Instant) -> bool) -> Self {
        Self {
            instants: self.instants.iter().filter(|i| keep(i)).cloned().collect(),
        }
    }
}

/// The storage-backed timeline for one table.
#[derive(Debug, Clone)]
pub struct ActiveTimeline {
    storage: TableStorage,
    timeline: Timeline,
}

impl ActiveTimeline {
    /// Loads the timeline from durable storage.
    ///
    /// Lists `timeline/` and parses every instant file name. Files that do
    /// not parse as instants (unknown actions, foreign objects) are skipped
    /// with a debug log so newer writers can add actions without breaking
    /// older readers.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    pub async fn load(storage: TableStorage) -> Result<Self> {
        let timeline = Self::read_timeline(&storage).await?;
        Ok(Self { storage, timeline })
    }

    async fn read_timeline(storage: &TableStorage) -> Result<Timeline> {
        let entries = storage.list_meta(TimelinePaths::TIMELINE_DIR).await?;

        let mut instants = Vec::with_capacity(entries.len());
        for meta in entries {
            let Some(name) = meta.path.strip_prefix(TimelinePaths::TIMELINE_DIR) else {
                continue;
            };
            match Instant::from_file_name(name) {
                Ok(instant) => instants.push(instant),
                Err(err) => {
                    tracing::debug!(path = %meta.path, error = %err, "skipping non-instant timeline object");
                }
            }
        }

        Ok(Timeline::new(instants))
    }

    /// Re-reads the timeline from durable storage, discarding the cached
    /// view. Another process may have repaired or appended concurrently.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    pub async fn reload(&mut self) -> Result<()> {
        self.timeline = Self::read_timeline(&self.storage).await?;
        Ok(())
    }

    /// The current in-memory view of the timeline.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The storage this timeline is bound to.
    #[must_use]
    pub fn storage(&self) -> &TableStorage {
        &self.storage
    }

    /// Tests whether the instant's backing content is empty.
    ///
    /// Probes durable storage directly rather than the cached view: the
    /// answer drives repair decisions and must be fresh. A missing object
    /// counts as empty - another process may have already repaired it and
    /// the subsequent delete is idempotent either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata probe fails.
    pub async fn is_instant_empty(&self, instant: &Instant) -> Result<bool> {
        let meta = self.storage.head_raw(&instant.file_path()).await?;
        Ok(meta.is_none_or(|m| m.is_empty()))
    }

    /// Deletes an instant file, but only if its content is empty.
    ///
    /// This is a repair operation for crashed writers, not a normal write.
    /// Deleting a missing instant is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::InvalidInstant`] if the instant has
    /// non-empty content (repair must never destroy committed state), or a
    /// storage error from the probe/delete.
    pub async fn delete_empty_instant(&self, instant: &Instant) -> Result<()> {
        let path = instant.file_path();
        match self.storage.head_raw(&path).await? {
            None => return Ok(()),
            Some(meta) if !meta.is_empty() => {
                return Err(TimelineError::invalid_instant(format!(
                    "refusing to delete non-empty instant {instant} ({} bytes)",
                    meta.size
                )));
            }
            Some(_) => {}
        }

        tracing::info!(instant = %instant, path = %path, "deleting empty instant (crash repair)");
        self.storage.delete(&path).await?;
        Ok(())
    }
}
