//! Durable read/write of clean plan payloads, keyed by instant timestamp.
//!
//! The plan store is the only writer of clean-requested payloads. Writes
//! are conditional (`DoesNotExist`) so a plan is persisted exactly once;
//! reads distinguish three failure shapes the recovery loop depends on:
//!
//! - missing payload ([`TimelineError::PlanMissing`]) - crash before the
//!   request was written,
//! - zero-byte payload ([`TimelineError::EmptyContent`]) - crash between
//!   write-start and completion,
//! - undecodable payload ([`TimelineError::CorruptPlan`]) - never repaired
//!   automatically; surfaced to the caller.

use bytes::Bytes;

use strata_core::{TableStorage, TimelinePaths, WritePrecondition, WriteResult};

use crate::error::{Result, TimelineError};
use crate::instant::ActionKind;
use crate::plan::{CleanMetadata, CleanerPlan};

/// Reads and writes serialized clean records for one table.
#[derive(Debug, Clone)]
pub struct PlanStore {
    storage: TableStorage,
}

impl PlanStore {
    /// Creates a plan store over the table's storage.
    #[must_use]
    pub fn new(storage: TableStorage) -> Self {
        Self { storage }
    }

    /// Reads the cleaner plan persisted for the clean requested at
    /// `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::PlanMissing`] if no payload exists,
    /// [`TimelineError::EmptyContent`] if the payload is zero bytes,
    /// [`TimelineError::CorruptPlan`] if it cannot be decoded, or a storage
    /// error.
    pub async fn read_plan(&self, timestamp: &str) -> Result<CleanerPlan> {
        let path = TimelinePaths::requested(timestamp, ActionKind::Clean.as_str());
        let data = self.read_payload(timestamp, &path).await?;
        serde_json::from_slice(&data).map_err(|e| TimelineError::CorruptPlan {
            timestamp: timestamp.to_string(),
            message: e.to_string(),
        })
    }

    /// Persists a cleaner plan as the payload of the clean requested at
    /// `timestamp`. Exactly-once: a second write for the same timestamp
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::PlanAlreadyExists`] if a payload is already
    /// present, or a storage/serialization error.
    pub async fn write_plan(&self, timestamp: &str, plan: &CleanerPlan) -> Result<()> {
        let path = TimelinePaths::requested(timestamp, ActionKind::Clean.as_str());
        let data = serde_json::to_vec(plan).map_err(|e| {
            TimelineError::Storage(strata_core::Error::serialization(format!(
                "failed to encode cleaner plan for {timestamp}: {e}"
            )))
        })?;

        let result = self
            .storage
            .put_raw(&path, Bytes::from(data), WritePrecondition::DoesNotExist)
            .await?;

        match result {
            WriteResult::Success { .. } => Ok(()),
            WriteResult::PreconditionFailed { .. } => Err(TimelineError::PlanAlreadyExists {
                timestamp: timestamp.to_string(),
            }),
        }
    }

    /// Reads the clean metadata persisted for the clean completed at
    /// `timestamp`.
    ///
    /// # Errors
    ///
    /// Same error shapes as [`Self::read_plan`].
    pub async fn read_clean_metadata(&self, timestamp: &str) -> Result<CleanMetadata> {
        let path = TimelinePaths::completed(timestamp, ActionKind::Clean.as_str());
        let data = self.read_payload(timestamp, &path).await?;
        serde_json::from_slice(&data).map_err(|e| TimelineError::CorruptPlan {
            timestamp: timestamp.to_string(),
            message: e.to_string(),
        })
    }

    async fn read_payload(&self, timestamp: &str, path: &str) -> Result<Bytes> {
        let data = match self.storage.get_raw(path).await {
            Ok(data) => data,
            Err(err) if err.is_not_found() => {
                return Err(TimelineError::PlanMissing {
                    timestamp: timestamp.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        if data.is_empty() {
            return Err(TimelineError::EmptyContent {
                path: path.to_string(),
            });
        }
        Ok(data)
    }
}
