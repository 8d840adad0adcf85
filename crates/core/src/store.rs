//! Persistence boundary for call sheets.
//!
//! [`CallSheetStore`] is the record-store interface the editor talks to. Reads
//! mirror the list / get verbs of a CRUD client; writes are grouped into a
//! [`SavePlan`] and a [`StatusChange`] so implementations can apply each one
//! atomically and enforce optimistic concurrency on `version`.

use async_trait::async_trait;

use crate::aggregate::{CallSheetHeader, CallSheetRecord, CastRow, CrewRow, SceneRow};
use crate::call_sheet::CallSheetStatus;
use crate::diff::ChildChanges;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp, Version};

/// Parent record and children read in one consistent snapshot.
#[derive(Debug, Clone)]
pub struct CallSheetSnapshot {
    pub record: CallSheetRecord,
    pub scenes: Vec<SceneRow>,
    pub cast: Vec<CastRow>,
    pub crew: Vec<CrewRow>,
}

/// Whether a save creates the parent row or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Create {
        organization_id: DbId,
        project_id: DbId,
    },
    /// Update guarded by the version the editor loaded.
    Update { id: DbId, expected_version: Version },
}

/// Everything a save writes, applied as one unit.
#[derive(Debug, Clone)]
pub struct SavePlan {
    pub target: SaveTarget,
    pub header: CallSheetHeader,
    pub status: CallSheetStatus,
    pub scenes: ChildChanges<SceneRow>,
    pub cast: ChildChanges<CastRow>,
    pub crew: ChildChanges<CrewRow>,
}

impl SavePlan {
    /// Number of child-row writes across all three collections.
    pub fn child_write_count(&self) -> usize {
        self.scenes.write_count() + self.cast.write_count() + self.crew.write_count()
    }
}

/// Result of a successfully applied [`SavePlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReceipt {
    pub id: DbId,
    pub version: Version,
}

/// A lifecycle transition to apply to a persisted call sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub id: DbId,
    pub expected_version: Version,
    pub to: CallSheetStatus,
    /// Stamped on `published_at` when `to` is `PUBLISHED`.
    pub at: Timestamp,
}

/// Record store for call sheets and their children.
///
/// Implementations must:
/// - return `CoreError::Conflict` when `expected_version` does not match the
///   stored version, or when an update/delete targets a row that does not
///   belong to the call sheet;
/// - apply a [`SavePlan`] or [`StatusChange`] entirely or not at all;
/// - re-validate status transitions against
///   [`CallSheetStatus::validate_transition`].
#[async_trait]
pub trait CallSheetStore: Send + Sync {
    /// Cheap liveness check of the backing store.
    async fn ping(&self) -> Result<(), CoreError>;

    async fn find_call_sheet(&self, id: DbId) -> Result<Option<CallSheetRecord>, CoreError>;

    /// Call sheets of a project, ordered by shoot day number.
    async fn list_call_sheets(&self, project_id: DbId) -> Result<Vec<CallSheetRecord>, CoreError>;

    async fn list_scenes(&self, call_sheet_id: DbId) -> Result<Vec<SceneRow>, CoreError>;

    async fn list_cast(&self, call_sheet_id: DbId) -> Result<Vec<CastRow>, CoreError>;

    async fn list_crew(&self, call_sheet_id: DbId) -> Result<Vec<CrewRow>, CoreError>;

    /// Parent and all children read atomically. `None` if the parent is absent.
    async fn load_snapshot(&self, id: DbId) -> Result<Option<CallSheetSnapshot>, CoreError>;

    async fn apply_save(&self, plan: SavePlan) -> Result<SaveReceipt, CoreError>;

    async fn transition_status(&self, change: StatusChange) -> Result<CallSheetRecord, CoreError>;
}
