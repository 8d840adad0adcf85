//! In-process [`CallSheetStore`] backed by ordered maps.
//!
//! Writes are applied to a copy of the state which replaces the live state
//! only when every step succeeds, giving the same all-or-nothing behaviour as
//! the PostgreSQL store. Used by tests and local tooling; supports fault
//! injection and counts store calls.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::aggregate::{CallSheetRecord, CastRow, ChildRow, CrewRow, SceneRow};
use crate::diff::ChildChanges;
use crate::error::CoreError;
use crate::row_key::RowKey;
use crate::store::{
    CallSheetSnapshot, CallSheetStore, SavePlan, SaveReceipt, SaveTarget, StatusChange,
};
use crate::types::{DbId, INITIAL_VERSION};

/// One of the three child collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildCollection {
    Scenes,
    Cast,
    Crew,
}

/// A point in a store operation where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Any read (`ping`, `find`, `list_*`, `load_snapshot`).
    Read,
    /// After the parent row was written in a save.
    AfterHeader,
    AfterDeletes(ChildCollection),
    AfterUpdates(ChildCollection),
    AfterInserts(ChildCollection),
    StatusChange,
}

#[derive(Debug, Clone)]
struct ChildEntry<R> {
    call_sheet_id: DbId,
    row: R,
}

type ChildTable<R> = BTreeMap<DbId, ChildEntry<R>>;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_id: DbId,
    call_sheets: BTreeMap<DbId, CallSheetRecord>,
    scenes: ChildTable<SceneRow>,
    cast: ChildTable<CastRow>,
    crew: ChildTable<CrewRow>,
}

impl MemoryState {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }
}

struct Inner {
    state: MemoryState,
    fault: Option<FaultPoint>,
}

/// In-memory call sheet store.
pub struct MemoryCallSheetStore {
    inner: Mutex<Inner>,
    calls: AtomicUsize,
}

impl Default for MemoryCallSheetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCallSheetStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: MemoryState::default(),
                fault: None,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every operation that reaches `point` until cleared.
    pub async fn inject_fault(&self, point: FaultPoint) {
        self.inner.lock().await.fault = Some(point);
    }

    pub async fn clear_fault(&self) {
        self.inner.lock().await.fault = None;
    }

    /// Number of trait calls made against this store.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn trip(fault: Option<FaultPoint>, point: FaultPoint) -> Result<(), CoreError> {
    if fault == Some(point) {
        return Err(CoreError::Storage(format!("injected failure at {point:?}")));
    }
    Ok(())
}

fn rows_for<R: ChildRow>(table: &ChildTable<R>, call_sheet_id: DbId) -> Vec<R> {
    table
        .values()
        .filter(|e| e.call_sheet_id == call_sheet_id)
        .map(|e| e.row.clone())
        .collect()
}

fn owned_entry<'a, R: ChildRow>(
    table: &'a mut ChildTable<R>,
    call_sheet_id: DbId,
    id: DbId,
) -> Result<&'a mut ChildEntry<R>, CoreError> {
    match table.get_mut(&id) {
        Some(entry) if entry.call_sheet_id == call_sheet_id => Ok(entry),
        _ => Err(CoreError::Conflict(format!(
            "{} row {id} does not belong to call sheet {call_sheet_id}",
            R::COLLECTION
        ))),
    }
}

/// Apply one collection's change set, checking for injected faults between
/// the delete, update and insert phases.
fn apply_children<R: ChildRow>(
    state: &mut MemoryState,
    table: fn(&mut MemoryState) -> &mut ChildTable<R>,
    call_sheet_id: DbId,
    changes: ChildChanges<R>,
    collection: ChildCollection,
    fault: Option<FaultPoint>,
) -> Result<(), CoreError> {
    for id in changes.deletes {
        owned_entry(table(state), call_sheet_id, id)?;
        table(state).remove(&id);
    }
    trip(fault, FaultPoint::AfterDeletes(collection))?;

    for row in changes.updates {
        let id = row.key().persisted_id().ok_or_else(|| {
            CoreError::Internal(format!("{} update without a persisted key", R::COLLECTION))
        })?;
        owned_entry(table(state), call_sheet_id, id)?.row = row;
    }
    trip(fault, FaultPoint::AfterUpdates(collection))?;

    for mut row in changes.inserts {
        let id = state.next_id();
        row.set_key(RowKey::Persisted(id));
        table(state).insert(id, ChildEntry { call_sheet_id, row });
    }
    trip(fault, FaultPoint::AfterInserts(collection))
}

#[async_trait]
impl CallSheetStore for MemoryCallSheetStore {
    async fn ping(&self) -> Result<(), CoreError> {
        self.record_call();
        let inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::Read)
    }

    async fn find_call_sheet(&self, id: DbId) -> Result<Option<CallSheetRecord>, CoreError> {
        self.record_call();
        let inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::Read)?;
        Ok(inner.state.call_sheets.get(&id).cloned())
    }

    async fn list_call_sheets(&self, project_id: DbId) -> Result<Vec<CallSheetRecord>, CoreError> {
        self.record_call();
        let inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::Read)?;
        let mut sheets: Vec<_> = inner
            .state
            .call_sheets
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        sheets.sort_by_key(|r| (r.header.shoot_day_number, r.id));
        Ok(sheets)
    }

    async fn list_scenes(&self, call_sheet_id: DbId) -> Result<Vec<SceneRow>, CoreError> {
        self.record_call();
        let inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::Read)?;
        Ok(rows_for(&inner.state.scenes, call_sheet_id))
    }

    async fn list_cast(&self, call_sheet_id: DbId) -> Result<Vec<CastRow>, CoreError> {
        self.record_call();
        let inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::Read)?;
        Ok(rows_for(&inner.state.cast, call_sheet_id))
    }

    async fn list_crew(&self, call_sheet_id: DbId) -> Result<Vec<CrewRow>, CoreError> {
        self.record_call();
        let inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::Read)?;
        Ok(rows_for(&inner.state.crew, call_sheet_id))
    }

    async fn load_snapshot(&self, id: DbId) -> Result<Option<CallSheetSnapshot>, CoreError> {
        self.record_call();
        let inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::Read)?;
        let Some(record) = inner.state.call_sheets.get(&id).cloned() else {
            return Ok(None);
        };
        Ok(Some(CallSheetSnapshot {
            record,
            scenes: rows_for(&inner.state.scenes, id),
            cast: rows_for(&inner.state.cast, id),
            crew: rows_for(&inner.state.crew, id),
        }))
    }

    async fn apply_save(&self, plan: SavePlan) -> Result<SaveReceipt, CoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        let fault = inner.fault;
        let mut next = inner.state.clone();
        let now = chrono::Utc::now();

        let receipt = match plan.target {
            SaveTarget::Create {
                organization_id,
                project_id,
            } => {
                let id = next.next_id();
                next.call_sheets.insert(
                    id,
                    CallSheetRecord {
                        id,
                        organization_id,
                        project_id,
                        header: plan.header,
                        status: plan.status,
                        version: INITIAL_VERSION,
                        published_at: None,
                        created_at: now,
                        updated_at: now,
                    },
                );
                SaveReceipt {
                    id,
                    version: INITIAL_VERSION,
                }
            }
            SaveTarget::Update {
                id,
                expected_version,
            } => {
                let record = next
                    .call_sheets
                    .get_mut(&id)
                    .ok_or(CoreError::NotFound {
                        entity: "CallSheet",
                        id,
                    })?;
                if record.version != expected_version {
                    return Err(CoreError::Conflict(format!(
                        "Call sheet {id} is at version {}, expected {expected_version}",
                        record.version
                    )));
                }
                record.header = plan.header;
                record.status = plan.status;
                record.version += 1;
                record.updated_at = now;
                SaveReceipt {
                    id,
                    version: record.version,
                }
            }
        };
        trip(fault, FaultPoint::AfterHeader)?;

        let id = receipt.id;
        apply_children(&mut next, |s| &mut s.scenes, id, plan.scenes, ChildCollection::Scenes, fault)?;
        apply_children(&mut next, |s| &mut s.cast, id, plan.cast, ChildCollection::Cast, fault)?;
        apply_children(&mut next, |s| &mut s.crew, id, plan.crew, ChildCollection::Crew, fault)?;

        inner.state = next;
        Ok(receipt)
    }

    async fn transition_status(&self, change: StatusChange) -> Result<CallSheetRecord, CoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        trip(inner.fault, FaultPoint::StatusChange)?;

        let record = inner
            .state
            .call_sheets
            .get_mut(&change.id)
            .ok_or(CoreError::NotFound {
                entity: "CallSheet",
                id: change.id,
            })?;
        if record.version != change.expected_version {
            return Err(CoreError::Conflict(format!(
                "Call sheet {} is at version {}, expected {}",
                change.id, record.version, change.expected_version
            )));
        }
        record.status.validate_transition(change.to)?;

        record.status = change.to;
        if change.to == crate::call_sheet::CallSheetStatus::Published {
            record.published_at = Some(change.at);
        }
        record.version += 1;
        record.updated_at = change.at;
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::aggregate::CallSheetHeader;
    use crate::call_sheet::CallSheetStatus;

    fn create_plan(scenes: Vec<SceneRow>) -> SavePlan {
        SavePlan {
            target: SaveTarget::Create {
                organization_id: 1,
                project_id: 10,
            },
            header: CallSheetHeader::default(),
            status: CallSheetStatus::Draft,
            scenes: ChildChanges {
                inserts: scenes,
                ..Default::default()
            },
            cast: ChildChanges::default(),
            crew: ChildChanges::default(),
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_initial_version() {
        let store = MemoryCallSheetStore::new();
        let receipt = store
            .apply_save(create_plan(vec![SceneRow::default()]))
            .await
            .unwrap();

        assert_eq!(receipt.version, INITIAL_VERSION);
        let snapshot = store.load_snapshot(receipt.id).await.unwrap().unwrap();
        assert_eq!(snapshot.scenes.len(), 1);
        assert_matches!(snapshot.scenes[0].key, RowKey::Persisted(_));
    }

    #[tokio::test]
    async fn failed_save_leaves_state_untouched() {
        let store = MemoryCallSheetStore::new();
        store
            .inject_fault(FaultPoint::AfterInserts(ChildCollection::Scenes))
            .await;

        let result = store.apply_save(create_plan(vec![SceneRow::default()])).await;

        assert_matches!(result, Err(CoreError::Storage(_)));
        store.clear_fault().await;
        assert!(store.list_call_sheets(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let store = MemoryCallSheetStore::new();
        let receipt = store.apply_save(create_plan(vec![])).await.unwrap();

        let mut plan = create_plan(vec![]);
        plan.target = SaveTarget::Update {
            id: receipt.id,
            expected_version: receipt.version + 1,
        };

        assert_matches!(store.apply_save(plan).await, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_foreign_row_is_a_conflict() {
        let store = MemoryCallSheetStore::new();
        let first = store
            .apply_save(create_plan(vec![SceneRow::default()]))
            .await
            .unwrap();
        let second = store.apply_save(create_plan(vec![])).await.unwrap();
        let foreign_id = store.list_scenes(first.id).await.unwrap()[0]
            .key
            .persisted_id()
            .unwrap();

        let mut plan = create_plan(vec![]);
        plan.target = SaveTarget::Update {
            id: second.id,
            expected_version: second.version,
        };
        plan.scenes.deletes = vec![foreign_id];

        assert_matches!(store.apply_save(plan).await, Err(CoreError::Conflict(_)));
        assert_eq!(store.list_scenes(first.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_change_revalidates_transition() {
        let store = MemoryCallSheetStore::new();
        let receipt = store.apply_save(create_plan(vec![])).await.unwrap();
        let now = chrono::Utc::now();

        let published = store
            .transition_status(StatusChange {
                id: receipt.id,
                expected_version: 1,
                to: CallSheetStatus::Published,
                at: now,
            })
            .await
            .unwrap();
        assert_eq!(published.published_at, Some(now));
        assert_eq!(published.version, 2);

        let again = store
            .transition_status(StatusChange {
                id: receipt.id,
                expected_version: 2,
                to: CallSheetStatus::Published,
                at: now,
            })
            .await;
        assert_matches!(again, Err(CoreError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn counts_calls() {
        let store = MemoryCallSheetStore::new();
        store.ping().await.unwrap();
        store.list_call_sheets(1).await.unwrap();
        assert_eq!(store.call_count(), 2);
    }
}
