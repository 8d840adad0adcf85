//! Keyed diff of a child collection against its last-loaded baseline.
//!
//! Produces the explicit insert / update / delete sets a save applies in one
//! transaction, instead of deleting and recreating every child row.

use std::collections::{HashMap, HashSet};

use crate::aggregate::ChildRow;
use crate::error::CoreError;
use crate::types::DbId;

/// How an edited row compares with the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffStatus {
    /// Draft key, not yet stored.
    Added,
    Changed,
    Unchanged,
}

/// Write set for one child collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildChanges<R> {
    /// Rows with a draft key, in collection order.
    pub inserts: Vec<R>,
    /// Persisted rows whose content differs from the baseline.
    pub updates: Vec<R>,
    /// Ids of baseline rows no longer present.
    pub deletes: Vec<DbId>,
}

impl<R> Default for ChildChanges<R> {
    fn default() -> Self {
        Self {
            inserts: Vec::new(),
            updates: Vec::new(),
            deletes: Vec::new(),
        }
    }
}

impl<R> ChildChanges<R> {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of row writes this change set performs.
    pub fn write_count(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }
}

/// Classify a single edited row against the baseline index.
fn classify<R: ChildRow>(row: &R, baseline: &HashMap<DbId, &R>) -> Result<DiffStatus, CoreError> {
    match row.key().persisted_id() {
        None => Ok(DiffStatus::Added),
        Some(id) => match baseline.get(&id) {
            Some(old) if *old == row => Ok(DiffStatus::Unchanged),
            Some(_) => Ok(DiffStatus::Changed),
            None => Err(CoreError::Conflict(format!(
                "{} row {id} is not part of this call sheet (it may have been removed by another editor)",
                R::COLLECTION
            ))),
        },
    }
}

/// Diff `edited` against `baseline`.
///
/// `edited` must already carry its final `sort_order` values; a row whose only
/// change is its position is reported as an update.
pub fn diff_children<R: ChildRow>(baseline: &[R], edited: &[R]) -> Result<ChildChanges<R>, CoreError> {
    let index: HashMap<DbId, &R> = baseline
        .iter()
        .filter_map(|r| r.key().persisted_id().map(|id| (id, r)))
        .collect();

    let mut changes = ChildChanges::default();
    let mut seen = HashSet::new();

    for row in edited {
        if let Some(id) = row.key().persisted_id() {
            if !seen.insert(id) {
                return Err(CoreError::Validation(format!(
                    "{} row {id} appears more than once",
                    R::COLLECTION
                )));
            }
        }
        match classify(row, &index)? {
            DiffStatus::Added => changes.inserts.push(row.clone()),
            DiffStatus::Changed => changes.updates.push(row.clone()),
            DiffStatus::Unchanged => {}
        }
    }

    changes.deletes = baseline
        .iter()
        .filter_map(|r| r.key().persisted_id())
        .filter(|id| !seen.contains(id))
        .collect();

    Ok(changes)
}
