//! Call sheet editing session: load, edit, save, publish.
//!
//! A [`CallSheetEditor`] owns one selected aggregate and the baseline it was
//! loaded from. Saves diff the edited aggregate against that baseline and hand
//! the resulting [`SavePlan`] to the store, which applies it atomically under
//! an optimistic version check. After a successful save the aggregate is
//! reloaded so draft keys are replaced by store ids.

use std::sync::Arc;

use crate::aggregate::{CallSheetData, CallSheetHeader, CallSheetRecord};
use crate::call_sheet::CallSheetStatus;
use crate::context::OrgContext;
use crate::diff::diff_children;
use crate::error::CoreError;
use crate::store::{CallSheetStore, SavePlan, SaveReceipt, SaveTarget, StatusChange};
use crate::summary::CallSheetSummary;
use crate::types::DbId;

/// Whether the selected call sheet is open for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing,
}

/// Why a save did not touch the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingOrganization,
}

/// Result of [`CallSheetEditor::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SaveReceipt),
    Skipped(SkipReason),
}

/// One user's editing session over a single call sheet.
pub struct CallSheetEditor<S: CallSheetStore + ?Sized> {
    store: Arc<S>,
    context: OrgContext,
    selected: Option<CallSheetData>,
    baseline: Option<CallSheetData>,
    mode: EditMode,
    saving: bool,
    last_error: Option<String>,
}

impl<S: CallSheetStore + ?Sized> CallSheetEditor<S> {
    pub fn new(store: Arc<S>, context: OrgContext) -> Self {
        Self {
            store,
            context,
            selected: None,
            baseline: None,
            mode: EditMode::Viewing,
            saving: false,
            last_error: None,
        }
    }

    pub fn context(&self) -> &OrgContext {
        &self.context
    }

    pub fn selected(&self) -> Option<&CallSheetData> {
        self.selected.as_ref()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Message of the most recent failed load, save or transition.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Derived statistics for the selected call sheet.
    pub fn summary(&self) -> Option<CallSheetSummary> {
        self.selected.as_ref().map(CallSheetSummary::from_data)
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Call sheets of the session's project (the list view).
    pub async fn list(&self) -> Result<Vec<CallSheetRecord>, CoreError> {
        self.store.list_call_sheets(self.context.project_id).await
    }

    /// Load a call sheet with its children and select it.
    ///
    /// On failure the selection is cleared rather than left partially
    /// populated.
    pub async fn load(&mut self, id: DbId) -> Result<&CallSheetData, CoreError> {
        self.mode = EditMode::Viewing;
        let fetched = self.fetch(id).await;
        match fetched {
            Ok(data) => {
                tracing::debug!(
                    call_sheet_id = id,
                    version = data.version,
                    scenes = data.scenes.len(),
                    cast = data.cast.len(),
                    crew = data.crew.len(),
                    "Call sheet loaded"
                );
                self.last_error = None;
                self.baseline = Some(data.clone());
                Ok(&*self.selected.insert(data))
            }
            Err(e) => {
                tracing::error!(call_sheet_id = id, error = %e, "Failed to load call sheet");
                self.selected = None;
                self.baseline = None;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch(&self, id: DbId) -> Result<CallSheetData, CoreError> {
        let snapshot = self
            .store
            .load_snapshot(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CallSheet",
                id,
            })?;
        Ok(CallSheetData::from_parts(
            snapshot.record,
            snapshot.scenes,
            snapshot.cast,
            snapshot.crew,
        ))
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Select a new, unsaved call sheet and open it for editing.
    pub fn start_new(&mut self, header: CallSheetHeader) -> &mut CallSheetData {
        let mut data = CallSheetData::new_draft(self.context.project_id, header);
        data.organization_id = self.context.organization_id;
        self.baseline = None;
        self.last_error = None;
        self.mode = EditMode::Editing;
        self.selected.insert(data)
    }

    /// Open the selected call sheet for editing.
    pub fn begin_edit(&mut self) -> Result<(), CoreError> {
        let data = self
            .selected
            .as_ref()
            .ok_or_else(|| CoreError::Precondition("No call sheet selected".to_string()))?;
        if !data.status.accepts_edits() {
            return Err(CoreError::InvalidTransition {
                from: data.status.as_str().to_string(),
                to: CallSheetStatus::Updated.as_str().to_string(),
            });
        }
        self.mode = EditMode::Editing;
        Ok(())
    }

    /// Discard local edits and return to the last loaded state.
    pub fn cancel_edit(&mut self) {
        self.selected = self.baseline.clone();
        self.mode = EditMode::Viewing;
    }

    /// Mutable access to the aggregate; only available in edit mode.
    pub fn draft_mut(&mut self) -> Result<&mut CallSheetData, CoreError> {
        if self.mode != EditMode::Editing {
            return Err(CoreError::Precondition(
                "Call sheet is not in edit mode".to_string(),
            ));
        }
        self.selected
            .as_mut()
            .ok_or_else(|| CoreError::Precondition("No call sheet selected".to_string()))
    }

    // -----------------------------------------------------------------------
    // Saving
    // -----------------------------------------------------------------------

    /// Persist the edited aggregate, reload it and leave edit mode.
    ///
    /// Without a resolved organization this returns
    /// [`SaveOutcome::Skipped`] and makes no store calls. On failure the
    /// local edits and edit mode are kept so the save can be retried.
    pub async fn save(&mut self) -> Result<SaveOutcome, CoreError> {
        let Some(organization_id) = self.context.organization_id else {
            tracing::warn!(
                project_id = self.context.project_id,
                "Save skipped: no organization resolved"
            );
            return Ok(SaveOutcome::Skipped(SkipReason::MissingOrganization));
        };
        if self.saving {
            return Err(CoreError::Precondition(
                "A save is already in progress".to_string(),
            ));
        }

        let plan = match self.build_plan(organization_id) {
            Ok(plan) => plan,
            Err(e) => return Err(self.record_failure(e)),
        };
        tracing::info!(
            target_row = ?plan.target,
            status = %plan.status,
            scene_inserts = plan.scenes.inserts.len(),
            scene_updates = plan.scenes.updates.len(),
            scene_deletes = plan.scenes.deletes.len(),
            child_writes = plan.child_write_count(),
            "Saving call sheet"
        );

        self.saving = true;
        let result = self.store.apply_save(plan).await;
        self.saving = false;

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.record_failure(e)),
        };

        tracing::info!(
            call_sheet_id = receipt.id,
            version = receipt.version,
            "Call sheet saved"
        );
        self.load(receipt.id).await?;
        Ok(SaveOutcome::Saved(receipt))
    }

    fn record_failure(&mut self, e: CoreError) -> CoreError {
        tracing::error!(
            call_sheet_id = ?self.selected.as_ref().and_then(|d| d.id),
            error = %e,
            "Failed to save call sheet"
        );
        self.last_error = Some(e.to_string());
        e
    }

    /// Renumber children and compute the write set against the baseline.
    fn build_plan(&mut self, organization_id: DbId) -> Result<SavePlan, CoreError> {
        if self.mode != EditMode::Editing {
            return Err(CoreError::Precondition(
                "Call sheet is not in edit mode".to_string(),
            ));
        }
        let draft = self
            .selected
            .as_mut()
            .ok_or_else(|| CoreError::Precondition("No call sheet selected".to_string()))?;

        if let Some(owner) = draft.organization_id {
            if owner != organization_id {
                return Err(CoreError::Precondition(format!(
                    "Call sheet belongs to organization {owner}, not {organization_id}"
                )));
            }
        }

        let status = draft.status.after_content_save()?;
        draft.renumber();

        let target = match draft.id {
            Some(id) => SaveTarget::Update {
                id,
                expected_version: draft.version,
            },
            None => SaveTarget::Create {
                organization_id,
                project_id: draft.project_id,
            },
        };

        let (base_scenes, base_cast, base_crew) = match &self.baseline {
            Some(b) => (&b.scenes[..], &b.cast[..], &b.crew[..]),
            None => (&[][..], &[][..], &[][..]),
        };

        Ok(SavePlan {
            target,
            header: draft.header.clone(),
            status,
            scenes: diff_children(base_scenes, &draft.scenes)?,
            cast: diff_children(base_cast, &draft.cast)?,
            crew: diff_children(base_crew, &draft.crew)?,
        })
    }

    // -----------------------------------------------------------------------
    // Status transitions
    // -----------------------------------------------------------------------

    /// Move a saved call sheet to `PUBLISHED`, stamping `published_at`.
    pub async fn publish(&mut self) -> Result<&CallSheetData, CoreError> {
        self.transition(CallSheetStatus::Published).await
    }

    /// Move a saved call sheet to `CANCELLED`.
    pub async fn cancel_call_sheet(&mut self) -> Result<&CallSheetData, CoreError> {
        self.transition(CallSheetStatus::Cancelled).await
    }

    async fn transition(&mut self, to: CallSheetStatus) -> Result<&CallSheetData, CoreError> {
        if self.mode == EditMode::Editing {
            return Err(CoreError::Precondition(
                "Save or discard edits before changing status".to_string(),
            ));
        }
        let data = self
            .selected
            .as_ref()
            .ok_or_else(|| CoreError::Precondition("No call sheet selected".to_string()))?;
        let id = data.id.ok_or_else(|| {
            CoreError::Precondition("Call sheet must be saved before changing status".to_string())
        })?;
        data.status.validate_transition(to)?;

        let change = StatusChange {
            id,
            expected_version: data.version,
            to,
            at: chrono::Utc::now(),
        };
        let record = match self.store.transition_status(change).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(call_sheet_id = id, to = %to, error = %e, "Status change failed");
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };
        tracing::info!(
            call_sheet_id = id,
            status = %record.status,
            version = record.version,
            "Call sheet status changed"
        );

        self.last_error = None;
        if let Some(baseline) = self.baseline.as_mut() {
            apply_lifecycle(baseline, &record);
        }
        let data = self
            .selected
            .as_mut()
            .ok_or_else(|| CoreError::Internal("Selection lost during status change".to_string()))?;
        apply_lifecycle(data, &record);
        Ok(&*data)
    }
}

fn apply_lifecycle(data: &mut CallSheetData, record: &CallSheetRecord) {
    data.status = record.status;
    data.version = record.version;
    data.published_at = record.published_at;
}
