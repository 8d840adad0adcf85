//! Handlers for call sheets.
//!
//! Every request runs its own [`CallSheetEditor`] session: load the
//! aggregate, apply the submitted document as local edits, save through the
//! store and answer with the reloaded aggregate.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use slate_core::aggregate::{CallSheetData, CallSheetHeader, CastRow, CrewRow, SceneRow};
use slate_core::context::OrgContext;
use slate_core::editor::{CallSheetEditor, SaveOutcome, SkipReason};
use slate_core::error::CoreError;
use slate_core::store::{CallSheetStore, SaveReceipt};
use slate_core::types::{DbId, Version};

use crate::error::{AppError, AppResult};
use crate::middleware::org::OrgScope;
use crate::response::DataResponse;
use crate::state::AppState;

type Editor = CallSheetEditor<dyn CallSheetStore>;

/// A full call sheet as submitted by a client.
///
/// Rows without a `key` are new; rows with a persisted key update the
/// matching stored row; stored rows left out are deleted. Array position
/// becomes `sort_order`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallSheetDocument {
    #[serde(flatten)]
    pub header: CallSheetHeader,
    pub scenes: Vec<SceneRow>,
    pub cast: Vec<CastRow>,
    pub crew: Vec<CrewRow>,
}

/// Body of `PUT /call-sheets/{id}`.
#[derive(Debug, Deserialize)]
pub struct SaveCallSheetRequest {
    /// Version the client last read; a mismatch is rejected with 409.
    pub version: Version,
    #[serde(flatten)]
    pub document: CallSheetDocument,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn apply_document(data: &mut CallSheetData, document: CallSheetDocument) {
    data.header = document.header;
    data.scenes = document.scenes;
    data.cast = document.cast;
    data.crew = document.crew;
}

/// Open a session on an existing call sheet visible to `org`.
///
/// Call sheets owned by another organization are reported as not found.
async fn open(state: &AppState, org: OrgScope, id: DbId) -> AppResult<Editor> {
    let not_found = CoreError::NotFound {
        entity: "CallSheet",
        id,
    };
    let record = state.store.find_call_sheet(id).await?.ok_or(not_found)?;
    if org.0.is_some_and(|o| o != record.organization_id) {
        return Err(CoreError::NotFound {
            entity: "CallSheet",
            id,
        }
        .into());
    }

    let mut context = OrgContext::for_project(record.project_id);
    if let Some(o) = org.0 {
        context = context.with_organization(o);
    }
    let mut editor = Editor::new(state.store.clone(), context);
    editor.load(id).await?;
    Ok(editor)
}

fn saved(outcome: SaveOutcome) -> AppResult<SaveReceipt> {
    match outcome {
        SaveOutcome::Saved(receipt) => Ok(receipt),
        SaveOutcome::Skipped(SkipReason::MissingOrganization) => {
            Err(AppError::OrganizationRequired)
        }
    }
}

fn selected(editor: &Editor) -> AppResult<CallSheetData> {
    editor
        .selected()
        .cloned()
        .ok_or_else(|| AppError::InternalError("No call sheet selected after save".into()))
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/call-sheets
// ---------------------------------------------------------------------------

/// List a project's call sheets ordered by shoot day.
pub async fn list_call_sheets(
    org: OrgScope,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let editor = Editor::new(state.store.clone(), OrgContext::for_project(project_id));
    let mut sheets = editor.list().await?;
    if let Some(o) = org.0 {
        sheets.retain(|s| s.organization_id == o);
    }
    Ok(Json(DataResponse { data: sheets }))
}

// ---------------------------------------------------------------------------
// POST /projects/{project_id}/call-sheets
// ---------------------------------------------------------------------------

/// Create a call sheet with its children in `DRAFT`.
pub async fn create_call_sheet(
    org: OrgScope,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CallSheetDocument>,
) -> AppResult<impl IntoResponse> {
    let mut context = OrgContext::for_project(project_id);
    if let Some(o) = org.0 {
        context = context.with_organization(o);
    }
    let mut editor = Editor::new(state.store.clone(), context);

    let CallSheetDocument {
        header,
        scenes,
        cast,
        crew,
    } = input;
    let draft = editor.start_new(header);
    draft.scenes = scenes;
    draft.cast = cast;
    draft.crew = crew;

    let receipt = saved(editor.save().await?)?;
    tracing::info!(
        call_sheet_id = receipt.id,
        project_id,
        "Call sheet created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: selected(&editor)?,
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /call-sheets/{id}
// ---------------------------------------------------------------------------

/// Load a call sheet with scenes, cast and crew.
pub async fn get_call_sheet(
    org: OrgScope,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let editor = open(&state, org, id).await?;
    Ok(Json(DataResponse {
        data: selected(&editor)?,
    }))
}

// ---------------------------------------------------------------------------
// PUT /call-sheets/{id}
// ---------------------------------------------------------------------------

/// Replace a call sheet's header and children.
///
/// Saving a `PUBLISHED` sheet moves it to `UPDATED`; `CANCELLED` sheets
/// cannot be edited.
pub async fn save_call_sheet(
    org: OrgScope,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SaveCallSheetRequest>,
) -> AppResult<impl IntoResponse> {
    let mut editor = open(&state, org, id).await?;

    let current = selected(&editor)?.version;
    if input.version != current {
        return Err(CoreError::Conflict(format!(
            "Call sheet {id} is at version {current}, request was based on {}",
            input.version
        ))
        .into());
    }

    editor.begin_edit()?;
    apply_document(editor.draft_mut()?, input.document);
    let receipt = saved(editor.save().await?)?;
    tracing::info!(
        call_sheet_id = receipt.id,
        version = receipt.version,
        "Call sheet updated"
    );

    Ok(Json(DataResponse {
        data: selected(&editor)?,
    }))
}

// ---------------------------------------------------------------------------
// POST /call-sheets/{id}/publish, POST /call-sheets/{id}/cancel
// ---------------------------------------------------------------------------

/// Publish a saved call sheet, stamping `published_at`.
pub async fn publish_call_sheet(
    org: OrgScope,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    org.require()?;
    let mut editor = open(&state, org, id).await?;
    let data = editor.publish().await?.clone();
    Ok(Json(DataResponse { data }))
}

/// Cancel a call sheet. Cancelled sheets accept no further changes.
pub async fn cancel_call_sheet(
    org: OrgScope,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    org.require()?;
    let mut editor = open(&state, org, id).await?;
    let data = editor.cancel_call_sheet().await?.clone();
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /call-sheets/{id}/summary
// ---------------------------------------------------------------------------

/// Page totals, completion and headcounts for a call sheet.
pub async fn get_call_sheet_summary(
    org: OrgScope,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let editor = open(&state, org, id).await?;
    let summary = editor
        .summary()
        .ok_or_else(|| AppError::InternalError("No call sheet selected".into()))?;
    Ok(Json(DataResponse { data: summary }))
}
