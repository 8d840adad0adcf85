//! Route definitions for call sheets.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::call_sheets;
use crate::state::AppState;

/// Project-scoped call sheet routes.
///
/// ```text
/// GET    /projects/{project_id}/call-sheets   -> list_call_sheets
/// POST   /projects/{project_id}/call-sheets   -> create_call_sheet
/// ```
pub fn project_router() -> Router<AppState> {
    Router::new().route(
        "/projects/{project_id}/call-sheets",
        get(call_sheets::list_call_sheets).post(call_sheets::create_call_sheet),
    )
}

/// Routes mounted at `/call-sheets`.
///
/// ```text
/// GET    /{id}           -> get_call_sheet
/// PUT    /{id}           -> save_call_sheet
/// POST   /{id}/publish   -> publish_call_sheet
/// POST   /{id}/cancel    -> cancel_call_sheet
/// GET    /{id}/summary   -> get_call_sheet_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(call_sheets::get_call_sheet).put(call_sheets::save_call_sheet),
        )
        .route("/{id}/publish", post(call_sheets::publish_call_sheet))
        .route("/{id}/cancel", post(call_sheets::cancel_call_sheet))
        .route("/{id}/summary", get(call_sheets::get_call_sheet_summary))
}
