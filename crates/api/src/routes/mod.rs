pub mod call_sheets;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
///
/// ```text
/// /projects/{project_id}/call-sheets   project-scoped list and create
/// /call-sheets                         single call sheet operations
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(call_sheets::project_router())
        .nest("/call-sheets", call_sheets::router())
}
