//! Repository for the `call_sheet_scenes` table.

use slate_core::aggregate::SceneRow;
use slate_core::types::DbId;
use sqlx::{PgExecutor, Postgres, Transaction};

use crate::models::call_sheet::CallSheetScene;

/// Column list for `call_sheet_scenes` queries.
const COLUMNS: &str = "\
    id, call_sheet_id, scene_number, heading, description, location, page_count, \
    estimated_minutes, scheduled_time, status, notes, sort_order, created_at, updated_at";

/// Provides queries for the scenes of a call sheet.
pub struct CallSheetSceneRepo;

impl CallSheetSceneRepo {
    /// List scenes of a call sheet in `sort_order`, ties broken by ID.
    pub async fn list_for_call_sheet<'e, E: PgExecutor<'e>>(
        executor: E,
        call_sheet_id: DbId,
    ) -> Result<Vec<CallSheetScene>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM call_sheet_scenes \
             WHERE call_sheet_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, CallSheetScene>(&query)
            .bind(call_sheet_id)
            .fetch_all(executor)
            .await
    }

    /// Insert a scene, returning its new ID.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        row: &SceneRow,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO call_sheet_scenes \
                (call_sheet_id, scene_number, heading, description, location, page_count, \
                 estimated_minutes, scheduled_time, status, notes, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING id",
        )
        .bind(call_sheet_id)
        .bind(&row.scene_number)
        .bind(&row.heading)
        .bind(&row.description)
        .bind(&row.location)
        .bind(row.page_count)
        .bind(row.estimated_minutes)
        .bind(&row.scheduled_time)
        .bind(row.status.as_str())
        .bind(&row.notes)
        .bind(row.sort_order)
        .fetch_one(&mut **tx)
        .await
    }

    /// Overwrite a scene owned by `call_sheet_id`. Returns `false` if no such
    /// row exists under that call sheet.
    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        id: DbId,
        row: &SceneRow,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_sheet_scenes SET \
                scene_number = $3, heading = $4, description = $5, location = $6, \
                page_count = $7, estimated_minutes = $8, scheduled_time = $9, \
                status = $10, notes = $11, sort_order = $12 \
             WHERE id = $1 AND call_sheet_id = $2",
        )
        .bind(id)
        .bind(call_sheet_id)
        .bind(&row.scene_number)
        .bind(&row.heading)
        .bind(&row.description)
        .bind(&row.location)
        .bind(row.page_count)
        .bind(row.estimated_minutes)
        .bind(&row.scheduled_time)
        .bind(row.status.as_str())
        .bind(&row.notes)
        .bind(row.sort_order)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a scene owned by `call_sheet_id`. Returns `false` if not found.
    pub async fn delete(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM call_sheet_scenes WHERE id = $1 AND call_sheet_id = $2")
                .bind(id)
                .bind(call_sheet_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
