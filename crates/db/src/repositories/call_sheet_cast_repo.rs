//! Repository for the `call_sheet_cast` table.

use slate_core::aggregate::CastRow;
use slate_core::types::DbId;
use sqlx::{PgExecutor, Postgres, Transaction};

use crate::models::call_sheet::CallSheetCast;

/// Column list for `call_sheet_cast` queries.
const COLUMNS: &str = "\
    id, call_sheet_id, actor_name, character_name, phone, email, makeup_call, \
    wardrobe_call, on_set_call, pickup_location, pickup_time, notes, sort_order, \
    created_at, updated_at";

/// Provides queries for the cast of a call sheet.
pub struct CallSheetCastRepo;

impl CallSheetCastRepo {
    /// List cast members of a call sheet in `sort_order`, ties broken by ID.
    pub async fn list_for_call_sheet<'e, E: PgExecutor<'e>>(
        executor: E,
        call_sheet_id: DbId,
    ) -> Result<Vec<CallSheetCast>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM call_sheet_cast \
             WHERE call_sheet_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, CallSheetCast>(&query)
            .bind(call_sheet_id)
            .fetch_all(executor)
            .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        row: &CastRow,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO call_sheet_cast \
                (call_sheet_id, actor_name, character_name, phone, email, makeup_call, \
                 wardrobe_call, on_set_call, pickup_location, pickup_time, notes, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id",
        )
        .bind(call_sheet_id)
        .bind(&row.actor_name)
        .bind(&row.character_name)
        .bind(&row.phone)
        .bind(&row.email)
        .bind(&row.makeup_call)
        .bind(&row.wardrobe_call)
        .bind(&row.on_set_call)
        .bind(&row.pickup_location)
        .bind(&row.pickup_time)
        .bind(&row.notes)
        .bind(row.sort_order)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        id: DbId,
        row: &CastRow,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_sheet_cast SET \
                actor_name = $3, character_name = $4, phone = $5, email = $6, \
                makeup_call = $7, wardrobe_call = $8, on_set_call = $9, \
                pickup_location = $10, pickup_time = $11, notes = $12, sort_order = $13 \
             WHERE id = $1 AND call_sheet_id = $2",
        )
        .bind(id)
        .bind(call_sheet_id)
        .bind(&row.actor_name)
        .bind(&row.character_name)
        .bind(&row.phone)
        .bind(&row.email)
        .bind(&row.makeup_call)
        .bind(&row.wardrobe_call)
        .bind(&row.on_set_call)
        .bind(&row.pickup_location)
        .bind(&row.pickup_time)
        .bind(&row.notes)
        .bind(row.sort_order)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM call_sheet_cast WHERE id = $1 AND call_sheet_id = $2")
                .bind(id)
                .bind(call_sheet_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
