//! Repository for the `call_sheet_crew` table.

use slate_core::aggregate::CrewRow;
use slate_core::types::DbId;
use sqlx::{PgExecutor, Postgres, Transaction};

use crate::models::call_sheet::CallSheetCrew;

/// Column list for `call_sheet_crew` queries.
const COLUMNS: &str = "\
    id, call_sheet_id, name, role, department, phone, call_time, radio_channel, \
    notes, sort_order, created_at, updated_at";

/// Provides queries for the crew of a call sheet.
pub struct CallSheetCrewRepo;

impl CallSheetCrewRepo {
    pub async fn list_for_call_sheet<'e, E: PgExecutor<'e>>(
        executor: E,
        call_sheet_id: DbId,
    ) -> Result<Vec<CallSheetCrew>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM call_sheet_crew \
             WHERE call_sheet_id = $1 \
             ORDER BY sort_order, id"
        );
        sqlx::query_as::<_, CallSheetCrew>(&query)
            .bind(call_sheet_id)
            .fetch_all(executor)
            .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        row: &CrewRow,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO call_sheet_crew \
                (call_sheet_id, name, role, department, phone, call_time, radio_channel, \
                 notes, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(call_sheet_id)
        .bind(&row.name)
        .bind(&row.role)
        .bind(row.department.as_str())
        .bind(&row.phone)
        .bind(&row.call_time)
        .bind(&row.radio_channel)
        .bind(&row.notes)
        .bind(row.sort_order)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn update(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        id: DbId,
        row: &CrewRow,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_sheet_crew SET \
                name = $3, role = $4, department = $5, phone = $6, call_time = $7, \
                radio_channel = $8, notes = $9, sort_order = $10 \
             WHERE id = $1 AND call_sheet_id = $2",
        )
        .bind(id)
        .bind(call_sheet_id)
        .bind(&row.name)
        .bind(&row.role)
        .bind(row.department.as_str())
        .bind(&row.phone)
        .bind(&row.call_time)
        .bind(&row.radio_channel)
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
            sqlx::query("DELETE FROM call_sheet_crew WHERE id = $1 AND call_sheet_id = $2")
                .bind(id)
                .bind(call_sheet_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
