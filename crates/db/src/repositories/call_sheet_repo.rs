//! Repository for the `call_sheets` table.

use slate_core::aggregate::CallSheetHeader;
use slate_core::call_sheet::CallSheetStatus;
use slate_core::types::{DbId, Timestamp, Version};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::models::call_sheet::CallSheet;

/// Column list for `call_sheets` queries.
const COLUMNS: &str = "\
    id, organization_id, project_id, \
    production_title, production_company, shoot_day_number, total_shoot_days, \
    shoot_date, crew_call_time, wrap_time, timezone, location_name, location_address, \
    director_name, director_phone, producer_name, producer_phone, \
    first_ad_name, first_ad_phone, production_manager_name, production_manager_phone, \
    weather_summary, sunrise, sunset, temperature_high, temperature_low, \
    general_notes, safety_notes, parking_notes, catering_notes, \
    status, version, published_at, created_at, updated_at";

/// Header columns in the order [`bind_header!`] binds them.
const HEADER_COLUMNS: &str = "\
    production_title, production_company, shoot_day_number, total_shoot_days, \
    shoot_date, crew_call_time, wrap_time, timezone, location_name, location_address, \
    director_name, director_phone, producer_name, producer_phone, \
    first_ad_name, first_ad_phone, production_manager_name, production_manager_phone, \
    weather_summary, sunrise, sunset, temperature_high, temperature_low, \
    general_notes, safety_notes, parking_notes, catering_notes";

/// Number of columns in [`HEADER_COLUMNS`].
const HEADER_COLUMN_COUNT: usize = 27;

/// Bind every header field, in [`HEADER_COLUMNS`] order.
macro_rules! bind_header {
    ($query:expr, $h:expr) => {
        $query
            .bind(&$h.production_title)
            .bind(&$h.production_company)
            .bind($h.shoot_day_number)
            .bind($h.total_shoot_days)
            .bind($h.shoot_date)
            .bind(&$h.crew_call_time)
            .bind(&$h.wrap_time)
            .bind(&$h.timezone)
            .bind(&$h.location_name)
            .bind(&$h.location_address)
            .bind(&$h.director.name)
            .bind(&$h.director.phone)
            .bind(&$h.producer.name)
            .bind(&$h.producer.phone)
            .bind(&$h.first_ad.name)
            .bind(&$h.first_ad.phone)
            .bind(&$h.production_manager.name)
            .bind(&$h.production_manager.phone)
            .bind(&$h.weather_summary)
            .bind(&$h.sunrise)
            .bind(&$h.sunset)
            .bind(&$h.temperature_high)
            .bind(&$h.temperature_low)
            .bind(&$h.general_notes)
            .bind(&$h.safety_notes)
            .bind(&$h.parking_notes)
            .bind(&$h.catering_notes)
    };
}

/// `$first, $first+1, ...` for `count` parameters.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `col = $n, ...` assignments for every header column starting at `$first`.
fn header_assignments(first: usize) -> String {
    HEADER_COLUMNS
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(i, col)| format!("{col} = ${}", first + i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Provides queries for call sheet parent rows.
pub struct CallSheetRepo;

impl CallSheetRepo {
    /// Find a call sheet by ID.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<CallSheet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM call_sheets WHERE id = $1");
        sqlx::query_as::<_, CallSheet>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a call sheet by ID and lock the row for the rest of the transaction.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<CallSheet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM call_sheets WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, CallSheet>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List the call sheets of a project, ordered by shoot day.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<CallSheet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM call_sheets \
             WHERE project_id = $1 \
             ORDER BY shoot_day_number, id"
        );
        sqlx::query_as::<_, CallSheet>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a call sheet at version 1, returning the full row.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        organization_id: DbId,
        project_id: DbId,
        status: CallSheetStatus,
        header: &CallSheetHeader,
    ) -> Result<CallSheet, sqlx::Error> {
        let query = format!(
            "INSERT INTO call_sheets \
                (organization_id, project_id, status, {HEADER_COLUMNS}) \
             VALUES ($1, $2, $3, {}) \
             RETURNING {COLUMNS}",
            placeholders(4, HEADER_COLUMN_COUNT)
        );
        let q = sqlx::query_as::<_, CallSheet>(&query)
            .bind(organization_id)
            .bind(project_id)
            .bind(status.as_str());
        bind_header!(q, header).fetch_one(&mut **tx).await
    }

    /// Overwrite the header and status and bump the version, but only if the
    /// stored version still equals `expected_version`.
    ///
    /// Returns `None` when the row is missing or the version has moved on.
    pub async fn update_if_version(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        expected_version: Version,
        status: CallSheetStatus,
        header: &CallSheetHeader,
    ) -> Result<Option<CallSheet>, sqlx::Error> {
        let n = HEADER_COLUMN_COUNT;
        let query = format!(
            "UPDATE call_sheets SET {}, status = ${}, version = version + 1 \
             WHERE id = ${} AND version = ${} \
             RETURNING {COLUMNS}",
            header_assignments(1),
            n + 1,
            n + 2,
            n + 3
        );
        let q = sqlx::query_as::<_, CallSheet>(&query);
        bind_header!(q, header)
            .bind(status.as_str())
            .bind(id)
            .bind(expected_version)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Set a new lifecycle status under the same version guard.
    ///
    /// `published_at` is only overwritten when a value is given.
    pub async fn set_status_if_version(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        expected_version: Version,
        status: CallSheetStatus,
        published_at: Option<Timestamp>,
    ) -> Result<Option<CallSheet>, sqlx::Error> {
        let query = format!(
            "UPDATE call_sheets \
             SET status = $1, published_at = COALESCE($2, published_at), version = version + 1 \
             WHERE id = $3 AND version = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CallSheet>(&query)
            .bind(status.as_str())
            .bind(published_at)
            .bind(id)
            .bind(expected_version)
            .fetch_optional(&mut **tx)
            .await
    }
}
