//! [`CallSheetStore`] backed by PostgreSQL.
//!
//! A save runs in a single transaction: the parent row is created or updated
//! under a version guard, then each child collection applies its deletes,
//! updates and inserts. Any failure rolls the whole save back.

use async_trait::async_trait;
use slate_core::aggregate::{CallSheetRecord, CastRow, ChildRow, CrewRow, SceneRow};
use slate_core::call_sheet::CallSheetStatus;
use slate_core::diff::ChildChanges;
use slate_core::error::CoreError;
use slate_core::store::{
    CallSheetSnapshot, CallSheetStore, SavePlan, SaveReceipt, SaveTarget, StatusChange,
};
use slate_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::repositories::{CallSheetCastRepo, CallSheetCrewRepo, CallSheetRepo, CallSheetSceneRepo};

/// Map a sqlx error onto the domain error type.
///
/// Check and not-null violations are caller mistakes and become
/// `Validation`; serialization failures become `Conflict`. Everything else
/// is a `Storage` error.
pub fn db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            // check_violation, not_null_violation
            Some("23514") | Some("23502") => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return CoreError::Validation(format!(
                    "{} (constraint: {constraint})",
                    db_err.message()
                ));
            }
            // serialization_failure
            Some("40001") => {
                return CoreError::Conflict(
                    "Concurrent modification detected, reload and retry".to_string(),
                );
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}

fn version_conflict(id: DbId, expected: i32, actual: i32) -> CoreError {
    CoreError::Conflict(format!(
        "Call sheet {id} is at version {actual}, expected {expected}"
    ))
}

fn not_owned<R: ChildRow>(call_sheet_id: DbId, id: DbId) -> CoreError {
    CoreError::Conflict(format!(
        "{} row {id} does not belong to call sheet {call_sheet_id}",
        R::COLLECTION
    ))
}

// ---------------------------------------------------------------------------
// Child collection writes
// ---------------------------------------------------------------------------

/// Transactional writes shared by the three child repositories.
#[async_trait]
trait ChildRepo {
    type Row: ChildRow + Send + Sync;

    async fn insert_row(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        row: &Self::Row,
    ) -> Result<DbId, sqlx::Error>;

    async fn update_row(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        id: DbId,
        row: &Self::Row,
    ) -> Result<bool, sqlx::Error>;

    async fn delete_row(
        tx: &mut Transaction<'_, Postgres>,
        call_sheet_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error>;
}

macro_rules! impl_child_repo {
    ($repo:ty, $row:ty) => {
        #[async_trait]
        impl ChildRepo for $repo {
            type Row = $row;

            async fn insert_row(
                tx: &mut Transaction<'_, Postgres>,
                call_sheet_id: DbId,
                row: &$row,
            ) -> Result<DbId, sqlx::Error> {
                <$repo>::insert(tx, call_sheet_id, row).await
            }

            async fn update_row(
                tx: &mut Transaction<'_, Postgres>,
                call_sheet_id: DbId,
                id: DbId,
                row: &$row,
            ) -> Result<bool, sqlx::Error> {
                <$repo>::update(tx, call_sheet_id, id, row).await
            }

            async fn delete_row(
                tx: &mut Transaction<'_, Postgres>,
                call_sheet_id: DbId,
                id: DbId,
            ) -> Result<bool, sqlx::Error> {
                <$repo>::delete(tx, call_sheet_id, id).await
            }
        }
    };
}

impl_child_repo!(CallSheetSceneRepo, SceneRow);
impl_child_repo!(CallSheetCastRepo, CastRow);
impl_child_repo!(CallSheetCrewRepo, CrewRow);

/// Apply one collection's deletes, then updates, then inserts.
///
/// A delete or update that matches no row under `call_sheet_id` aborts the
/// save with `Conflict`.
async fn apply_children<R: ChildRepo>(
    tx: &mut Transaction<'_, Postgres>,
    call_sheet_id: DbId,
    changes: &ChildChanges<R::Row>,
) -> Result<(), CoreError> {
    for &id in &changes.deletes {
        if !R::delete_row(tx, call_sheet_id, id).await.map_err(db_error)? {
            return Err(not_owned::<R::Row>(call_sheet_id, id));
        }
    }

    for row in &changes.updates {
        let id = row.key().persisted_id().ok_or_else(|| {
            CoreError::Internal(format!(
                "{} update without a persisted key",
                <R::Row as ChildRow>::COLLECTION
            ))
        })?;
        if !R::update_row(tx, call_sheet_id, id, row)
            .await
            .map_err(db_error)?
        {
            return Err(not_owned::<R::Row>(call_sheet_id, id));
        }
    }

    for row in &changes.inserts {
        R::insert_row(tx, call_sheet_id, row)
            .await
            .map_err(db_error)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// PostgreSQL call sheet store.
#[derive(Clone)]
pub struct PgCallSheetStore {
    pool: PgPool,
}

impl PgCallSheetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CallSheetStore for PgCallSheetStore {
    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(db_error)
    }

    async fn find_call_sheet(&self, id: DbId) -> Result<Option<CallSheetRecord>, CoreError> {
        CallSheetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error)?
            .map(|row| row.into_record())
            .transpose()
    }

    async fn list_call_sheets(&self, project_id: DbId) -> Result<Vec<CallSheetRecord>, CoreError> {
        CallSheetRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|row| row.into_record())
            .collect()
    }

    async fn list_scenes(&self, call_sheet_id: DbId) -> Result<Vec<SceneRow>, CoreError> {
        CallSheetSceneRepo::list_for_call_sheet(&self.pool, call_sheet_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|row| row.into_row())
            .collect()
    }

    async fn list_cast(&self, call_sheet_id: DbId) -> Result<Vec<CastRow>, CoreError> {
        let rows = CallSheetCastRepo::list_for_call_sheet(&self.pool, call_sheet_id)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(CastRow::from).collect())
    }

    async fn list_crew(&self, call_sheet_id: DbId) -> Result<Vec<CrewRow>, CoreError> {
        CallSheetCrewRepo::list_for_call_sheet(&self.pool, call_sheet_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|row| row.into_row())
            .collect()
    }

    async fn load_snapshot(&self, id: DbId) -> Result<Option<CallSheetSnapshot>, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let Some(row) = CallSheetRepo::find_by_id(&mut *tx, id)
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };
        let scenes = CallSheetSceneRepo::list_for_call_sheet(&mut *tx, id)
            .await
            .map_err(db_error)?;
        let cast = CallSheetCastRepo::list_for_call_sheet(&mut *tx, id)
            .await
            .map_err(db_error)?;
        let crew = CallSheetCrewRepo::list_for_call_sheet(&mut *tx, id)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;

        Ok(Some(CallSheetSnapshot {
            record: row.into_record()?,
            scenes: scenes
                .into_iter()
                .map(|r| r.into_row())
                .collect::<Result<_, _>>()?,
            cast: cast.into_iter().map(CastRow::from).collect(),
            crew: crew
                .into_iter()
                .map(|r| r.into_row())
                .collect::<Result<_, _>>()?,
        }))
    }

    async fn apply_save(&self, plan: SavePlan) -> Result<SaveReceipt, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let saved = match plan.target {
            SaveTarget::Create {
                organization_id,
                project_id,
            } => CallSheetRepo::create(
                &mut tx,
                organization_id,
                project_id,
                plan.status,
                &plan.header,
            )
            .await
            .map_err(db_error)?,
            SaveTarget::Update {
                id,
                expected_version,
            } => {
                let updated = CallSheetRepo::update_if_version(
                    &mut tx,
                    id,
                    expected_version,
                    plan.status,
                    &plan.header,
                )
                .await
                .map_err(db_error)?;
                match updated {
                    Some(row) => row,
                    None => {
                        let current = CallSheetRepo::find_by_id(&mut *tx, id)
                            .await
                            .map_err(db_error)?;
                        return Err(match current {
                            Some(row) => version_conflict(id, expected_version, row.version),
                            None => CoreError::NotFound {
                                entity: "CallSheet",
                                id,
                            },
                        });
                    }
                }
            }
        };

        apply_children::<CallSheetSceneRepo>(&mut tx, saved.id, &plan.scenes).await?;
        apply_children::<CallSheetCastRepo>(&mut tx, saved.id, &plan.cast).await?;
        apply_children::<CallSheetCrewRepo>(&mut tx, saved.id, &plan.crew).await?;

        tx.commit().await.map_err(db_error)?;
        tracing::debug!(
            call_sheet_id = saved.id,
            version = saved.version,
            child_writes = plan.child_write_count(),
            "Call sheet save committed"
        );

        Ok(SaveReceipt {
            id: saved.id,
            version: saved.version,
        })
    }

    async fn transition_status(&self, change: StatusChange) -> Result<CallSheetRecord, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let current = CallSheetRepo::find_for_update(&mut tx, change.id)
            .await
            .map_err(db_error)?
            .ok_or(CoreError::NotFound {
                entity: "CallSheet",
                id: change.id,
            })?;
        if current.version != change.expected_version {
            return Err(version_conflict(
                change.id,
                change.expected_version,
                current.version,
            ));
        }
        CallSheetStatus::from_str_db(&current.status)?.validate_transition(change.to)?;

        let published_at = (change.to == CallSheetStatus::Published).then_some(change.at);
        let updated = CallSheetRepo::set_status_if_version(
            &mut tx,
            change.id,
            change.expected_version,
            change.to,
            published_at,
        )
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            version_conflict(change.id, change.expected_version, current.version + 1)
        })?;

        tx.commit().await.map_err(db_error)?;
        updated.into_record()
    }
}
