//! Schema checks run against the migrated database.
//!
//! Require `DATABASE_URL`; run with `cargo test -p slate-db -- --ignored`.

use sqlx::PgPool;

const TABLES: [&str; 4] = [
    "call_sheets",
    "call_sheet_scenes",
    "call_sheet_cast",
    "call_sheet_crew",
];

/// Every `id` is a bigint and every table carries timestamptz audit columns.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ids_and_timestamps_follow_conventions(pool: PgPool) {
    for table in TABLES {
        for (col, expected) in [
            ("id", "bigint"),
            ("created_at", "timestamp with time zone"),
            ("updated_at", "timestamp with time zone"),
        ] {
            let row: Option<(String,)> = sqlx::query_as(
                "SELECT data_type FROM information_schema.columns \
                 WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
            )
            .bind(table)
            .bind(col)
            .fetch_optional(&pool)
            .await
            .unwrap();

            let (data_type,) = row.unwrap_or_else(|| panic!("Table {table} is missing column {col}"));
            assert_eq!(data_type, expected, "{table}.{col}");
        }
    }
}

/// No character varying columns; TEXT is used throughout.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name FROM information_schema.columns \
         WHERE table_schema = 'public' AND data_type = 'character varying' \
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "Found VARCHAR columns: {rows:?}");
}

/// Each child table indexes its `call_sheet_id` foreign key.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn child_foreign_keys_are_indexed(pool: PgPool) {
    for table in &TABLES[1..] {
        let (has_index,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM pg_indexes \
             WHERE schemaname = 'public' AND tablename = $1 \
               AND indexdef LIKE '%(call_sheet_id)%')",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(has_index, "{table}.call_sheet_id has no index");
    }
}

/// Unknown statuses are rejected by the check constraint.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn status_check_rejects_unknown_values(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO call_sheets (organization_id, project_id, status) VALUES (1, 1, 'ARCHIVED')",
    )
    .execute(&pool)
    .await;

    let err = result.unwrap_err();
    let db_err = err.as_database_error().expect("expected a database error");
    assert_eq!(db_err.code().as_deref(), Some("23514"));
}

/// Deleting a call sheet removes its children.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deleting_call_sheet_cascades(pool: PgPool) {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO call_sheets (organization_id, project_id) VALUES (1, 1) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO call_sheet_scenes (call_sheet_id, scene_number) VALUES ($1, '1')")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM call_sheets WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM call_sheet_scenes WHERE call_sheet_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}
