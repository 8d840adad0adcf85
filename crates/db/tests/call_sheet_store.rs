//! Integration tests for `PgCallSheetStore`.
//!
//! These need a PostgreSQL server reachable through `DATABASE_URL`; run with
//! `cargo test -p slate-db -- --ignored`.

use std::sync::Arc;

use assert_matches::assert_matches;
use slate_core::aggregate::{CallSheetHeader, ScenePatch};
use slate_core::call_sheet::{CallSheetStatus, Department};
use slate_core::context::OrgContext;
use slate_core::editor::{CallSheetEditor, SaveOutcome};
use slate_core::error::CoreError;
use slate_core::row_key::RowKey;
use slate_core::store::{CallSheetStore, StatusChange};
use slate_db::PgCallSheetStore;
use sqlx::PgPool;

const ORG: i64 = 3;
const PROJECT: i64 = 11;

fn editor(store: &Arc<PgCallSheetStore>) -> CallSheetEditor<PgCallSheetStore> {
    CallSheetEditor::new(
        Arc::clone(store),
        OrgContext::for_project(PROJECT).with_organization(ORG),
    )
}

fn header(day: i32) -> CallSheetHeader {
    CallSheetHeader {
        production_title: "Harbor Lights".to_string(),
        shoot_day_number: day,
        ..Default::default()
    }
}

async fn create_with_scenes(store: &Arc<PgCallSheetStore>, numbers: &[&str]) -> i64 {
    let mut ed = editor(store);
    let data = ed.start_new(header(1));
    for n in numbers {
        let i = data.add_scene();
        data.update_scene(
            i,
            ScenePatch {
                scene_number: Some(n.to_string()),
                page_count: Some(0.5),
                ..Default::default()
            },
        )
        .unwrap();
    }
    let i = data.add_crew();
    data.crew[i].name = "Rosa".into();
    data.crew[i].department = Department::Camera;

    match ed.save().await.unwrap() {
        SaveOutcome::Saved(receipt) => receipt.id,
        other => panic!("expected a save, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_persists_header_and_children(pool: PgPool) {
    let store = Arc::new(PgCallSheetStore::new(pool));
    let id = create_with_scenes(&store, &["1A", "1B"]).await;

    let snapshot = store.load_snapshot(id).await.unwrap().unwrap();
    assert_eq!(snapshot.record.version, 1);
    assert_eq!(snapshot.record.status, CallSheetStatus::Draft);
    assert_eq!(snapshot.record.organization_id, ORG);
    assert_eq!(snapshot.record.header.production_title, "Harbor Lights");
    assert_eq!(snapshot.scenes.len(), 2);
    assert_eq!(snapshot.scenes[0].scene_number, "1A");
    assert_eq!(snapshot.scenes[1].sort_order, 1);
    assert_matches!(snapshot.scenes[0].key, RowKey::Persisted(_));
    assert_eq!(snapshot.crew[0].department, Department::Camera);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unchanged_rows_keep_their_ids(pool: PgPool) {
    let store = Arc::new(PgCallSheetStore::new(pool));
    let id = create_with_scenes(&store, &["1", "2", "3"]).await;

    let mut ed = editor(&store);
    ed.load(id).await.unwrap();
    let before: Vec<_> = ed.selected().unwrap().scenes.iter().map(|s| s.key).collect();

    ed.begin_edit().unwrap();
    ed.draft_mut()
        .unwrap()
        .update_scene(1, ScenePatch {
            heading: Some("EXT. PIER - DAWN".into()),
            ..Default::default()
        })
        .unwrap();
    ed.save().await.unwrap();

    let after: Vec<_> = ed.selected().unwrap().scenes.iter().map(|s| s.key).collect();
    assert_eq!(before, after);
    assert_eq!(ed.selected().unwrap().version, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn stale_editor_gets_conflict_and_nothing_changes(pool: PgPool) {
    let store = Arc::new(PgCallSheetStore::new(pool));
    let id = create_with_scenes(&store, &["1"]).await;

    let mut first = editor(&store);
    let mut second = editor(&store);
    first.load(id).await.unwrap();
    second.load(id).await.unwrap();

    first.begin_edit().unwrap();
    first.draft_mut().unwrap().remove_scene(0).unwrap();
    first.save().await.unwrap();

    second.begin_edit().unwrap();
    second.draft_mut().unwrap().add_scene();
    let result = second.save().await;

    assert_matches!(result, Err(CoreError::Conflict(_)));
    let scenes = store.list_scenes(id).await.unwrap();
    assert!(scenes.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn check_violation_rolls_back_whole_save(pool: PgPool) {
    let store = Arc::new(PgCallSheetStore::new(pool));
    let id = create_with_scenes(&store, &["1"]).await;

    let mut ed = editor(&store);
    ed.load(id).await.unwrap();
    ed.begin_edit().unwrap();
    let draft = ed.draft_mut().unwrap();
    draft.remove_scene(0).unwrap();
    draft.header.shoot_day_number = 0;

    assert_matches!(ed.save().await, Err(CoreError::Validation(_)));
    assert_eq!(store.list_scenes(id).await.unwrap().len(), 1);
    let record = store.find_call_sheet(id).await.unwrap().unwrap();
    assert_eq!(record.version, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn publish_then_invalid_republish(pool: PgPool) {
    let store = Arc::new(PgCallSheetStore::new(pool));
    let id = create_with_scenes(&store, &[]).await;
    let now = chrono::Utc::now();

    let published = store
        .transition_status(StatusChange {
            id,
            expected_version: 1,
            to: CallSheetStatus::Published,
            at: now,
        })
        .await
        .unwrap();
    assert_eq!(published.status, CallSheetStatus::Published);
    assert_eq!(published.version, 2);
    assert!(published.published_at.is_some());

    let again = store
        .transition_status(StatusChange {
            id,
            expected_version: 2,
            to: CallSheetStatus::Published,
            at: now,
        })
        .await;
    assert_matches!(again, Err(CoreError::InvalidTransition { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_orders_by_shoot_day(pool: PgPool) {
    let store = Arc::new(PgCallSheetStore::new(pool));
    for day in [3, 1, 2] {
        let mut ed = editor(&store);
        ed.start_new(header(day));
        ed.save().await.unwrap();
    }

    let days: Vec<_> = store
        .list_call_sheets(PROJECT)
        .await
        .unwrap()
        .iter()
        .map(|r| r.header.shoot_day_number)
        .collect();
    assert_eq!(days, [1, 2, 3]);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn missing_sheet_loads_as_none(pool: PgPool) {
    let store = PgCallSheetStore::new(pool);
    assert!(store.load_snapshot(999_999).await.unwrap().is_none());
    store.ping().await.unwrap();
}
