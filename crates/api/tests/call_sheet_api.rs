//! Integration tests for the `/api/v1` call sheet endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, get, post_json, put_json, send, ORG, PROJECT};
use serde_json::{json, Value};
use slate_core::memory_store::{ChildCollection, FaultPoint};

fn collection_uri() -> String {
    format!("/api/v1/projects/{PROJECT}/call-sheets")
}

fn sheet_uri(id: &Value) -> String {
    format!("/api/v1/call-sheets/{id}")
}

fn new_sheet(day: i32) -> Value {
    json!({
        "production_title": "Harbor Lights",
        "shoot_day_number": day,
        "director": { "name": "June Park", "phone": "555-0100" },
        "scenes": [
            { "scene_number": "1A", "page_count": 1.125, "estimated_minutes": 40 },
            { "scene_number": "1B", "page_count": 0.25 }
        ],
        "cast": [
            { "actor_name": "Ada Lane", "character_name": "Mara" }
        ],
        "crew": [
            { "name": "Rosa", "department": "CAMERA" },
            { "name": "Ken", "department": "SOUND" }
        ]
    })
}

/// Create a call sheet and return the `data` payload.
async fn create(app: axum::Router, body: Value) -> Value {
    let response = post_json(app, &collection_uri(), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn scene_numbers(data: &Value) -> Vec<String> {
    data["scenes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["scene_number"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Create / load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_persisted_aggregate() {
    let (app, _) = build_test_app();
    let data = create(app, new_sheet(1)).await;

    assert!(data["id"].is_i64());
    assert_eq!(data["organization_id"], ORG);
    assert_eq!(data["project_id"], PROJECT);
    assert_eq!(data["status"], "DRAFT");
    assert_eq!(data["version"], 1);
    assert_eq!(data["production_title"], "Harbor Lights");
    assert_eq!(data["director"]["name"], "June Park");
    assert_eq!(scene_numbers(&data), ["1A", "1B"]);
    assert!(data["scenes"][0]["key"]["persisted"].is_i64());
    assert_eq!(data["scenes"][1]["sort_order"], 1);
    assert_eq!(data["crew"][1]["department"], "SOUND");
}

#[tokio::test]
async fn get_returns_same_aggregate_as_create() {
    let (app, _) = build_test_app();
    let created = create(app.clone(), new_sheet(1)).await;

    let response = get(app, &sheet_uri(&created["id"])).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], created);
}

#[tokio::test]
async fn create_without_organization_is_rejected_without_store_calls() {
    let (app, store) = build_test_app();

    let response = send(app, Method::POST, &collection_uri(), None, Some(new_sheet(1))).await;

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(body_json(response).await["code"], "ORGANIZATION_REQUIRED");
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn malformed_organization_header_is_bad_request() {
    let (app, _) = build_test_app();
    let request = axum::http::Request::builder()
        .method(Method::GET)
        .uri(collection_uri())
        .header("x-organization-id", "acme")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn create_with_unknown_persisted_key_is_conflict() {
    let (app, _) = build_test_app();
    let body = json!({
        "production_title": "Harbor Lights",
        "scenes": [ { "key": { "persisted": 999 }, "scene_number": "9" } ]
    });

    let response = post_json(app, &collection_uri(), body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn missing_call_sheet_is_404() {
    let (app, _) = build_test_app();
    let response = get(app, "/api/v1/call-sheets/12345").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "CallSheet with id 12345 not found");
}

#[tokio::test]
async fn other_organizations_call_sheet_is_hidden() {
    let (app, _) = build_test_app();
    let created = create(app.clone(), new_sheet(1)).await;

    let response = send(
        app,
        Method::GET,
        &sheet_uri(&created["id"]),
        Some(ORG + 1),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_ordered_by_shoot_day() {
    let (app, _) = build_test_app();
    create(app.clone(), new_sheet(3)).await;
    create(app.clone(), new_sheet(1)).await;
    create(app.clone(), new_sheet(2)).await;

    let response = get(app, &collection_uri()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let days: Vec<i64> = body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["shoot_day_number"].as_i64().unwrap())
        .collect();
    assert_eq!(days, [1, 2, 3]);
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_applies_edits_and_bumps_version() {
    let (app, _) = build_test_app();
    let mut doc = create(app.clone(), new_sheet(1)).await;
    let kept_key = doc["scenes"][1]["key"].clone();

    // Drop 1A, rename 1B, append 2.
    let mut scenes = doc["scenes"].as_array().unwrap().clone();
    scenes.remove(0);
    scenes[0]["heading"] = json!("EXT. PIER - DAWN");
    scenes.push(json!({ "scene_number": "2" }));
    doc["scenes"] = Value::Array(scenes);
    doc["production_title"] = json!("Harbor Lights (rev)");

    let response = put_json(app, &sheet_uri(&doc["id"]), doc).await;

    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await["data"].clone();
    assert_eq!(saved["version"], 2);
    assert_eq!(saved["production_title"], "Harbor Lights (rev)");
    assert_eq!(scene_numbers(&saved), ["1B", "2"]);
    assert_eq!(saved["scenes"][0]["key"], kept_key);
    assert_eq!(saved["scenes"][0]["sort_order"], 0);
    assert_eq!(saved["scenes"][0]["heading"], "EXT. PIER - DAWN");
    assert!(saved["scenes"][1]["key"]["persisted"].is_i64());
}

#[tokio::test]
async fn stale_version_is_conflict() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;
    let uri = sheet_uri(&doc["id"]);

    let first = put_json(app.clone(), &uri, doc.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    // Still claims version 1.
    let second = put_json(app, &uri, doc).await;

    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "CONFLICT");
}

#[tokio::test]
async fn save_without_version_is_rejected() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;

    let response = put_json(
        app,
        &sheet_uri(&doc["id"]),
        json!({ "production_title": "No version" }),
    )
    .await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn save_without_organization_is_412() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;

    let response = send(app, Method::PUT, &sheet_uri(&doc["id"]), None, Some(doc)).await;

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(body_json(response).await["code"], "ORGANIZATION_REQUIRED");
}

#[tokio::test]
async fn failed_save_leaves_stored_sheet_untouched() {
    let (app, store) = build_test_app();
    let mut doc = create(app.clone(), new_sheet(1)).await;
    let uri = sheet_uri(&doc["id"]);
    let before = body_json(get(app.clone(), &uri).await).await["data"].clone();

    doc["cast"] = json!([]);
    doc["scenes"] = json!([{ "scene_number": "5" }]);
    store
        .inject_fault(FaultPoint::AfterInserts(ChildCollection::Scenes))
        .await;

    let response = put_json(app.clone(), &uri, doc).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "INTERNAL_ERROR");

    store.clear_fault().await;
    let after = body_json(get(app, &uri).await).await["data"].clone();
    assert_eq!(after, before);
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_stamps_published_at() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;

    let response = post_json(
        app,
        &format!("{}/publish", sheet_uri(&doc["id"])),
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "PUBLISHED");
    assert_eq!(data["version"], 2);
    assert!(data["published_at"].is_string());
}

#[tokio::test]
async fn publishing_twice_is_invalid_transition() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;
    let uri = format!("{}/publish", sheet_uri(&doc["id"]));

    post_json(app.clone(), &uri, json!({})).await;
    let response = post_json(app, &uri, json!({})).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn editing_published_sheet_marks_it_updated() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;
    let uri = sheet_uri(&doc["id"]);
    let published = body_json(post_json(app.clone(), &format!("{uri}/publish"), json!({})).await)
        .await["data"]
        .clone();

    let response = put_json(app.clone(), &uri, published).await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "UPDATED");
    assert_eq!(data["version"], 3);

    let republished = post_json(app, &format!("{uri}/publish"), json!({})).await;
    assert_eq!(republished.status(), StatusCode::OK);
}

#[tokio::test]
async fn cancelled_sheet_cannot_be_edited() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;
    let uri = sheet_uri(&doc["id"]);

    let cancelled = post_json(app.clone(), &format!("{uri}/cancel"), json!({})).await;
    assert_eq!(cancelled.status(), StatusCode::OK);
    let cancelled = body_json(cancelled).await["data"].clone();
    assert_eq!(cancelled["status"], "CANCELLED");

    let response = put_json(app, &uri, cancelled).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn publish_without_organization_is_412() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;

    let response = send(
        app,
        Method::POST,
        &format!("{}/publish", sheet_uri(&doc["id"])),
        None,
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summary_reports_pages_and_headcounts() {
    let (app, _) = build_test_app();
    let doc = create(app.clone(), new_sheet(1)).await;

    let response = get(app, &format!("{}/summary", sheet_uri(&doc["id"]))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await["data"].clone();
    assert_eq!(summary["scene_count"], 2);
    assert_eq!(summary["total_pages_display"], "1 3/8");
    assert_eq!(summary["estimated_minutes"], 40);
    assert_eq!(summary["scenes_by_status"]["SCHEDULED"], 2);
    assert_eq!(summary["cast_count"], 1);
    assert_eq!(summary["crew_by_department"]["CAMERA"], 1);
}
