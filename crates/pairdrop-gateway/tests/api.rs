// SPDX-FileCopyrightText: 2026 Pairdrop Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end HTTP API tests driven through the router without a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use pairdrop_allocator::{Allocator, AllocatorSettings};
use pairdrop_gateway::{GatewayState, router};
use pairdrop_storage::PairStore;

async fn test_app(daily_cap: u32) -> (Router, Arc<PairStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        PairStore::open(dir.path().join("api.db").to_str().unwrap())
            .await
            .unwrap(),
    );
    let settings = AllocatorSettings {
        daily_cap,
        ..AllocatorSettings::default()
    };
    let allocator = Arc::new(Allocator::with_seed(store.clone(), settings, 7));
    let app = router(GatewayState {
        store: store.clone(),
        allocator,
    });
    (app, store, dir)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _store, _dir) = test_app(1).await;
    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn owner_and_pair_crud_flow() {
    let (app, _store, _dir) = test_app(1).await;

    let (status, owner) = send_json(
        &app,
        "POST",
        "/v1/owners",
        Some(json!({"display_name": "Ada", "contact_handle": "+234 801 234 5678"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // Handle is normalized to digits on the way in.
    assert_eq!(owner["contact_handle"], "2348012345678");
    let owner_id = owner["id"].as_str().unwrap().to_string();

    let (status, pair) = send_json(
        &app,
        "POST",
        &format!("/v1/owners/{owner_id}/pairs"),
        Some(json!({"resource_link": "https://example.com/p/1", "message": "lovely"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pair_id = pair["id"].as_str().unwrap().to_string();

    let (status, listed) = send_json(&app, "GET", &format!("/v1/owners/{owner_id}/pairs"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send_json(&app, "DELETE", &format!("/v1/pairs/{pair_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, listed) = send_json(&app, "GET", &format!("/v1/owners/{owner_id}/pairs"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_owner_and_pair_are_404() {
    let (app, _store, _dir) = test_app(1).await;

    let (status, body) = send_json(&app, "GET", "/v1/owners/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send_json(&app, "DELETE", "/v1/pairs/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        "POST",
        "/v1/claims/missing",
        Some(json!({"device_id": "dev_x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn claim_flow_with_replay_cap_and_audit() {
    let (app, _store, _dir) = test_app(1).await;

    let (_, owner) = send_json(
        &app,
        "POST",
        "/v1/owners",
        Some(json!({"display_name": "Ada", "contact_handle": "2348012345678"})),
    )
    .await;
    let owner_id = owner["id"].as_str().unwrap().to_string();
    for n in 0..2 {
        send_json(
            &app,
            "POST",
            &format!("/v1/owners/{owner_id}/pairs"),
            Some(json!({
                "resource_link": format!("https://example.com/p/{n}"),
                "message": "great stuff"
            })),
        )
        .await;
    }

    // Before claiming, status shows nothing held.
    let (status, held) = send_json(
        &app,
        "GET",
        &format!("/v1/claims/{owner_id}?device=dev_one"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(held["pair"].is_null());

    let (status, view) = send_json(
        &app,
        "POST",
        &format!("/v1/claims/{owner_id}"),
        Some(json!({"device_id": "dev_one"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["owner_contact_handle"], "2348012345678");

    // Same-day replay returns the identical pair.
    let (status, replay) = send_json(
        &app,
        "POST",
        &format!("/v1/claims/{owner_id}"),
        Some(json!({"device_id": "dev_one"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay, view);

    // Status lookup agrees.
    let (_, held) = send_json(
        &app,
        "GET",
        &format!("/v1/claims/{owner_id}?device=dev_one"),
        None,
    )
    .await;
    assert_eq!(held["pair"], view);

    // A second device hits the daily cap.
    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/v1/claims/{owner_id}"),
        Some(json!({"device_id": "dev_two"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "daily_cap_reached");

    // Exactly one audit entry was written.
    let (status, claims) = send_json(&app, "GET", &format!("/v1/owners/{owner_id}/claims"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(claims.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_catalog_claims_conflict() {
    let (app, _store, _dir) = test_app(5).await;

    let (_, owner) = send_json(
        &app,
        "POST",
        "/v1/owners",
        Some(json!({"display_name": "Ada", "contact_handle": "2348012345678"})),
    )
    .await;
    let owner_id = owner["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/v1/claims/{owner_id}"),
        Some(json!({"device_id": "dev_one"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "no_pairs_available");
}

#[tokio::test]
async fn contact_update_applies_to_future_views() {
    let (app, _store, _dir) = test_app(5).await;

    let (_, owner) = send_json(
        &app,
        "POST",
        "/v1/owners",
        Some(json!({"display_name": "Ada", "contact_handle": "2348012345678"})),
    )
    .await;
    let owner_id = owner["id"].as_str().unwrap().to_string();
    send_json(
        &app,
        "POST",
        &format!("/v1/owners/{owner_id}/pairs"),
        Some(json!({"resource_link": "https://example.com/p/1", "message": "m"})),
    )
    .await;

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/v1/owners/{owner_id}/contact"),
        Some(json!({"contact_handle": "+234 900 000 0000"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, view) = send_json(
        &app,
        "POST",
        &format!("/v1/claims/{owner_id}"),
        Some(json!({"device_id": "dev_one"})),
    )
    .await;
    assert_eq!(view["owner_contact_handle"], "2349000000000");
}
