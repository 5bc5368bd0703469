mod common;

use axum::http::StatusCode;
use common::{T0, entry_body, rfc3339, spawn_app};
use serde_json::{Value, json};
use ttl_shortener::domain::repositories::EntryRepository;

#[tokio::test]
async fn test_put_fresh_id_is_created() {
    let app = spawn_app();

    let response = app
        .server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 10))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["shortened_url_id"], "validid");
    assert_eq!(body["long_url"], "https://example.com/");
    assert_eq!(body["expiration_timestamp"], rfc3339(T0 + 10));
}

#[tokio::test]
async fn test_identical_put_is_ok_and_unchanged() {
    let app = spawn_app();
    let body = entry_body("https://example.com/", T0 + 10);

    app.server.put("/validid").json(&body).await;
    let response = app.server.put("/validid").json(&body).await;

    response.assert_status(StatusCode::OK);
    let stored = app.repository.find_by_id("validid").await.unwrap().unwrap();
    assert_eq!(stored.expires_at, T0 + 10);
}

#[tokio::test]
async fn test_subsecond_precision_is_truncated() {
    let app = spawn_app();

    app.server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 10))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .put("/validid")
        .json(&json!({
            "url": "https://example.com/",
            "expiration_timestamp": "2025-01-01T00:00:10.750Z",
        }))
        .await;

    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_changed_expiration_conflicts() {
    let app = spawn_app();

    app.server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 10))
        .await;
    let response = app
        .server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 11))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "conflict");

    let stored = app.repository.find_by_id("validid").await.unwrap().unwrap();
    assert_eq!(stored.expires_at, T0 + 10);
}

#[tokio::test]
async fn test_changed_target_conflicts() {
    let app = spawn_app();

    app.server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 10))
        .await;
    let response = app
        .server
        .put("/validid")
        .json(&entry_body("https://example.com/other", T0 + 10))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let stored = app.repository.find_by_id("validid").await.unwrap().unwrap();
    assert_eq!(stored.target, "https://example.com/");
}

#[tokio::test]
async fn test_put_after_expiry_replaces_entry() {
    let app = spawn_app();

    app.server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 10))
        .await;

    app.clock.set(T0 + 10);
    let response = app
        .server
        .put("/validid")
        .json(&entry_body("https://example.com/new-url", T0 + 100))
        .await;

    response.assert_status(StatusCode::CREATED);
    let stored = app.repository.find_by_id("validid").await.unwrap().unwrap();
    assert_eq!(stored.target, "https://example.com/new-url");
    assert_eq!(stored.expires_at, T0 + 100);
}

#[tokio::test]
async fn test_invalid_ids_are_rejected() {
    let app = spawn_app();
    let body = entry_body("https://example.com/", T0 + 10);

    for id in ["short", "seventeen-chars-x", "has_under", "abcdefghijklmnopq"] {
        let response = app.server.put(&format!("/{id}")).json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    assert!(app.repository.is_empty());
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let app = spawn_app();

    let response = app
        .server
        .put("/validid")
        .json(&entry_body("not a url", T0 + 10))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_expiration_must_be_strictly_in_the_future() {
    let app = spawn_app();

    for expires_at in [T0 - 1, T0] {
        let response = app
            .server
            .put("/validid")
            .json(&entry_body("https://example.com/", expires_at))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    app.server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 1))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_expiration_too_far_is_rejected() {
    let app = spawn_app();

    let response = app
        .server
        .put("/validid")
        .json(&entry_body("https://example.com/", T0 + 3651 * 86_400))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_bodies_are_rejected() {
    let app = spawn_app();

    let response = app
        .server
        .put("/validid")
        .json(&json!({ "url": "https://example.com/" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put("/validid")
        .json(&json!({
            "url": "https://example.com/",
            "expiration_timestamp": "tomorrow",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
