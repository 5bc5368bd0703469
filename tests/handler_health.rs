mod common;

use axum::http::StatusCode;
use common::{T0, entry_body, spawn_app};
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_components() {
    let app = spawn_app();
    app.server
        .put("/healthy1")
        .json(&entry_body("https://example.com/", T0 + 5))
        .await;
    app.clock.set(T0 + 5);

    let response = app.server.get("/health").await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["store"]["status"], "ok");
    assert_eq!(body["checks"]["cache"]["status"], "ok");
    assert_eq!(body["checks"]["store"]["message"], "reachable");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
