mod common;

use serde_json::Value;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn health_check_reports_ok() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fees-service");
}

#[tokio::test]
#[serial]
async fn metrics_endpoint_exposes_prometheus_text() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    // A listing query populates the DB duration histogram.
    let response = app.get("/fees/payments", "ADMIN").await;
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(app.url("/metrics"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("fees_db_query_duration_seconds"));
}
