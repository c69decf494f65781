mod common;

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn health_check_reports_ok() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "librarian-service");
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn readiness_check_reports_ok() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn metrics_endpoint_serves_prometheus_text() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}
