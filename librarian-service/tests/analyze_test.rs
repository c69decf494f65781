mod common;

use reqwest::multipart;

fn analyze_form(mode: &str, text: &str, stream: bool) -> multipart::Form {
    multipart::Form::new()
        .text("mode", mode.to_string())
        .text("text", text.to_string())
        .text("stream", if stream { "true" } else { "false" })
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn buffered_analyze_returns_result_json() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .multipart(analyze_form("coder", "dedupe 650 fields", false))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["mode"], "coder");
    assert!(body["result"]
        .as_str()
        .unwrap()
        .contains("dedupe 650 fields"));
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn streaming_analyze_emits_chunk_frames() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .multipart(analyze_form("translator", "Kokoro by Natsume Soseki", true))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = response.text().await.unwrap();
    let chunks: Vec<&str> = body
        .lines()
        .filter(|l| l.starts_with("data:"))
        .collect();
    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|l| l.contains("\"chunk\"")));
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn analyze_requires_a_mode() {
    let app = common::spawn_app().await;

    let form = multipart::Form::new().text("text", "no mode given");
    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn analyze_rejects_unknown_mode() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .multipart(analyze_form("poet", "haiku please", false))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn analyze_rejects_oversized_text() {
    let app = common::spawn_app().await;

    let long_text = "x".repeat(1001);
    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .multipart(analyze_form("coder", &long_text, false))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn analyze_rejects_unsupported_image_type() {
    let app = common::spawn_app().await;

    let form = multipart::Form::new().text("mode", "translator").part(
        "image",
        multipart::Part::bytes(vec![0u8; 16])
            .file_name("scan.tiff")
            .mime_str("image/tiff")
            .unwrap(),
    );

    let response = app
        .client
        .post(format!("{}/analyze", app.address))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
