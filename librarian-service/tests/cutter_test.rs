//! Cutter endpoint tests. The handler is stateless, so these run against
//! the extractor directly without spinning up the full application.

use axum::Json;
use librarian_service::dtos::CutterRequest;
use librarian_service::handlers::cutter::make_cutter;

async fn cutter_for(text: &str, digits: Option<usize>) -> Result<String, ()> {
    let result = make_cutter(Json(CutterRequest {
        text: text.to_string(),
        digits,
    }))
    .await;

    match result {
        Ok(response) => {
            use axum::response::IntoResponse;
            let response = response.into_response();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            Ok(body["cutter"].as_str().unwrap().to_string())
        }
        Err(_) => Err(()),
    }
}

#[tokio::test]
async fn produces_standard_cutter_numbers() {
    assert_eq!(cutter_for("Campbell", None).await.unwrap(), "C36");
    assert_eq!(cutter_for("Idaho", None).await.unwrap(), "I33");
    assert_eq!(cutter_for("Schreiber", None).await.unwrap(), "S37");
}

#[tokio::test]
async fn honors_digit_count() {
    assert_eq!(cutter_for("Campbell", Some(3)).await.unwrap(), "C367");
}

#[tokio::test]
async fn rejects_non_alphabetic_input() {
    assert!(cutter_for("1984", None).await.is_err());
}

#[tokio::test]
async fn rejects_empty_text() {
    assert!(cutter_for("", None).await.is_err());
}
