mod common;

use serde_json::json;

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn upsert_entry_inserts_then_updates() {
    let app = common::spawn_app().await;

    let entry = json!({
        "id": "https://id.example.org/authorities/n80001234",
        "heading": "Austen, Jane, 1775-1817",
        "variants": ["Ostin, Dzhein"],
        "related": []
    });

    let first: serde_json::Value = app
        .client
        .post(format!("{}/mads/entry", app.address))
        .json(&entry)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["upserted_count"], 1);

    // Same payload again matches the existing document instead of inserting.
    let second: serde_json::Value = app
        .client
        .post(format!("{}/mads/entry", app.address))
        .json(&entry)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["upserted_count"], 0);
    assert_eq!(second["matched_count"], 1);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn upsert_rejects_empty_heading() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .post(format!("{}/mads/entry", app.address))
        .json(&json!({ "id": "x", "heading": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn check_entry_reflects_upserts() {
    let app = common::spawn_app().await;
    let id = "https://id.example.org/authorities/n99999999";

    let before: serde_json::Value = app
        .client
        .post(format!("{}/mads/entry/check", app.address))
        .json(&json!({ "id": id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before["exists"], false);

    app.client
        .post(format!("{}/mads/entry", app.address))
        .json(&json!({ "id": id, "heading": "Test heading" }))
        .send()
        .await
        .unwrap();

    let after: serde_json::Value = app
        .client
        .post(format!("{}/mads/entry/check", app.address))
        .json(&json!({ "id": id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["exists"], true);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn bulk_check_returns_only_known_ids() {
    let app = common::spawn_app().await;

    let docs = json!({
        "docs": [
            { "id": "a1", "heading": "Heading one" },
            { "id": "a2", "heading": "Heading two" }
        ]
    });
    let bulk: serde_json::Value = app
        .client
        .post(format!("{}/mads/entries", app.address))
        .json(&docs)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bulk["upserted_count"], 2);

    let check: serde_json::Value = app
        .client
        .post(format!("{}/mads/entries/check", app.address))
        .json(&json!({ "ids": ["a1", "a2", "a3"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let existing: Vec<&str> = check["existing_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(existing.contains(&"a1"));
    assert!(existing.contains(&"a2"));
    assert!(!existing.contains(&"a3"));
}
