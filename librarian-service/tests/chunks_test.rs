mod common;

use reqwest::multipart;

const SAMPLE_CSV: &str = "\
record_id,title,holds,date\n\
b100,First title,h1;h2,01-15-2024\n\
b101,Second title,h1,02-20-2024\n\
b102,Third title,h1;h2;h3,03-25-2024\n\
b103,Fourth title,,04-30-2024\n";

fn csv_form(extra: &[(&str, &str)]) -> multipart::Form {
    let mut form = multipart::Form::new().part(
        "file",
        multipart::Part::text(SAMPLE_CSV)
            .file_name("holds.csv")
            .mime_str("text/csv")
            .unwrap(),
    );
    for (name, value) in extra {
        form = form.text(name.to_string(), value.to_string());
    }
    form
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn split_stores_header_carrying_chunks() {
    let app = common::spawn_app().await;

    // 4 data rows with chunk_size 3 -> 2 chunks.
    let body: serde_json::Value = app
        .client
        .post(format!("{}/csv/split", app.address))
        .multipart(csv_form(&[("chunk_size", "3")]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let chunks = body["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(body["total_rows"], 4);
    assert_eq!(chunks[0]["rows"], 3);
    assert_eq!(chunks[1]["rows"], 1);

    // Every stored chunk begins with the header row.
    let id = chunks[0]["id"].as_str().unwrap();
    let downloaded = app
        .client
        .get(format!("{}/chunks/{}", app.address, id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(downloaded.starts_with("record_id,title,holds,date"));
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn download_deletes_the_chunk() {
    let app = common::spawn_app().await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/csv/split", app.address))
        .multipart(csv_form(&[]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["chunks"][0]["id"].as_str().unwrap().to_string();

    let first = app
        .client
        .get(format!("{}/chunks/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);
    assert!(first
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .contains("attachment"));

    let second = app
        .client
        .get(format!("{}/chunks/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 404);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn split_with_filter_returns_holds_report() {
    let app = common::spawn_app().await;

    let body: serde_json::Value = app
        .client
        .post(format!("{}/csv/split", app.address))
        .multipart(csv_form(&[("min_holds", "2")]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let records = body["holds"]["records"].as_array().unwrap();
    // Only b100 (2 holds) and b102 (3 holds) pass the filter.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["record_id"], "b100");
    assert_eq!(records[1]["record_id"], "b102");
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn split_rejects_unsupported_extension() {
    let app = common::spawn_app().await;

    let form = multipart::Form::new().part(
        "file",
        multipart::Part::text("a,b\n1,2\n")
            .file_name("holds.xlsx")
            .mime_str("application/octet-stream")
            .unwrap(),
    );

    let response = app
        .client
        .post(format!("{}/csv/split", app.address))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn expired_chunk_answers_404_and_is_removed() {
    use librarian_service::models::CsvChunk;
    use mongodb::bson::doc;

    let app = common::spawn_app().await;

    // Zero TTL: expired the moment it is written, before the TTL monitor
    // has had a chance to reap it.
    let chunk = CsvChunk::new("record_id,title\nb100,Stale".to_string(), 0);
    let id = chunk.id.clone();
    app.db.insert_chunk(&chunk).await.unwrap();

    let response = app
        .client
        .get(format!("{}/chunks/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // The read-side check deletes what it refuses to serve.
    let remaining = app
        .db
        .chunks()
        .find_one(doc! { "_id": &id }, None)
        .await
        .unwrap();
    assert!(remaining.is_none());
}

#[tokio::test]
#[ignore = "requires a local MongoDB"]
async fn clear_removes_all_chunks() {
    let app = common::spawn_app().await;

    app.client
        .post(format!("{}/csv/split", app.address))
        .multipart(csv_form(&[]))
        .send()
        .await
        .unwrap();

    let cleared: serde_json::Value = app
        .client
        .post(format!("{}/chunks/clear", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cleared["deleted"].as_u64().unwrap() >= 1);

    let again: serde_json::Value = app
        .client
        .post(format!("{}/chunks/clear", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["deleted"], 0);
}
