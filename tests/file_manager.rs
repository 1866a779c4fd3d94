mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use parkvault::{
    file_manager::{router, FileManagerState},
    uploads::{FileStore, MAX_UPLOAD_BYTES},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "parkvault-test-boundary";

async fn setup() -> (TempDir, Router, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let state = FileManagerState::new(&config(dir.path()));
    state.store.ensure_root().await.unwrap();
    let store = state.store.clone();
    (dir, router(state), store)
}

fn upload(filename: &str, contents: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn allowed_uploads_are_stored_with_a_timestamp_prefix() {
    let (_dir, app, store) = setup().await;

    for name in ["notes.txt", "photo.JPG", "slides.pptx", "song.mp3", "bundle.rar"] {
        let response = app.clone().oneshot(upload(name, b"content")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/files");
    }

    let files = store.list().await.unwrap();
    assert_eq!(files.len(), 5);
    assert!(files.iter().all(|file| looks_stamped(&file.name)));
}

#[tokio::test]
async fn disallowed_uploads_write_nothing() {
    let (_dir, app, store) = setup().await;

    for name in ["run.exe", "script.sh", "Makefile", ""] {
        let response = app.clone().oneshot(upload(name, b"nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/upload");
    }

    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_upload_flashes_the_reason() {
    let (_dir, app, _store) = setup().await;

    let response = app.clone().oneshot(upload("run.exe", b"nope")).await.unwrap();
    let cookie = set_cookie(&response);

    let page = app
        .clone()
        .oneshot(get_with_cookie("/upload", &cookie))
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("File type not allowed"));
}

#[tokio::test]
async fn missing_file_part_is_no_file_selected() {
    let (_dir, app, store) = setup().await;

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(location(&response), "/upload");

    let page = app
        .oneshot(get_with_cookie("/upload", &set_cookie(&response)))
        .await
        .unwrap();
    assert!(body_text(page).await.contains("No file selected"));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let (_dir, app, store) = setup().await;

    let big = vec![b'x'; MAX_UPLOAD_BYTES + 1];
    let response = app.clone().oneshot(upload("big.txt", &big)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/upload");
    assert!(store.list().await.unwrap().is_empty());

    let page = app
        .oneshot(get_with_cookie("/upload", &set_cookie(&response)))
        .await
        .unwrap();
    assert!(body_text(page).await.contains("File too large"));
}

#[tokio::test]
async fn traversal_upload_lands_inside_the_upload_directory() {
    let (dir, app, store) = setup().await;

    let response = app
        .oneshot(upload("../../evil.txt", b"payload"))
        .await
        .unwrap();
    assert_eq!(location(&response), "/files");

    let files = store.list().await.unwrap();
    assert_eq!(files.len(), 1);
    assert!(looks_stamped(&files[0].name));
    assert!(files[0].name.ends_with("_evil.txt"));
    assert_eq!(files[0].display_name, "evil.txt");
    assert!(store.root().join(&files[0].name).is_file());
    assert!(!dir.path().join("evil.txt").exists());
}

#[tokio::test]
async fn accented_names_keep_their_extension() {
    let (_dir, app, store) = setup().await;

    let response = app
        .clone()
        .oneshot(upload("\u{e9}.txt", b"bonjour"))
        .await
        .unwrap();
    assert_eq!(location(&response), "/files");

    let stored = store.list().await.unwrap().remove(0).name;
    assert!(stored.ends_with("_e.txt"));

    let download = app
        .oneshot(get(&format!("/download/{stored}")))
        .await
        .unwrap();
    assert_eq!(download.headers()[header::CONTENT_TYPE], "text/plain");
}

#[tokio::test]
async fn names_whose_extension_is_sanitised_away_are_rejected() {
    let (_dir, app, store) = setup().await;

    let response = app.clone().oneshot(upload("..txt", b"data")).await.unwrap();
    assert_eq!(location(&response), "/upload");

    let page = app
        .oneshot(get_with_cookie("/upload", &set_cookie(&response)))
        .await
        .unwrap();
    assert!(body_text(page).await.contains("File type not allowed"));
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn uploaded_report_lists_under_its_original_name() {
    let (_dir, app, _store) = setup().await;
    app.clone()
        .oneshot(upload("report.pdf", b"%PDF-1.4 report"))
        .await
        .unwrap();

    let page = app.clone().oneshot(get("/files")).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    assert!(html.contains("<td>report.pdf</td>"));

    let api = app.oneshot(get("/api/files")).await.unwrap();
    assert_eq!(api.status(), StatusCode::OK);
    let entries: Vec<Value> = serde_json::from_str(&body_text(api).await).unwrap();
    assert_eq!(entries.len(), 1);

    let name = entries[0]["name"].as_str().unwrap();
    assert!(looks_stamped(name));
    assert!(name.ends_with("_report.pdf"));
    assert_eq!(entries[0]["size"], 15);
    assert_eq!(entries[0]["created"].as_str().unwrap().len(), 19);
}

#[tokio::test]
async fn download_streams_bytes_under_the_display_name() {
    let (_dir, app, store) = setup().await;
    app.clone()
        .oneshot(upload("report.pdf", b"%PDF-1.4 report"))
        .await
        .unwrap();
    let stored = store.list().await.unwrap().remove(0).name;

    let response = app
        .oneshot(get(&format!("/download/{stored}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.pdf\""
    );
    assert_eq!(body_text(response).await, "%PDF-1.4 report");
}

#[tokio::test]
async fn delete_then_download_reports_not_found() {
    let (_dir, app, store) = setup().await;
    app.clone().oneshot(upload("notes.txt", b"hello")).await.unwrap();
    let stored = store.list().await.unwrap().remove(0).name;

    let deleted = app
        .clone()
        .oneshot(get(&format!("/delete/{stored}")))
        .await
        .unwrap();
    assert_eq!(location(&deleted), "/files");
    assert!(store.list().await.unwrap().is_empty());

    let missing = app
        .clone()
        .oneshot(get(&format!("/download/{stored}")))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&missing), "/files");

    let page = app
        .oneshot(get_with_cookie("/files", &set_cookie(&missing)))
        .await
        .unwrap();
    assert!(body_text(page).await.contains("File not found"));
}

#[tokio::test]
async fn delete_of_unknown_file_reports_not_found() {
    let (_dir, app, _store) = setup().await;

    let response = app
        .clone()
        .oneshot(get("/delete/20240101_000000_ghost.txt"))
        .await
        .unwrap();
    assert_eq!(location(&response), "/files");

    let page = app
        .oneshot(get_with_cookie("/files", &set_cookie(&response)))
        .await
        .unwrap();
    assert!(body_text(page).await.contains("File not found"));
}

#[tokio::test]
async fn traversal_names_never_leave_the_upload_directory() {
    let (dir, app, _store) = setup().await;
    std::fs::write(dir.path().join("outside.txt"), b"private").unwrap();

    let response = app
        .oneshot(get("/download/..%2Foutside.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(dir.path().join("outside.txt").exists());
}

#[tokio::test]
async fn index_summarises_storage() {
    let (_dir, app, _store) = setup().await;
    app.clone().oneshot(upload("a.txt", b"1234")).await.unwrap();

    let page = app.oneshot(get("/")).await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("1 files stored, 4 B in total."));
}
