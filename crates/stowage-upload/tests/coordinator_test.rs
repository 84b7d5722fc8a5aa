//! Upload coordinator integration tests.
//!
//! Run with: `cargo test -p stowage-upload --test coordinator_test`

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::fixtures::{png_file, text_file};
use helpers::storage::{CollidingStorage, PanickingStorage, ScriptedStorage};
use helpers::{concurrent_coordinator_with, coordinator_with, BUCKET, USER_ID};
use regex::Regex;
use stowage_storage::{MemoryStorage, Storage};
use stowage_upload::{decode_data_url, FileBlob};

#[tokio::test]
async fn test_upload_one_returns_url_and_user_scoped_path() {
    let storage = Arc::new(MemoryStorage::new("https://cdn.example.com"));
    let coordinator = coordinator_with(storage.clone());

    let result = coordinator
        .upload_one(BUCKET, &png_file("avatar.png"), USER_ID, Some("profiles"))
        .await;

    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
    let path = result.path.clone().unwrap();
    let shape = Regex::new(r"^profiles/user-42/\d+-[a-z0-9]{8}\.png$").unwrap();
    assert!(shape.is_match(&path), "unexpected key: {}", path);
    assert_eq!(
        result.url.as_deref(),
        Some(format!("https://cdn.example.com/{}/{}", BUCKET, path).as_str())
    );
    assert!(storage.exists(BUCKET, &path).await.unwrap());
}

#[tokio::test]
async fn test_upload_one_without_folder_or_extension() {
    let coordinator = coordinator_with(Arc::new(MemoryStorage::default()));

    let result = coordinator
        .upload_one(BUCKET, &text_file("README"), USER_ID, None)
        .await;

    let path = result.path.unwrap();
    let shape = Regex::new(r"^user-42/\d+-[a-z0-9]{8}$").unwrap();
    assert!(shape.is_match(&path), "unexpected key: {}", path);
}

#[tokio::test]
async fn test_upload_one_forwards_put_options() {
    let storage = Arc::new(ScriptedStorage::new());
    let coordinator = coordinator_with(storage.clone());

    let result = coordinator
        .upload_one(BUCKET, &png_file("a.png"), USER_ID, None)
        .await;
    assert!(result.is_success());

    let calls = storage.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].bucket, BUCKET);
    assert_eq!(Some(calls[0].key.as_str()), result.path.as_deref());
    assert_eq!(calls[0].size, png_file("a.png").size());
    assert!(!calls[0].options.overwrite);
    assert_eq!(calls[0].options.cache_control(), "max-age=3600");
    assert_eq!(calls[0].options.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_storage_failure_is_returned_as_value() {
    let storage = Arc::new(ScriptedStorage::new().failing_on("txt"));
    let coordinator = coordinator_with(storage);

    let result = coordinator
        .upload_one(BUCKET, &text_file("notes.txt"), USER_ID, None)
        .await;

    assert_eq!(result.url, None);
    assert_eq!(result.path, None);
    let error = result.error.unwrap();
    assert_eq!(error.code, "UPLOAD_FAILED");
    assert!(error.recoverable);
    assert_eq!(error.file.as_deref(), Some("notes.txt"));
}

#[tokio::test]
async fn test_public_url_failure_is_returned_as_value() {
    let storage = Arc::new(ScriptedStorage::new().without_public_urls());
    let coordinator = coordinator_with(storage);

    let result = coordinator
        .upload_one(BUCKET, &png_file("a.png"), USER_ID, None)
        .await;

    assert_eq!(result.url, None);
    assert_eq!(result.path, None);
    assert_eq!(result.error.unwrap().code, "STORAGE_ERROR");
}

#[tokio::test]
async fn test_collision_is_reported_not_overwritten() {
    let coordinator = coordinator_with(Arc::new(CollidingStorage));

    let result = coordinator
        .upload_one(BUCKET, &png_file("a.png"), USER_ID, None)
        .await;

    assert_eq!(result.url, None);
    assert_eq!(result.path, None);
    let error = result.error.unwrap();
    assert_eq!(error.code, "OBJECT_ALREADY_EXISTS");
    assert!(!error.recoverable);
}

#[tokio::test]
async fn test_panicking_storage_does_not_escape() {
    let coordinator = coordinator_with(Arc::new(PanickingStorage));

    let result = coordinator
        .upload_one(BUCKET, &png_file("a.png"), USER_ID, None)
        .await;

    let error = result.error.unwrap();
    assert_eq!(error.code, "INTERNAL_ERROR");
    assert_eq!(error.message, "Internal storage error");

    let batch = coordinator
        .upload_many(BUCKET, &[png_file("a.png"), png_file("b.png")], USER_ID, None)
        .await;
    assert!(batch.urls.is_empty());
    assert_eq!(batch.errors.len(), 2);

    let errors = coordinator
        .remove_many(BUCKET, &["user-42/1-abc.png".to_string()])
        .await;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].file.as_deref(), Some("user-42/1-abc.png"));
}

#[tokio::test]
async fn test_upload_many_continues_past_failures() {
    let storage = Arc::new(ScriptedStorage::new().failing_on("txt"));
    let coordinator = coordinator_with(storage.clone());
    let files = vec![png_file("one.png"), text_file("two.txt"), png_file("three.png")];

    let batch = coordinator.upload_many(BUCKET, &files, USER_ID, None).await;

    assert_eq!(storage.calls().len(), 3);
    assert_eq!(batch.urls.len(), 2);
    assert_eq!(batch.paths.len(), 2);
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].file.as_deref(), Some("two.txt"));
    for (url, path) in batch.urls.iter().zip(&batch.paths) {
        assert!(url.ends_with(path.as_str()));
        assert!(path.ends_with(".png"));
    }
    assert!(!batch.is_complete_success());
}

#[tokio::test]
async fn test_upload_many_empty_batch() {
    let coordinator = coordinator_with(Arc::new(MemoryStorage::default()));

    let batch = coordinator.upload_many(BUCKET, &[], USER_ID, None).await;

    assert!(batch.urls.is_empty());
    assert!(batch.paths.is_empty());
    assert!(batch.is_complete_success());
}

#[tokio::test]
async fn test_upload_many_is_sequential_by_default() {
    let storage = Arc::new(
        ScriptedStorage::new()
            .delaying("png", Duration::from_millis(20))
            .delaying("jpg", Duration::from_millis(5)),
    );
    let coordinator = coordinator_with(storage.clone());
    let files = vec![
        FileBlob::new("first.png", "image/png", &b"1"[..]),
        FileBlob::new("second.jpg", "image/jpeg", &b"2"[..]),
        FileBlob::new("third.gif", "image/gif", &b"3"[..]),
    ];

    let batch = coordinator.upload_many(BUCKET, &files, USER_ID, None).await;

    assert_eq!(storage.max_in_flight(), 1);
    let started: Vec<String> = storage.calls().into_iter().map(|c| c.key).collect();
    assert_eq!(batch.paths, started);
    assert!(batch.paths[0].ends_with(".png"));
    assert!(batch.paths[1].ends_with(".jpg"));
    assert!(batch.paths[2].ends_with(".gif"));
}

#[tokio::test]
async fn test_concurrent_batch_keeps_input_order() {
    let storage = Arc::new(
        ScriptedStorage::new()
            .delaying("png", Duration::from_millis(50))
            .delaying("jpg", Duration::from_millis(10))
            .failing_on("txt"),
    );
    let coordinator = concurrent_coordinator_with(storage.clone(), 4);
    let files = vec![
        FileBlob::new("slow.png", "image/png", &b"1"[..]),
        text_file("broken.txt"),
        FileBlob::new("fast.jpg", "image/jpeg", &b"2"[..]),
        FileBlob::new("instant.gif", "image/gif", &b"3"[..]),
    ];

    let batch = coordinator.upload_many(BUCKET, &files, USER_ID, None).await;

    assert!(storage.max_in_flight() > 1);
    assert!(storage.max_in_flight() <= 4);
    assert_eq!(batch.paths.len(), 3);
    assert!(batch.paths[0].ends_with(".png"));
    assert!(batch.paths[1].ends_with(".jpg"));
    assert!(batch.paths[2].ends_with(".gif"));
    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.errors[0].file.as_deref(), Some("broken.txt"));
}

#[tokio::test]
async fn test_decoded_data_url_uploads_with_its_content_type() {
    let storage = Arc::new(MemoryStorage::default());
    let coordinator = coordinator_with(storage.clone());
    let blob = decode_data_url("data:image/png;base64,AAAA", "pixel.png").unwrap();

    let result = coordinator.upload_one(BUCKET, &blob, USER_ID, None).await;

    let path = result.path.unwrap();
    let stored = storage.get_object(BUCKET, &path).await.unwrap();
    assert_eq!(stored.data.as_ref(), &[0u8, 0, 0]);
    assert_eq!(stored.content_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_remove_many_reports_only_failures() {
    let storage = Arc::new(ScriptedStorage::new());
    let coordinator = coordinator_with(storage.clone());

    let batch = coordinator
        .upload_many(BUCKET, &[png_file("a.png"), png_file("b.png")], USER_ID, None)
        .await;
    let mut paths = batch.paths.clone();
    paths.push("user-42/never-uploaded.png".to_string());
    paths.push("../escape.png".to_string());

    let errors = coordinator.remove_many(BUCKET, &paths).await;

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "INVALID_KEY");
    for path in &batch.paths {
        assert!(!storage.inner().exists(BUCKET, path).await.unwrap());
    }
}
