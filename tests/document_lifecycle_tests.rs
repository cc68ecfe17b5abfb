//! Tests for opening and disposing package documents
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{CountingEngine, PendingStorage, open, storage, truncated, uri, well_formed};
use msi_language_server::core::{Disposable, DisposableStore, Error, PackageDocument};

#[tokio::test]
async fn test_open_well_formed_package() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", well_formed())]);

    let document = open("pkg://sample.msi", &storage, &engine).await;

    assert_eq!(document.uri().as_str(), "pkg://sample.msi");
    assert!(document.has_package());
    assert!(!document.is_disposed());
    assert_eq!(engine.live(), 1);

    document.dispose();
}

#[tokio::test]
async fn test_open_truncated_package_is_format_error() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", truncated())]);

    let result = PackageDocument::open(uri("pkg://sample.msi"), storage.as_ref(), engine.clone()).await;

    assert!(matches!(result, Err(Error::Format { .. })));
    assert_eq!(engine.opens(), 0);
    assert_eq!(engine.frees(), 0);
    assert_eq!(engine.live(), 0);
}

#[tokio::test]
async fn test_open_unreadable_location_is_io_error() {
    let engine = CountingEngine::new();
    let storage = storage(&[]);

    let result = PackageDocument::open(uri("pkg://missing.msi"), storage.as_ref(), engine.clone()).await;

    match result {
        Err(Error::Io { uri, source }) => {
            assert_eq!(uri.as_str(), "pkg://missing.msi");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected IO error, got {:?}", other),
    }
    assert_eq!(engine.live(), 0);
}

#[tokio::test]
async fn test_dispose_frees_handle_once() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", well_formed())]);
    let document = open("pkg://sample.msi", &storage, &engine).await;

    document.dispose();
    document.dispose();

    assert!(document.is_disposed());
    assert!(!document.has_package());
    assert_eq!(engine.frees(), 1);
    assert_eq!(engine.live(), 0);
}

#[tokio::test]
async fn test_dispose_from_independent_triggers() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", well_formed())]);
    let document = open("pkg://sample.msi", &storage, &engine).await;

    // Both the panel and the editor infrastructure hold on to the document
    let panel = DisposableStore::new();
    let editor = DisposableStore::new();
    panel.register(document.clone());
    editor.register(document.clone());

    panel.dispose();
    editor.dispose();

    assert_eq!(engine.frees(), 1);
}

#[tokio::test]
async fn test_document_releases_registered_resources() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", well_formed())]);
    let document = open("pkg://sample.msi", &storage, &engine).await;

    let inner = DisposableStore::new();
    let inner = document.register(Arc::new(inner));
    document.dispose();

    assert!(inner.is_disposed());

    // Registering after dispose releases right away
    let late = document.register(Arc::new(DisposableStore::new()));
    assert!(late.is_disposed());
}

#[tokio::test]
async fn test_tables_and_rows_through_document() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", well_formed())]);
    let document = open("pkg://sample.msi", &storage, &engine).await;

    let tables = document.tables().await.expect("tables");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "Property");

    let rows = document.rows("Property").await.expect("rows");
    assert_eq!(rows[0].get("Property"), Some(&Some("ProductName".to_string())));

    let missing = document.rows("File").await;
    assert!(matches!(missing, Err(Error::Engine(_))));

    document.dispose();
    let after = document.tables().await;
    assert!(matches!(after, Err(Error::Disposed(_))));
}

#[tokio::test]
async fn test_drop_without_dispose_frees_handle() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", well_formed())]);
    let document = open("pkg://sample.msi", &storage, &engine).await;

    drop(document);

    assert_eq!(engine.frees(), 1);
    assert_eq!(engine.live(), 0);
}

#[tokio::test]
async fn test_concurrent_opens_are_not_deduplicated() {
    let engine = CountingEngine::new();
    let storage = storage(&[("pkg://sample.msi", well_formed())]);

    let (first, second) = tokio::join!(
        open("pkg://sample.msi", &storage, &engine),
        open("pkg://sample.msi", &storage, &engine),
    );

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(engine.live(), 2);

    first.dispose();
    assert!(second.has_package());
    second.dispose();
    assert_eq!(engine.live(), 0);
}

#[tokio::test]
async fn test_cancelled_open_allocates_nothing() {
    let engine = CountingEngine::new();

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        PackageDocument::open(uri("pkg://slow.msi"), &PendingStorage, engine.clone()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(engine.opens(), 0);
    assert_eq!(engine.live(), 0);
}
