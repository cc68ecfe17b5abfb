//! Tests for the msi-backed package engine
mod common;

use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use common::{sample_msi, uri};
use msi_language_server::core::{Disposable, Error, MemoryStorage, PackageDocument};
use msi_language_server::engine::{EngineError, HandleId, MsiEngine, PackageEngine};

/// Poll `future` exactly once without a runtime waker.
fn poll_once<F: Future + ?Sized>(future: std::pin::Pin<&mut F>) -> Poll<F::Output> {
    let mut cx = Context::from_waker(Waker::noop());
    future.poll(&mut cx)
}

/// Wait until the worker has handled every command sent so far.
async fn flush(engine: &MsiEngine) {
    let result = engine.tables(HandleId(u64::MAX)).await;
    assert!(matches!(result, Err(EngineError::UnknownHandle(_))));
}

fn storage_with(location: &str, data: Vec<u8>) -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.insert(&uri(location), data);
    storage
}

#[tokio::test]
async fn test_open_sample_package() {
    let engine = Arc::new(MsiEngine::spawn().expect("spawn engine"));
    let storage = storage_with("pkg://sample.msi", sample_msi());

    let document = PackageDocument::open(uri("pkg://sample.msi"), &storage, engine.clone())
        .await
        .expect("open sample");

    assert_eq!(document.uri().as_str(), "pkg://sample.msi");
    assert!(document.has_package());
    assert_eq!(engine.live_handles(), 1);

    let tables = document.tables().await.expect("tables");
    let property = tables
        .iter()
        .find(|table| table.name == "Property")
        .expect("Property table");
    let columns: Vec<_> = property.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Property", "Value"]);
    assert!(property.columns[0].primary_key);
    assert!(property.columns[1].nullable);

    document.dispose();
}

#[tokio::test]
async fn test_rows_of_sample_package() {
    let engine = Arc::new(MsiEngine::spawn().expect("spawn engine"));
    let storage = storage_with("pkg://sample.msi", sample_msi());
    let document = PackageDocument::open(uri("pkg://sample.msi"), &storage, engine.clone())
        .await
        .expect("open sample");

    let rows = document.rows("Property").await.expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Property"), Some(&Some("ProductName".to_string())));
    assert_eq!(rows[0].get("Value"), Some(&Some("Sample".to_string())));

    let missing = document.rows("NoSuchTable").await;
    assert!(matches!(
        missing,
        Err(Error::Engine(EngineError::TableNotFound(_)))
    ));

    document.dispose();
}

#[tokio::test]
async fn test_truncated_package_leaves_nothing_allocated() {
    let engine = Arc::new(MsiEngine::spawn().expect("spawn engine"));
    let mut data = sample_msi();
    data.truncate(100);
    let storage = storage_with("pkg://sample.msi", data);

    let result = PackageDocument::open(uri("pkg://sample.msi"), &storage, engine.clone()).await;

    assert!(matches!(result, Err(Error::Format { .. })));
    assert_eq!(engine.live_handles(), 0);
}

#[tokio::test]
async fn test_dispose_releases_package() {
    let engine = Arc::new(MsiEngine::spawn().expect("spawn engine"));
    let handle = engine.open(sample_msi()).await.expect("open");
    let id = handle.id();
    assert_eq!(engine.live_handles(), 1);

    engine.free(handle);

    // Commands are processed in order, so this answers after the free
    let result = engine.tables(id).await;
    assert!(matches!(result, Err(EngineError::UnknownHandle(_))));
    assert_eq!(engine.live_handles(), 0);
}

#[tokio::test]
async fn test_open_cancelled_before_reply_frees_package() {
    let engine = MsiEngine::spawn().expect("spawn engine");

    let mut open = engine.open(sample_msi());
    assert!(poll_once(open.as_mut()).is_pending());
    drop(open);

    flush(&engine).await;
    assert_eq!(engine.live_handles(), 0);
}

#[tokio::test]
async fn test_open_cancelled_after_reply_frees_package() {
    let engine = Arc::new(MsiEngine::spawn().expect("spawn engine"));
    let storage = storage_with("pkg://sample.msi", sample_msi());

    let mut open = Box::pin(PackageDocument::open(
        uri("pkg://sample.msi"),
        &storage,
        engine.clone(),
    ));
    assert!(poll_once(open.as_mut()).is_pending());

    // The worker has allocated and replied, but nobody took the reply
    tokio::time::timeout(Duration::from_secs(5), async {
        while engine.live_handles() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("worker allocates the package");

    drop(open);

    flush(&engine).await;
    assert_eq!(engine.live_handles(), 0);
}
