//! Storage failures, cancellation and corrupt records seen through `Service`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rangepool::storage::StorageResult;
use rangepool::{Context, ErrorKind, MemoryStorage, Service, Storage, StorageError};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Faulty storage
// ---------------------------------------------------------------------------

/// Wraps [`MemoryStorage`] and misbehaves on request.
#[derive(Debug, Default)]
struct FaultyStorage {
    inner: MemoryStorage,
    calls: AtomicUsize,
    /// 1-based call that fails with a backend error; 0 disables it.
    fail_at: AtomicUsize,
    /// 1-based call that cancels `cancel_token` before running; 0 disables it.
    cancel_at: AtomicUsize,
    cancel_token: CancellationToken,
    /// Report `NotFound` when deleting a key that is not stored.
    strict_delete: AtomicBool,
}

impl FaultyStorage {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn fail_on_call(&self, n: usize) {
        self.calls.store(0, Ordering::SeqCst);
        self.fail_at.store(n, Ordering::SeqCst);
    }

    fn cancel_on_call(&self, n: usize) {
        self.calls.store(0, Ordering::SeqCst);
        self.cancel_at.store(n, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn before_call(&self, key: &str) -> StorageResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.cancel_at.load(Ordering::SeqCst) == call {
            self.cancel_token.cancel();
        }
        if self.fail_at.load(Ordering::SeqCst) == call {
            return Err(StorageError::backend(key, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FaultyStorage {
    async fn create(&self, ctx: &Context, key: &str, value: &str) -> StorageResult<()> {
        self.before_call(key)?;
        self.inner.create(ctx, key, value).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> StorageResult<()> {
        self.before_call(key)?;
        if self.strict_delete.load(Ordering::SeqCst)
            && !self.inner.keys().iter().any(|stored| stored == key)
        {
            return Err(StorageError::not_found(key));
        }
        self.inner.delete(ctx, key).await
    }

    async fn search(&self, ctx: &Context, key: &str) -> StorageResult<String> {
        self.before_call(key)?;
        self.inner.search(ctx, key).await
    }

    async fn list(&self, ctx: &Context, prefix: &str) -> StorageResult<Vec<String>> {
        self.before_call(prefix)?;
        self.inner.list(ctx, prefix).await
    }
}

fn setup() -> (Service, Arc<FaultyStorage>) {
    let _ = rangepool_log::init_test();

    let storage = FaultyStorage::new();
    let service = Service::builder()
        .with_storage(storage.clone())
        .build()
        .expect("service should build");
    (service, storage)
}

const NAMESPACE: &str = "ns";

// ---------------------------------------------------------------------------
// Backend failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_stops_at_first_failed_write() {
    let (service, storage) = setup();
    let ctx = Context::new();

    // list, search latest, write namespace item, write owner item (fails)
    storage.fail_on_call(4);
    let err = service.create(&ctx, NAMESPACE, "a", 1, 2, 9).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(storage.calls(), 4);
    assert_eq!(storage.inner.keys(), vec!["range-pool/ns/item/2".to_string()]);
}

#[tokio::test]
async fn list_failure_is_not_reported_as_missing_items() {
    let (service, storage) = setup();
    let ctx = Context::new();

    service.create(&ctx, NAMESPACE, "a", 1, 2, 9).await.unwrap();

    storage.fail_on_call(1);
    let err = service.search(&ctx, NAMESPACE, "a").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(!err.is_items_not_found());
    assert!(!err.is_expected());
    assert!(err.to_string().contains("list owner items"));
    assert_eq!(err.storage_error().map(StorageError::key), Some("range-pool/ns/id/a/item"));
}

#[tokio::test]
async fn failed_delete_can_be_retried() {
    let (service, storage) = setup();
    let ctx = Context::new();

    service.create(&ctx, NAMESPACE, "a", 2, 2, 9).await.unwrap();

    // list owner items, delete namespace item 2, delete owner item 2 (fails)
    storage.fail_on_call(3);
    let err = service.delete(&ctx, NAMESPACE, "a").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(!storage.inner.is_empty());

    storage.fail_on_call(0);
    service.delete(&ctx, NAMESPACE, "a").await.unwrap();
    assert!(storage.inner.is_empty(), "left over: {:?}", storage.inner.keys());
}

#[tokio::test]
async fn delete_tolerates_backends_reporting_missing_keys() {
    let (service, storage) = setup();
    let ctx = Context::new();
    storage.strict_delete.store(true, Ordering::SeqCst);

    service.create(&ctx, NAMESPACE, "a", 2, 2, 9).await.unwrap();
    service.delete(&ctx, NAMESPACE, "a").await.unwrap();
    service.delete(&ctx, NAMESPACE, "ghost").await.unwrap();

    assert!(storage.inner.is_empty());
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_context_fails_without_writing() {
    let (service, storage) = setup();
    let token = CancellationToken::new();
    token.cancel();
    let ctx = Context::new().with_cancellation(token);

    let err = service.create(&ctx, NAMESPACE, "a", 1, 2, 9).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(storage.calls(), 1);
    assert!(storage.inner.is_empty());
}

#[tokio::test]
async fn cancellation_mid_operation_stops_further_calls() {
    let (service, storage) = setup();
    let ctx = Context::new().with_cancellation(storage.cancel_token.clone());

    // Cancelled right before the first write.
    storage.cancel_on_call(3);
    let err = service.create(&ctx, NAMESPACE, "a", 1, 2, 9).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(storage.calls(), 3);
    assert!(storage.inner.is_empty());
}

// ---------------------------------------------------------------------------
// Corrupt records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_latest_cursor_is_reported() {
    let (service, storage) = setup();
    let ctx = Context::new();

    storage
        .inner
        .create(&ctx, "range-pool/ns/latest", "abc")
        .await
        .unwrap();

    let err = service.create(&ctx, NAMESPACE, "a", 1, 2, 9).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Corrupted);
    assert!(err.to_string().contains("abc"));
    assert_eq!(storage.inner.len(), 1);
}

#[tokio::test]
async fn corrupt_item_records_are_reported() {
    let (service, storage) = setup();
    let ctx = Context::new();

    storage
        .inner
        .create(&ctx, "range-pool/ns/item/2", "two")
        .await
        .unwrap();
    storage
        .inner
        .create(&ctx, "range-pool/ns/id/a/item/3", "-3")
        .await
        .unwrap();

    let err = service.create(&ctx, NAMESPACE, "b", 1, 2, 9).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Corrupted);

    let err = service.search(&ctx, NAMESPACE, "a").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Corrupted);
}
