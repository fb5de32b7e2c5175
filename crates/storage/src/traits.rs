//! The storage contract every backend implements

use async_trait::async_trait;

use crate::context::Context;
use crate::error::StorageResult;

/// Key-value storage contract.
///
/// Keys are `/`-separated paths. A key doubles as the prefix of every key
/// below it, so `list("a/b")` returns the values stored under `a/b/...`.
///
/// # Contract Requirements
/// - `create` writes or overwrites a single key
/// - `delete` removes the key and every key below it; removing an absent key
///   succeeds
/// - `search` returns [`StorageError::NotFound`](crate::StorageError::NotFound)
///   for an absent key
/// - `list` returns values in key order and `NotFound` when nothing lives
///   below the prefix
/// - every method fails with `Cancelled` once `ctx` is cancelled
/// - each call is atomic for the key it addresses; nothing spans keys
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `value` under `key`.
    async fn create(&self, ctx: &Context, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key` and everything below it.
    async fn delete(&self, ctx: &Context, key: &str) -> StorageResult<()>;

    /// Look up the value stored under `key`.
    async fn search(&self, ctx: &Context, key: &str) -> StorageResult<String>;

    /// Values of every key below `prefix`.
    async fn list(&self, ctx: &Context, prefix: &str) -> StorageResult<Vec<String>>;
}
