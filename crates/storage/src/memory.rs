//! In-memory key-value storage

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::context::Context;
use crate::error::{StorageError, StorageResult};
use crate::traits::Storage;

/// In-memory implementation of [`Storage`].
///
/// Entries live in an ordered map so prefix scans are a single range walk.
/// Nothing survives the process; use it for tests and single-process setups.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create new in-memory storage
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of every stored key, in key order
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

/// Keys are non-empty paths without leading, trailing or doubled `/`.
fn validate_key(key: &str) -> StorageResult<()> {
    let reason = if key.is_empty() {
        "key must not be empty"
    } else if key.starts_with('/') || key.ends_with('/') {
        "key must not start or end with '/'"
    } else if key.contains("//") {
        "key must not contain empty segments"
    } else {
        return Ok(());
    };

    Err(StorageError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}

fn check(ctx: &Context, key: &str) -> StorageResult<()> {
    if ctx.is_cancelled() {
        return Err(StorageError::cancelled(key));
    }
    validate_key(key)
}

fn child_prefix(key: &str) -> String {
    format!("{key}/")
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create(&self, ctx: &Context, key: &str, value: &str) -> StorageResult<()> {
        check(ctx, key)?;
        tracing::trace!(key, value, "memory storage create");

        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, ctx: &Context, key: &str) -> StorageResult<()> {
        check(ctx, key)?;
        tracing::trace!(key, "memory storage delete");

        let prefix = child_prefix(key);
        let mut entries = self.entries.write();
        entries.remove(key);
        let children: Vec<String> = entries
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for child in children {
            entries.remove(&child);
        }
        Ok(())
    }

    async fn search(&self, ctx: &Context, key: &str) -> StorageResult<String> {
        check(ctx, key)?;
        tracing::trace!(key, "memory storage search");

        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn list(&self, ctx: &Context, prefix: &str) -> StorageResult<Vec<String>> {
        check(ctx, prefix)?;
        tracing::trace!(prefix, "memory storage list");

        let start = child_prefix(prefix);
        let values: Vec<String> = self
            .entries
            .read()
            .range(start.clone()..)
            .take_while(|(k, _)| k.starts_with(&start))
            .map(|(_, v)| v.clone())
            .collect();

        if values.is_empty() {
            return Err(StorageError::not_found(prefix));
        }
        Ok(values)
    }
}
