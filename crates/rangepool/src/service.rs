//! Range pool service: persists allocator decisions and reclaims them.

use std::collections::BTreeSet;
use std::sync::Arc;

use rangepool_storage::{Context, Storage};

use crate::allocator;
use crate::error::{Error, Result};
use crate::keys::{self, DEFAULT_KEY_PREFIX, Keys};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration used to create a [`Service`].
#[derive(Clone)]
pub struct Config {
    /// Key-value backend holding the allocation records. Required.
    pub storage: Option<Arc<dyn Storage>>,
    /// Prefix of every key the service writes.
    pub key_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("storage", &self.storage.is_some())
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

/// Builder for [`Service`]
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    config: Config,
}

impl ServiceBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage backend
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.config.storage = Some(storage);
        self
    }

    /// Set the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Build the service
    pub fn build(self) -> Result<Service> {
        Service::new(self.config)
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Allocates unique items from `[min, max]` to owners, per namespace.
///
/// Every operation issues its storage calls one after another and forwards
/// the caller's [`Context`] to each of them. Writes of one operation are not
/// transactional: a storage failure halfway through `create` or `delete`
/// leaves the records written so far in place. Two callers mutating the same
/// namespace concurrently can allocate the same item; serialise writers per
/// namespace outside the service.
#[derive(Clone)]
pub struct Service {
    storage: Arc<dyn Storage>,
    keys: Keys,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("key_prefix", &self.keys.prefix())
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Create a new configured service.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if no storage is set or the key prefix is
    /// malformed.
    pub fn new(config: Config) -> Result<Self> {
        let storage = config
            .storage
            .ok_or_else(|| Error::invalid_config("storage must not be empty"))?;
        let keys = Keys::new(config.key_prefix)?;

        Ok(Self { storage, keys })
    }

    /// Start building a service
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    /// Key layout used by this service
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Allocate `count` items from `[min, max]` to `owner`.
    ///
    /// Items are returned in allocation order. The search continues after the
    /// namespace's latest cursor and wraps to `min` once it passes `max`.
    ///
    /// # Errors
    /// - `ExecutionFailed` for an empty or malformed namespace/owner,
    ///   `count == 0`, `min >= max`, or a stored cursor outside `[min, max]`
    /// - `CapacityReached` if the batch does not fit; nothing is written
    /// - `Storage` / `Corrupted` for backend failures and unreadable records
    #[tracing::instrument(skip(self, ctx), fields(request_id = ctx.request_id.as_deref()))]
    pub async fn create(
        &self,
        ctx: &Context,
        namespace: &str,
        owner: &str,
        count: usize,
        min: u64,
        max: u64,
    ) -> Result<Vec<u64>> {
        keys::validate_segment("namespace", namespace)?;
        keys::validate_segment("owner", owner)?;
        allocator::validate_batch(count, min, max)?;

        // Items of the namespace may have gaps where owners released theirs.
        let mut used = self
            .load_items(ctx, &self.keys.item_list(namespace), "list namespace items")
            .await?;
        let latest = self.load_latest(ctx, namespace).await?;

        let items = allocator::allocate(&mut used, count, min, max, latest).inspect_err(|err| {
            if err.is_capacity_reached() {
                tracing::debug!(
                    free = allocator::free_count(&used, min, max),
                    "range exhausted"
                );
            }
        })?;

        self.persist(ctx, namespace, owner, &items).await?;
        tracing::debug!(?items, ?latest, "allocated items");

        Ok(items)
    }

    /// Release every item held by `owner`.
    ///
    /// Deleting an owner without items succeeds. Once the namespace has no
    /// items left its item list and latest cursor are removed as well;
    /// otherwise the cursor stays where it is so allocation keeps rotating.
    #[tracing::instrument(skip(self, ctx), fields(request_id = ctx.request_id.as_deref()))]
    pub async fn delete(&self, ctx: &Context, namespace: &str, owner: &str) -> Result<()> {
        keys::validate_segment("namespace", namespace)?;
        keys::validate_segment("owner", owner)?;

        let owner_list = self.keys.owner_item_list(namespace, owner);
        let items = self
            .load_items(ctx, &owner_list, "list owner items")
            .await?;

        for &item in &items {
            self.delete_key(ctx, &self.keys.item(namespace, item), "delete namespace item")
                .await?;
            self.delete_key(
                ctx,
                &self.keys.owner_item(namespace, owner, item),
                "delete owner item",
            )
            .await?;
        }
        self.delete_key(ctx, &owner_list, "delete owner item list")
            .await?;

        let item_list = self.keys.item_list(namespace);
        let remaining = self
            .load_items(ctx, &item_list, "list namespace items")
            .await?;
        if remaining.is_empty() {
            self.delete_key(ctx, &item_list, "delete namespace item list")
                .await?;
            self.delete_key(ctx, &self.keys.latest(namespace), "delete latest item")
                .await?;
            tracing::debug!("namespace has no items left, removed its bookkeeping");
        }

        tracing::debug!(released = ?items, remaining = remaining.len(), "released owner items");
        Ok(())
    }

    /// Items currently held by `owner`, in ascending order.
    ///
    /// # Errors
    /// Returns `ItemsNotFound` if the owner holds nothing.
    #[tracing::instrument(skip(self, ctx), fields(request_id = ctx.request_id.as_deref()))]
    pub async fn search(&self, ctx: &Context, namespace: &str, owner: &str) -> Result<Vec<u64>> {
        keys::validate_segment("namespace", namespace)?;
        keys::validate_segment("owner", owner)?;

        let items = self
            .load_items(
                ctx,
                &self.keys.owner_item_list(namespace, owner),
                "list owner items",
            )
            .await?;
        if items.is_empty() {
            return Err(Error::ItemsNotFound {
                namespace: namespace.to_string(),
                owner: owner.to_string(),
            });
        }

        Ok(items.into_iter().collect())
    }

    // -----------------------------------------------------------------------
    // Storage helpers
    // -----------------------------------------------------------------------

    /// Items listed below `prefix`; nothing stored counts as empty.
    async fn load_items(
        &self,
        ctx: &Context,
        prefix: &str,
        operation: &'static str,
    ) -> Result<BTreeSet<u64>> {
        let values = match self.storage.list(ctx, prefix).await {
            Ok(values) => values,
            Err(err) if err.is_not_found() => return Ok(BTreeSet::new()),
            Err(err) => return Err(Error::storage(operation, err)),
        };

        values.iter().map(|value| parse_item(prefix, value)).collect()
    }

    async fn load_latest(&self, ctx: &Context, namespace: &str) -> Result<Option<u64>> {
        let key = self.keys.latest(namespace);
        match self.storage.search(ctx, &key).await {
            Ok(value) => parse_item(&key, &value).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(Error::storage("load latest item", err)),
        }
    }

    /// Write both membership records of every item, then move the cursor to
    /// the last item of the batch.
    async fn persist(
        &self,
        ctx: &Context,
        namespace: &str,
        owner: &str,
        items: &[u64],
    ) -> Result<()> {
        for &item in items {
            let value = item.to_string();

            self.storage
                .create(ctx, &self.keys.item(namespace, item), &value)
                .await
                .map_err(|err| Error::storage("persist namespace item", err))?;
            self.storage
                .create(ctx, &self.keys.owner_item(namespace, owner, item), &value)
                .await
                .map_err(|err| Error::storage("persist owner item", err))?;
        }

        if let Some(last) = items.last() {
            self.storage
                .create(ctx, &self.keys.latest(namespace), &last.to_string())
                .await
                .map_err(|err| Error::storage("persist latest item", err))?;
        }

        Ok(())
    }

    /// Delete `key`; a key that is already gone is not an error.
    async fn delete_key(&self, ctx: &Context, key: &str, operation: &'static str) -> Result<()> {
        match self.storage.delete(ctx, key).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(Error::storage(operation, err)),
        }
    }
}

fn parse_item(key: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|source| Error::CorruptValue {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangepool_storage::MemoryStorage;

    #[test]
    fn test_missing_storage_is_invalid_config() {
        let err = Service::new(Config::default()).unwrap_err();
        assert!(err.is_invalid_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: storage must not be empty"
        );
    }

    #[test]
    fn test_bad_prefix_is_invalid_config() {
        let err = Service::builder()
            .with_storage(MemoryStorage::new())
            .with_key_prefix("/pools/")
            .build()
            .unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_builder_defaults() {
        let service = Service::builder()
            .with_storage(MemoryStorage::new())
            .build()
            .unwrap();
        assert_eq!(service.keys().prefix(), DEFAULT_KEY_PREFIX);
    }

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("k", "42").unwrap(), 42);
        let err = parse_item("k", "-1").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Corrupted);
    }

    #[test]
    fn test_config_debug_hides_storage() {
        let config = Config {
            storage: Some(MemoryStorage::new()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("storage: true"));
        assert!(debug.contains("range-pool"));
    }
}
