//! # Rangepool
//!
//! Hands out unique integers from a bounded range `[min, max]` to named
//! owners, grouped by namespace, and persists every allocation in a
//! key-value [`Storage`] so it survives restarts. Typical items are VLAN
//! tags, port numbers or slot indices.
//!
//! - [`allocator`]: pure selection of the next free item (continue after the
//!   latest cursor, then wrap to `min`)
//! - [`Service`]: `create`, `delete` and `search` on top of a storage backend
//! - [`keys`]: the storage key layout
//!
//! ```ignore
//! use rangepool::{Context, MemoryStorage, Service};
//!
//! let service = Service::builder().with_storage(MemoryStorage::new()).build()?;
//! let ctx = Context::new();
//!
//! let vlans = service.create(&ctx, "vlan", "cluster-1", 2, 2, 4094).await?;
//! assert_eq!(vlans, vec![2, 3]);
//!
//! service.delete(&ctx, "vlan", "cluster-1").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod allocator;
pub mod error;
pub mod keys;
pub mod service;

pub use error::{Error, ErrorKind, Result};
pub use keys::{DEFAULT_KEY_PREFIX, Keys};
pub use service::{Config, Service, ServiceBuilder};

pub use rangepool_storage as storage;
pub use rangepool_storage::{Context, MemoryStorage, Storage, StorageError};
