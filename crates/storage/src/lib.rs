//! # Rangepool Storage
//!
//! The key-value contract the range pool persists its allocations through.
//!
//! - [`Storage`]: object-safe async trait with `create`, `delete`, `search`
//!   and `list` operations
//! - [`Context`]: per-call context carrying a cancellation token, forwarded
//!   unchanged to every storage call
//! - [`StorageError`]: error type keeping "not found" distinguishable from
//!   other failures
//! - [`MemoryStorage`]: ordered in-memory backend for tests and single-process
//!   deployments

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod memory;
pub mod traits;

pub use context::Context;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use traits::Storage;
