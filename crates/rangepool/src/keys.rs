//! Storage key layout.
//!
//! Three key families per namespace, all below a common prefix:
//!
//! ```text
//! range-pool/{namespace}/item/{item}               {item}
//! range-pool/{namespace}/id/{owner}/item/{item}    {item}
//! range-pool/{namespace}/latest                    {item}
//! ```
//!
//! `range-pool/{namespace}/item` and `range-pool/{namespace}/id/{owner}/item`
//! are the prefixes scanned to list a namespace's or an owner's items.

use crate::error::{Error, Result};

/// Default prefix of every key the pool writes.
pub const DEFAULT_KEY_PREFIX: &str = "range-pool";

/// Builds storage keys below a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    prefix: String,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl Keys {
    /// Create a key builder for `prefix`.
    ///
    /// The prefix may span several segments (`tenant-a/range-pool`) but must
    /// not be empty, start or end with `/`, or contain empty segments.
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(Error::invalid_config("key prefix must not be empty"));
        }
        if prefix.starts_with('/') || prefix.ends_with('/') || prefix.contains("//") {
            return Err(Error::invalid_config(format!(
                "key prefix '{prefix}' must not start or end with '/' or contain empty segments"
            )));
        }
        Ok(Self { prefix })
    }

    /// The configured prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Namespace membership record of one item.
    pub fn item(&self, namespace: &str, item: u64) -> String {
        format!("{}/{namespace}/item/{item}", self.prefix)
    }

    /// Prefix listing every item of a namespace.
    pub fn item_list(&self, namespace: &str) -> String {
        format!("{}/{namespace}/item", self.prefix)
    }

    /// Owner membership record of one item.
    pub fn owner_item(&self, namespace: &str, owner: &str, item: u64) -> String {
        format!("{}/{namespace}/id/{owner}/item/{item}", self.prefix)
    }

    /// Prefix listing every item of an owner.
    pub fn owner_item_list(&self, namespace: &str, owner: &str) -> String {
        format!("{}/{namespace}/id/{owner}/item", self.prefix)
    }

    /// Latest cursor of a namespace.
    pub fn latest(&self, namespace: &str) -> String {
        format!("{}/{namespace}/latest", self.prefix)
    }
}

/// Reject identifiers that would break the key layout.
///
/// A `/` inside a namespace or owner would let keys of one family alias
/// another's, e.g. owner `x/item` colliding with namespace items.
pub(crate) fn validate_segment(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::execution_failed(format!("{what} must not be empty")));
    }
    if value.contains('/') {
        return Err(Error::execution_failed(format!(
            "{what} '{value}' must not contain '/'"
        )));
    }
    Ok(())
}
