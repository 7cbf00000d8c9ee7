//! Whole-collection persistence.
//!
//! Every backend stores the catalog as one JSON array document. Reads return
//! the full collection; writes replace it in one step, so a reader never sees
//! a partially written collection. There is no per-record write path.

mod json_file;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use json_file::JsonFileStore;
pub use memory::MemoryItemStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteItemStore;

use crate::error::StoreError;
use crate::item::Item;

/// Name of the persisted record holding the collection.
pub const DEFAULT_RECORD_KEY: &str = "inventory_products";

/// The trait that all storage backends implement.
///
/// Implementations fail fast: no call retries internally.
pub trait ItemStore: Send + Sync {
    /// Read the persisted collection. Nothing stored yet yields an empty vec.
    fn load_all(&self) -> Result<Vec<Item>, StoreError>;

    /// Overwrite the persisted collection with `items`.
    fn save_all(&self, items: &[Item]) -> Result<(), StoreError>;

    /// Approximate serialized size in bytes, for diagnostics.
    fn size_estimate(&self) -> Result<u64, StoreError>;

    /// Persist an empty collection.
    fn clear(&self) -> Result<(), StoreError> {
        self.save_all(&[])
    }
}

impl<S: ItemStore + ?Sized> ItemStore for Box<S> {
    fn load_all(&self) -> Result<Vec<Item>, StoreError> {
        (**self).load_all()
    }

    fn save_all(&self, items: &[Item]) -> Result<(), StoreError> {
        (**self).save_all(items)
    }

    fn size_estimate(&self) -> Result<u64, StoreError> {
        (**self).size_estimate()
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

pub(crate) fn encode(items: &[Item]) -> Result<String, StoreError> {
    serde_json::to_string(items).map_err(StoreError::Serialize)
}

/// Blank text counts as "nothing stored".
pub(crate) fn decode(text: &str) -> Result<Vec<Item>, StoreError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(StoreError::Corrupt)
}
