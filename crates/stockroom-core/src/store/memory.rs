use std::sync::Mutex;

use crate::error::StoreError;
use crate::item::Item;
use crate::store::{decode, encode, ItemStore};

/// In-memory store holding the serialized document.
///
/// Keeps the encoded text rather than the items so that reads and writes go
/// through the same codec as the durable backends.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    document: Mutex<Option<String>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw document text, which need not be valid.
    pub fn with_document(text: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(text.into())),
        }
    }

    /// The raw persisted text, if anything has been stored.
    pub fn document(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StoreError> {
        self.document
            .lock()
            .map_err(|e| StoreError::Backend(format!("memory store lock: {}", e)))
    }
}

impl ItemStore for MemoryItemStore {
    fn load_all(&self) -> Result<Vec<Item>, StoreError> {
        match self.lock()?.as_deref() {
            Some(text) => decode(text),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&self, items: &[Item]) -> Result<(), StoreError> {
        let text = encode(items)?;
        *self.lock()? = Some(text);
        Ok(())
    }

    fn size_estimate(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.as_ref().map_or(0, |t| t.len() as u64))
    }
}
