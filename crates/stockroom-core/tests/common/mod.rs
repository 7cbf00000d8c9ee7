//! Shared builders for integration tests

use stockroom_core::{CatalogService, ItemDraft, MemoryItemStore};

pub const IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ";

/// Draft with the given name, category and per-piece price.
pub fn product(name: &str, category: &str, price: f64) -> ItemDraft {
    let mut draft = ItemDraft::new(name, IMAGE);
    draft.category = Some(category.to_string());
    draft.price_per_piece = price;
    draft
}

/// Service over a fresh in-memory store.
#[allow(dead_code)]
pub fn memory_service() -> CatalogService {
    CatalogService::new(MemoryItemStore::new())
}

/// The three-item catalog used by pipeline tests.
#[allow(dead_code)]
pub fn mug_catalog() -> CatalogService {
    let service = memory_service();
    service.add(product("Red Mug", "Home", 5.0)).unwrap();
    service.add(product("Blue Mug", "Home", 15.0)).unwrap();
    service.add(product("Red Shirt", "Clothing", 20.0)).unwrap();
    service
}
