//! The catalog service: identity assignment and read/modify/write orchestration.
//!
//! Every mutation loads the whole collection, changes it in memory and writes
//! the whole collection back while holding the service's write lock, so
//! concurrent callers are serialized and no write is lost. Reads take a
//! single snapshot and never block on the write lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::event::CatalogEvent;
use crate::item::{Item, ItemDraft, ItemId, ItemPatch};
use crate::query::CatalogQuery;
use crate::store::{encode, ItemStore};

/// Item count and persisted size of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub total_items: usize,
    pub storage_bytes: u64,
}

impl StorageStats {
    /// Size rendered as kilobytes with two decimals, e.g. `"1.25 KB"`.
    pub fn display_size(&self) -> String {
        format!("{:.2} KB", self.storage_bytes as f64 / 1024.0)
    }
}

/// Sole entry point for hosts: mutations, listing and queries.
pub struct CatalogService {
    store: Box<dyn ItemStore>,
    write_lock: Mutex<()>,
    last_id: AtomicU64,
    subscribers: Mutex<Vec<Sender<CatalogEvent>>>,
}

impl CatalogService {
    pub fn new(store: impl ItemStore + 'static) -> Self {
        Self::from_boxed(Box::new(store))
    }

    pub fn from_boxed(store: Box<dyn ItemStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
            last_id: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &dyn ItemStore {
        self.store.as_ref()
    }

    /// Validate, stamp and append a new item.
    pub fn add(&self, draft: ItemDraft) -> Result<Item> {
        draft.validate()?;

        let _guard = self.lock_writes();
        let mut items = self.store.load_all()?;
        let id = self.next_id(&items);
        let item = Item::from_draft(id, Utc::now(), draft);
        items.push(item.clone());
        self.store.save_all(&items)?;

        debug!(id = %item.id, total = items.len(), "Added item");
        self.emit(CatalogEvent::Created(Box::new(item.clone())));
        Ok(item)
    }

    /// Merge `patch` over the stored item. `id` and `created_at` are kept.
    pub fn update(&self, id: &str, patch: ItemPatch) -> Result<Item> {
        patch.validate()?;

        let _guard = self.lock_writes();
        let mut items = self.store.load_all()?;
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        item.apply(patch);
        let updated = item.clone();
        self.store.save_all(&items)?;

        debug!(id = %updated.id, "Updated item");
        self.emit(CatalogEvent::Updated(Box::new(updated.clone())));
        Ok(updated)
    }

    /// Erase an item. Removing an id that is not present is `NotFound`.
    pub fn remove(&self, id: &str) -> Result<()> {
        let _guard = self.lock_writes();
        let mut items = self.store.load_all()?;
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        self.store.save_all(&items)?;

        debug!(id, total = items.len(), "Removed item");
        self.emit(CatalogEvent::Removed(id.to_string()));
        Ok(())
    }

    /// Current collection. An unreadable store is treated as empty.
    pub fn list(&self) -> Vec<Item> {
        self.try_list().unwrap_or_else(|e| {
            warn!("Failed to load catalog, treating as empty: {}", e);
            Vec::new()
        })
    }

    /// Current collection, surfacing storage failures.
    pub fn try_list(&self) -> Result<Vec<Item>> {
        Ok(self.store.load_all()?)
    }

    pub fn get(&self, id: &str) -> Result<Item> {
        self.try_list()?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Run `query` over one snapshot of the collection.
    pub fn query(&self, query: &CatalogQuery) -> Vec<Item> {
        query.apply(self.list())
    }

    /// Count and serialized size, both taken from one snapshot.
    pub fn stats(&self) -> StorageStats {
        let items = self.list();
        match encode(&items) {
            Ok(document) => StorageStats {
                total_items: items.len(),
                storage_bytes: document.len() as u64,
            },
            Err(e) => {
                warn!("Failed to measure catalog: {}", e);
                StorageStats {
                    total_items: 0,
                    storage_bytes: 0,
                }
            }
        }
    }

    /// Replace the collection with an empty one.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock_writes();
        self.store.clear()?;
        info!("Cleared catalog");
        self.emit(CatalogEvent::Cleared);
        Ok(())
    }

    /// Store `seed` only if the catalog is currently empty.
    ///
    /// Seed records keep their own ids and timestamps; later duplicates of an
    /// id are dropped. Returns the number of records written.
    pub fn seed_if_empty(&self, seed: Vec<Item>) -> Result<usize> {
        let _guard = self.lock_writes();
        if !self.store.load_all()?.is_empty() {
            return Ok(0);
        }

        let mut seen = HashSet::new();
        let items: Vec<Item> = seed
            .into_iter()
            .filter(|i| seen.insert(i.id.clone()))
            .collect();
        if items.is_empty() {
            return Ok(0);
        }
        self.store.save_all(&items)?;

        info!(count = items.len(), "Seeded empty catalog");
        for item in &items {
            self.emit(CatalogEvent::Created(Box::new(item.clone())));
        }
        Ok(items.len())
    }

    /// Receive an event for every persisted change from now on.
    pub fn subscribe(&self) -> Receiver<CatalogEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    fn emit(&self, event: CatalogEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Drop receivers that have gone away
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    // The guarded data is `()`, so a poisoned lock carries no broken state.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Millisecond timestamp, bumped past every id issued or already stored.
    fn next_id(&self, existing: &[Item]) -> ItemId {
        let taken: HashSet<&str> = existing.iter().map(|i| i.id.as_str()).collect();
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut candidate = now.max(self.last_id.load(Ordering::SeqCst) + 1);
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        self.last_id.store(candidate, Ordering::SeqCst);
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::query::{FilterSet, SortDirection, SortKey};
    use crate::store::MemoryItemStore;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn draft(name: &str) -> ItemDraft {
        ItemDraft::new(name, "data:image/jpeg;base64,/9j/")
    }

    /// Wraps a memory store and fails writes on demand.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryItemStore,
        fail_writes: AtomicBool,
    }

    impl ItemStore for Arc<FlakyStore> {
        fn load_all(&self) -> std::result::Result<Vec<Item>, StoreError> {
            self.inner.load_all()
        }

        fn save_all(&self, items: &[Item]) -> std::result::Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("disk full".into()));
            }
            self.inner.save_all(items)
        }

        fn size_estimate(&self) -> std::result::Result<u64, StoreError> {
            self.inner.size_estimate()
        }
    }

    #[test]
    fn add_stamps_identity_and_persists() {
        let service = CatalogService::new(MemoryItemStore::new());
        let before = Utc::now();
        let item = service.add(draft("Desk Lamp")).unwrap();
        assert!(!item.id.is_empty());
        assert!(item.created_at >= before);
        assert_eq!(service.list(), vec![item]);
    }

    #[test]
    fn non_finite_price_is_rejected_and_store_stays_readable() {
        let service = CatalogService::new(MemoryItemStore::new());
        let kept = service.add(draft("Kept")).unwrap();

        let mut bad = draft("Broken");
        bad.price_per_piece = f64::NAN;
        let err = service.add(bad).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "pricePerPiece"));

        let patch = ItemPatch {
            price_per_weight: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&kept.id, patch),
            Err(CatalogError::Validation { .. })
        ));

        assert_eq!(service.try_list().unwrap(), vec![kept]);
        assert!(service.add(draft("After")).is_ok());
    }

    #[test]
    fn add_rejects_missing_fields_without_writing() {
        let service = CatalogService::new(MemoryItemStore::new());
        let err = service.add(ItemDraft::new("", "img")).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "name"));
        let err = service.add(ItemDraft::new("Lamp", "")).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "image"));
        assert_eq!(service.store().size_estimate().unwrap(), 0);
    }

    #[test]
    fn rapid_adds_get_unique_increasing_ids() {
        let service = CatalogService::new(MemoryItemStore::new());
        let ids: Vec<u64> = (0..50)
            .map(|n| service.add(draft(&format!("item {}", n))).unwrap().id.parse().unwrap())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ids_skip_values_already_stored() {
        let store = MemoryItemStore::new();
        let far_future = (Utc::now().timestamp_millis() + 60_000).to_string();
        let existing = Item::from_draft(far_future.clone(), Utc::now(), draft("Old"));
        store.save_all(&[existing]).unwrap();

        let service = CatalogService::new(store);
        service.last_id.store(far_future.parse::<u64>().unwrap() - 1, Ordering::SeqCst);
        let item = service.add(draft("New")).unwrap();
        assert_ne!(item.id, far_future);
        assert_eq!(service.list().len(), 2);
    }

    #[test]
    fn update_merges_and_preserves_identity() {
        let service = CatalogService::new(MemoryItemStore::new());
        let mut d = draft("Mug");
        d.brand = Some("Acme".into());
        d.price_per_piece = 4.0;
        let original = service.add(d).unwrap();

        let updated = service
            .update(
                &original.id,
                ItemPatch {
                    price_per_piece: Some(6.5),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.brand.as_deref(), Some("Acme"));
        assert_eq!(updated.price_per_piece, 6.5);
        assert_eq!(service.get(&original.id).unwrap(), updated);
    }

    #[test]
    fn update_missing_is_not_found() {
        let service = CatalogService::new(MemoryItemStore::new());
        let err = service.update("nope", ItemPatch::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_rejects_blank_name() {
        let service = CatalogService::new(MemoryItemStore::new());
        let item = service.add(draft("Mug")).unwrap();
        let patch = ItemPatch {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&item.id, patch),
            Err(CatalogError::Validation { .. })
        ));
        assert_eq!(service.get(&item.id).unwrap().name, "Mug");
    }

    #[test]
    fn remove_twice_reports_not_found() {
        let service = CatalogService::new(MemoryItemStore::new());
        let item = service.add(draft("Mug")).unwrap();
        service.remove(&item.id).unwrap();
        assert!(service.remove(&item.id).unwrap_err().is_not_found());
        assert!(service.list().is_empty());
    }

    #[test]
    fn corrupt_store_lists_empty_but_blocks_mutation() {
        let service = CatalogService::new(MemoryItemStore::with_document("[oops"));
        assert!(service.list().is_empty());
        assert!(service.try_list().is_err());
        assert_eq!(service.stats().total_items, 0);

        let err = service.add(draft("Mug")).unwrap_err();
        assert!(matches!(err, CatalogError::StorageUnavailable(StoreError::Corrupt(_))));
    }

    #[test]
    fn failed_write_propagates_and_keeps_old_state() {
        let store = Arc::new(FlakyStore::default());
        let service = CatalogService::new(store.clone());
        let kept = service.add(draft("Kept")).unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        let rx = service.subscribe();
        let err = service.add(draft("Lost")).unwrap_err();
        assert!(matches!(err, CatalogError::StorageUnavailable(_)));
        assert!(service.remove(&kept.id).is_err());
        assert!(rx.try_recv().is_err());
        assert_eq!(service.list(), vec![kept]);
    }

    #[test]
    fn query_runs_pipeline_on_snapshot() {
        let service = CatalogService::new(MemoryItemStore::new());
        for (name, category, price) in [
            ("Red Mug", "Home", 5.0),
            ("Blue Mug", "Home", 15.0),
            ("Red Shirt", "Clothing", 20.0),
        ] {
            let mut d = draft(name);
            d.category = Some(category.into());
            d.price_per_piece = price;
            service.add(d).unwrap();
        }
        let q = CatalogQuery::new()
            .text("mug")
            .filters(FilterSet::new().category("Home"))
            .sort_by(SortKey::PricePerPiece, SortDirection::Descending);
        let names: Vec<String> = service.query(&q).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Blue Mug", "Red Mug"]);
    }

    #[test]
    fn stats_report_count_and_size() {
        let service = CatalogService::new(MemoryItemStore::new());
        assert_eq!(service.stats().display_size(), "0.00 KB");
        service.add(draft("Mug")).unwrap();
        let stats = service.stats();
        assert_eq!(stats.total_items, 1);
        assert_eq!(
            stats.storage_bytes,
            service.store().size_estimate().unwrap()
        );
        let stats = StorageStats {
            total_items: 0,
            storage_bytes: 1536,
        };
        assert_eq!(stats.display_size(), "1.50 KB");
    }

    #[test]
    fn seed_only_when_empty() {
        let service = CatalogService::new(MemoryItemStore::new());
        let seed = vec![
            Item::from_draft("1".into(), Utc::now(), draft("One")),
            Item::from_draft("2".into(), Utc::now(), draft("Two")),
            Item::from_draft("1".into(), Utc::now(), draft("Dup")),
        ];
        assert_eq!(service.seed_if_empty(seed.clone()).unwrap(), 2);
        assert_eq!(service.seed_if_empty(seed).unwrap(), 0);
        let ids: Vec<String> = service.list().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn clear_empties_catalog() {
        let service = CatalogService::new(MemoryItemStore::new());
        service.add(draft("Mug")).unwrap();
        service.clear().unwrap();
        assert!(service.list().is_empty());
    }

    #[test]
    fn subscribers_see_persisted_changes() {
        let service = CatalogService::new(MemoryItemStore::new());
        let rx = service.subscribe();
        let item = service.add(draft("Mug")).unwrap();
        service
            .update(
                &item.id,
                ItemPatch {
                    notes: Some(Some("chipped".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        service.remove(&item.id).unwrap();
        service.clear().unwrap();

        let events: Vec<CatalogEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], CatalogEvent::Created(_)));
        assert!(matches!(events[1], CatalogEvent::Updated(ref i) if i.notes.as_deref() == Some("chipped")));
        assert_eq!(events[2], CatalogEvent::Removed(item.id));
        assert_eq!(events[3], CatalogEvent::Cleared);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let service = CatalogService::new(MemoryItemStore::new());
        drop(service.subscribe());
        service.add(draft("Mug")).unwrap();
        assert!(service.subscribers.lock().unwrap().is_empty());
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let service = Arc::new(CatalogService::new(MemoryItemStore::new()));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    for n in 0..10 {
                        service.add(draft(&format!("t{}-{}", t, n))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let items = service.list();
        assert_eq!(items.len(), 80);
        let unique: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(unique.len(), 80);
    }
}
