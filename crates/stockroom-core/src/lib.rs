//! Stockroom Core - offline inventory catalog engine
//!
//! - **Item**: the catalog record, drafts for creation and patches for updates
//! - **Store**: whole-collection persistence behind the [`ItemStore`] trait
//!   (in-memory, JSON file, and SQLite with the `sqlite` feature)
//! - **Query**: pure search → filter → sort pipeline over a snapshot
//! - **Service**: [`CatalogService`], identity assignment and serialized
//!   read/modify/write, the only entry point hosts mutate through
//! - **Config**: backend selection and data locations

pub mod config;
pub mod demo;
pub mod error;
pub mod event;
pub mod item;
pub mod query;
pub mod service;
pub mod store;

pub use config::{default_data_dir, CatalogConfig, StorageBackend, StorageConfig};
pub use error::{CatalogError, ConfigError, Result, StoreError};
pub use event::CatalogEvent;
pub use item::{Item, ItemDraft, ItemId, ItemPatch};
pub use query::{
    filter, pipeline, search, sort, CatalogQuery, FilterSet, SortDescriptor, SortDirection,
    SortKey,
};
pub use service::{CatalogService, StorageStats};
pub use store::{ItemStore, JsonFileStore, MemoryItemStore, DEFAULT_RECORD_KEY};

#[cfg(feature = "sqlite")]
pub use store::SqliteItemStore;
