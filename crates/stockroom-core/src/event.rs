use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemId};

/// Events emitted by the catalog service after a write has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CatalogEvent {
    Created(Box<Item>),
    Updated(Box<Item>),
    Removed(ItemId),
    Cleared,
}

impl CatalogEvent {
    /// The item this event concerns, if it names a single one.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            CatalogEvent::Created(item) | CatalogEvent::Updated(item) => Some(&item.id),
            CatalogEvent::Removed(id) => Some(id),
            CatalogEvent::Cleared => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;
    use chrono::Utc;

    #[test]
    fn item_id_of_events() {
        let item = Item::from_draft("42".into(), Utc::now(), ItemDraft::new("Vase", "img"));
        assert_eq!(CatalogEvent::Created(Box::new(item.clone())).item_id(), Some("42"));
        assert_eq!(CatalogEvent::Updated(Box::new(item)).item_id(), Some("42"));
        assert_eq!(CatalogEvent::Removed("7".into()).item_id(), Some("7"));
        assert_eq!(CatalogEvent::Cleared.item_id(), None);
    }
}
