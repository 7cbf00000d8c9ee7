use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CatalogError, Result};

/// Opaque item identifier, assigned once at creation.
pub type ItemId = String;

/// A single catalog record representing one physical product.
///
/// Serialized with the camelCase field names of the persisted document.
/// `id` and `created_at` never change after creation; everything else may be
/// replaced through an [`ItemPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub price_per_piece: f64,
    #[serde(default)]
    pub price_per_weight: f64,
    /// Encoded image payload produced by the capture pipeline.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Stamp a validated draft with its identity.
    pub fn from_draft(id: ItemId, created_at: DateTime<Utc>, draft: ItemDraft) -> Self {
        Self {
            id,
            name: draft.name,
            color: draft.color,
            weight: draft.weight,
            size: draft.size,
            brand: draft.brand,
            category: draft.category,
            price_per_piece: draft.price_per_piece,
            price_per_weight: draft.price_per_weight,
            image: draft.image,
            notes: draft.notes,
            created_at,
        }
    }

    /// Shallow-merge a patch over this record. Identity is untouched.
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(v) = patch.price_per_piece {
            self.price_per_piece = v;
        }
        if let Some(v) = patch.price_per_weight {
            self.price_per_weight = v;
        }
        merge_text(&mut self.color, patch.color);
        merge_text(&mut self.weight, patch.weight);
        merge_text(&mut self.size, patch.size);
        merge_text(&mut self.brand, patch.brand);
        merge_text(&mut self.category, patch.category);
        merge_text(&mut self.notes, patch.notes);
    }
}

fn merge_text(slot: &mut Option<String>, update: Option<Option<String>>) {
    if let Some(value) = update {
        *slot = value;
    }
}

/// An item as submitted by the host before identity is assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub price_per_piece: f64,
    #[serde(default)]
    pub price_per_weight: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Check the fields required at creation time.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("image", &self.image)?;
        require_price("pricePerPiece", self.price_per_piece)?;
        require_price("pricePerWeight", self.price_per_weight)?;
        Ok(())
    }
}

/// A partial update. Omitted fields are preserved.
///
/// Optional text fields distinguish "omitted" (`None`) from "cleared"
/// (`Some(None)`); in JSON the latter is an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub brand: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_piece: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl ItemPatch {
    /// A patch that overwrites every mutable field with the draft's values.
    pub fn replace_with(draft: ItemDraft) -> Self {
        Self {
            name: Some(draft.name),
            color: Some(draft.color),
            weight: Some(draft.weight),
            size: Some(draft.size),
            brand: Some(draft.brand),
            category: Some(draft.category),
            price_per_piece: Some(draft.price_per_piece),
            price_per_weight: Some(draft.price_per_weight),
            image: Some(draft.image),
            notes: Some(draft.notes),
        }
    }

    /// Supplied `name`/`image` must still be non-empty and supplied prices
    /// finite.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            require_text("name", name)?;
        }
        if let Some(ref image) = self.image {
            require_text("image", image)?;
        }
        if let Some(price) = self.price_per_piece {
            require_price("pricePerPiece", price)?;
        }
        if let Some(price) = self.price_per_weight {
            require_price("pricePerWeight", price)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::validation(field, "required field is empty"));
    }
    Ok(())
}

// JSON has no NaN or infinity; serde_json writes them as `null`, which then
// fails to load as a price.
fn require_price(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CatalogError::validation(field, "price must be a finite number"));
    }
    Ok(())
}

// An explicit `null` must become `Some(None)`, not `None`.
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
