//! Search, filter and sort over an in-memory snapshot of the catalog.
//!
//! Everything here is a pure function of its inputs: each call takes the
//! candidate items by value and returns the reduced or reordered sequence.
//! Nothing here fails. A query the engine cannot interpret (blank text,
//! empty filter values, no sort key) leaves the sequence as it was.
//!
//! The fixed composition used by hosts is [`pipeline`]:
//! search, then filter, then sort.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Case-insensitive substring match against name, brand and category.
///
/// Blank or whitespace-only queries pass every item through untouched.
pub fn search(items: Vec<Item>, query: &str) -> Vec<Item> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            contains_ci(&item.name, &needle)
                || item.brand.as_deref().is_some_and(|b| contains_ci(b, &needle))
                || item.category.as_deref().is_some_and(|c| contains_ci(c, &needle))
        })
        .collect()
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Named optional constraints, combined with AND.
///
/// `None` and empty strings impose no constraint. `category` and `color` must
/// match exactly; `brand` is a case-insensitive substring match; the price
/// bounds are inclusive and apply to `price_per_piece`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    pub category: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn min_price(mut self, min: f64) -> Self {
        self.min_price = Some(min);
        self
    }

    pub fn max_price(mut self, max: f64) -> Self {
        self.max_price = Some(max);
        self
    }

    /// Number of constraints that will actually be applied.
    pub fn active_count(&self) -> usize {
        [
            active_text(&self.category).is_some(),
            active_text(&self.color).is_some(),
            active_text(&self.brand).is_some(),
            active_price(self.min_price).is_some(),
            active_price(self.max_price).is_some(),
        ]
        .iter()
        .filter(|on| **on)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Parse a price typed into a form field.
    ///
    /// Blank or unparsable input yields `None`, i.e. no constraint.
    pub fn parse_price(text: &str) -> Option<f64> {
        text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Whether a single item satisfies every active constraint.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(category) = active_text(&self.category) {
            if item.category.as_deref() != Some(category) {
                return false;
            }
        }
        if let Some(color) = active_text(&self.color) {
            if item.color.as_deref() != Some(color) {
                return false;
            }
        }
        if let Some(brand) = active_text(&self.brand) {
            let needle = brand.to_lowercase();
            if !item.brand.as_deref().is_some_and(|b| contains_ci(b, &needle)) {
                return false;
            }
        }
        if let Some(min) = active_price(self.min_price) {
            if item.price_per_piece < min {
                return false;
            }
        }
        if let Some(max) = active_price(self.max_price) {
            if item.price_per_piece > max {
                return false;
            }
        }
        true
    }
}

fn active_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn active_price(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Keep the items matching every active constraint in `filters`.
pub fn filter(items: Vec<Item>, filters: &FilterSet) -> Vec<Item> {
    if filters.is_empty() {
        return items;
    }
    items.into_iter().filter(|item| filters.matches(item)).collect()
}

/// Orderable item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    Name,
    Brand,
    Category,
    Color,
    Size,
    Weight,
    Notes,
    PricePerPiece,
    PricePerWeight,
    CreatedAt,
}

impl SortKey {
    pub const ALL: [SortKey; 11] = [
        SortKey::Id,
        SortKey::Name,
        SortKey::Brand,
        SortKey::Category,
        SortKey::Color,
        SortKey::Size,
        SortKey::Weight,
        SortKey::Notes,
        SortKey::PricePerPiece,
        SortKey::PricePerWeight,
        SortKey::CreatedAt,
    ];

    /// Look up a key by its persisted field name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name.trim())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Brand => "brand",
            SortKey::Category => "category",
            SortKey::Color => "color",
            SortKey::Size => "size",
            SortKey::Weight => "weight",
            SortKey::Notes => "notes",
            SortKey::PricePerPiece => "pricePerPiece",
            SortKey::PricePerWeight => "pricePerWeight",
            SortKey::CreatedAt => "createdAt",
        }
    }

    fn value(&self, item: &Item) -> Option<SortValue> {
        let text = |v: &Option<String>| v.as_deref().map(|s| SortValue::Text(s.to_lowercase()));
        match self {
            SortKey::Id => Some(SortValue::Text(item.id.to_lowercase())),
            SortKey::Name => Some(SortValue::Text(item.name.to_lowercase())),
            SortKey::Brand => text(&item.brand),
            SortKey::Category => text(&item.category),
            SortKey::Color => text(&item.color),
            SortKey::Size => text(&item.size),
            SortKey::Weight => text(&item.weight),
            SortKey::Notes => text(&item.notes),
            SortKey::PricePerPiece => Some(SortValue::Number(item.price_per_piece)),
            SortKey::PricePerWeight => Some(SortValue::Number(item.price_per_weight)),
            SortKey::CreatedAt => Some(SortValue::Time(item.created_at)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed sort value; values produced by one key are always the same variant.
#[derive(Debug, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            // Total order; a NaN sorts above every number.
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Time(a), SortValue::Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

// Absent values order before present ones.
fn compare_present(a: &Option<SortValue>, b: &Option<SortValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub key: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }

    /// Column-header click: the same key flips ascending to descending,
    /// anything else starts ascending on the clicked key.
    pub fn toggle(current: Option<SortDescriptor>, clicked: SortKey) -> Self {
        match current {
            Some(c) if c.key == clicked && c.direction == SortDirection::Ascending => {
                Self::descending(clicked)
            }
            _ => Self::ascending(clicked),
        }
    }
}

/// Stable sort by one key. `None` keeps the input order.
///
/// Ties keep their relative input order in both directions.
pub fn sort(items: Vec<Item>, key: Option<SortKey>, direction: SortDirection) -> Vec<Item> {
    let Some(key) = key else {
        return items;
    };

    let mut keyed: Vec<(Option<SortValue>, Item)> =
        items.into_iter().map(|item| (key.value(&item), item)).collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord = compare_present(a, b);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Search, then filter, then sort.
pub fn pipeline(
    items: Vec<Item>,
    query: &str,
    filters: &FilterSet,
    order: Option<SortDescriptor>,
) -> Vec<Item> {
    let items = search(items, query);
    let items = filter(items, filters);
    match order {
        Some(d) => sort(items, Some(d.key), d.direction),
        None => items,
    }
}

/// The inputs to [`pipeline`] bundled as one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub text: String,
    pub filters: FilterSet,
    pub sort: Option<SortDescriptor>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn sort_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort = Some(SortDescriptor { key, direction });
        self
    }

    /// True when applying this query cannot change membership.
    pub fn is_unconstrained(&self) -> bool {
        self.text.trim().is_empty() && self.filters.is_empty()
    }

    pub fn apply(&self, items: Vec<Item>) -> Vec<Item> {
        pipeline(items, &self.text, &self.filters, self.sort)
    }
}
