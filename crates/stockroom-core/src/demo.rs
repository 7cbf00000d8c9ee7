//! Vocabularies offered to hosts and the records seeded on first run.

use chrono::Utc;

use crate::item::Item;

/// Categories offered by the item form. Advisory only.
pub const CATEGORIES: [&str; 8] = [
    "Electronics",
    "Clothing",
    "Food & Beverage",
    "Home & Garden",
    "Sports",
    "Books",
    "Beauty",
    "Others",
];

/// Colors offered by the item form. Advisory only.
pub const COLORS: [&str; 12] = [
    "Black", "White", "Red", "Blue", "Green", "Yellow", "Orange", "Purple", "Pink", "Brown",
    "Gray", "Others",
];

fn placeholder_image(fill: &str) -> String {
    format!(
        "data:image/svg+xml,%3csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'%3e\
         %3crect width='24' height='24' fill='%23{}'/%3e%3c/svg%3e",
        fill
    )
}

/// Three sample products with fixed ids `1`..`3`, stamped now.
pub fn demo_items() -> Vec<Item> {
    let now = Utc::now();
    let make = |id: &str,
                name: &str,
                (color, weight, size): (&str, &str, &str),
                (brand, category): (&str, &str),
                (per_piece, per_weight): (f64, f64),
                fill: &str| Item {
        id: id.to_string(),
        name: name.to_string(),
        color: Some(color.to_string()),
        weight: Some(weight.to_string()),
        size: Some(size.to_string()),
        brand: Some(brand.to_string()),
        category: Some(category.to_string()),
        price_per_piece: per_piece,
        price_per_weight: per_weight,
        image: placeholder_image(fill),
        notes: None,
        created_at: now,
    };

    vec![
        make(
            "1",
            "Wireless Headphones",
            ("Black", "250g", "Medium"),
            ("TechBrand", "Electronics"),
            (99.99, 399.96),
            "374151",
        ),
        make(
            "2",
            "Organic Coffee Beans",
            ("Brown", "500g", "Large"),
            ("BrewMaster", "Food & Beverage"),
            (24.99, 49.98),
            "6b7280",
        ),
        make(
            "3",
            "Cotton T-Shirt",
            ("White", "180g", "Large"),
            ("ComfortWear", "Clothing"),
            (19.99, 111.06),
            "9ca3af",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_items_are_valid_and_use_vocabularies() {
        let items = demo_items();
        assert_eq!(items.len(), 3);
        for item in &items {
            assert!(!item.name.is_empty());
            assert!(item.image.starts_with("data:image/"));
            assert!(CATEGORIES.contains(&item.category.as_deref().unwrap()));
            assert!(COLORS.contains(&item.color.as_deref().unwrap()));
        }
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
