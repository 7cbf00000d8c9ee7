//! Query pipeline integration tests

mod common;

use common::{memory_service, mug_catalog, product};
use stockroom_core::{
    filter, pipeline, search, CatalogQuery, FilterSet, SortDescriptor, SortDirection, SortKey,
};

fn names(items: &[stockroom_core::Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

#[test]
fn test_search_filter_sort_end_to_end() {
    let service = mug_catalog();
    let result = pipeline(
        service.list(),
        "mug",
        &FilterSet::new().category("Home"),
        Some(SortDescriptor::descending(SortKey::PricePerPiece)),
    );
    assert_eq!(names(&result), vec!["Blue Mug", "Red Mug"]);
}

#[test]
fn test_empty_search_returns_collection_unchanged() {
    let service = mug_catalog();
    let items = service.list();
    assert_eq!(search(items.clone(), ""), items);
}

#[test]
fn test_category_filter_is_exact() {
    let service = mug_catalog();
    let result = filter(service.list(), &FilterSet::new().category("Clothing"));
    assert_eq!(names(&result), vec!["Red Shirt"]);
    assert_eq!(filter(service.list(), &FilterSet::new()), service.list());
}

#[test]
fn test_filters_run_before_sort() {
    let service = mug_catalog();
    let query = CatalogQuery::new()
        .filters(FilterSet::new().max_price(15.0))
        .sort_by(SortKey::Name, SortDirection::Ascending);
    assert_eq!(names(&service.query(&query)), vec!["Blue Mug", "Red Mug"]);
}

#[test]
fn test_unknown_sort_key_keeps_order() {
    let service = mug_catalog();
    let key = SortKey::parse("warehouseBin");
    assert!(key.is_none());
    let result = stockroom_core::sort(service.list(), key, SortDirection::Descending);
    assert_eq!(names(&result), vec!["Red Mug", "Blue Mug", "Red Shirt"]);
}

#[test]
fn test_sort_by_created_at_puts_newest_first() {
    let service = memory_service();
    service.add(product("Older", "Books", 1.0)).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    service.add(product("Newer", "Books", 1.0)).unwrap();
    let query = CatalogQuery::new().sort_by(SortKey::CreatedAt, SortDirection::Descending);
    assert_eq!(names(&service.query(&query)), vec!["Newer", "Older"]);
}

#[test]
fn test_brand_filter_and_search_combine() {
    let service = memory_service();
    let mut kettle = product("Kettle", "Home & Garden", 30.0);
    kettle.brand = Some("BrewMaster".into());
    let mut beans = product("Coffee Beans", "Food & Beverage", 12.0);
    beans.brand = Some("BrewMaster".into());
    let mut toaster = product("Toaster", "Home & Garden", 25.0);
    toaster.brand = Some("HeatCo".into());
    for d in [kettle, beans, toaster] {
        service.add(d).unwrap();
    }

    let query = CatalogQuery::new()
        .text("home")
        .filters(FilterSet::new().brand("brew"));
    assert_eq!(names(&service.query(&query)), vec!["Kettle"]);
}
