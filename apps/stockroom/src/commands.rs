use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use stockroom_core::demo::{demo_items, CATEGORIES, COLORS};
use stockroom_core::{
    CatalogQuery, CatalogService, FilterSet, Item, ItemDraft, ItemPatch, SortDescriptor,
    SortDirection, SortKey,
};

use crate::FieldArgs;

type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Read an image file and wrap it as a data URL.
fn image_data_url(path: &Path) -> CmdResult<String> {
    let bytes = std::fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn image_arg(fields: &FieldArgs) -> CmdResult<Option<String>> {
    match (&fields.image, &fields.image_file) {
        (Some(payload), _) => Ok(Some(payload.clone())),
        (None, Some(path)) => Ok(Some(image_data_url(path)?)),
        (None, None) => Ok(None),
    }
}

// Empty text on the command line means "clear this field".
fn optional_text(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.is_empty() { None } else { Some(v) })
}

pub fn add(service: &CatalogService, name: String, fields: FieldArgs) -> CmdResult {
    let image = image_arg(&fields)?.unwrap_or_default();
    let draft = ItemDraft {
        name,
        color: fields.color,
        weight: fields.weight,
        size: fields.size,
        brand: fields.brand,
        category: fields.category,
        price_per_piece: fields.price.unwrap_or(0.0),
        price_per_weight: fields.price_per_weight.unwrap_or(0.0),
        image,
        notes: fields.notes,
    };
    let item = service.add(draft)?;
    println!("Added {} ({})", item.name, item.id);
    Ok(())
}

pub fn update(
    service: &CatalogService,
    id: &str,
    name: Option<String>,
    fields: FieldArgs,
) -> CmdResult {
    let patch = ItemPatch {
        name,
        image: image_arg(&fields)?,
        color: optional_text(fields.color),
        weight: optional_text(fields.weight),
        size: optional_text(fields.size),
        brand: optional_text(fields.brand),
        category: optional_text(fields.category),
        notes: optional_text(fields.notes),
        price_per_piece: fields.price,
        price_per_weight: fields.price_per_weight,
    };
    if patch.is_empty() {
        return Err("nothing to update".into());
    }
    let item = service.update(id, patch)?;
    println!("Updated {} ({})", item.name, item.id);
    Ok(())
}

pub fn filters(
    category: Option<String>,
    color: Option<String>,
    brand: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
) -> FilterSet {
    FilterSet {
        category,
        color,
        brand,
        min_price: min_price.as_deref().and_then(FilterSet::parse_price),
        max_price: max_price.as_deref().and_then(FilterSet::parse_price),
    }
}

pub fn order(sort: Option<&str>, direction: &str) -> Option<SortDescriptor> {
    let key = sort.and_then(SortKey::parse);
    if sort.is_some() && key.is_none() {
        tracing::warn!("Unknown sort key {:?}, keeping catalog order", sort);
    }
    key.map(|key| SortDescriptor {
        key,
        direction: SortDirection::parse(direction).unwrap_or_default(),
    })
}

pub fn list(
    service: &CatalogService,
    text: String,
    filters: FilterSet,
    sort: Option<SortDescriptor>,
    json: bool,
) -> CmdResult {
    let query = CatalogQuery {
        text,
        filters,
        sort,
    };
    let items = service.query(&query);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        if query.is_unconstrained() {
            println!("No products yet");
        } else {
            println!("No products found");
        }
        return Ok(());
    }

    println!(
        "{:<15} {:<24} {:<14} {:<16} {:>10} {:>10}  {}",
        "ID", "NAME", "BRAND", "CATEGORY", "PRICE", "PER WT", "ADDED"
    );
    for item in &items {
        print_row(item);
    }
    let n = items.len();
    println!("{} product{}", n, if n == 1 { "" } else { "s" });
    Ok(())
}

fn print_row(item: &Item) {
    println!(
        "{:<15} {:<24} {:<14} {:<16} {:>10} {:>10}  {}",
        item.id,
        truncate(&item.name, 24),
        truncate(item.brand.as_deref().unwrap_or("-"), 14),
        truncate(item.category.as_deref().unwrap_or("-"), 16),
        format!("${:.2}", item.price_per_piece),
        format!("${:.2}", item.price_per_weight),
        item.created_at.format("%b %-d, %Y"),
    );
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Seed demo items if the catalog is empty; `verbose` reports the outcome.
pub fn seed(service: &CatalogService, verbose: bool) -> CmdResult {
    let inserted = service.seed_if_empty(demo_items())?;
    if inserted > 0 {
        eprintln!("Demo products loaded. Start adding your own products!");
    } else if verbose {
        println!("Catalog is not empty; nothing seeded");
    }
    Ok(())
}

/// First-run seeding. An unreadable store is left alone so the requested
/// command still runs.
pub fn seed_on_startup(service: &CatalogService) {
    if let Err(e) = seed(service, false) {
        tracing::warn!("Skipping demo seed: {}", e);
    }
}

pub fn vocab() {
    println!("Categories: {}", CATEGORIES.join(", "));
    println!("Colors: {}", COLORS.join(", "));
}
