//! Stockroom - command-line host for the offline inventory catalog.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stockroom_core::{default_data_dir, CatalogConfig, CatalogService, StorageBackend};

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Offline inventory catalog", long_about = None)]
struct Cli {
    /// Config file (TOML); defaults to <data dir>/stockroom/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage file, overriding the configured path
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Storage backend, overriding the configured one: json, sqlite or memory
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Item fields shared by `add` and `update`.
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub weight: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Price per piece
    #[arg(long)]
    pub price: Option<f64>,
    /// Price per unit of weight
    #[arg(long)]
    pub price_per_weight: Option<f64>,
    /// Encoded image payload, e.g. a data URL
    #[arg(long, conflicts_with = "image_file")]
    pub image: Option<String>,
    /// Image file to embed as a base64 data URL
    #[arg(long)]
    pub image_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Add an item
    Add {
        name: String,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Update fields of an item; an empty value clears an optional field
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Remove an item
    Remove { id: String },

    /// Show one item as JSON
    Show { id: String },

    /// List items, optionally searched, filtered and sorted
    List {
        /// Free-text search over name, brand and category
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        min_price: Option<String>,
        #[arg(long)]
        max_price: Option<String>,
        /// Field to sort by, e.g. name or pricePerPiece
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction: asc or desc
        #[arg(long, default_value = "asc")]
        direction: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show item count and storage size
    Stats,

    /// Load demo items into an empty catalog
    Seed,

    /// Delete every item
    Clear,

    /// Print the category and color vocabularies
    Vocab,
}

fn resolve_config(cli: &Cli) -> Result<CatalogConfig, Box<dyn std::error::Error>> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_data_dir().join("config.toml"));
    let mut config = CatalogConfig::load_or_default(&path)?;

    if let Some(ref backend) = cli.backend {
        config.storage.backend = match backend.as_str() {
            "json" => StorageBackend::Json,
            "sqlite" => StorageBackend::Sqlite,
            "memory" => StorageBackend::Memory,
            other => return Err(format!("unknown backend: {}", other).into()),
        };
    }
    if let Some(ref data) = cli.data {
        config.storage.path = Some(data.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let service = CatalogService::from_boxed(config.open_store()?);

    if config.seed_demo_data {
        commands::seed_on_startup(&service);
    }

    match cli.command {
        Command::Add { name, fields } => commands::add(&service, name, fields)?,
        Command::Update { id, name, fields } => commands::update(&service, &id, name, fields)?,
        Command::Remove { id } => {
            service.remove(&id)?;
            println!("Removed {}", id);
        }
        Command::Show { id } => {
            let item = service.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        Command::List {
            query,
            category,
            color,
            brand,
            min_price,
            max_price,
            sort,
            direction,
            json,
        } => {
            let filters = commands::filters(category, color, brand, min_price, max_price);
            let order = commands::order(sort.as_deref(), &direction);
            commands::list(&service, query, filters, order, json)?;
        }
        Command::Stats => {
            let stats = service.stats();
            println!(
                "{} total items stored locally • Storage size: {}",
                stats.total_items,
                stats.display_size()
            );
        }
        Command::Seed => commands::seed(&service, true)?,
        Command::Clear => {
            service.clear()?;
            println!("Catalog cleared");
        }
        Command::Vocab => commands::vocab(),
    }

    Ok(())
}
