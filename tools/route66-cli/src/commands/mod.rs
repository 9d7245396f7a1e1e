//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod search;
pub mod serve;

use clap::{Args, Subcommand};

/// Catalog file override shared by commands that read products.
#[derive(Args, Clone, Default)]
pub struct CatalogSource {
    /// Product JSON file (default: `catalog.path` from the config).
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<String>,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,

    #[command(flatten)]
    pub source: CatalogSource,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Check the catalog against the product schema.
    Validate,
    /// List products the way a catalog page shows them.
    List(ListArgs),
    /// List categories with their product counts.
    Categories,
}

/// Category, filter and sort options for `catalog list`.
#[derive(Args, Default)]
pub struct ListArgs {
    /// Category name or slug.
    #[arg(long)]
    pub category: Option<String>,

    /// Sort order: featured, price-asc or price-desc.
    #[arg(short, long, default_value = "featured")]
    pub sort: String,

    /// Keep products with some size priced at least this.
    #[arg(long)]
    pub min_price: Option<String>,

    /// Keep products with some size priced at most this.
    #[arg(long)]
    pub max_price: Option<String>,

    /// Hide products with nothing in stock.
    #[arg(long)]
    pub in_stock: bool,

    /// Minimum THCa percentage.
    #[arg(long)]
    pub min_potency: Option<f64>,

    /// Maximum THCa percentage.
    #[arg(long)]
    pub max_potency: Option<f64>,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Text matched against name, category and sizes.
    pub query: String,

    #[command(flatten)]
    pub source: CatalogSource,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,

    /// Cart storage directory (default: `cart.store_dir` from the config).
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<String>,

    #[command(flatten)]
    pub source: CatalogSource,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    Show,
    /// Add one size of a product.
    Add {
        /// Product name or id.
        product: String,
        /// Size label, e.g. "3.5g".
        size: String,
        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        qty: i64,
    },
    /// Set the quantity of a line; zero or less removes it.
    Update {
        /// Variant id shown by `cart show`.
        variant: String,
        /// New quantity.
        qty: i64,
    },
    /// Remove a line.
    Remove {
        /// Variant id shown by `cart show`.
        variant: String,
    },
    /// Empty the cart.
    Clear,
    /// Check out the cart and append the order to the transaction log.
    Checkout,
}

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Listen address (default: `server.bind_addr` from the config).
    #[arg(short, long)]
    pub bind: Option<String>,

    #[command(flatten)]
    pub source: CatalogSource,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
