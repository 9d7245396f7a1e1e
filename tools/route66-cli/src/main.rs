//! Route 66 CLI - Command line tool for the Route 66 storefront.
//!
//! Commands:
//! - `route66 catalog` - Validate and browse the product catalog
//! - `route66 search` - Run a storefront search
//! - `route66 cart` - Manage a locally persisted cart
//! - `route66 serve` - Run the HTTP API
//! - `route66 config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CartArgs, CatalogArgs, ConfigArgs, SearchArgs, ServeArgs};

/// Route 66 CLI - Browse, test and serve the storefront
#[derive(Parser)]
#[command(name = "route66")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and browse the product catalog
    Catalog(CatalogArgs),

    /// Search products by name, category or size
    Search(SearchArgs),

    /// Manage the local cart
    Cart(CartArgs),

    /// Run the storefront HTTP API
    Serve(ServeArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;
    ctx.init_logging()?;

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx),
        Commands::Search(args) => commands::search::run(args, &ctx),
        Commands::Cart(args) => commands::cart::run(args, &ctx),
        Commands::Serve(args) => commands::serve::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
