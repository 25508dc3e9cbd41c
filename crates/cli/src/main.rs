//! repX CLI - Catalog, pricing and cart snapshot tools.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! repx-cli catalog
//!
//! # Price a cart: two Beast Mode tees in M, one No Pain No Gain in Navy, with a coupon
//! repx-cli quote --item 1:M --item 1:M --item 2:L:Navy --coupon REPX10
//!
//! # Inspect a shopper's persisted cart
//! repx-cli snapshot show --data-dir /var/lib/repx --shopper 0b5e...
//! ```
//!
//! Pricing and catalog settings come from the same `REPX_*` environment
//! variables the storefront reads.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

use commands::quote::ItemSpec;

#[derive(Parser)]
#[command(name = "repx-cli")]
#[command(author, version, about = "repX storefront tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with prices and colours
    Catalog,
    /// Price a cart built from the given items
    Quote {
        /// Item as `<id>[:<size>[:<color>]]`; repeat to add more units
        #[arg(short, long = "item", required = true)]
        items: Vec<ItemSpec>,

        /// Coupon code to apply
        #[arg(short, long)]
        coupon: Option<String>,
    },
    /// Inspect persisted cart snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Show one shopper's snapshot with durability and totals
    Show {
        /// Snapshot directory (defaults to `REPX_DATA_DIR`)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Shopper ID from the storefront session
        #[arg(short, long)]
        shopper: Uuid,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt().without_time().with_target(false).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = repx_storefront::config::StorefrontConfig::from_env()?;
    match cli.command {
        Commands::Catalog => commands::catalog::list(&config)?,
        Commands::Quote { items, coupon } => {
            commands::quote::quote(&config, &items, coupon.as_deref())?;
        }
        Commands::Snapshot { action } => match action {
            SnapshotAction::Show { data_dir, shopper } => {
                let data_dir = data_dir
                    .or_else(|| config.data_dir.clone())
                    .ok_or("no --data-dir given and REPX_DATA_DIR not set")?;
                commands::snapshot::show(&config, &data_dir, shopper);
            }
        },
    }
    Ok(())
}
