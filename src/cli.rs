//! Command-line front end over a file-backed cart.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::cart::{Cart, Product};
use crate::config::Config;
use crate::storage::FileStore;
use crate::store::{CartScope, MutationOutcome, Persistence};

#[derive(Debug, Parser)]
#[command(name = "gomarket-cart", version, about = "Inspect and edit the persisted shopping cart")]
pub struct Cli {
    /// Path to config.toml (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the cart data (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print the cart as JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Show the cart
    List,
    /// Add one unit of a product
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        price: f64,
    },
    /// Add one unit to an existing line item
    Increment { id: String },
    /// Remove one unit from an existing line item (stops at zero)
    Decrement { id: String },
}

/// What a command produced: the resulting cart plus an optional note for
/// stderr.
#[derive(Debug)]
pub struct Report {
    pub cart: Cart,
    pub note: Option<String>,
}

/// Run one command against the cart on disk.
pub async fn run(cli: &Cli) -> Result<Report> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.storage.data_dir.clone())
        .unwrap_or_else(FileStore::default_dir);
    tracing::debug!(data_dir = %data_dir.display(), "Using cart data directory");

    let scope = CartScope::spawn(Arc::new(FileStore::new(data_dir)), config.store.clone());
    let handle = scope.handle();

    let outcome = match &cli.command {
        Command::List => None,
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => Some(
            handle
                .add_to_cart(Product {
                    id: id.clone(),
                    title: title.clone(),
                    image_url: image_url.clone(),
                    price: *price,
                })
                .await?,
        ),
        Command::Increment { id } => Some(handle.increment(id.as_str()).await?),
        Command::Decrement { id } => Some(handle.decrement(id.as_str()).await?),
    };

    let cart = handle.products().await?;
    scope.close().await;

    Ok(Report {
        cart,
        note: outcome.and_then(|outcome| describe(&outcome)),
    })
}

fn describe(outcome: &MutationOutcome) -> Option<String> {
    match outcome {
        MutationOutcome::NotFound { id } => Some(format!("No line item with id '{}' in cart", id)),
        MutationOutcome::Rejected { id, reason } => {
            Some(format!("Product '{}' was not added: {}", id, reason))
        }
        MutationOutcome::Applied {
            id,
            persistence: Persistence::Failed,
            ..
        } => Some(format!(
            "Warning: change to '{}' could not be saved to disk",
            id
        )),
        MutationOutcome::Applied { .. } => None,
    }
}

/// Plain-text table of the cart with totals.
pub fn render_table(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let id_width = cart
        .items()
        .iter()
        .map(|item| item.id.len())
        .max()
        .unwrap_or(0)
        .max(2);
    let title_width = cart
        .items()
        .iter()
        .map(|item| item.title.len())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut out = format!(
        "{:<id_width$}  {:<title_width$}  {:>10}  {:>4}  {:>10}\n",
        "ID", "TITLE", "PRICE", "QTY", "SUBTOTAL"
    );
    for item in cart.items() {
        out.push_str(&format!(
            "{:<id_width$}  {:<title_width$}  {:>10.2}  {:>4}  {:>10.2}\n",
            item.id,
            item.title,
            item.price,
            item.quantity,
            item.subtotal()
        ));
    }
    out.push_str(&format!(
        "{} item(s), total {:.2}\n",
        cart.total_quantity(),
        cart.total_price()
    ));
    out
}

pub fn render_json(cart: &Cart) -> Result<String> {
    serde_json::to_string_pretty(cart).context("Failed to serialize cart")
}
