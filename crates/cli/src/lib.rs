//! Command-line front end for the cart store.
//!
//! Each invocation opens the file-backed cart, runs at most one mutation and
//! reports the resulting item list.

pub mod config;
pub mod error;

use std::path::PathBuf;

use cart::{CartChange, CartItem, CartStore, NewCartItem};
use clap::{Parser, Subcommand};
use kv_store::FileKvStore;
use serde::Serialize;

pub use config::Config;
pub use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "cart")]
#[command(version, about = "Inspect and edit the locally persisted shopping cart")]
pub struct Cli {
    /// Directory holding the persisted cart (overrides CART_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the items in the cart
    List,
    /// Put a product into the cart, or bump its quantity
    Add {
        /// Product identifier
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        title: String,

        /// Image reference
        #[arg(long)]
        image_url: String,

        /// Unit price
        #[arg(long, value_parser = parse_price)]
        price: f64,
    },
    /// Increment the quantity of a product already in the cart
    Increment {
        /// Product identifier
        id: String,
    },
    /// Decrement the quantity of a product, removing it at zero
    Decrement {
        /// Product identifier
        id: String,
    },
}

/// Parses a unit price, rejecting NaN and infinities.
fn parse_price(raw: &str) -> Result<f64, String> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid price {raw:?}: {e}"))?;
    if price.is_finite() {
        Ok(price)
    } else {
        Err(format!("invalid price {raw:?}: must be a finite number"))
    }
}

/// What a command did and the cart it left behind.
#[derive(Debug, Serialize)]
pub struct CommandOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<CartChange>,
    pub products: Vec<CartItem>,
}

impl CommandOutput {
    /// Renders the output as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Opens the file-backed cart described by `config`.
pub async fn open_cart(config: &Config) -> Result<CartStore<FileKvStore>, CliError> {
    let kv = FileKvStore::open(&config.data_dir).await?;
    Ok(CartStore::open(kv, config.cart.clone()).await?)
}

/// Runs one CLI command.
#[tracing::instrument(skip(cli, config), fields(data_dir = tracing::field::Empty))]
pub async fn run(cli: Cli, mut config: Config) -> Result<CommandOutput, CliError> {
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    tracing::Span::current().record("data_dir", tracing::field::display(config.data_dir.display()));

    let cart = open_cart(&config).await?;

    let change = match cli.command {
        Command::List => None,
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => Some(
            cart.add_to_cart(NewCartItem::new(id, title, image_url, price))
                .await?,
        ),
        Command::Increment { id } => Some(cart.increment(&id).await?),
        Command::Decrement { id } => Some(cart.decrement(&id).await?),
    };

    Ok(CommandOutput {
        change,
        products: cart.products(),
    })
}
