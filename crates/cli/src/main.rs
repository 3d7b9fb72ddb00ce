//! Orbitcart CLI - command-line storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Authenticate (reconciles the local cart with the server cart)
//! orbitcart login -e user@example.com -p 'secret'
//!
//! # Browse the catalog
//! orbitcart products list --page 1
//! orbitcart search "trail running shoes"
//!
//! # Work with the cart
//! orbitcart cart add 42 --quantity 2
//! orbitcart cart sync
//! ```
//!
//! # Configuration
//!
//! - `ORBITCART_API_URL` - backend base URL (fallback: `NEXT_PUBLIC_API_URL`)
//! - `ORBITCART_STATE_DIR` - session/cart state directory (default `~/.orbitcart`)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;

use orbitcart_client::{ApiClient, ApiError, CatalogClient, ClientConfig, ConfigError, EventTracker};
use orbitcart_core::{EmailError, ProductId};

mod commands;
mod store;

use store::{FileSession, LocalCartFile};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("State file error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidArgument(String),
}

#[derive(Parser)]
#[command(name = "orbitcart")]
#[command(author, version, about = "Orbitcart storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and reconcile the local cart with the server cart
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log in
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List categories
    Categories,
    /// Semantic product search
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Products recommended alongside the given one
    Recommend {
        /// Product id
        product_id: i32,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 5)]
        limit: u32,
    },
    /// The orbit-embedding neighborhood around a product
    Orbit {
        /// Product id
        product_id: i32,
    },
    /// Work with the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Send a tracking event
    Track {
        /// Event kind: view, cart, or purchase
        kind: String,

        /// Product id
        product_id: i32,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page
        #[arg(long, default_value_t = 20)]
        per_page: u32,

        /// Restrict to a category id
        #[arg(long)]
        category: Option<i32>,
    },
    /// Show a single product
    Show {
        /// Product id
        product_id: i32,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the local cart (and the server cart when logged in)
    Show,
    /// Add a product to the local cart
    Add {
        /// Product id
        product_id: i32,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the local cart
    Remove {
        /// Product id
        product_id: i32,
    },
    /// Push the local cart to the server, then pull the merged result
    Sync,
}

#[tokio::main]
async fn main() {
    // Initialize tracing; RUST_LOG controls verbosity
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn build_client() -> Result<(ApiClient, PathBuf), CliError> {
    let config = ClientConfig::from_env()?;
    let state_dir = store::state_dir();
    let session = Arc::new(FileSession::new(&state_dir));
    let client = ApiClient::new(config, session)?;
    Ok((client, state_dir))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let (client, state_dir) = build_client()?;
    let cart_file = LocalCartFile::new(&state_dir);

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&client, &cart_file, &email, &password).await?;
        }
        Commands::Signup {
            name,
            email,
            password,
        } => {
            commands::auth::signup(&client, &cart_file, &name, &email, &password).await?;
        }
        Commands::Logout => commands::auth::logout(&client).await,
        Commands::Whoami => commands::auth::whoami(&client).await?,
        Commands::Products { action } => {
            let catalog = CatalogClient::new(client);
            match action {
                ProductsAction::List {
                    page,
                    per_page,
                    category,
                } => {
                    commands::catalog::list_products(&catalog, page, per_page, category).await?;
                }
                ProductsAction::Show { product_id } => {
                    commands::catalog::show_product(&catalog, ProductId::new(product_id)).await?;
                }
            }
        }
        Commands::Categories => {
            let catalog = CatalogClient::new(client);
            commands::catalog::list_categories(&catalog).await?;
        }
        Commands::Search { query, limit } => {
            commands::catalog::search(&client, &query, limit).await?;
        }
        Commands::Recommend { product_id, limit } => {
            commands::catalog::recommend(&client, ProductId::new(product_id), limit).await?;
        }
        Commands::Orbit { product_id } => {
            commands::catalog::orbit(&client, ProductId::new(product_id)).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&client, &cart_file).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => {
                let tracker = EventTracker::new(client.clone());
                commands::cart::add(&cart_file, &tracker, ProductId::new(product_id), quantity)
                    .await?;
            }
            CartAction::Remove { product_id } => {
                commands::cart::remove(&cart_file, ProductId::new(product_id))?;
            }
            CartAction::Sync => commands::cart::sync(&client, &cart_file).await?,
        },
        Commands::Track { kind, product_id } => {
            let tracker = EventTracker::new(client.clone());
            commands::track::send(&tracker, &kind, ProductId::new(product_id)).await?;
        }
    }
    Ok(())
}
