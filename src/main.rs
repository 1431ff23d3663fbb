//! Stockpos CLI - inventory and point-of-sale screens over one shared database

mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use stockpos::config::{self, StockposConfig};
use stockpos::output::{OutputMode, error_envelope};
use stockpos::storage::SqliteStore;
use stockpos::MovementKind;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Context;

#[derive(Parser)]
#[command(name = "stockpos")]
#[command(version)]
#[command(about = "Inventory and point-of-sale suite over a shared SQLite database")]
#[command(long_about = r#"
Stockpos keeps categories, products, stock levels, customers and sales in
one SQLite file that every screen shares:
  • Category and product management
  • Stock adjustments with a full transaction log
  • A point-of-sale cart with transactional checkout

Example usage:
  stockpos category add --name beverages
  stockpos product add --name "green tea" --sku GT-01 --category PC-001 --price 2.50
  stockpos stock add PID-00001 24
  stockpos checkout --item PID-00001:2 --customer 09171234567
  stockpos pos
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to ./stockpos.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter stockpos.toml and create the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,

        /// Currency symbol written to the config
        #[arg(long)]
        currency: Option<String>,
    },

    /// List the screens and the command that opens each one
    Menu,

    /// Show statistics about the database
    Stats,

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Product management
    #[command(subcommand)]
    Product(ProductCommand),

    /// Inventory stock adjustments
    #[command(subcommand)]
    Stock(StockCommand),

    /// Customer lookup and registration
    #[command(subcommand)]
    Customer(CustomerCommand),

    /// Sell a list of items in one transaction
    Checkout {
        /// Item as PRODUCT_ID[:QTY]; repeat for more lines
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,

        /// Customer mobile number
        #[arg(short, long)]
        customer: Option<String>,

        /// Register the customer under this name when the mobile is new
        #[arg(short, long, requires = "customer")]
        name: Option<String>,
    },

    /// Interactive point-of-sale session on stdin/stdout
    Pos,

    /// Sales history, newest first
    Sales {
        /// Only sales linked to this customer id
        #[arg(long)]
        customer: Option<String>,

        /// Only sales of this product id
        #[arg(long)]
        product: Option<String>,

        /// Maximum number of rows
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// List all categories
    List,

    /// Add a category (the name is stored upper-case)
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Rename or re-describe a category
    Update {
        /// Category id, e.g. PC-001
        id: String,

        #[arg(short, long)]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a category no product uses
    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub sku: Option<String>,

    /// Category id, e.g. PC-001
    #[arg(short, long)]
    pub category: Option<String>,

    #[arg(short, long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand)]
pub enum ProductCommand {
    /// Search products by id, name or SKU
    List {
        #[arg(short, long, default_value = "")]
        search: String,

        /// Restrict to one category id
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Add a product; the next free PID is assigned
    Add(ProductArgs),

    /// Update a product; omitted fields keep their current value
    Update {
        /// Product id, e.g. PID-00001
        id: String,

        #[command(flatten)]
        fields: ProductArgs,
    },

    /// Delete a product with no stock or sales history
    Delete {
        id: String,
    },

    /// Show the id the next product will get
    NextId,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RemovalReason {
    Damaged,
    Expired,
}

impl From<RemovalReason> for MovementKind {
    fn from(reason: RemovalReason) -> Self {
        match reason {
            RemovalReason::Damaged => MovementKind::Damaged,
            RemovalReason::Expired => MovementKind::Expired,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Direction {
    Add,
    Deduct,
}

impl From<Direction> for MovementKind {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Add => MovementKind::ManualAdd,
            Direction::Deduct => MovementKind::ManualDeduct,
        }
    }
}

#[derive(Subcommand)]
pub enum StockCommand {
    /// Inventory view: products with their stock levels
    List {
        #[arg(short, long, default_value = "")]
        search: String,

        /// Exact category name
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Receive stock
    Add {
        product_id: String,
        quantity: i64,
        #[arg(short, long)]
        remarks: Option<String>,
    },

    /// Take back goods from a customer
    ReturnCustomer {
        product_id: String,
        quantity: i64,
        #[arg(short, long)]
        remarks: Option<String>,
    },

    /// Send goods back to the vendor
    ReturnVendor {
        product_id: String,
        quantity: i64,
        #[arg(short, long)]
        remarks: Option<String>,
    },

    /// Write off damaged or expired stock
    Remove {
        product_id: String,
        quantity: i64,
        #[arg(long, value_enum)]
        reason: RemovalReason,
        #[arg(short, long)]
        remarks: Option<String>,
    },

    /// Manual correction in either direction
    Adjust {
        product_id: String,
        quantity: i64,
        #[arg(long, value_enum)]
        direction: Direction,
        #[arg(short, long)]
        remarks: Option<String>,
    },

    /// Set safety and target stock levels
    Levels {
        product_id: String,
        #[arg(long)]
        safety: i64,
        #[arg(long)]
        target: i64,
    },

    /// Products at or below their safety stock
    Low,

    /// Stock transaction log, newest first
    History {
        product_id: Option<String>,
        /// Only this movement kind, e.g. damaged or "add stock"
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// Look a customer up by mobile number
    Find {
        mobile: String,
    },

    /// Register a customer
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        mobile: String,
    },

    /// List all customers
    List,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Menu => "menu",
            Commands::Stats => "stats",
            Commands::Category(_) => "category",
            Commands::Product(_) => "product",
            Commands::Stock(_) => "stock",
            Commands::Customer(_) => "customer",
            Commands::Checkout { .. } => "checkout",
            Commands::Pos => "pos",
            Commands::Sales { .. } => "sales",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mode = OutputMode::from_flag(cli.json);
    let command = cli.command.name();

    match run(cli, mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if mode.is_human() {
                stockpos::ui::error(&e.to_string());
            } else {
                let envelope = error_envelope(command, &e.to_string());
                println!("{}", serde_json::to_string_pretty(&envelope).unwrap_or_default());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, mode: OutputMode) -> anyhow::Result<()> {
    let loaded = config::load_config(cli.config.as_deref())?;

    if let Commands::Init { force, currency } = &cli.command {
        let path = cli.config.clone().unwrap_or_else(config::default_config_path);
        let mut starter = loaded.unwrap_or_else(StockposConfig::starter);
        if let Some(db) = &cli.database {
            starter.database = Some(db.display().to_string());
        }
        if let Some(currency) = currency {
            starter.currency = Some(currency.clone());
        }
        return commands::run_init(&path, &starter, *force, mode);
    }

    let config = loaded.unwrap_or_default();
    if matches!(cli.command, Commands::Menu) {
        return commands::run_menu(mode);
    }

    let db_path = config.database_path(cli.database.as_deref());
    config::ensure_db_dir(&db_path)?;
    tracing::debug!("Opening database {}", db_path.display());
    let mut store = SqliteStore::open(&db_path)?;

    let ctx = Context {
        mode,
        currency: config.currency().to_string(),
    };

    match cli.command {
        Commands::Init { .. } | Commands::Menu => Ok(()),
        Commands::Stats => commands::run_stats(&store, &ctx, &db_path),
        Commands::Category(cmd) => commands::run_category(&mut store, &ctx, cmd),
        Commands::Product(cmd) => commands::run_product(&mut store, &ctx, cmd),
        Commands::Stock(cmd) => commands::run_stock(&mut store, &ctx, cmd),
        Commands::Customer(cmd) => commands::run_customer(&mut store, &ctx, cmd),
        Commands::Checkout { items, customer, name } => commands::run_checkout(
            &mut store,
            &ctx,
            &items,
            customer.as_deref(),
            name.as_deref(),
        ),
        Commands::Pos => commands::run_pos(&mut store, &ctx),
        Commands::Sales { customer, product, limit } => {
            let filter = stockpos::SalesFilter {
                customer_id: customer,
                product_id: product,
                limit,
            };
            commands::run_sales(&store, &ctx, &filter)
        }
    }
}
