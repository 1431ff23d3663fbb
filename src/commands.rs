use crate::{CategoryCommand, CustomerCommand, ProductArgs, ProductCommand, StockCommand};
use owo_colors::OwoColorize;
use std::path::Path;
use stockpos::config::{self, StockposConfig};
use stockpos::output::{OutputMode, emit_success};
use stockpos::storage::SqliteStore;
use stockpos::ui::{self, Icons, banner, section, success};
use stockpos::{
    Cart, CartProduct, Error, InventoryFilter, MovementKind, NewProduct, ProductFilter,
    SalesFilter, StockMovementRecord,
};

/// Settings shared by every command handler
pub struct Context {
    pub mode: OutputMode,
    pub currency: String,
}

impl Context {
    fn human(&self) -> bool {
        self.mode.is_human()
    }
}

/// Screens of the suite and the subcommand that opens each one
const SCREENS: &[(&str, &str, &str)] = &[
    ("Point of Sale", "stockpos pos", "Cart, customer lookup and checkout"),
    ("Inventory", "stockpos stock list", "Stock levels and adjustments"),
    ("Products", "stockpos product list", "Add, update and delete products"),
    ("Categories", "stockpos category list", "Manage product categories"),
    ("Customers", "stockpos customer list", "Customer lookup and registration"),
    ("Sales", "stockpos sales", "Sales history"),
];

fn print_or_empty(table: String, what: &str) {
    if table.is_empty() {
        println!("{} No {} found.", Icons::EMPTY, what);
    } else {
        println!("{}", table);
    }
}

pub fn run_init(path: &Path, config: &StockposConfig, force: bool, mode: OutputMode) -> anyhow::Result<()> {
    config::write_config(path, config, force)?;

    let db_path = config.database_path(None);
    config::ensure_db_dir(&db_path)?;
    SqliteStore::open(&db_path)?;

    if mode.is_human() {
        success(&format!("Wrote {}", path.display()));
        ui::status(Icons::DATABASE, "Database", &db_path.display().to_string());
        ui::info("Currency", config.currency());
    } else {
        let data = serde_json::json!({
            "config": path.display().to_string(),
            "database": db_path.display().to_string(),
            "currency": config.currency(),
        });
        emit_success(mode, "init", data)?;
    }
    Ok(())
}

pub fn run_menu(mode: OutputMode) -> anyhow::Result<()> {
    if mode.is_human() {
        banner(
            &format!("{}", "Stockpos".bold().style(ui::theme().accent.clone())),
            &format!("Version {}", env!("CARGO_PKG_VERSION").bold()),
        );
        println!("{}", ui::menu_table(SCREENS));
    } else {
        let screens: Vec<_> = SCREENS
            .iter()
            .map(|(screen, command, purpose)| {
                serde_json::json!({ "screen": screen, "command": command, "purpose": purpose })
            })
            .collect();
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "screens": screens,
        });
        emit_success(mode, "menu", data)?;
    }
    Ok(())
}

pub fn run_stats(store: &SqliteStore, ctx: &Context, db_path: &Path) -> anyhow::Result<()> {
    let stats = store.stats()?;
    tracing::debug!("{}", stats);
    if !ctx.human() {
        return emit_success(ctx.mode, "stats", &stats);
    }

    ui::header("Stockpos statistics");
    ui::status(Icons::STATS, "Database", &db_path.display().to_string());
    let revenue = ui::money(&ctx.currency, stats.revenue);
    let rows = [
        ("Categories", stats.categories.to_string()),
        ("Products", stats.products.to_string()),
        ("Stocked products", stats.stocked_products.to_string()),
        ("Low stock", stats.low_stock.to_string()),
        ("Stock transactions", stats.stock_transactions.to_string()),
        ("Customers", stats.customers.to_string()),
        ("Sales", stats.sales.to_string()),
        ("Revenue", revenue),
    ];
    let pairs: Vec<(&str, &str)> = rows.iter().map(|(k, v)| (*k, v.as_str())).collect();
    println!("{}", ui::stats_table(&pairs));
    Ok(())
}

pub fn run_category(store: &mut SqliteStore, ctx: &Context, cmd: CategoryCommand) -> anyhow::Result<()> {
    match cmd {
        CategoryCommand::List => {
            let categories = store.list_categories()?;
            if ctx.human() {
                section("Categories");
                print_or_empty(ui::categories_table(&categories), "categories");
                ui::status(Icons::TAG, "Total", &categories.len().to_string());
            } else {
                emit_success(ctx.mode, "category list", &categories)?;
            }
        }
        CategoryCommand::Add { name, description } => {
            let category = store.add_category(&name, description.as_deref())?;
            if ctx.human() {
                success(&format!("Added {} {}", category.category_id, category.category_name));
            } else {
                emit_success(ctx.mode, "category add", &category)?;
            }
        }
        CategoryCommand::Update { id, name, description } => {
            let category = store.update_category(&id, &name, description.as_deref())?;
            if ctx.human() {
                success(&format!("Updated {} {}", category.category_id, category.category_name));
            } else {
                emit_success(ctx.mode, "category update", &category)?;
            }
        }
        CategoryCommand::Delete { id } => {
            store.delete_category(&id)?;
            if ctx.human() {
                success(&format!("Deleted {}", id));
            } else {
                emit_success(ctx.mode, "category delete", serde_json::json!({ "category_id": id }))?;
            }
        }
    }
    Ok(())
}

/// Build product input, falling back to `base` for omitted fields
fn product_input(fields: ProductArgs, base: Option<NewProduct>) -> NewProduct {
    let base = base.unwrap_or_default();
    NewProduct {
        name: fields.name.unwrap_or(base.name),
        sku: fields.sku.unwrap_or(base.sku),
        category_id: fields.category.unwrap_or(base.category_id),
        price: fields.price.unwrap_or(base.price),
        description: fields.description.or(base.description),
    }
}

pub fn run_product(store: &mut SqliteStore, ctx: &Context, cmd: ProductCommand) -> anyhow::Result<()> {
    match cmd {
        ProductCommand::List { search, category } => {
            let mut filter = ProductFilter::search(&search);
            if let Some(category) = &category {
                filter = filter.in_category(category);
            }
            let products = store.search_products(&filter)?;
            if ctx.human() {
                section("Products");
                if !search.trim().is_empty() {
                    ui::status(Icons::SEARCH, "Search", &search);
                }
                print_or_empty(ui::products_table(&products, &ctx.currency), "products");
            } else {
                emit_success(ctx.mode, "product list", &products)?;
            }
        }
        ProductCommand::Add(fields) => {
            if fields.price.is_none() {
                anyhow::bail!("Price is required");
            }
            let product = store.add_product(&product_input(fields, None))?;
            if ctx.human() {
                success(&format!("Added {} {}", product.product_id, product.product_name));
            } else {
                emit_success(ctx.mode, "product add", &product)?;
            }
        }
        ProductCommand::Update { id, fields } => {
            let current = store
                .get_product(&id)?
                .ok_or_else(|| Error::ProductNotFound(id.clone()))?;
            let base = NewProduct {
                name: current.product_name,
                sku: current.sku,
                category_id: current.category_id.unwrap_or_default(),
                price: current.price,
                description: current.description,
            };
            let product = store.update_product(&id, &product_input(fields, Some(base)))?;
            if ctx.human() {
                success(&format!("Updated {} {}", product.product_id, product.product_name));
            } else {
                emit_success(ctx.mode, "product update", &product)?;
            }
        }
        ProductCommand::Delete { id } => {
            store.delete_product(&id)?;
            if ctx.human() {
                success(&format!("Deleted {}", id));
            } else {
                emit_success(ctx.mode, "product delete", serde_json::json!({ "product_id": id }))?;
            }
        }
        ProductCommand::NextId => {
            let next = store.next_product_id()?;
            if ctx.human() {
                ui::status(Icons::PACKAGE, "Next product id", &next);
            } else {
                emit_success(ctx.mode, "product next-id", serde_json::json!({ "product_id": next }))?;
            }
        }
    }
    Ok(())
}

fn report_movement(ctx: &Context, record: &StockMovementRecord, on_hand: i64) -> anyhow::Result<()> {
    if ctx.human() {
        ui::movement(record);
        ui::summary_row("Current stock:", &on_hand.to_string());
        Ok(())
    } else {
        let data = serde_json::json!({ "movement": record, "current_stock": on_hand });
        emit_success(ctx.mode, "stock", data)
    }
}

fn move_and_report(
    store: &mut SqliteStore,
    ctx: &Context,
    product_id: &str,
    kind: MovementKind,
    quantity: i64,
    remarks: Option<&str>,
) -> anyhow::Result<()> {
    let record = store.apply_movement(product_id, kind, quantity, remarks)?;
    let on_hand = store.current_stock(product_id)?;
    report_movement(ctx, &record, on_hand)
}

pub fn run_stock(store: &mut SqliteStore, ctx: &Context, cmd: StockCommand) -> anyhow::Result<()> {
    match cmd {
        StockCommand::List { search, category } => {
            let mut filter = InventoryFilter::search(&search);
            if let Some(category) = &category {
                filter = filter.in_category(category);
            }
            let rows = store.inventory(&filter)?;
            if ctx.human() {
                if let Some(category) = &category {
                    if !store.category_names()?.contains(category) {
                        ui::warn(&format!("No category named {}", category));
                    }
                }
                section("Inventory");
                print_or_empty(ui::inventory_table(&rows), "products");
            } else {
                emit_success(ctx.mode, "stock list", &rows)?;
            }
        }
        StockCommand::Add { product_id, quantity, remarks } => {
            move_and_report(store, ctx, &product_id, MovementKind::AddStock, quantity, remarks.as_deref())?;
        }
        StockCommand::ReturnCustomer { product_id, quantity, remarks } => {
            move_and_report(store, ctx, &product_id, MovementKind::ReturnFromCustomer, quantity, remarks.as_deref())?;
        }
        StockCommand::ReturnVendor { product_id, quantity, remarks } => {
            move_and_report(store, ctx, &product_id, MovementKind::ReturnToVendor, quantity, remarks.as_deref())?;
        }
        StockCommand::Remove { product_id, quantity, reason, remarks } => {
            move_and_report(store, ctx, &product_id, reason.into(), quantity, remarks.as_deref())?;
        }
        StockCommand::Adjust { product_id, quantity, direction, remarks } => {
            move_and_report(store, ctx, &product_id, direction.into(), quantity, remarks.as_deref())?;
        }
        StockCommand::Levels { product_id, safety, target } => {
            store.set_stock_levels(&product_id, safety, target)?;
            let row = store.inventory_row(&product_id)?;
            if ctx.human() {
                success(&format!("Stock levels for {}: safety {}, target {}", product_id, safety, target));
            } else {
                emit_success(ctx.mode, "stock levels", &row)?;
            }
        }
        StockCommand::Low => {
            let rows = store.low_stock()?;
            if ctx.human() {
                section("Low stock");
                print_or_empty(ui::inventory_table(&rows), "low-stock products");
                if !rows.is_empty() {
                    let needed: i64 = rows.iter().map(|r| r.shortfall()).sum();
                    println!(
                        "{} {} product(s) need {} unit(s) to reach target",
                        Icons::WARN,
                        rows.len().style(ui::theme().low_stock.clone()),
                        needed
                    );
                }
            } else {
                emit_success(ctx.mode, "stock low", &rows)?;
            }
        }
        StockCommand::History { product_id, kind, limit } => {
            let kind = kind.map(|k| k.parse::<MovementKind>()).transpose()?;
            let records = store.stock_history_by_kind(product_id.as_deref(), kind, limit)?;
            if ctx.human() {
                section("Stock transactions");
                print_or_empty(ui::history_table(&records), "stock transactions");
            } else {
                emit_success(ctx.mode, "stock history", &records)?;
            }
        }
    }
    Ok(())
}

pub fn run_customer(store: &mut SqliteStore, ctx: &Context, cmd: CustomerCommand) -> anyhow::Result<()> {
    match cmd {
        CustomerCommand::Find { mobile } => {
            let customer = store
                .find_customer_by_mobile(&mobile)?
                .ok_or_else(|| Error::CustomerNotFound(mobile.clone()))?;
            if ctx.human() {
                ui::status(Icons::PERSON, "Customer", &customer.to_string());
                ui::status(Icons::PHONE, "Mobile", &customer.mobile_number);
                ui::summary_row("Id:", &customer.customer_id);
            } else {
                emit_success(ctx.mode, "customer find", &customer)?;
            }
        }
        CustomerCommand::Add { name, mobile } => {
            let customer = store.add_customer(&name, &mobile)?;
            if ctx.human() {
                success(&format!("Added {} {}", customer.customer_id, customer));
            } else {
                emit_success(ctx.mode, "customer add", &customer)?;
            }
        }
        CustomerCommand::List => {
            let customers = store.list_customers()?;
            if ctx.human() {
                section("Customers");
                print_or_empty(ui::customers_table(&customers), "customers");
            } else {
                emit_success(ctx.mode, "customer list", &customers)?;
            }
        }
    }
    Ok(())
}

/// Parse `PID-00001:3`; a bare product id means one unit
fn parse_item(item: &str) -> anyhow::Result<(String, i64)> {
    match item.rsplit_once(':') {
        Some((id, qty)) => {
            let qty = qty
                .trim()
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Invalid quantity in item '{}'", item))?;
            Ok((id.trim().to_string(), qty))
        }
        None => Ok((item.trim().to_string(), 1)),
    }
}

pub fn run_checkout(
    store: &mut SqliteStore,
    ctx: &Context,
    items: &[String],
    mobile: Option<&str>,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let mut cart = Cart::new();
    for item in items {
        let (product_id, quantity) = parse_item(item)?;
        let product = store
            .get_product(&product_id)?
            .ok_or_else(|| Error::ProductNotFound(product_id.clone()))?;
        let available = store.current_stock(&product_id)?;
        cart.add(
            CartProduct {
                product_id: product.product_id,
                product_name: product.product_name,
                unit_price: product.price,
            },
            quantity,
            available,
        )?;
    }

    if let Some(mobile) = mobile {
        let customer = match (store.find_customer_by_mobile(mobile)?, name) {
            (Some(customer), _) => customer,
            (None, Some(name)) => store.add_customer(name, mobile)?,
            (None, None) => return Err(Error::CustomerNotFound(mobile.to_string()).into()),
        };
        cart.set_customer(customer);
    }

    if ctx.human() {
        section("Cart");
        println!("{}", ui::cart_table(cart.lines(), &ctx.currency));
    }

    let receipt = store.checkout(&cart)?;
    if ctx.human() {
        println!();
        println!("{} {}", Icons::RECEIPT, receipt.summary(&ctx.currency));
        success("Sale recorded");
    } else {
        emit_success(ctx.mode, "checkout", &receipt)?;
    }
    Ok(())
}

pub fn run_pos(store: &mut SqliteStore, ctx: &Context) -> anyhow::Result<()> {
    if !ctx.human() {
        anyhow::bail!("The point-of-sale session is only available in human mode.");
    }

    banner(
        &format!("{} {}", Icons::CART, "Point of Sale".bold().style(ui::theme().accent.clone())),
        "search, add, customer, checkout; 'help' lists every command",
    );
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut session = stockpos::pos::PosSession::new(store, &ctx.currency);
    session.run(stdin.lock(), &mut stdout)?;
    Ok(())
}

pub fn run_sales(store: &SqliteStore, ctx: &Context, filter: &SalesFilter) -> anyhow::Result<()> {
    if let Some(customer_id) = &filter.customer_id {
        if store.get_customer(customer_id)?.is_none() {
            return Err(Error::CustomerNotFound(customer_id.clone()).into());
        }
    }
    let sales = store.list_sales(filter)?;
    if ctx.human() {
        section("Sales");
        print_or_empty(ui::sales_table(&sales, &ctx.currency), "sales");
        let total: f64 = sales.iter().map(|s| s.total_price).sum();
        ui::summary_row("Total:", &ui::money(&ctx.currency, total));
    } else {
        emit_success(ctx.mode, "sales", &sales)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("PID-00001:3").unwrap(), ("PID-00001".to_string(), 3));
        assert_eq!(parse_item("PID-00002").unwrap(), ("PID-00002".to_string(), 1));
        assert!(parse_item("PID-00001:x").is_err());
    }

    #[test]
    fn test_product_input_keeps_unset_fields() {
        let base = NewProduct::new("TEA", "T-1", "PC-001", 2.5).with_description("loose leaf");
        let fields = ProductArgs {
            name: None,
            sku: None,
            category: None,
            price: Some(3.0),
            description: None,
        };
        let input = product_input(fields, Some(base));
        assert_eq!(input.name, "TEA");
        assert_eq!(input.price, 3.0);
        assert_eq!(input.description.as_deref(), Some("loose leaf"));
    }
}
