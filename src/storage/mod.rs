//! Storage Layer - SQLite-backed persistence
//!
//! One shared database file holds every screen's data:
//! - product_categories(category_id, category_name, description)
//! - products(product_id, product_name, sku, category_id, category_name, price, description)
//! - stock_management(product_id, current_stock, safety_stock, target_stock)
//! - stock_transactions(transaction_id, product_id, quantity, transaction_type, transaction_date, remarks)
//! - sales(sales_trans_id, product_id, quantity, unit_price, total_price, sale_date)
//! - customer_list(customer_id, customer_name, mobile_number)
//! - customer_sales(id, sales_trans_id, customer_id)

pub mod schema;
pub mod sqlite;
mod inventory;
mod sales;

pub use sqlite::{SqliteStore, DbStats};
