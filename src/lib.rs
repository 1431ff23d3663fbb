//! # Stockpos - Inventory and Point-of-Sale Suite
//!
//! Every screen of the suite works against one shared SQLite database.
//!
//! Stockpos provides:
//! - Category and product management with generated identifiers
//! - Stock adjustments, each paired with a transaction-log row
//! - An in-memory cart and a transactional checkout
//! - Customer lookup and sales history

pub mod category;
pub mod product;
pub mod stock;
pub mod customer;
pub mod cart;
pub mod sale;
pub mod storage;
pub mod pos;
pub mod ui;
pub mod output;
pub mod config;

// Re-exports for convenient access
pub use category::Category;
pub use product::{NewProduct, Product, ProductFilter};
pub use stock::{InventoryFilter, InventoryRow, MovementKind, StockMovementRecord};
pub use customer::Customer;
pub use cart::{Cart, CartLine, CartProduct};
pub use sale::{Receipt, SaleRecord, SalesFilter};
pub use storage::SqliteStore;

/// Result type alias for Stockpos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Stockpos operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Quantity must be greater than zero (got {0})")]
    InvalidQuantity(i64),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category name already exists: {0}")]
    DuplicateCategory(String),

    #[error("Cannot delete category {id}: {count} product(s) are assigned to it")]
    CategoryInUse { id: String, count: i64 },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("SKU already exists: {0}")]
    DuplicateSku(String),

    #[error("Cannot delete product {0}: it has sales or stock history")]
    ProductInUse(String),

    #[error("Product not found in stock management: {0}")]
    NotStocked(String),

    #[error("Insufficient stock for {product_id}: only {available} units available, {requested} requested")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    #[error("Stock of {0} would exceed the largest storable quantity")]
    QuantityOverflow(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Mobile number already registered: {0}")]
    DuplicateMobile(String),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("No cart line at position {0}")]
    CartLineNotFound(usize),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

/// Returns `Ok(trimmed)` for a non-blank field, otherwise a validation error naming it.
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Picks the lowest positive number not present in `used`.
///
/// Category and product identifiers reuse the first gap left by deletions.
pub(crate) fn lowest_free_number(mut used: Vec<u32>) -> u32 {
    used.sort_unstable();
    used.dedup();
    let mut next = 1;
    for num in used {
        if num != next {
            break;
        }
        next += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_free_number_fills_gaps() {
        assert_eq!(lowest_free_number(vec![]), 1);
        assert_eq!(lowest_free_number(vec![1, 2, 3]), 4);
        assert_eq!(lowest_free_number(vec![3, 1, 4]), 2);
        assert_eq!(lowest_free_number(vec![2, 3]), 1);
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("Name", "  soap ").unwrap(), "soap");
        assert!(matches!(required("Name", "   "), Err(Error::Validation(_))));
    }
}
