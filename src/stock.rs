//! Stock levels and stock movements
//!
//! Every change to `stock_management.current_stock` is one of the movement
//! kinds below and is logged to `stock_transactions` with a signed quantity:
//! - Additions: `AddStock`, `ReturnFromCustomer`, `ManualAdd`
//! - Deductions: `ReturnToVendor`, `Damaged`, `Expired`, `ManualDeduct`, `Sale`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of stock movement.
///
/// The string form is the `transaction_type` written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    AddStock,
    ReturnFromCustomer,
    ReturnToVendor,
    Damaged,
    Expired,
    ManualAdd,
    ManualDeduct,
    /// Recorded by checkout only
    Sale,
}

impl MovementKind {
    /// Get the `transaction_type` string of the movement
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::AddStock => "add stock",
            MovementKind::ReturnFromCustomer => "return from customer",
            MovementKind::ReturnToVendor => "return to vendor",
            MovementKind::Damaged => "damaged",
            MovementKind::Expired => "expired",
            MovementKind::ManualAdd => "manual add",
            MovementKind::ManualDeduct => "manual deduct",
            MovementKind::Sale => "Sale",
        }
    }

    /// Whether the movement increases stock
    pub fn is_addition(&self) -> bool {
        matches!(
            self,
            MovementKind::AddStock | MovementKind::ReturnFromCustomer | MovementKind::ManualAdd
        )
    }

    /// Signed quantity as written to the log
    pub fn signed(&self, quantity: i64) -> i64 {
        if self.is_addition() { quantity } else { -quantity }
    }

    /// Remark used when the operator leaves the description blank
    pub fn default_remark(&self) -> &'static str {
        match self {
            MovementKind::AddStock => "Added stock to inventory",
            MovementKind::ReturnFromCustomer => "Returned from customer",
            MovementKind::ReturnToVendor => "Returned to vendor",
            MovementKind::Damaged => "Damaged removal",
            MovementKind::Expired => "Expired removal",
            MovementKind::ManualAdd => "Manual add adjustment",
            MovementKind::ManualDeduct => "Manual deduct adjustment",
            MovementKind::Sale => "sales",
        }
    }

    /// Get all movement kinds
    pub fn all() -> &'static [MovementKind] {
        &[
            MovementKind::AddStock,
            MovementKind::ReturnFromCustomer,
            MovementKind::ReturnToVendor,
            MovementKind::Damaged,
            MovementKind::Expired,
            MovementKind::ManualAdd,
            MovementKind::ManualDeduct,
            MovementKind::Sale,
        ]
    }
}

impl FromStr for MovementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "add stock" | "add" => Ok(MovementKind::AddStock),
            "return from customer" | "return customer" => Ok(MovementKind::ReturnFromCustomer),
            "return to vendor" | "return vendor" => Ok(MovementKind::ReturnToVendor),
            "damaged" => Ok(MovementKind::Damaged),
            "expired" => Ok(MovementKind::Expired),
            "manual add" => Ok(MovementKind::ManualAdd),
            "manual deduct" => Ok(MovementKind::ManualDeduct),
            "sale" => Ok(MovementKind::Sale),
            _ => {
                let known: Vec<&str> = MovementKind::all().iter().map(|k| k.as_str()).collect();
                Err(Error::validation(format!(
                    "Unknown stock movement: {} (expected one of: {})",
                    s,
                    known.join(", ")
                )))
            }
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick the remark to log: the operator's text, or the kind's default.
pub fn remark_or_default(kind: MovementKind, remarks: Option<&str>) -> String {
    remarks
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| kind.default_remark().to_string())
}

/// One row of the inventory screen: a product joined with its stock row.
///
/// The stock columns are `None` when the product has never been stocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub product_id: String,
    pub product_name: String,
    pub sku: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub current_stock: Option<i64>,
    pub safety_stock: Option<i64>,
    pub target_stock: Option<i64>,
}

impl InventoryRow {
    /// Current stock, treating an untracked product as zero
    pub fn on_hand(&self) -> i64 {
        self.current_stock.unwrap_or(0)
    }

    /// At or below safety stock
    pub fn is_low(&self) -> bool {
        match (self.current_stock, self.safety_stock) {
            (Some(current), Some(safety)) => current <= safety,
            _ => false,
        }
    }

    /// Units needed to reach the target level
    pub fn shortfall(&self) -> i64 {
        (self.target_stock.unwrap_or(0) - self.on_hand()).max(0)
    }
}

/// Search criteria for the inventory screen
#[derive(Debug, Clone, Default)]
pub struct InventoryFilter {
    /// Substring matched against product id, name, SKU and category name
    pub search: String,
    /// Exact category name; `None` means all categories
    pub category_name: Option<String>,
}

impl InventoryFilter {
    pub fn search(term: &str) -> Self {
        Self {
            search: term.to_string(),
            category_name: None,
        }
    }

    pub fn in_category(mut self, category_name: &str) -> Self {
        self.category_name = Some(category_name.to_string());
        self
    }
}

/// A logged stock movement (`stock_transactions` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovementRecord {
    pub transaction_id: i64,
    pub product_id: String,
    pub quantity: i64,
    pub transaction_type: String,
    pub transaction_date: String,
    pub remarks: Option<String>,
}

/// Validate a movement quantity; zero and negative amounts are rejected.
pub fn check_quantity(quantity: i64) -> Result<()> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_roundtrip_names() {
        for kind in MovementKind::all() {
            assert_eq!(kind.as_str().parse::<MovementKind>().unwrap(), *kind);
        }
        assert_eq!("return-to-vendor".parse::<MovementKind>().unwrap(), MovementKind::ReturnToVendor);
        assert!("teleport".parse::<MovementKind>().is_err());
    }

    #[test]
    fn test_signed_quantity() {
        assert_eq!(MovementKind::AddStock.signed(5), 5);
        assert_eq!(MovementKind::Damaged.signed(5), -5);
        assert_eq!(MovementKind::Sale.signed(2), -2);
    }

    #[test]
    fn test_remark_fallback() {
        assert_eq!(remark_or_default(MovementKind::Expired, None), "Expired removal");
        assert_eq!(remark_or_default(MovementKind::ManualAdd, Some("  ")), "Manual add adjustment");
        assert_eq!(remark_or_default(MovementKind::AddStock, Some("delivery #4")), "delivery #4");
    }

    #[test]
    fn test_low_stock_and_shortfall() {
        let row = InventoryRow {
            product_id: "PID-00001".into(),
            product_name: "TEA".into(),
            sku: "T1".into(),
            category_id: None,
            category_name: None,
            current_stock: Some(3),
            safety_stock: Some(5),
            target_stock: Some(20),
        };
        assert!(row.is_low());
        assert_eq!(row.shortfall(), 17);

        let untracked = InventoryRow { current_stock: None, safety_stock: None, target_stock: None, ..row };
        assert!(!untracked.is_low());
        assert_eq!(untracked.on_hand(), 0);
    }

    #[test]
    fn test_check_quantity() {
        assert!(check_quantity(1).is_ok());
        assert!(matches!(check_quantity(0), Err(Error::InvalidQuantity(0))));
        assert!(check_quantity(-3).is_err());
    }
}
