//! Sales records and checkout receipts

use crate::customer::Customer;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A line written to `sales` by checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub sales_trans_id: i64,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Result of a successful checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub lines: Vec<ReceiptLine>,
    pub total: f64,
    pub customer: Option<Customer>,
}

impl Receipt {
    /// Render the sales summary shown after checkout
    pub fn summary(&self, currency: &str) -> String {
        let mut out = String::from("Sales Summary:\n");
        for line in &self.lines {
            let _ = writeln!(
                out,
                "{}: Quantity {}, Total {}{:.2}",
                line.product_name, line.quantity, currency, line.total_price
            );
        }
        let _ = write!(out, "\nTotal Sale Amount: {}{:.2}", currency, self.total);
        if let Some(customer) = &self.customer {
            let _ = write!(out, "\n\nCustomer: {}", customer);
        }
        out
    }
}

impl std::fmt::Display for Receipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary("$"))
    }
}

/// A row of the sales history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub sales_trans_id: i64,
    pub product_id: String,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub sale_date: String,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
}

/// Criteria for listing sales
#[derive(Debug, Clone)]
pub struct SalesFilter {
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub limit: usize,
}

impl Default for SalesFilter {
    fn default() -> Self {
        Self {
            customer_id: None,
            product_id: None,
            limit: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_with_customer() {
        let receipt = Receipt {
            lines: vec![ReceiptLine {
                sales_trans_id: 1,
                product_id: "PID-00001".into(),
                product_name: "GREEN TEA".into(),
                quantity: 2,
                unit_price: 2.5,
                total_price: 5.0,
            }],
            total: 5.0,
            customer: Some(Customer {
                customer_id: "cus-000001".into(),
                customer_name: "Ana".into(),
                mobile_number: "0917".into(),
            }),
        };

        let text = receipt.to_string();
        assert!(text.starts_with("Sales Summary:\nGREEN TEA: Quantity 2, Total $5.00\n"));
        assert!(text.contains("Total Sale Amount: $5.00"));
        assert!(text.ends_with("Customer: Ana (0917)"));
        assert!(receipt.summary("€").contains("Total €5.00"));
    }
}
