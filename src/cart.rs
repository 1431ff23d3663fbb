//! In-memory point-of-sale cart
//!
//! The cart never touches the database. Callers pass the stock available for
//! a product so quantities can be checked before checkout.

use crate::customer::Customer;
use crate::stock::check_quantity;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// The product details a cart line needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
}

/// One line of the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub total_price: f64,
}

impl CartLine {
    fn new(product: CartProduct, quantity: i64) -> Self {
        let mut line = Self {
            product_id: product.product_id,
            product_name: product.product_name,
            unit_price: product.unit_price,
            quantity: 0,
            total_price: 0.0,
        };
        line.set_quantity(quantity);
        line
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.total_price = self.unit_price * quantity as f64;
    }
}

/// The cart of the current sale, plus the customer it is assigned to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    customer: Option<Customer>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// Returns the index of the affected line.
    pub fn add(&mut self, product: CartProduct, quantity: i64, available: i64) -> Result<usize> {
        check_quantity(quantity)?;

        if let Some(index) = self.position(&product.product_id) {
            let line = &mut self.lines[index];
            let merged = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| Error::QuantityOverflow(line.product_id.clone()))?;
            ensure_available(&line.product_id, merged, available)?;
            line.set_quantity(merged);
            return Ok(index);
        }

        ensure_available(&product.product_id, quantity, available)?;
        self.lines.push(CartLine::new(product, quantity));
        Ok(self.lines.len() - 1)
    }

    /// Replace the quantity of the line at `index`
    pub fn update(&mut self, index: usize, quantity: i64, available: i64) -> Result<()> {
        check_quantity(quantity)?;
        let line = self
            .lines
            .get_mut(index)
            .ok_or(Error::CartLineNotFound(index))?;
        ensure_available(&line.product_id, quantity, available)?;
        line.set_quantity(quantity);
        Ok(())
    }

    /// Remove and return the line at `index`
    pub fn remove(&mut self, index: usize) -> Result<CartLine> {
        if index >= self.lines.len() {
            return Err(Error::CartLineNotFound(index));
        }
        Ok(self.lines.remove(index))
    }

    /// Empty the cart; the customer stays assigned
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Start a new sale: no lines, no customer
    pub fn reset(&mut self) {
        self.lines.clear();
        self.customer = None;
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&CartLine> {
        self.lines.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line totals
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.total_price).sum()
    }

    /// Quantity of a product already in the cart
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.position(product_id)
            .map(|i| self.lines[i].quantity)
            .unwrap_or(0)
    }

    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = Some(customer);
    }

    pub fn clear_customer(&mut self) {
        self.customer = None;
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

fn ensure_available(product_id: &str, requested: i64, available: i64) -> Result<()> {
    if requested > available {
        return Err(Error::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}
