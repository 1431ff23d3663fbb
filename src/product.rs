//! Products
//!
//! Product identifiers have the form `PID-NNNNN` and, like categories, reuse
//! the lowest free number. Names and SKUs are stored upper-case.

use crate::{Error, Result, required};
use serde::{Deserialize, Serialize};

/// Prefix of every product identifier
pub const PRODUCT_ID_PREFIX: &str = "PID-";

/// A product as stored in `products`.
///
/// `category_name` is a denormalized copy of the category's name at the time
/// the product was last written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub sku: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub price: f64,
    pub description: Option<String>,
}

/// Input for creating or updating a product
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub category_id: String,
    pub price: f64,
    pub description: Option<String>,
}

/// Validated, normalized product fields ready for storage
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProductFields {
    pub name: String,
    pub sku: String,
    pub category_id: String,
    pub price: f64,
    pub description: Option<String>,
}

impl NewProduct {
    pub fn new(name: &str, sku: &str, category_id: &str, price: f64) -> Self {
        Self {
            name: name.to_string(),
            sku: sku.to_string(),
            category_id: category_id.to_string(),
            price,
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// All fields except the description are required.
    pub(crate) fn validate(&self) -> Result<ProductFields> {
        let name = required("Product name", &self.name)?.to_uppercase();
        let sku = required("SKU", &self.sku)?.to_uppercase();
        let category_id = required("Category", &self.category_id)?.to_string();

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::validation(format!(
                "Price must be a non-negative number (got {})",
                self.price
            )));
        }

        Ok(ProductFields {
            name,
            sku,
            category_id,
            price: self.price,
            description: crate::category::normalize_description(self.description.as_deref()),
        })
    }
}

/// Search criteria for the product management screen
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Substring matched against product id, name and SKU
    pub search: String,
    /// Restrict to one category id
    pub category_id: Option<String>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: &str) -> Self {
        Self {
            search: term.to_string(),
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: &str) -> Self {
        self.category_id = Some(category_id.to_string());
        self
    }
}

/// Format a product number as an identifier, e.g. `3` -> `PID-00003`
pub fn format_product_id(num: u32) -> String {
    format!("{}{:05}", PRODUCT_ID_PREFIX, num)
}

pub fn parse_product_number(id: &str) -> Option<u32> {
    id.strip_prefix(PRODUCT_ID_PREFIX)?.parse().ok()
}

/// Build a `LIKE` pattern for literal substring search.
///
/// `%`, `_` and `\` in the term are escaped; queries must use `ESCAPE '\'`.
/// SQLite's `LIKE` is case-insensitive for ASCII, which matches the
/// lower-cased comparison the screens perform.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::from("%");
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_format() {
        assert_eq!(format_product_id(1), "PID-00001");
        assert_eq!(parse_product_number("PID-00120"), Some(120));
        assert_eq!(parse_product_number("P-1"), None);
    }

    #[test]
    fn test_validate_uppercases_name_and_sku() {
        let fields = NewProduct::new("green tea", "gt-01", "PC-001", 2.5)
            .with_description("  loose leaf ")
            .validate()
            .unwrap();
        assert_eq!(fields.name, "GREEN TEA");
        assert_eq!(fields.sku, "GT-01");
        assert_eq!(fields.description.as_deref(), Some("loose leaf"));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert!(NewProduct::new("", "SKU", "PC-001", 1.0).validate().is_err());
        assert!(NewProduct::new("Tea", " ", "PC-001", 1.0).validate().is_err());
        assert!(NewProduct::new("Tea", "SKU", "", 1.0).validate().is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" tea "), "%tea%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn test_validate_rejects_bad_price() {
        assert!(NewProduct::new("Tea", "SKU", "PC-001", -1.0).validate().is_err());
        assert!(NewProduct::new("Tea", "SKU", "PC-001", f64::NAN).validate().is_err());
        assert!(NewProduct::new("Tea", "SKU", "PC-001", 0.0).validate().is_ok());
    }
}
