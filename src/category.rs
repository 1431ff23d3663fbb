//! Product categories
//!
//! Category identifiers have the form `PC-NNN`. A new category takes the
//! lowest free number, so ids released by deletions are reused.

use serde::{Deserialize, Serialize};

/// Prefix of every category identifier
pub const CATEGORY_ID_PREFIX: &str = "PC-";

/// A product category as stored in `product_categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: String,
    pub category_name: String,
    pub description: Option<String>,
}

/// Format a category number as an identifier, e.g. `7` -> `PC-007`
pub fn format_category_id(num: u32) -> String {
    format!("{}{:03}", CATEGORY_ID_PREFIX, num)
}

/// Extract the numeric part of a category identifier.
///
/// Ids that do not follow the `PC-NNN` form are ignored by the generator.
pub fn parse_category_number(id: &str) -> Option<u32> {
    id.strip_prefix(CATEGORY_ID_PREFIX)?.parse().ok()
}

/// Category names are stored upper-case.
pub fn normalize_category_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Empty descriptions are stored as NULL.
pub(crate) fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_id_format() {
        assert_eq!(format_category_id(1), "PC-001");
        assert_eq!(format_category_id(42), "PC-042");
        assert_eq!(format_category_id(1234), "PC-1234");
    }

    #[test]
    fn test_parse_category_number() {
        assert_eq!(parse_category_number("PC-010"), Some(10));
        assert_eq!(parse_category_number("XX-010"), None);
        assert_eq!(parse_category_number("PC-abc"), None);
    }

    #[test]
    fn test_normalize_category_name() {
        assert_eq!(normalize_category_name("  drinks "), "DRINKS");
        assert_eq!(normalize_description(Some("  ")), None);
        assert_eq!(normalize_description(Some(" cold ")), Some("cold".to_string()));
    }
}
