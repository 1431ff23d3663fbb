//! Customers attached to point-of-sale carts

use serde::{Deserialize, Serialize};

/// Prefix of every customer identifier
pub const CUSTOMER_ID_PREFIX: &str = "cus-";

/// A customer as stored in `customer_list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub customer_name: String,
    pub mobile_number: String,
}

impl std::fmt::Display for Customer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.customer_name, self.mobile_number)
    }
}

/// Customer ids continue from the highest existing number, e.g. `cus-000008`.
pub fn format_customer_id(num: u32) -> String {
    format!("{}{:06}", CUSTOMER_ID_PREFIX, num)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_id_format() {
        assert_eq!(format_customer_id(1), "cus-000001");
        assert_eq!(format_customer_id(123456), "cus-123456");
    }

    #[test]
    fn test_display() {
        let c = Customer {
            customer_id: format_customer_id(1),
            customer_name: "Ana".into(),
            mobile_number: "0917".into(),
        };
        assert_eq!(c.to_string(), "Ana (0917)");
    }
}
