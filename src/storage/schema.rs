//! Database schema definitions
//!
//! Every statement is idempotent so any screen may open the shared database
//! first and bring it up to date.

/// SQL to create the product_categories table
pub const CREATE_PRODUCT_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS product_categories (
    category_id TEXT PRIMARY KEY,
    category_name TEXT UNIQUE NOT NULL,
    description TEXT
)
"#;

/// SQL to create the products table
/// `category_name` is denormalized from product_categories
pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    product_id TEXT PRIMARY KEY,
    product_name TEXT NOT NULL,
    sku TEXT UNIQUE NOT NULL,
    category_id TEXT,
    category_name TEXT,
    price REAL NOT NULL,
    description TEXT,
    FOREIGN KEY (category_id) REFERENCES product_categories(category_id)
)
"#;

/// SQL to create the stock_management table
pub const CREATE_STOCK_MANAGEMENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stock_management (
    product_id TEXT PRIMARY KEY,
    current_stock INTEGER DEFAULT 0,
    safety_stock INTEGER DEFAULT 0,
    target_stock INTEGER DEFAULT 0,
    FOREIGN KEY (product_id) REFERENCES products(product_id)
)
"#;

/// SQL to create the stock_transactions table
/// One row per stock movement, quantity signed
pub const CREATE_STOCK_TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stock_transactions (
    transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id TEXT,
    quantity INTEGER,
    transaction_type TEXT,
    transaction_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    remarks TEXT,
    FOREIGN KEY (product_id) REFERENCES products(product_id)
)
"#;

/// SQL to create the sales table
pub const CREATE_SALES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sales (
    sales_trans_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    total_price REAL NOT NULL,
    sale_date TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (product_id) REFERENCES products(product_id)
)
"#;

/// SQL to create the customer_list table
pub const CREATE_CUSTOMER_LIST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS customer_list (
    customer_id TEXT PRIMARY KEY,
    customer_name TEXT NOT NULL,
    mobile_number TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the customer_sales table
pub const CREATE_CUSTOMER_SALES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS customer_sales (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sales_trans_id INTEGER NOT NULL,
    customer_id TEXT NOT NULL,
    FOREIGN KEY (sales_trans_id) REFERENCES sales(sales_trans_id),
    FOREIGN KEY (customer_id) REFERENCES customer_list(customer_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_stock_tx_product ON stock_transactions(product_id)",
    "CREATE INDEX IF NOT EXISTS idx_sales_product ON sales(product_id)",
    "CREATE INDEX IF NOT EXISTS idx_customer_sales_customer ON customer_sales(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_customer_sales_sale ON customer_sales(sales_trans_id)",
];

/// All schema creation statements, parents before children
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_PRODUCT_CATEGORIES_TABLE,
        CREATE_PRODUCTS_TABLE,
        CREATE_STOCK_MANAGEMENT_TABLE,
        CREATE_STOCK_TRANSACTIONS_TABLE,
        CREATE_SALES_TABLE,
        CREATE_CUSTOMER_LIST_TABLE,
        CREATE_CUSTOMER_SALES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
