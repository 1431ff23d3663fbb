//! SQLite storage implementation
//!
//! Catalog operations (categories and products) live here together with the
//! connection handling. Stock operations are in `inventory.rs`, customers and
//! checkout in `sales.rs`.

use std::path::Path;
use rusqlite::{Connection, OptionalExtension, params};
use crate::category::{
    Category, format_category_id, normalize_category_name, normalize_description,
    parse_category_number,
};
use crate::product::{NewProduct, Product, ProductFilter, format_product_id, like_pattern, parse_product_number};
use crate::{Error, Result, lowest_free_number, required};
use super::schema;

/// SQLite-backed storage shared by every screen
pub struct SqliteStore {
    pub(super) conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening database {}", path.display());
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Category Operations ==========

    /// Add a category; the name is stored upper-case and the id is generated
    pub fn add_category(&mut self, name: &str, description: Option<&str>) -> Result<Category> {
        let name = normalize_category_name(required("Category name", name)?);
        let description = normalize_description(description);

        let tx = self.conn.transaction()?;
        let category_id = next_category_id_in(&tx)?;
        tx.execute(
            "INSERT INTO product_categories (category_id, category_name, description) VALUES (?1, ?2, ?3)",
            params![category_id, name, description],
        )
        .map_err(|e| map_unique(e, || Error::DuplicateCategory(name.clone())))?;
        tx.commit()?;

        tracing::info!("Added category {} ({})", category_id, name);
        Ok(Category {
            category_id,
            category_name: name,
            description,
        })
    }

    /// Rename or re-describe a category.
    ///
    /// Products assigned to it get the new name in the same transaction.
    pub fn update_category(
        &mut self,
        category_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category> {
        let name = normalize_category_name(required("Category name", name)?);
        let description = normalize_description(description);

        let tx = self.conn.transaction()?;
        let updated = tx
            .execute(
                "UPDATE product_categories SET category_name = ?1, description = ?2 WHERE category_id = ?3",
                params![name, description, category_id],
            )
            .map_err(|e| map_unique(e, || Error::DuplicateCategory(name.clone())))?;
        if updated == 0 {
            return Err(Error::CategoryNotFound(category_id.to_string()));
        }
        let relabeled = tx.execute(
            "UPDATE products SET category_name = ?1 WHERE category_id = ?2",
            params![name, category_id],
        )?;
        tx.commit()?;

        tracing::info!("Updated category {} ({} product(s) relabeled)", category_id, relabeled);
        Ok(Category {
            category_id: category_id.to_string(),
            category_name: name,
            description,
        })
    }

    /// Delete a category that no product references
    pub fn delete_category(&self, category_id: &str) -> Result<()> {
        if self.get_category(category_id)?.is_none() {
            return Err(Error::CategoryNotFound(category_id.to_string()));
        }

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE category_id = ?1",
            [category_id],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(Error::CategoryInUse {
                id: category_id.to_string(),
                count,
            });
        }

        self.conn
            .execute("DELETE FROM product_categories WHERE category_id = ?1", [category_id])?;
        tracing::info!("Deleted category {}", category_id);
        Ok(())
    }

    /// Get a category by id
    pub fn get_category(&self, category_id: &str) -> Result<Option<Category>> {
        query_category(&self.conn, category_id)
    }

    /// All categories ordered by id
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, category_name, description FROM product_categories ORDER BY category_id",
        )?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// The id the next added category will receive
    pub fn next_category_id(&self) -> Result<String> {
        next_category_id_in(&self.conn)
    }

    // ========== Product Operations ==========

    /// The id the next added product will receive
    pub fn next_product_id(&self) -> Result<String> {
        next_product_id_in(&self.conn)
    }

    /// Add a product under an existing category
    pub fn add_product(&mut self, input: &NewProduct) -> Result<Product> {
        let fields = input.validate()?;

        let tx = self.conn.transaction()?;
        let category = query_category(&tx, &fields.category_id)?
            .ok_or_else(|| Error::CategoryNotFound(fields.category_id.clone()))?;
        let product_id = next_product_id_in(&tx)?;

        tx.execute(
            r#"
            INSERT INTO products (product_id, product_name, sku, category_id, category_name, price, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                product_id,
                fields.name,
                fields.sku,
                category.category_id,
                category.category_name,
                fields.price,
                fields.description,
            ],
        )
        .map_err(|e| map_unique(e, || Error::DuplicateSku(fields.sku.clone())))?;
        tx.commit()?;

        tracing::info!("Added product {} ({}, SKU {})", product_id, fields.name, fields.sku);
        Ok(Product {
            product_id,
            product_name: fields.name,
            sku: fields.sku,
            category_id: Some(category.category_id),
            category_name: Some(category.category_name),
            price: fields.price,
            description: fields.description,
        })
    }

    /// Overwrite every editable field of a product
    pub fn update_product(&mut self, product_id: &str, input: &NewProduct) -> Result<Product> {
        let fields = input.validate()?;

        let tx = self.conn.transaction()?;
        if query_product(&tx, product_id)?.is_none() {
            return Err(Error::ProductNotFound(product_id.to_string()));
        }
        let category = query_category(&tx, &fields.category_id)?
            .ok_or_else(|| Error::CategoryNotFound(fields.category_id.clone()))?;

        tx.execute(
            r#"
            UPDATE products
            SET product_name = ?1, sku = ?2, category_id = ?3, category_name = ?4, price = ?5, description = ?6
            WHERE product_id = ?7
            "#,
            params![
                fields.name,
                fields.sku,
                category.category_id,
                category.category_name,
                fields.price,
                fields.description,
                product_id,
            ],
        )
        .map_err(|e| map_unique(e, || Error::DuplicateSku(fields.sku.clone())))?;
        tx.commit()?;

        tracing::info!("Updated product {}", product_id);
        Ok(Product {
            product_id: product_id.to_string(),
            product_name: fields.name,
            sku: fields.sku,
            category_id: Some(category.category_id),
            category_name: Some(category.category_name),
            price: fields.price,
            description: fields.description,
        })
    }

    /// Delete a product with no sales or stock history, along with its stock row
    pub fn delete_product(&mut self, product_id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        if query_product(&tx, product_id)?.is_none() {
            return Err(Error::ProductNotFound(product_id.to_string()));
        }

        let history: i64 = tx.query_row(
            r#"
            SELECT (SELECT COUNT(*) FROM stock_transactions WHERE product_id = ?1)
                 + (SELECT COUNT(*) FROM sales WHERE product_id = ?1)
            "#,
            [product_id],
            |row| row.get(0),
        )?;
        if history > 0 {
            return Err(Error::ProductInUse(product_id.to_string()));
        }

        tx.execute("DELETE FROM stock_management WHERE product_id = ?1", [product_id])?;
        tx.execute("DELETE FROM products WHERE product_id = ?1", [product_id])?;
        tx.commit()?;

        tracing::info!("Deleted product {}", product_id);
        Ok(())
    }

    /// Get a product by id
    pub fn get_product(&self, product_id: &str) -> Result<Option<Product>> {
        query_product(&self.conn, product_id)
    }

    /// Search products by id, name or SKU, optionally within one category
    pub fn search_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let pattern = like_pattern(&filter.search);
        tracing::debug!("Searching products for {:?} (category: {:?})", pattern, filter.category_id);

        let mut stmt = self.conn.prepare(
            r#"
            SELECT product_id, product_name, sku, category_id, category_name, price, description
            FROM products
            WHERE (product_id LIKE ?1 ESCAPE '\' OR product_name LIKE ?1 ESCAPE '\' OR sku LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR category_id = ?2)
            ORDER BY product_id
            "#,
        )?;
        let products = stmt
            .query_map(params![pattern, filter.category_id], row_to_product)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(products)
    }

    // ========== Statistics ==========

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let revenue: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(total_price), 0.0) FROM sales",
            [],
            |row| row.get(0),
        )?;

        Ok(DbStats {
            categories: self.count("SELECT COUNT(*) FROM product_categories")?,
            products: self.count("SELECT COUNT(*) FROM products")?,
            stocked_products: self.count("SELECT COUNT(*) FROM stock_management")?,
            low_stock: self.low_stock()?.len(),
            stock_transactions: self.count("SELECT COUNT(*) FROM stock_transactions")?,
            customers: self.count("SELECT COUNT(*) FROM customer_list")?,
            sales: self.count("SELECT COUNT(*) FROM sales")?,
            revenue,
        })
    }
}

// ========== Row Helpers ==========

pub(super) fn query_category(conn: &Connection, category_id: &str) -> Result<Option<Category>> {
    conn.query_row(
        "SELECT category_id, category_name, description FROM product_categories WHERE category_id = ?1",
        [category_id],
        row_to_category,
    )
    .optional()
    .map_err(Into::into)
}

pub(super) fn query_product(conn: &Connection, product_id: &str) -> Result<Option<Product>> {
    conn.query_row(
        r#"
        SELECT product_id, product_name, sku, category_id, category_name, price, description
        FROM products WHERE product_id = ?1
        "#,
        [product_id],
        row_to_product,
    )
    .optional()
    .map_err(Into::into)
}

fn next_category_id_in(conn: &Connection) -> Result<String> {
    let mut stmt = conn.prepare("SELECT category_id FROM product_categories")?;
    let used: Vec<u32> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?
        .iter()
        .filter_map(|id| parse_category_number(id))
        .collect();
    Ok(format_category_id(lowest_free_number(used)))
}

fn next_product_id_in(conn: &Connection) -> Result<String> {
    let mut stmt = conn.prepare("SELECT product_id FROM products")?;
    let used: Vec<u32> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?
        .iter()
        .filter_map(|id| parse_product_number(id))
        .collect();
    Ok(format_product_id(lowest_free_number(used)))
}

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        category_id: row.get(0)?,
        category_name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn row_to_product(row: &rusqlite::Row) -> rusqlite::Result<Product> {
    Ok(Product {
        product_id: row.get(0)?,
        product_name: row.get(1)?,
        sku: row.get(2)?,
        category_id: row.get(3)?,
        category_name: row.get(4)?,
        price: row.get(5)?,
        description: row.get(6)?,
    })
}

/// Whether SQLite rejected a write because of a UNIQUE or PRIMARY KEY constraint
pub(super) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Map a uniqueness violation to the caller's duplicate error
pub(super) fn map_unique(err: rusqlite::Error, duplicate: impl FnOnce() -> Error) -> Error {
    if is_unique_violation(&err) {
        duplicate()
    } else {
        err.into()
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub categories: usize,
    pub products: usize,
    pub stocked_products: usize,
    pub low_stock: usize,
    pub stock_transactions: usize,
    pub customers: usize,
    pub sales: usize,
    pub revenue: f64,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Categories: {}", self.categories)?;
        writeln!(f, "  Products: {}", self.products)?;
        writeln!(f, "  Stocked products: {}", self.stocked_products)?;
        writeln!(f, "  Low stock: {}", self.low_stock)?;
        writeln!(f, "  Stock transactions: {}", self.stock_transactions)?;
        writeln!(f, "  Customers: {}", self.customers)?;
        writeln!(f, "  Sales: {}", self.sales)?;
        writeln!(f, "  Revenue: {:.2}", self.revenue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_category() -> (SqliteStore, Category) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let category = store.add_category("beverages", Some("Drinks")).unwrap();
        (store, category)
    }

    #[test]
    fn test_category_crud() {
        let (mut store, category) = store_with_category();
        assert_eq!(category.category_id, "PC-001");
        assert_eq!(category.category_name, "BEVERAGES");

        let updated = store.update_category("PC-001", "hot drinks", None).unwrap();
        assert_eq!(updated.category_name, "HOT DRINKS");
        assert_eq!(updated.description, None);

        let fetched = store.get_category("PC-001").unwrap().unwrap();
        assert_eq!(fetched, updated);

        store.delete_category("PC-001").unwrap();
        assert!(store.list_categories().unwrap().is_empty());
    }

    #[test]
    fn test_category_ids_fill_gaps() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.add_category("a", None).unwrap();
        store.add_category("b", None).unwrap();
        store.add_category("c", None).unwrap();
        store.delete_category("PC-002").unwrap();

        assert_eq!(store.next_category_id().unwrap(), "PC-002");
        let d = store.add_category("d", None).unwrap();
        assert_eq!(d.category_id, "PC-002");
        assert_eq!(store.next_category_id().unwrap(), "PC-004");
    }

    #[test]
    fn test_duplicate_category_name() {
        let (mut store, _) = store_with_category();
        let err = store.add_category("Beverages", None).unwrap_err();
        assert!(matches!(err, Error::DuplicateCategory(name) if name == "BEVERAGES"));

        store.add_category("snacks", None).unwrap();
        let err = store.update_category("PC-002", "beverages", None).unwrap_err();
        assert!(matches!(err, Error::DuplicateCategory(_)));
    }

    #[test]
    fn test_category_name_required() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(store.add_category("  ", None), Err(Error::Validation(_))));
        assert!(matches!(
            store.update_category("PC-009", "x", None),
            Err(Error::CategoryNotFound(_))
        ));
    }

    #[test]
    fn test_delete_category_in_use() {
        let (mut store, category) = store_with_category();
        store
            .add_product(&NewProduct::new("tea", "t-1", &category.category_id, 2.0))
            .unwrap();

        let err = store.delete_category(&category.category_id).unwrap_err();
        assert!(matches!(err, Error::CategoryInUse { count: 1, .. }));
        assert!(matches!(store.delete_category("PC-404"), Err(Error::CategoryNotFound(_))));
    }

    #[test]
    fn test_rename_category_relabels_products() {
        let (mut store, category) = store_with_category();
        let product = store
            .add_product(&NewProduct::new("tea", "t-1", &category.category_id, 2.0))
            .unwrap();

        store.update_category(&category.category_id, "tea & coffee", None).unwrap();
        let product = store.get_product(&product.product_id).unwrap().unwrap();
        assert_eq!(product.category_name.as_deref(), Some("TEA & COFFEE"));
    }

    #[test]
    fn test_product_crud() {
        let (mut store, category) = store_with_category();
        let input = NewProduct::new("green tea", "gt-01", &category.category_id, 2.5)
            .with_description("loose leaf");
        let product = store.add_product(&input).unwrap();

        assert_eq!(product.product_id, "PID-00001");
        assert_eq!(product.product_name, "GREEN TEA");
        assert_eq!(product.sku, "GT-01");
        assert_eq!(product.category_name.as_deref(), Some("BEVERAGES"));
        assert_eq!(store.get_product("PID-00001").unwrap().unwrap(), product);

        let edit = NewProduct::new("green tea 100g", "gt-01", &category.category_id, 3.0);
        let updated = store.update_product("PID-00001", &edit).unwrap();
        assert_eq!(updated.price, 3.0);
        assert_eq!(updated.description, None);

        store.delete_product("PID-00001").unwrap();
        assert!(store.get_product("PID-00001").unwrap().is_none());
        assert!(matches!(store.delete_product("PID-00001"), Err(Error::ProductNotFound(_))));
    }

    #[test]
    fn test_duplicate_sku() {
        let (mut store, category) = store_with_category();
        store
            .add_product(&NewProduct::new("tea", "sku-1", &category.category_id, 1.0))
            .unwrap();
        let err = store
            .add_product(&NewProduct::new("coffee", "SKU-1", &category.category_id, 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSku(sku) if sku == "SKU-1"));
        assert_eq!(store.next_product_id().unwrap(), "PID-00002");
    }

    #[test]
    fn test_delete_product_removes_stock_row() {
        let (mut store, category) = store_with_category();
        let product = store
            .add_product(&NewProduct::new("tea", "t-1", &category.category_id, 2.0))
            .unwrap();
        store.set_stock_levels(&product.product_id, 1, 5).unwrap();
        assert!(store.inventory_row(&product.product_id).unwrap().is_some());
        assert_eq!(store.stats().unwrap().stocked_products, 1);

        store.delete_product(&product.product_id).unwrap();
        assert!(store.inventory_row(&product.product_id).unwrap().is_none());
        assert_eq!(store.stats().unwrap().stocked_products, 0);
    }

    #[test]
    fn test_update_to_taken_sku() {
        let (mut store, category) = store_with_category();
        store
            .add_product(&NewProduct::new("tea", "sku-1", &category.category_id, 1.0))
            .unwrap();
        let coffee = store
            .add_product(&NewProduct::new("coffee", "sku-2", &category.category_id, 1.0))
            .unwrap();

        let edit = NewProduct::new("coffee", "Sku-1", &category.category_id, 1.0);
        let err = store.update_product(&coffee.product_id, &edit).unwrap_err();
        assert!(matches!(err, Error::DuplicateSku(sku) if sku == "SKU-1"));
        assert_eq!(store.get_product(&coffee.product_id).unwrap().unwrap().sku, "SKU-2");
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let (mut store, category) = store_with_category();
        store
            .add_product(&NewProduct::new("tea", "t-1", &category.category_id, 1.0))
            .unwrap();
        store
            .add_product(&NewProduct::new("tea 50% off", "t_2", &category.category_id, 1.0))
            .unwrap();

        let hits = store.search_products(&ProductFilter::search("_")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sku, "T_2");
        assert_eq!(store.search_products(&ProductFilter::search("%")).unwrap().len(), 1);
        assert_eq!(store.search_products(&ProductFilter::search("tea")).unwrap().len(), 2);

        let rows = store.inventory(&crate::stock::InventoryFilter::search("_")).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_product_requires_known_category() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = store
            .add_product(&NewProduct::new("tea", "t", "PC-999", 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound(id) if id == "PC-999"));

        let err = store
            .update_product("PID-00001", &NewProduct::new("tea", "t", "PC-999", 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::ProductNotFound(_)));
    }

    #[test]
    fn test_search_products() {
        let (mut store, drinks) = store_with_category();
        let snacks = store.add_category("snacks", None).unwrap();
        store.add_product(&NewProduct::new("green tea", "gt", &drinks.category_id, 1.0)).unwrap();
        store.add_product(&NewProduct::new("black tea", "bt", &drinks.category_id, 1.0)).unwrap();
        store.add_product(&NewProduct::new("tea biscuits", "tb", &snacks.category_id, 1.0)).unwrap();

        let all = store.search_products(&ProductFilter::all()).unwrap();
        assert_eq!(all.len(), 3);

        let teas = store.search_products(&ProductFilter::search("Tea")).unwrap();
        assert_eq!(teas.len(), 3);

        let drink_teas = store
            .search_products(&ProductFilter::search("tea").in_category(&drinks.category_id))
            .unwrap();
        assert_eq!(drink_teas.len(), 2);

        let by_id = store.search_products(&ProductFilter::search("pid-00003")).unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].product_name, "TEA BISCUITS");
    }

    #[test]
    fn test_stats_on_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.products, 0);
        assert_eq!(stats.revenue, 0.0);
        assert!(stats.to_string().contains("Products: 0"));
    }
}
