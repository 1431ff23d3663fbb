//! Stock operations: the inventory screen's adjustments and listings

use rusqlite::{Connection, OptionalExtension, params};
use crate::product::like_pattern;
use crate::stock::{
    InventoryFilter, InventoryRow, MovementKind, StockMovementRecord, check_quantity,
    remark_or_default,
};
use crate::{Error, Result};
use super::sqlite::{SqliteStore, query_product};

const INVENTORY_COLUMNS: &str = r#"
    SELECT p.product_id, p.product_name, p.sku, p.category_id, p.category_name,
           s.current_stock, s.safety_stock, s.target_stock
    FROM products p
    LEFT JOIN stock_management s ON p.product_id = s.product_id
"#;

impl SqliteStore {
    /// Apply one stock movement and log it.
    ///
    /// The stock update and its `stock_transactions` row commit together.
    pub fn apply_movement(
        &mut self,
        product_id: &str,
        kind: MovementKind,
        quantity: i64,
        remarks: Option<&str>,
    ) -> Result<StockMovementRecord> {
        check_quantity(quantity)?;

        let tx = self.conn.transaction()?;
        if query_product(&tx, product_id)?.is_none() {
            return Err(Error::ProductNotFound(product_id.to_string()));
        }
        let transaction_id = move_stock(&tx, product_id, kind, quantity, remarks)?;
        let record = query_movement(&tx, transaction_id)?;
        tx.commit()?;

        tracing::info!(
            "{} {} x{} (log #{})",
            kind, product_id, quantity, transaction_id
        );
        Ok(record)
    }

    /// Stock received into inventory
    pub fn add_stock(&mut self, product_id: &str, quantity: i64, remarks: Option<&str>) -> Result<StockMovementRecord> {
        self.apply_movement(product_id, MovementKind::AddStock, quantity, remarks)
    }

    /// Goods brought back by a customer
    pub fn return_from_customer(&mut self, product_id: &str, quantity: i64, remarks: Option<&str>) -> Result<StockMovementRecord> {
        self.apply_movement(product_id, MovementKind::ReturnFromCustomer, quantity, remarks)
    }

    /// Goods sent back to the supplier
    pub fn return_to_vendor(&mut self, product_id: &str, quantity: i64, remarks: Option<&str>) -> Result<StockMovementRecord> {
        self.apply_movement(product_id, MovementKind::ReturnToVendor, quantity, remarks)
    }

    /// Current stock of a product; zero when it has no stock row
    pub fn current_stock(&self, product_id: &str) -> Result<i64> {
        Ok(query_current_stock(&self.conn, product_id)?.flatten().unwrap_or(0))
    }

    /// Products with their stock levels, filtered like the inventory screen
    pub fn inventory(&self, filter: &InventoryFilter) -> Result<Vec<InventoryRow>> {
        let pattern = like_pattern(&filter.search);
        tracing::debug!("Inventory query {:?} (category: {:?})", pattern, filter.category_name);

        let sql = format!(
            r#"{}
            WHERE (p.product_id LIKE ?1 ESCAPE '\' OR p.product_name LIKE ?1 ESCAPE '\'
                   OR p.sku LIKE ?1 ESCAPE '\' OR p.category_name LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR p.category_name = ?2)
            ORDER BY p.product_id
            "#,
            INVENTORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![pattern, filter.category_name], row_to_inventory)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// One product's inventory row
    pub fn inventory_row(&self, product_id: &str) -> Result<Option<InventoryRow>> {
        let sql = format!("{} WHERE p.product_id = ?1", INVENTORY_COLUMNS);
        self.conn
            .query_row(&sql, [product_id], row_to_inventory)
            .optional()
            .map_err(Into::into)
    }

    /// Distinct category names in use by products, for the category filter
    pub fn category_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT category_name FROM products WHERE category_name IS NOT NULL ORDER BY category_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Set safety and target stock, creating the stock row when missing
    pub fn set_stock_levels(&self, product_id: &str, safety_stock: i64, target_stock: i64) -> Result<()> {
        if safety_stock < 0 || target_stock < 0 {
            return Err(Error::validation("Stock levels cannot be negative"));
        }
        if query_product(&self.conn, product_id)?.is_none() {
            return Err(Error::ProductNotFound(product_id.to_string()));
        }

        self.conn.execute(
            r#"
            INSERT INTO stock_management (product_id, current_stock, safety_stock, target_stock)
            VALUES (?1, 0, ?2, ?3)
            ON CONFLICT(product_id) DO UPDATE SET
                safety_stock = excluded.safety_stock,
                target_stock = excluded.target_stock
            "#,
            params![product_id, safety_stock, target_stock],
        )?;
        tracing::info!("Stock levels for {}: safety {}, target {}", product_id, safety_stock, target_stock);
        Ok(())
    }

    /// Stocked products at or below their safety stock
    pub fn low_stock(&self) -> Result<Vec<InventoryRow>> {
        let sql = format!(
            r#"{}
            WHERE s.current_stock IS NOT NULL AND s.current_stock <= COALESCE(s.safety_stock, 0)
            ORDER BY p.product_id
            "#,
            INVENTORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], row_to_inventory)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Logged movements, newest first, optionally for one product
    pub fn stock_history(&self, product_id: Option<&str>, limit: usize) -> Result<Vec<StockMovementRecord>> {
        self.stock_history_by_kind(product_id, None, limit)
    }

    /// Logged movements, newest first, optionally for one product and one kind
    pub fn stock_history_by_kind(
        &self,
        product_id: Option<&str>,
        kind: Option<MovementKind>,
        limit: usize,
    ) -> Result<Vec<StockMovementRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT transaction_id, product_id, quantity, transaction_type, transaction_date, remarks
            FROM stock_transactions
            WHERE (?1 IS NULL OR product_id = ?1)
              AND (?2 IS NULL OR transaction_type = ?2)
            ORDER BY transaction_id DESC
            LIMIT ?3
            "#,
        )?;
        let kind = kind.map(|k| k.as_str());
        let records = stmt
            .query_map(params![product_id, kind, limit as i64], row_to_movement)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

/// Change a product's stock and append the log row on an open connection
/// or transaction. Returns the log row's id.
///
/// Deductions need an existing stock row with enough stock; additions create
/// the row on first use.
pub(super) fn move_stock(
    conn: &Connection,
    product_id: &str,
    kind: MovementKind,
    quantity: i64,
    remarks: Option<&str>,
) -> Result<i64> {
    let current = query_current_stock(conn, product_id)?;

    if kind.is_addition() {
        match current {
            None => {
                conn.execute(
                    "INSERT INTO stock_management (product_id, current_stock) VALUES (?1, ?2)",
                    params![product_id, quantity],
                )?;
            }
            Some(stock) => {
                let updated = stock
                    .unwrap_or(0)
                    .checked_add(quantity)
                    .ok_or_else(|| Error::QuantityOverflow(product_id.to_string()))?;
                conn.execute(
                    "UPDATE stock_management SET current_stock = ?1 WHERE product_id = ?2",
                    params![updated, product_id],
                )?;
            }
        }
    } else {
        let available = current
            .ok_or_else(|| Error::NotStocked(product_id.to_string()))?
            .unwrap_or(0);
        if available < quantity {
            return Err(Error::InsufficientStock {
                product_id: product_id.to_string(),
                available,
                requested: quantity,
            });
        }
        conn.execute(
            "UPDATE stock_management SET current_stock = ?1 WHERE product_id = ?2",
            params![available - quantity, product_id],
        )?;
    }

    conn.execute(
        r#"
        INSERT INTO stock_transactions (product_id, quantity, transaction_type, remarks)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            product_id,
            kind.signed(quantity),
            kind.as_str(),
            remark_or_default(kind, remarks),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Outer `None`: no stock row. Inner `None`: row with NULL current_stock.
fn query_current_stock(conn: &Connection, product_id: &str) -> Result<Option<Option<i64>>> {
    conn.query_row(
        "SELECT current_stock FROM stock_management WHERE product_id = ?1",
        [product_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

fn query_movement(conn: &Connection, transaction_id: i64) -> Result<StockMovementRecord> {
    conn.query_row(
        r#"
        SELECT transaction_id, product_id, quantity, transaction_type, transaction_date, remarks
        FROM stock_transactions WHERE transaction_id = ?1
        "#,
        [transaction_id],
        row_to_movement,
    )
    .map_err(Into::into)
}

fn row_to_inventory(row: &rusqlite::Row) -> rusqlite::Result<InventoryRow> {
    Ok(InventoryRow {
        product_id: row.get(0)?,
        product_name: row.get(1)?,
        sku: row.get(2)?,
        category_id: row.get(3)?,
        category_name: row.get(4)?,
        current_stock: row.get(5)?,
        safety_stock: row.get(6)?,
        target_stock: row.get(7)?,
    })
}

fn row_to_movement(row: &rusqlite::Row) -> rusqlite::Result<StockMovementRecord> {
    Ok(StockMovementRecord {
        transaction_id: row.get(0)?,
        product_id: row.get(1)?,
        quantity: row.get(2)?,
        transaction_type: row.get(3)?,
        transaction_date: row.get(4)?,
        remarks: row.get(5)?,
    })
}
