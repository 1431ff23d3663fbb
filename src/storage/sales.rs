//! Customers, checkout and sales history

use rusqlite::{Connection, OptionalExtension, params};
use crate::cart::Cart;
use crate::customer::{Customer, CUSTOMER_ID_PREFIX, format_customer_id};
use crate::sale::{Receipt, ReceiptLine, SaleRecord, SalesFilter};
use crate::stock::MovementKind;
use crate::{Error, Result, required};
use super::inventory::move_stock;
use super::sqlite::{SqliteStore, map_unique};

impl SqliteStore {
    // ========== Customer Operations ==========

    /// Look a customer up by mobile number
    pub fn find_customer_by_mobile(&self, mobile_number: &str) -> Result<Option<Customer>> {
        let mobile_number = required("Mobile number", mobile_number)?;
        self.conn
            .query_row(
                "SELECT customer_id, customer_name, mobile_number FROM customer_list WHERE mobile_number = ?1",
                [mobile_number],
                row_to_customer,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a customer by id
    pub fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        query_customer(&self.conn, customer_id)
    }

    /// Register a customer; the id continues from the highest existing one
    pub fn add_customer(&mut self, name: &str, mobile_number: &str) -> Result<Customer> {
        let name = required("Customer name", name)?.to_string();
        let mobile_number = required("Mobile number", mobile_number)?.to_string();

        let tx = self.conn.transaction()?;
        let customer_id = next_customer_id_in(&tx)?;
        tx.execute(
            "INSERT INTO customer_list (customer_id, customer_name, mobile_number) VALUES (?1, ?2, ?3)",
            params![customer_id, name, mobile_number],
        )
        .map_err(|e| map_unique(e, || Error::DuplicateMobile(mobile_number.clone())))?;
        tx.commit()?;

        tracing::info!("Added customer {} ({})", customer_id, name);
        Ok(Customer {
            customer_id,
            customer_name: name,
            mobile_number,
        })
    }

    /// All customers ordered by id
    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, customer_name, mobile_number FROM customer_list ORDER BY customer_id",
        )?;
        let customers = stmt
            .query_map([], row_to_customer)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(customers)
    }

    // ========== Checkout ==========

    /// Record every cart line as a sale.
    ///
    /// Per line: one `sales` row, the stock deduction with its `Sale` log
    /// row, and the customer link when a customer is assigned. Stock is
    /// re-checked against the database; any failure rolls back the whole
    /// checkout.
    pub fn checkout(&mut self, cart: &Cart) -> Result<Receipt> {
        if cart.is_empty() {
            return Err(Error::EmptyCart);
        }

        let tx = self.conn.transaction()?;

        let customer = match cart.customer() {
            Some(c) => Some(
                query_customer(&tx, &c.customer_id)?
                    .ok_or_else(|| Error::CustomerNotFound(c.customer_id.clone()))?,
            ),
            None => None,
        };

        let mut lines = Vec::with_capacity(cart.len());
        for item in cart.lines() {
            move_stock(&tx, &item.product_id, MovementKind::Sale, item.quantity, None)?;

            tx.execute(
                r#"
                INSERT INTO sales (product_id, quantity, unit_price, total_price)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![item.product_id, item.quantity, item.unit_price, item.total_price],
            )?;
            let sales_trans_id = tx.last_insert_rowid();

            if let Some(c) = &customer {
                tx.execute(
                    "INSERT INTO customer_sales (sales_trans_id, customer_id) VALUES (?1, ?2)",
                    params![sales_trans_id, c.customer_id],
                )?;
            }

            lines.push(ReceiptLine {
                sales_trans_id,
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total_price,
            });
        }

        tx.commit()?;

        let total: f64 = lines.iter().map(|l| l.total_price).sum();
        tracing::info!("Checkout recorded {} line(s), total {:.2}", lines.len(), total);
        Ok(Receipt {
            lines,
            total,
            customer,
        })
    }

    /// Sales history, newest first
    pub fn list_sales(&self, filter: &SalesFilter) -> Result<Vec<SaleRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.sales_trans_id, s.product_id, p.product_name, s.quantity, s.unit_price,
                   s.total_price, s.sale_date, cs.customer_id, c.customer_name
            FROM sales s
            LEFT JOIN products p ON p.product_id = s.product_id
            LEFT JOIN customer_sales cs ON cs.sales_trans_id = s.sales_trans_id
            LEFT JOIN customer_list c ON c.customer_id = cs.customer_id
            WHERE (?1 IS NULL OR cs.customer_id = ?1)
              AND (?2 IS NULL OR s.product_id = ?2)
            ORDER BY s.sales_trans_id DESC
            LIMIT ?3
            "#,
        )?;
        let sales = stmt
            .query_map(
                params![filter.customer_id, filter.product_id, filter.limit as i64],
                row_to_sale,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sales)
    }
}

fn next_customer_id_in(conn: &Connection) -> Result<String> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(CAST(SUBSTR(customer_id, ?1) AS INTEGER)) FROM customer_list WHERE customer_id LIKE ?2",
        params![CUSTOMER_ID_PREFIX.len() as i64 + 1, format!("{}%", CUSTOMER_ID_PREFIX)],
        |row| row.get(0),
    )?;
    let next = max.unwrap_or(0).max(0) + 1;
    Ok(format_customer_id(next as u32))
}

fn query_customer(conn: &Connection, customer_id: &str) -> Result<Option<Customer>> {
    conn.query_row(
        "SELECT customer_id, customer_name, mobile_number FROM customer_list WHERE customer_id = ?1",
        [customer_id],
        row_to_customer,
    )
    .optional()
    .map_err(Into::into)
}

fn row_to_customer(row: &rusqlite::Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        customer_id: row.get(0)?,
        customer_name: row.get(1)?,
        mobile_number: row.get(2)?,
    })
}

fn row_to_sale(row: &rusqlite::Row) -> rusqlite::Result<SaleRecord> {
    Ok(SaleRecord {
        sales_trans_id: row.get(0)?,
        product_id: row.get(1)?,
        product_name: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: row.get(4)?,
        total_price: row.get(5)?,
        sale_date: row.get(6)?,
        customer_id: row.get(7)?,
        customer_name: row.get(8)?,
    })
}
