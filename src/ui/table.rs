use crate::cart::CartLine;
use crate::category::Category;
use crate::customer::Customer;
use crate::product::Product;
use crate::sale::SaleRecord;
use crate::stock::{InventoryRow, StockMovementRecord};
use crate::ui::output::money;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        render(&self.rows)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or("").to_string()
}

fn opt_num(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category ID")]
    id: String,
    #[tabled(rename = "Category Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn categories_table(categories: &[Category]) -> String {
    let rows: Vec<CategoryRow> = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.category_id.clone(),
            name: c.category_name.clone(),
            description: opt(c.description.as_deref()),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "Product ID")]
    id: String,
    #[tabled(rename = "Product Name")]
    name: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Category ID")]
    category_id: String,
    #[tabled(rename = "Category Name")]
    category_name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn products_table(products: &[Product], currency: &str) -> String {
    let rows: Vec<ProductRow> = products
        .iter()
        .map(|p| ProductRow {
            id: p.product_id.clone(),
            name: p.product_name.clone(),
            sku: p.sku.clone(),
            category_id: opt(p.category_id.as_deref()),
            category_name: opt(p.category_name.as_deref()),
            price: money(currency, p.price),
            description: opt(p.description.as_deref()),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct InventoryTableRow {
    #[tabled(rename = "Product ID")]
    id: String,
    #[tabled(rename = "Product Name")]
    name: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Current Stock")]
    current: String,
    #[tabled(rename = "Safety Stock")]
    safety: String,
    #[tabled(rename = "Target Stock")]
    target: String,
    #[tabled(rename = "")]
    flag: String,
}

pub fn inventory_table(rows: &[InventoryRow]) -> String {
    let rows: Vec<InventoryTableRow> = rows
        .iter()
        .map(|r| InventoryTableRow {
            id: r.product_id.clone(),
            name: r.product_name.clone(),
            sku: r.sku.clone(),
            category: opt(r.category_name.as_deref()),
            current: opt_num(r.current_stock),
            safety: opt_num(r.safety_stock),
            target: opt_num(r.target_stock),
            flag: if r.is_low() { "LOW".to_string() } else { String::new() },
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct CartTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Product Name")]
    name: String,
    #[tabled(rename = "Unit Price")]
    unit_price: String,
    #[tabled(rename = "Quantity")]
    quantity: i64,
    #[tabled(rename = "Total Price")]
    total: String,
}

/// Cart lines are numbered from 1, matching the POS session commands
pub fn cart_table(lines: &[CartLine], currency: &str) -> String {
    let rows: Vec<CartTableRow> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| CartTableRow {
            index: i + 1,
            name: l.product_name.clone(),
            unit_price: money(currency, l.unit_price),
            quantity: l.quantity,
            total: money(currency, l.total_price),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Product ID")]
    product_id: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Remarks")]
    remarks: String,
}

pub fn history_table(records: &[StockMovementRecord]) -> String {
    let rows: Vec<HistoryRow> = records
        .iter()
        .map(|r| HistoryRow {
            id: r.transaction_id,
            date: r.transaction_date.clone(),
            product_id: r.product_id.clone(),
            quantity: format!("{:+}", r.quantity),
            kind: r.transaction_type.clone(),
            remarks: opt(r.remarks.as_deref()),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "Customer ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mobile")]
    mobile: String,
}

pub fn customers_table(customers: &[Customer]) -> String {
    let rows: Vec<CustomerRow> = customers
        .iter()
        .map(|c| CustomerRow {
            id: c.customer_id.clone(),
            name: c.customer_name.clone(),
            mobile: c.mobile_number.clone(),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct SaleRow {
    #[tabled(rename = "Sale #")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Qty")]
    quantity: i64,
    #[tabled(rename = "Unit Price")]
    unit_price: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Customer")]
    customer: String,
}

pub fn sales_table(sales: &[SaleRecord], currency: &str) -> String {
    let rows: Vec<SaleRow> = sales
        .iter()
        .map(|s| SaleRow {
            id: s.sales_trans_id,
            date: s.sale_date.clone(),
            product: s.product_name.clone().unwrap_or_else(|| s.product_id.clone()),
            quantity: s.quantity,
            unit_price: money(currency, s.unit_price),
            total: money(currency, s.total_price),
            customer: opt(s.customer_name.as_deref()),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct ScreenRow {
    #[tabled(rename = "Screen")]
    screen: String,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Purpose")]
    purpose: String,
}

/// Launcher listing: (screen, command, purpose)
pub fn menu_table(entries: &[(&str, &str, &str)]) -> String {
    let rows: Vec<ScreenRow> = entries
        .iter()
        .map(|(screen, command, purpose)| ScreenRow {
            screen: screen.to_string(),
            command: command.to_string(),
            purpose: purpose.to_string(),
        })
        .collect();
    render(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(categories_table(&[]).is_empty());
        assert!(TableBuilder::new().build().is_empty());
    }

    #[test]
    fn test_cart_table_numbers_lines_from_one() {
        let lines = vec![CartLine {
            product_id: "PID-00001".into(),
            product_name: "GREEN TEA".into(),
            unit_price: 2.5,
            quantity: 2,
            total_price: 5.0,
        }];
        let table = cart_table(&lines, "$");
        assert!(table.contains("GREEN TEA"));
        assert!(table.contains("$5.00"));
        assert!(table.contains("│ 1 "));
    }

    #[test]
    fn test_stats_table_contains_rows() {
        let table = stats_table(&[("Products", "3")]);
        assert!(table.contains("Metric"));
        assert!(table.contains("Products"));
    }
}
