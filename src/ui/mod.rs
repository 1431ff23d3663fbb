pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    banner, error, header, info, money, movement, muted, section, status, success,
    summary_row, warn,
};
pub use table::{
    TableBuilder, cart_table, categories_table, customers_table, history_table, inventory_table,
    menu_table, products_table, sales_table, stats_table,
};
pub use theme::{theme, Theme};
