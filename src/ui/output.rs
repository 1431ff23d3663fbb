use crate::output::is_quiet;
use crate::stock::StockMovementRecord;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().title.clone()));
}

pub fn banner(title: &str, subtitle: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!("  {}", title);
    println!("  {}", subtitle.style(theme().label.clone()));
    println!();
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().label.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().failure.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().caution.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().accent.clone()),
        label.style(theme().label.clone()),
        value
    );
}

pub fn section(title: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!("━{}━", title.style(theme().title.clone()));
}

pub fn muted(text: &str) -> String {
    text.style(theme().note.clone()).to_string()
}

/// Format an amount with the configured currency symbol
pub fn money(currency: &str, amount: f64) -> String {
    format!("{}{:.2}", currency, amount)
}

/// One line for a logged stock movement
pub fn movement(record: &StockMovementRecord) {
    let (icon, style) = if record.quantity >= 0 {
        (Icons::UP, theme().stock_in.clone())
    } else {
        (Icons::DOWN, theme().stock_out.clone())
    };
    println!(
        "{} {} {} {} {}",
        icon,
        record.product_id,
        format!("{:+}", record.quantity).style(style),
        record.transaction_type.style(theme().accent.clone()),
        muted(record.remarks.as_deref().unwrap_or(""))
    );
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}
