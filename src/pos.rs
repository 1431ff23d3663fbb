//! Interactive point-of-sale session
//!
//! Reads one command per line, keeps the cart in memory and writes every
//! result to the given output. A failed command prints its error and the
//! session carries on with the cart unchanged.

use std::io::{BufRead, Write};
use crate::cart::{Cart, CartProduct};
use crate::product::ProductFilter;
use crate::storage::SqliteStore;
use crate::ui::{cart_table, money};
use crate::{Error, Result};

pub const HELP: &str = "\
Commands:
  search [term]            list products by id, SKU or name
  category <id|all>        restrict searches to one category
  add <product_id> [qty]   add to cart (default 1)
  update <line> <qty>      change the quantity of a cart line
  remove <line>            drop a cart line
  cart                     show the cart
  customer <mobile> [name] assign a customer, registering them when a name is given
  customer clear           sell without a customer
  checkout                 record the sale
  clear                    empty the cart
  new                      start a new sale (cart and customer)
  help                     this text
  quit                     leave";

/// A parsed session command
#[derive(Debug, Clone, PartialEq)]
pub enum PosCommand {
    Search(String),
    Category(Option<String>),
    Add { product_id: String, quantity: i64 },
    Update { line: usize, quantity: i64 },
    Remove { line: usize },
    ShowCart,
    Customer { mobile: String, name: Option<String> },
    ClearCustomer,
    Checkout,
    Clear,
    NewSale,
    Help,
    Quit,
}

impl PosCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(Error::validation("Empty command"));
        };
        let rest: Vec<&str> = words.collect();

        let cmd = match verb.to_lowercase().as_str() {
            "search" | "s" => PosCommand::Search(rest.join(" ")),
            "category" | "cat" => match rest.first() {
                None => return Err(Error::validation("Usage: category <id|all>")),
                Some(id) if id.eq_ignore_ascii_case("all") => PosCommand::Category(None),
                Some(id) => PosCommand::Category(Some(id.to_uppercase())),
            },
            "add" | "a" => {
                let product_id = rest
                    .first()
                    .ok_or_else(|| Error::validation("Usage: add <product_id> [qty]"))?
                    .to_uppercase();
                let quantity = match rest.get(1) {
                    Some(q) => parse_quantity(q)?,
                    None => 1,
                };
                PosCommand::Add { product_id, quantity }
            }
            "update" | "u" => {
                let (Some(line), Some(qty)) = (rest.first(), rest.get(1)) else {
                    return Err(Error::validation("Usage: update <line> <qty>"));
                };
                PosCommand::Update {
                    line: parse_line(line)?,
                    quantity: parse_quantity(qty)?,
                }
            }
            "remove" | "rm" => {
                let line = rest
                    .first()
                    .ok_or_else(|| Error::validation("Usage: remove <line>"))?;
                PosCommand::Remove { line: parse_line(line)? }
            }
            "cart" => PosCommand::ShowCart,
            "customer" | "cust" if rest.len() == 1 && rest[0].eq_ignore_ascii_case("clear") => {
                PosCommand::ClearCustomer
            }
            "customer" | "cust" => {
                let mobile = rest
                    .first()
                    .ok_or_else(|| Error::validation("Please enter a mobile number."))?
                    .to_string();
                let name = (rest.len() > 1).then(|| rest[1..].join(" "));
                PosCommand::Customer { mobile, name }
            }
            "checkout" | "pay" => PosCommand::Checkout,
            "clear" => PosCommand::Clear,
            "new" => PosCommand::NewSale,
            "help" | "?" => PosCommand::Help,
            "quit" | "exit" | "q" => PosCommand::Quit,
            other => return Err(Error::validation(format!("Unknown command: {} (try 'help')", other))),
        };
        Ok(cmd)
    }
}

fn parse_quantity(text: &str) -> Result<i64> {
    text.parse()
        .map_err(|_| Error::validation(format!("Quantity must be a whole number (got '{}')", text)))
}

/// Cart lines are numbered from 1 on screen
fn parse_line(text: &str) -> Result<usize> {
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::validation(format!("Line must be a positive number (got '{}')", text))),
    }
}

/// Whether the session should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One point-of-sale terminal over the shared store
pub struct PosSession<'a> {
    store: &'a mut SqliteStore,
    cart: Cart,
    category: Option<String>,
    currency: String,
}

impl<'a> PosSession<'a> {
    pub fn new(store: &'a mut SqliteStore, currency: &str) -> Self {
        Self {
            store,
            cart: Cart::new(),
            category: None,
            currency: currency.to_string(),
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Run commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "Point of sale ready. Type 'help' for commands.")?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match PosCommand::parse(&line).and_then(|cmd| self.execute(cmd, out)) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(Error::Io(e)) => return Err(Error::Io(e)),
                Err(e) => {
                    tracing::debug!("POS command failed: {}", e);
                    writeln!(out, "Error: {}", e)?;
                }
            }
        }
        Ok(())
    }

    /// Apply one command
    pub fn execute<W: Write>(&mut self, cmd: PosCommand, out: &mut W) -> Result<Flow> {
        match cmd {
            PosCommand::Search(term) => self.search(&term, out)?,
            PosCommand::Category(category) => {
                if let Some(id) = &category {
                    if self.store.get_category(id)?.is_none() {
                        return Err(Error::CategoryNotFound(id.clone()));
                    }
                }
                writeln!(out, "Category: {}", category.as_deref().unwrap_or("All Categories"))?;
                self.category = category;
                self.search("", out)?;
            }
            PosCommand::Add { product_id, quantity } => {
                let product = self
                    .store
                    .get_product(&product_id)?
                    .ok_or_else(|| Error::ProductNotFound(product_id.clone()))?;
                let available = self.store.current_stock(&product_id)?;
                self.cart.add(
                    CartProduct {
                        product_id: product.product_id,
                        product_name: product.product_name,
                        unit_price: product.price,
                    },
                    quantity,
                    available,
                )?;
                self.show_cart(out)?;
            }
            PosCommand::Update { line, quantity } => {
                let index = line.checked_sub(1).ok_or(Error::CartLineNotFound(line))?;
                let product_id = self
                    .cart
                    .line(index)
                    .map(|l| l.product_id.clone())
                    .ok_or(Error::CartLineNotFound(line))?;
                let available = self.store.current_stock(&product_id)?;
                self.cart.update(index, quantity, available)?;
                self.show_cart(out)?;
            }
            PosCommand::Remove { line } => {
                if line == 0 || line > self.cart.len() {
                    return Err(Error::CartLineNotFound(line));
                }
                let removed = self.cart.remove(line - 1)?;
                writeln!(out, "Removed {}", removed.product_name)?;
                self.show_cart(out)?;
            }
            PosCommand::ShowCart => self.show_cart(out)?,
            PosCommand::Customer { mobile, name } => {
                let customer = match self.store.find_customer_by_mobile(&mobile)? {
                    Some(c) => c,
                    None => match name {
                        Some(name) => {
                            let c = self.store.add_customer(&name, &mobile)?;
                            writeln!(out, "Customer {} added.", c.customer_name)?;
                            c
                        }
                        None => {
                            return Err(Error::CustomerNotFound(format!(
                                "{} (add a name to register: customer {} <name>)",
                                mobile, mobile
                            )));
                        }
                    },
                };
                writeln!(out, "Customer {} assigned to the current cart.", customer)?;
                self.cart.set_customer(customer);
            }
            PosCommand::ClearCustomer => {
                self.cart.clear_customer();
                writeln!(out, "No customer assigned to the current cart.")?;
            }
            PosCommand::Checkout => {
                let receipt = self.store.checkout(&self.cart)?;
                writeln!(out, "{}", receipt.summary(&self.currency))?;
                self.cart.reset();
            }
            PosCommand::Clear => {
                self.cart.clear();
                writeln!(out, "Cart cleared.")?;
            }
            PosCommand::NewSale => {
                self.cart.reset();
                writeln!(out, "New sale started.")?;
            }
            PosCommand::Help => writeln!(out, "{}", HELP)?,
            PosCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn search<W: Write>(&mut self, term: &str, out: &mut W) -> Result<()> {
        let filter = ProductFilter {
            search: term.to_string(),
            category_id: self.category.clone(),
        };
        let products = self.store.search_products(&filter)?;
        if products.is_empty() {
            writeln!(out, "No products found.")?;
        }
        for p in products {
            let stock = self.store.current_stock(&p.product_id)?;
            writeln!(
                out,
                "{}  {}  SKU {}  stock {}  {}",
                p.product_id,
                p.product_name,
                p.sku,
                stock,
                money(&self.currency, p.price)
            )?;
        }
        Ok(())
    }

    fn show_cart<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.cart.is_empty() {
            writeln!(out, "Cart is empty.")?;
        } else {
            writeln!(out, "{}", cart_table(self.cart.lines(), &self.currency))?;
        }
        writeln!(out, "Total: {}", money(&self.currency, self.cart.total()))?;
        if let Some(c) = self.cart.customer() {
            writeln!(out, "Customer: {}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::NewProduct;
    use std::io::Cursor;

    fn store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let c = store.add_category("snacks", None).unwrap();
        store.add_product(&NewProduct::new("chips", "ch-1", &c.category_id, 1.5)).unwrap();
        store.add_product(&NewProduct::new("nuts", "nt-1", &c.category_id, 3.0)).unwrap();
        store.add_stock("PID-00001", 5, None).unwrap();
        store.add_stock("PID-00002", 2, None).unwrap();
        store
    }

    fn run(store: &mut SqliteStore, script: &str) -> String {
        let mut out = Vec::new();
        PosSession::new(store, "$")
            .run(Cursor::new(script.to_string()), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            PosCommand::parse("add pid-00001 3").unwrap(),
            PosCommand::Add { product_id: "PID-00001".into(), quantity: 3 }
        );
        assert_eq!(
            PosCommand::parse("customer 0917 Ana Cruz").unwrap(),
            PosCommand::Customer { mobile: "0917".into(), name: Some("Ana Cruz".into()) }
        );
        assert_eq!(PosCommand::parse("customer CLEAR").unwrap(), PosCommand::ClearCustomer);
        assert_eq!(PosCommand::parse("category all").unwrap(), PosCommand::Category(None));
        assert!(PosCommand::parse("update 0 2").is_err());
        assert!(PosCommand::parse("add PID-1 many").is_err());
        assert!(PosCommand::parse("dance").is_err());
    }

    #[test]
    fn test_session_checkout_with_new_customer() {
        let mut store = store();
        let output = run(
            &mut store,
            "add PID-00001 2\nadd PID-00002\ncustomer 0917 Ana\ncheckout\nquit\n",
        );

        assert!(output.contains("Customer Ana added."));
        assert!(output.contains("Total Sale Amount: $6.00"));
        assert!(output.contains("Customer: Ana (0917)"));
        assert_eq!(store.current_stock("PID-00001").unwrap(), 3);
        assert_eq!(store.current_stock("PID-00002").unwrap(), 1);
    }

    #[test]
    fn test_session_reports_errors_and_continues() {
        let mut store = store();
        let output = run(&mut store, "add PID-00002 3\ncheckout\nremove 4\nadd PID-00002 2\ncart\n");

        assert!(output.contains("Error: Insufficient stock for PID-00002: only 2 units available, 3 requested"));
        assert!(output.contains("Error: Your cart is empty"));
        assert!(output.contains("Error: No cart line at position 4"));
        assert!(output.contains("Total: $6.00"));
        assert_eq!(store.current_stock("PID-00002").unwrap(), 2);
    }

    #[test]
    fn test_session_update_and_unknown_customer() {
        let mut store = store();
        let mut session = PosSession::new(&mut store, "$");
        let mut out = Vec::new();

        session.execute(PosCommand::parse("add PID-00001").unwrap(), &mut out).unwrap();
        session.execute(PosCommand::parse("update 1 4").unwrap(), &mut out).unwrap();
        assert_eq!(session.cart().lines()[0].quantity, 4);
        assert!(session.execute(PosCommand::parse("update 1 6").unwrap(), &mut out).is_err());

        let err = session
            .execute(PosCommand::parse("customer 0999").unwrap(), &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::CustomerNotFound(_)));
        assert!(session.cart().customer().is_none());
    }

    #[test]
    fn test_session_customer_clear_sells_anonymously() {
        let mut store = store();
        store.add_customer("Ana", "0917").unwrap();
        let mut session = PosSession::new(&mut store, "$");
        let mut out = Vec::new();

        for line in ["add PID-00001 1", "customer 0917", "customer clear"] {
            session.execute(PosCommand::parse(line).unwrap(), &mut out).unwrap();
        }
        assert!(session.cart().customer().is_none());
        assert_eq!(session.cart().len(), 1);

        session.execute(PosCommand::Checkout, &mut out).unwrap();
        let sales = store.list_sales(&crate::sale::SalesFilter::default()).unwrap();
        assert_eq!(sales.len(), 1);
        assert!(sales[0].customer_id.is_none());
    }

    #[test]
    fn test_session_category_filter() {
        let mut store = store();
        let output = run(&mut store, "category PC-001\nsearch nut\ncategory PC-404\n");
        assert!(output.contains("PID-00002  NUTS  SKU NT-1  stock 2  $3.00"));
        assert!(output.contains("Error: Category not found: PC-404"));
    }
}
