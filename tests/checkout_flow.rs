use stockpos::pos::PosSession;
use stockpos::storage::SqliteStore;
use stockpos::{Cart, CartProduct, Error, MovementKind, NewProduct, SalesFilter};

#[test]
fn store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("inventory.db");

    let product_id = {
        let mut store = SqliteStore::open(&db).unwrap();
        let category = store.add_category("snacks", Some("chips and nuts")).unwrap();
        let product = store
            .add_product(&NewProduct::new("peanuts", "pn-100", &category.category_id, 1.5))
            .unwrap();
        store.add_stock(&product.product_id, 12, None).unwrap();
        product.product_id
    };

    let store = SqliteStore::open(&db).unwrap();
    assert_eq!(store.current_stock(&product_id).unwrap(), 12);
    let product = store.get_product(&product_id).unwrap().unwrap();
    assert_eq!(product.category_name.as_deref(), Some("SNACKS"));
    assert_eq!(store.stock_history(Some(&product_id), 10).unwrap().len(), 1);
}

#[test]
fn full_sale_updates_stock_log_and_sales() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("shop").join("inventory.db");
    stockpos::config::ensure_db_dir(&db).unwrap();
    let mut store = SqliteStore::open(&db).unwrap();

    let category = store.add_category("beverages", None).unwrap();
    assert_eq!(category.category_id, "PC-001");
    let tea = store
        .add_product(&NewProduct::new("green tea", "gt-01", "PC-001", 2.5))
        .unwrap();
    assert_eq!(tea.product_id, "PID-00001");

    store.add_stock(&tea.product_id, 20, Some("opening stock")).unwrap();
    store
        .apply_movement(&tea.product_id, MovementKind::Damaged, 2, None)
        .unwrap();
    store.set_stock_levels(&tea.product_id, 10, 30).unwrap();

    let customer = store.add_customer("Maria", "09171234567").unwrap();
    let mut cart = Cart::new();
    let available = store.current_stock(&tea.product_id).unwrap();
    cart.add(
        CartProduct {
            product_id: tea.product_id.clone(),
            product_name: tea.product_name.clone(),
            unit_price: tea.price,
        },
        8,
        available,
    )
    .unwrap();
    cart.set_customer(customer.clone());

    let receipt = store.checkout(&cart).unwrap();
    assert!((receipt.total - 20.0).abs() < 1e-9);
    assert!(receipt.summary("$").contains("Customer: Maria (09171234567)"));

    assert_eq!(store.current_stock(&tea.product_id).unwrap(), 10);
    let low = store.low_stock().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].shortfall(), 20);

    let history = store.stock_history(Some(&tea.product_id), 10).unwrap();
    let quantities: Vec<i64> = history.iter().map(|r| r.quantity).collect();
    assert_eq!(quantities, vec![-8, -2, 20]);

    let sales = store.list_sales(&SalesFilter::default()).unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].customer_id.as_deref(), Some(customer.customer_id.as_str()));

    // history now blocks deletion of both the product and its category
    assert!(matches!(store.delete_product(&tea.product_id), Err(Error::ProductInUse(_))));
    assert!(matches!(
        store.delete_category("PC-001"),
        Err(Error::CategoryInUse { count: 1, .. })
    ));
}

#[test]
fn pos_session_sells_to_new_customer() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("inventory.db");
    let mut store = SqliteStore::open(&db).unwrap();
    let category = store.add_category("bakery", None).unwrap();
    let bread = store
        .add_product(&NewProduct::new("pandesal", "bk-1", &category.category_id, 0.25))
        .unwrap();
    store.add_stock(&bread.product_id, 40, None).unwrap();

    let script = format!(
        "add {id} 10\nadd {id} 50\ncustomer 0918 Jose Cruz\ncheckout\nquit\n",
        id = bread.product_id
    );
    let mut out = Vec::new();
    {
        let mut session = PosSession::new(&mut store, "$");
        session.run(script.as_bytes(), &mut out).unwrap();
        assert!(session.cart().is_empty());
    }
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Insufficient stock"));
    assert!(text.contains("Total Sale Amount: $2.50"));

    assert_eq!(store.current_stock(&bread.product_id).unwrap(), 30);
    let customer = store.find_customer_by_mobile("0918").unwrap().unwrap();
    assert_eq!(customer.customer_name, "Jose Cruz");
}
