//! Reconciliation flow tests against mocked storefront and gateway collaborators.

use mockall::{mock, predicate::eq};
use recon_engine::{
    status::OrderStatus,
    traits::{
        CartStore,
        CustomerDirectory,
        GatewayError,
        OrderStore,
        PaymentGateway,
        ProductStore,
        StoreError,
    },
    types::{
        CartLine,
        CustomerRef,
        DocumentId,
        IncomingNotification,
        LineItem,
        NewOrder,
        NewTransaction,
        Order,
        OrderId,
        OrderUpdate,
        PaymentSession,
        Product,
        VerifiedTransaction,
    },
    ReconcileApi,
    ReconcileError,
};
use serde_json::json;
use spr_common::Money;

mock! {
    pub Storefront {}

    impl OrderStore for Storefront {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;
        async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;
        async fn update_order(&self, id: &DocumentId, update: OrderUpdate) -> Result<(), StoreError>;
    }

    impl ProductStore for Storefront {
        async fn fetch_product(&self, product_ref: &str) -> Result<Option<Product>, StoreError>;
        async fn set_product_stock(&self, id: &DocumentId, stock: i64) -> Result<(), StoreError>;
    }

    impl CartStore for Storefront {
        async fn fetch_cart_lines(&self, customer_id: i64) -> Result<Vec<CartLine>, StoreError>;
        async fn delete_cart_line(&self, id: &DocumentId) -> Result<(), StoreError>;
    }

    impl CustomerDirectory for Storefront {
        async fn fetch_customer_id_by_email(&self, email: &str) -> Result<Option<i64>, StoreError>;
    }
}

mock! {
    pub Gateway {}

    impl PaymentGateway for Gateway {
        async fn fetch_transaction_status(&self, order_id: &OrderId) -> Result<VerifiedTransaction, GatewayError>;
        async fn create_transaction(&self, request: &NewTransaction) -> Result<PaymentSession, GatewayError>;
    }
}

fn notification(order_id: &str) -> IncomingNotification {
    IncomingNotification {
        order_id: OrderId(order_id.to_string()),
        transaction_id: Some("tx-abc".to_string()),
        raw: json!({"order_id": order_id, "transaction_status": "settlement"}),
    }
}

fn verified(order_id: &str, status: &str, fraud: Option<&str>) -> VerifiedTransaction {
    VerifiedTransaction {
        order_id: OrderId(order_id.to_string()),
        transaction_status: status.to_string(),
        fraud_status: fraud.map(String::from),
        transaction_id: Some("tx-abc".to_string()),
        status_code: "200".to_string(),
        payment_type: Some("qris".to_string()),
        gross_amount: Some("247000.00".to_string()),
        raw: json!({"transaction_status": status}),
    }
}

fn line(product_ref: &str, quantity: i64) -> LineItem {
    LineItem {
        product_ref: product_ref.to_string(),
        name: format!("Product {product_ref}"),
        unit_price: Money::from_cents(100_000),
        quantity,
        category: "groceries".to_string(),
    }
}

fn shipping_line() -> LineItem {
    LineItem {
        product_ref: "shipping".to_string(),
        name: "Standard delivery".to_string(),
        unit_price: Money::from_cents(15_000),
        quantity: 1,
        category: "shipping".to_string(),
    }
}

fn order(order_id: &str, status: OrderStatus, items: Vec<LineItem>) -> Order {
    Order {
        internal_id: DocumentId("doc-order-1".to_string()),
        order_id: OrderId(order_id.to_string()),
        status,
        total_amount: Money::from_cents(300_000),
        items,
        customer: CustomerRef { id: Some(7), email: Some("ayu@example.com".to_string()) },
        gateway_transaction_id: None,
    }
}

fn product(document_id: &str, product_ref: &str, stock: i64) -> Product {
    Product {
        internal_id: DocumentId(document_id.to_string()),
        product_ref: product_ref.to_string(),
        name: format!("Product {product_ref}"),
        stock,
    }
}

#[tokio::test]
async fn happy_path_settlement_updates_stock_and_clears_cart() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_transaction_status()
        .with(eq(OrderId("ORDER-1".to_string())))
        .times(1)
        .returning(|_| Ok(verified("ORDER-1", "settlement", None)));
    db.expect_fetch_order_by_order_id()
        .times(1)
        .returning(|_| Ok(Some(order("ORDER-1", OrderStatus::Pending, vec![line("p-1", 2), line("p-2", 1), shipping_line()]))));
    db.expect_update_order()
        .withf(|id, update| {
            id.as_str() == "doc-order-1"
                && update.status == OrderStatus::Settlement
                && update.gateway_transaction_id.as_deref() == Some("tx-abc")
                && update.payment_metadata["transaction_status"] == "settlement"
        })
        .times(1)
        .returning(|_, _| Ok(()));
    db.expect_fetch_product().withf(|r| r == "p-1").times(1).returning(|_| Ok(Some(product("doc-p-1", "p-1", 10))));
    db.expect_fetch_product().withf(|r| r == "p-2").times(1).returning(|_| Ok(Some(product("doc-p-2", "p-2", 5))));
    db.expect_set_product_stock()
        .withf(|id, stock| id.as_str() == "doc-p-1" && *stock == 8)
        .times(1)
        .returning(|_, _| Ok(()));
    db.expect_set_product_stock()
        .withf(|id, stock| id.as_str() == "doc-p-2" && *stock == 4)
        .times(1)
        .returning(|_, _| Ok(()));
    db.expect_fetch_cart_lines().with(eq(7)).times(1).returning(|_| {
        Ok(vec![CartLine { internal_id: DocumentId("cart-1".to_string()), quantity: 2 }])
    });
    db.expect_delete_cart_line()
        .withf(|id| id.as_str() == "cart-1")
        .times(1)
        .returning(|_| Ok(()));

    let api = ReconcileApi::new(db, gateway);
    let outcome = api.process_notification(notification("ORDER-1")).await.expect("reconciliation failed");
    assert_eq!(outcome.previous_status, OrderStatus::Pending);
    assert_eq!(outcome.new_status, OrderStatus::Settlement);
    assert!(outcome.settled_now);
    assert_eq!(outcome.stock_updates, 2);
    assert_eq!(outcome.cart_lines_cleared, 1);
}

#[tokio::test]
async fn capture_pending_fraud_review_has_no_side_effects() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_transaction_status()
        .times(1)
        .returning(|_| Ok(verified("ORDER-2", "capture", Some("challenge"))));
    db.expect_fetch_order_by_order_id()
        .times(1)
        .returning(|_| Ok(Some(order("ORDER-2", OrderStatus::Pending, vec![line("p-1", 2)]))));
    db.expect_update_order()
        .withf(|_, update| update.status == OrderStatus::Capture)
        .times(1)
        .returning(|_, _| Ok(()));
    db.expect_fetch_product().times(0);
    db.expect_set_product_stock().times(0);
    db.expect_fetch_cart_lines().times(0);
    db.expect_delete_cart_line().times(0);

    let api = ReconcileApi::new(db, gateway);
    let outcome = api.process_notification(notification("ORDER-2")).await.expect("reconciliation failed");
    assert_eq!(outcome.new_status, OrderStatus::Capture);
    assert!(!outcome.settled_now);
}

#[tokio::test]
async fn duplicate_settlement_delivery_decrements_stock_exactly_once() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_transaction_status().times(2).returning(|_| Ok(verified("ORDER-3", "settlement", None)));
    // First delivery sees the pending order; the second sees the already-settled one.
    db.expect_fetch_order_by_order_id()
        .times(1)
        .returning(|_| Ok(Some(order("ORDER-3", OrderStatus::Pending, vec![line("p-1", 2)]))));
    db.expect_fetch_order_by_order_id()
        .times(1)
        .returning(|_| Ok(Some(order("ORDER-3", OrderStatus::Settlement, vec![line("p-1", 2)]))));
    // The status write itself is idempotent and happens on both runs.
    db.expect_update_order()
        .withf(|_, update| update.status == OrderStatus::Settlement)
        .times(2)
        .returning(|_, _| Ok(()));
    db.expect_fetch_product().times(1).returning(|_| Ok(Some(product("doc-p-1", "p-1", 10))));
    db.expect_set_product_stock()
        .withf(|id, stock| id.as_str() == "doc-p-1" && *stock == 8)
        .times(1)
        .returning(|_, _| Ok(()));
    db.expect_fetch_cart_lines().times(1).returning(|_| Ok(vec![]));
    db.expect_delete_cart_line().times(0);

    let api = ReconcileApi::new(db, gateway);
    let first = api.process_notification(notification("ORDER-3")).await.expect("first run failed");
    assert!(first.settled_now);
    let second = api.process_notification(notification("ORDER-3")).await.expect("second run failed");
    assert!(!second.settled_now);
    assert_eq!(second.stock_updates, 0);
    assert_eq!(second.cart_lines_cleared, 0);
}

#[tokio::test]
async fn missing_order_aborts_without_any_writes() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_transaction_status().times(1).returning(|_| Ok(verified("GHOST-1", "settlement", None)));
    db.expect_fetch_order_by_order_id().times(1).returning(|_| Ok(None));
    db.expect_update_order().times(0);
    db.expect_set_product_stock().times(0);
    db.expect_delete_cart_line().times(0);

    let api = ReconcileApi::new(db, gateway);
    let err = api.process_notification(notification("GHOST-1")).await.expect_err("expected an error");
    assert!(matches!(err, ReconcileError::OrderNotFound(ref id) if id.as_str() == "GHOST-1"));
}

#[tokio::test]
async fn gateway_verification_failure_aborts_before_any_lookup() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_transaction_status()
        .times(1)
        .returning(|_| Err(GatewayError::Network("connection reset".to_string())));
    db.expect_fetch_order_by_order_id().times(0);
    db.expect_update_order().times(0);

    let api = ReconcileApi::new(db, gateway);
    let err = api.process_notification(notification("ORDER-4")).await.expect_err("expected an error");
    assert!(matches!(err, ReconcileError::Gateway(_)));
}

#[tokio::test]
async fn one_failing_product_does_not_block_the_rest() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_transaction_status().times(1).returning(|_| Ok(verified("ORDER-5", "settlement", None)));
    db.expect_fetch_order_by_order_id()
        .times(1)
        .returning(|_| Ok(Some(order("ORDER-5", OrderStatus::Capture, vec![line("p-1", 2), line("p-2", 1)]))));
    db.expect_update_order().times(1).returning(|_, _| Ok(()));
    db.expect_fetch_product().withf(|r| r == "p-1").times(1).returning(|_| Ok(Some(product("doc-p-1", "p-1", 10))));
    db.expect_fetch_product().withf(|r| r == "p-2").times(1).returning(|_| Ok(Some(product("doc-p-2", "p-2", 5))));
    db.expect_set_product_stock()
        .withf(|id, _| id.as_str() == "doc-p-1")
        .times(1)
        .returning(|_, _| Err(StoreError::Backend { status: 500, message: "boom".to_string() }));
    db.expect_set_product_stock()
        .withf(|id, stock| id.as_str() == "doc-p-2" && *stock == 4)
        .times(1)
        .returning(|_, _| Ok(()));
    db.expect_fetch_cart_lines().with(eq(7)).times(1).returning(|_| {
        Ok(vec![CartLine { internal_id: DocumentId("cart-9".to_string()), quantity: 2 }])
    });
    db.expect_delete_cart_line().times(1).returning(|_| Ok(()));

    let api = ReconcileApi::new(db, gateway);
    let outcome = api.process_notification(notification("ORDER-5")).await.expect("reconciliation failed");
    assert!(outcome.settled_now);
    assert_eq!(outcome.stock_updates, 1);
    assert_eq!(outcome.cart_lines_cleared, 1);
}

#[tokio::test]
async fn stock_is_clamped_at_zero() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_transaction_status().times(1).returning(|_| Ok(verified("ORDER-6", "settlement", None)));
    db.expect_fetch_order_by_order_id()
        .times(1)
        .returning(|_| Ok(Some(order("ORDER-6", OrderStatus::Pending, vec![line("p-1", 8)]))));
    db.expect_update_order().times(1).returning(|_, _| Ok(()));
    db.expect_fetch_product().times(1).returning(|_| Ok(Some(product("doc-p-1", "p-1", 3))));
    db.expect_set_product_stock()
        .withf(|_, stock| *stock == 0)
        .times(1)
        .returning(|_, _| Ok(()));
    db.expect_fetch_cart_lines().times(1).returning(|_| Ok(vec![]));

    let api = ReconcileApi::new(db, gateway);
    api.process_notification(notification("ORDER-6")).await.expect("reconciliation failed");
}

#[tokio::test]
async fn customer_resolution_falls_back_to_email() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_transaction_status().times(1).returning(|_| Ok(verified("ORDER-7", "settlement", None)));
    let mut o = order("ORDER-7", OrderStatus::Pending, vec![]);
    o.customer = CustomerRef { id: None, email: Some("ayu@example.com".to_string()) };
    db.expect_fetch_order_by_order_id().times(1).return_once(move |_| Ok(Some(o)));
    db.expect_update_order().times(1).returning(|_, _| Ok(()));
    db.expect_fetch_customer_id_by_email().withf(|e| e == "ayu@example.com").times(1).returning(|_| Ok(Some(42)));
    db.expect_fetch_cart_lines().with(eq(42)).times(1).returning(|_| {
        Ok(vec![CartLine { internal_id: DocumentId("cart-2".to_string()), quantity: 1 }])
    });
    db.expect_delete_cart_line().times(1).returning(|_| Ok(()));

    let api = ReconcileApi::new(db, gateway);
    let outcome = api.process_notification(notification("ORDER-7")).await.expect("reconciliation failed");
    assert_eq!(outcome.cart_lines_cleared, 1);
}

#[tokio::test]
async fn unresolvable_customer_skips_cart_clearing_but_reconciles() {
    let _ = env_logger::try_init();
    let mut db = MockStorefront::new();
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_transaction_status().times(1).returning(|_| Ok(verified("ORDER-8", "settlement", None)));
    let mut o = order("ORDER-8", OrderStatus::Pending, vec![]);
    o.customer = CustomerRef { id: None, email: None };
    db.expect_fetch_order_by_order_id().times(1).return_once(move |_| Ok(Some(o)));
    db.expect_update_order().times(1).returning(|_, _| Ok(()));
    db.expect_fetch_cart_lines().times(0);
    db.expect_delete_cart_line().times(0);

    let api = ReconcileApi::new(db, gateway);
    let outcome = api.process_notification(notification("ORDER-8")).await.expect("reconciliation failed");
    assert!(outcome.settled_now);
    assert_eq!(outcome.cart_lines_cleared, 0);
}
