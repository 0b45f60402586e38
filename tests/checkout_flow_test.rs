//! Checkout engine behavior: snapshot pricing, totals, availability
//! rejection, order-number shape, cart cleanup, and COD auto-confirmation.

mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use combocart::{
    models::{ItemType, OrderStatus, PaymentMethod, PaymentStatus, ProductStatus},
    repository::CatalogRepository,
    services::{
        cart::AddItemInput,
        checkout::{CreateOrderInput, SelectedItem},
        RequestContext,
    },
    ServiceError,
};

fn order_input(items: Vec<SelectedItem>, payment_method: PaymentMethod) -> CreateOrderInput {
    CreateOrderInput {
        items,
        payment_method,
        customer_name: "Jordan Doe".to_string(),
        customer_phone: "555-0100".to_string(),
        customer_address: "1 Main St, Springfield".to_string(),
        customer_email: Some("jordan@example.com".to_string()),
        shipping_fee: Decimal::ZERO,
        notes: None,
    }
}

fn select(item_id: Uuid, item_type: ItemType, quantity: u32) -> SelectedItem {
    SelectedItem {
        item_id,
        item_type,
        quantity,
    }
}

#[tokio::test]
async fn test_checkout_totals_and_order_number() {
    let app = TestApp::new();
    let ctx = app.user_ctx();
    let product = app.seed_product("SKU-TOTAL", dec!(100.00));

    let mut input = order_input(
        vec![select(product.id, ItemType::Product, 2)],
        PaymentMethod::OnlinePayment,
    );
    input.shipping_fee = dec!(10.00);

    let order = app.checkout.create_order(&ctx, input).await.unwrap();

    assert_eq!(order.total_amount, dec!(200.00));
    assert_eq!(order.shipping_fee, dec!(10.00));
    assert_eq!(order.final_amount, dec!(210.00));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, dec!(100.00));
    assert_eq!(order.items[0].total_price, dec!(200.00));

    // ORD-<yyyyMMdd>-<8 alphanumerics>
    let parts: Vec<&str> = order.order_number.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "ORD");
    assert_eq!(parts[1].len(), 8);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 8);
}

#[tokio::test]
async fn test_checkout_with_empty_selection_fails() {
    let app = TestApp::new();
    let ctx = app.user_ctx();

    let result = app
        .checkout
        .create_order(&ctx, order_input(Vec::new(), PaymentMethod::Cod))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn test_out_of_stock_product_rejected_and_no_order_created() {
    let app = TestApp::new();
    let ctx = app.user_ctx();
    let product =
        app.seed_product_with_status("SKU-OOS", dec!(50.00), ProductStatus::OutOfStock);

    let result = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(product.id, ItemType::Product, 1)],
                PaymentMethod::Cod,
            ),
        )
        .await;

    assert_matches!(result, Err(ServiceError::Unavailable(_)));
    assert!(app.order_status.list_orders(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_product_rejected() {
    let app = TestApp::new();
    let ctx = app.user_ctx();
    let product = app.seed_product_with_status("SKU-PEND", dec!(50.00), ProductStatus::Pending);

    let result = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(product.id, ItemType::Product, 1)],
                PaymentMethod::Cod,
            ),
        )
        .await;
    assert_matches!(result, Err(ServiceError::Unavailable(_)));
}

#[tokio::test]
async fn test_inactive_combo_rejected() {
    let app = TestApp::new();
    let ctx = app.user_ctx();
    app.seed_product("SKU-IC-1", dec!(40.00));
    let combo = app
        .seed_combo_with_active("Retired Bundle", &["SKU-IC-1"], dec!(30.00), false)
        .await;

    let result = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(combo.id, ItemType::Combo, 1)],
                PaymentMethod::Cod,
            ),
        )
        .await;
    assert_matches!(result, Err(ServiceError::Unavailable(_)));
}

#[tokio::test]
async fn test_unknown_item_rejected() {
    let app = TestApp::new();
    let ctx = app.user_ctx();

    let result = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(Uuid::new_v4(), ItemType::Product, 1)],
                PaymentMethod::Cod,
            ),
        )
        .await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_cod_order_is_auto_confirmed() {
    let app = TestApp::new();
    let ctx = app.user_ctx();
    let product = app.seed_product("SKU-COD", dec!(75.00));

    let order = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(product.id, ItemType::Product, 1)],
                PaymentMethod::Cod,
            ),
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert!(order.confirmed_at.is_some());
    // COD auto-confirmation does not touch the payment machine.
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_checkout_clears_only_the_selected_cart_lines() {
    let app = TestApp::new();
    let ctx = app.user_ctx();
    let ordered = app.seed_product("SKU-CLEAN-1", dec!(10.00));
    let kept = app.seed_product("SKU-CLEAN-2", dec!(20.00));

    for product in [&ordered, &kept] {
        app.carts
            .add_item(
                ctx.user_id,
                AddItemInput {
                    item_id: product.id,
                    item_type: ItemType::Product,
                    quantity: 1,
                },
            )
            .await
            .unwrap();
    }

    app.checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(ordered.id, ItemType::Product, 1)],
                PaymentMethod::Cod,
            ),
        )
        .await
        .unwrap();

    let view = app.carts.get_cart(ctx.user_id).await.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].item_id, kept.id);
}

#[tokio::test]
async fn test_checkout_works_without_a_cart() {
    // The selection is independent of the cart; a user who never carted
    // anything can still order.
    let app = TestApp::new();
    let ctx = app.user_ctx();
    let product = app.seed_product("SKU-NO-CART", dec!(15.00));

    let order = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(product.id, ItemType::Product, 3)],
                PaymentMethod::OnlinePayment,
            ),
        )
        .await
        .unwrap();

    assert_eq!(order.total_amount, dec!(45.00));
}

#[tokio::test]
async fn test_order_lines_snapshot_prices() {
    let app = TestApp::new();
    let ctx = app.user_ctx();
    app.seed_product("SKU-SNAP-1", dec!(120.00));
    app.seed_product("SKU-SNAP-2", dec!(180.00));
    let combo = app
        .seed_combo("Snapshot Bundle", &["SKU-SNAP-1", "SKU-SNAP-2"], dec!(250.00))
        .await;

    let order = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(combo.id, ItemType::Combo, 1)],
                PaymentMethod::OnlinePayment,
            ),
        )
        .await
        .unwrap();
    assert_eq!(order.items[0].unit_price, dec!(250.00));

    // Catalog-side reprice after the fact.
    let stored = app.store.find_combo(combo.id).await.unwrap().unwrap();
    let mut changed = stored.value;
    changed.combo_price = dec!(199.00);
    app.store
        .save_combo(changed, Some(stored.version))
        .await
        .unwrap();

    let reloaded = app.order_status.get_order(&ctx, order.id).await.unwrap();
    assert_eq!(reloaded.items[0].unit_price, dec!(250.00));
    assert_eq!(reloaded.total_amount, dec!(250.00));
}

#[tokio::test]
async fn test_checkout_records_caller_identity() {
    let app = TestApp::new();
    let ctx = RequestContext::new(Uuid::new_v4(), "jordan", false);
    let product = app.seed_product("SKU-WHO", dec!(10.00));

    let order = app
        .checkout
        .create_order(
            &ctx,
            order_input(
                vec![select(product.id, ItemType::Product, 1)],
                PaymentMethod::OnlinePayment,
            ),
        )
        .await
        .unwrap();

    assert_eq!(order.user_id, ctx.user_id);
    assert_eq!(order.created_by, "jordan");
}
