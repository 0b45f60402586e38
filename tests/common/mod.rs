//! Shared fixture wiring the services onto the in-memory repositories.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

use combocart::{
    config::AppConfig,
    events::{Event, EventSender},
    models::{Combo, Product, ProductStatus},
    repository::{CatalogRepository, InMemoryStore},
    services::{
        CartService, CheckoutService, ComboPricingService, OrderStatusService,
        PaymentStatusService, RequestContext,
    },
};

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub order_status: Arc<OrderStatusService>,
    pub payments: PaymentStatusService,
    pub pricing: ComboPricingService,
    /// Held so event sends keep succeeding; tests may drain it.
    pub events: mpsc::Receiver<Event>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let config = Arc::new(AppConfig::default());
        let (event_sender, events) = EventSender::channel(config.event_channel_capacity);
        let event_sender = Arc::new(event_sender);

        let order_status = Arc::new(OrderStatusService::new(
            store.clone(),
            event_sender.clone(),
        ));
        let carts = CartService::new(store.clone(), store.clone(), event_sender.clone());
        let checkout = CheckoutService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            order_status.clone(),
            event_sender.clone(),
            config,
        );
        let payments = PaymentStatusService::new(store.clone(), event_sender.clone());
        let pricing = ComboPricingService::new(store.clone(), event_sender);

        Self {
            store,
            carts,
            checkout,
            order_status,
            payments,
            pricing,
            events,
        }
    }

    pub fn seed_product(&self, code: &str, price: Decimal) -> Product {
        self.seed_product_with_status(code, price, ProductStatus::Active)
    }

    pub fn seed_product_with_status(
        &self,
        code: &str,
        price: Decimal,
        status: ProductStatus,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: format!("Product {}", code),
            description: format!("Test product {}", code),
            image_url: format!("https://cdn.test/{}.png", code),
            price,
            discount_percentage: Decimal::ZERO,
            status,
            created_at: now,
            updated_at: now,
        };
        self.store.upsert_product(product.clone());
        product
    }

    /// Seeds a combo and runs it through the pricing engine so the derived
    /// original price and discount are populated.
    pub async fn seed_combo(&self, name: &str, codes: &[&str], combo_price: Decimal) -> Combo {
        self.seed_combo_with_active(name, codes, combo_price, true)
            .await
    }

    pub async fn seed_combo_with_active(
        &self,
        name: &str,
        codes: &[&str],
        combo_price: Decimal,
        is_active: bool,
    ) -> Combo {
        let now = Utc::now();
        let combo = Combo {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("Test combo {}", name),
            image_url: format!("https://cdn.test/{}.png", name),
            product_codes: codes.iter().map(|c| c.to_string()).collect(),
            original_price: Decimal::ZERO,
            combo_price,
            discount_percentage: Decimal::ZERO,
            is_active,
            created_at: now,
            created_by: "seed".to_string(),
            updated_at: now,
            updated_by: None,
        };
        self.store
            .save_combo(combo.clone(), None)
            .await
            .expect("seed combo");
        self.pricing
            .reprice_combo(combo.id, "seed")
            .await
            .expect("reprice seeded combo")
    }

    pub fn user_ctx(&self) -> RequestContext {
        RequestContext::new(Uuid::new_v4(), "customer", false)
    }

    pub fn admin_ctx(&self) -> RequestContext {
        RequestContext::new(Uuid::new_v4(), "admin", true)
    }
}
