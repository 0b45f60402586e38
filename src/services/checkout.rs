use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ItemType, Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus},
    repository::{CartRepository, CatalogRepository, OrderRepository},
};

use super::{order_status::OrderDetail, OrderStatusService, RequestContext};

/// Converts a selection of items into an immutable order.
///
/// Prices, names and images are snapshotted from the catalog at creation
/// time; later catalog edits never affect the order. Order insert, cart
/// cleanup and COD auto-confirmation are three separate writes with no
/// transaction boundary: a failure between them leaves an
/// inconsistent-but-recoverable state (order placed, stale cart lines).
#[derive(Clone)]
pub struct CheckoutService {
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    order_status: Arc<OrderStatusService>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

impl CheckoutService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        order_status: Arc<OrderStatusService>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            carts,
            orders,
            catalog,
            order_status,
            event_sender,
            config,
        }
    }

    /// Creates an order from the selected items.
    ///
    /// The selection is caller-chosen: usually a subset of the user's cart,
    /// but nothing requires the items to have been carted. Each selected
    /// item is resolved against the catalog (`NotFound` when absent,
    /// `Unavailable` when not purchasable) and snapshotted into an
    /// [`OrderLine`]. After the order is persisted the matching cart lines
    /// are removed best-effort, and COD orders are auto-confirmed.
    #[instrument(skip(self, ctx, input), fields(user_id = %ctx.user_id, items = input.items.len(), payment_method = %input.payment_method))]
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        input: CreateOrderInput,
    ) -> Result<OrderDetail, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "No items selected".to_string(),
            ));
        }
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let mut lines = Vec::with_capacity(input.items.len());
        for selected in &input.items {
            lines.push(self.snapshot_line(selected).await?);
        }
        // Unreachable given the per-item resolution above; kept as a guard
        // against future partial-resolution changes.
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "No valid items in selection".to_string(),
            ));
        }

        let total_amount: Decimal = lines.iter().map(|l| l.total_price).sum();
        let final_amount = total_amount + input.shipping_fee;
        let now = Utc::now();

        let order = Order {
            id: Uuid::new_v4(),
            order_number: generate_order_number(&self.config.order_number_prefix),
            user_id: ctx.user_id,
            items: lines,
            total_amount,
            shipping_fee: input.shipping_fee,
            final_amount,
            status: OrderStatus::Pending,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_address: input.customer_address,
            customer_email: input.customer_email,
            notes: input.notes,
            created_at: now,
            created_by: ctx.username.clone(),
            confirmed_at: None,
            processing_at: None,
            shipping_at: None,
            delivered_at: None,
            completed_at: None,
            canceled_at: None,
            paid_at: None,
            refunded_at: None,
        };

        self.orders.insert(order.clone()).await?;
        self.event_sender
            .send_or_log(Event::OrderCreated(order.id))
            .await;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %total_amount,
            "Order created"
        );

        // Best-effort: the order exists either way, so a cleanup failure is
        // logged instead of turning a placed order into a failed request.
        if let Err(err) = self.clear_ordered_lines(ctx.user_id, &input.items).await {
            warn!(
                user_id = %ctx.user_id,
                order_id = %order.id,
                error = %err,
                "Cart cleanup after checkout failed"
            );
        }

        // COD needs no gateway confirmation, so the order confirms itself.
        if order.payment_method == PaymentMethod::Cod {
            return self
                .order_status
                .update_status(ctx, order.id, OrderStatus::Confirmed)
                .await;
        }

        Ok(OrderDetail::from(order))
    }

    /// Resolves one selected item against the catalog into a snapshot line.
    async fn snapshot_line(&self, selected: &SelectedItem) -> Result<OrderLine, ServiceError> {
        if selected.quantity == 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for {} {} must be at least 1",
                selected.item_type, selected.item_id
            )));
        }
        let quantity = Decimal::from(selected.quantity);

        match selected.item_type {
            ItemType::Product => {
                let product = self
                    .catalog
                    .find_product(selected.item_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Product {} not found", selected.item_id))
                    })?;
                if !product.status.is_purchasable() {
                    return Err(ServiceError::Unavailable(format!(
                        "Product '{}' is {}",
                        product.name, product.status
                    )));
                }
                Ok(OrderLine {
                    item_id: selected.item_id,
                    item_type: ItemType::Product,
                    name: product.name,
                    image_url: product.image_url,
                    quantity: selected.quantity,
                    unit_price: product.price,
                    total_price: product.price * quantity,
                })
            }
            ItemType::Combo => {
                let combo = self
                    .catalog
                    .find_combo(selected.item_id)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Combo {} not found", selected.item_id))
                    })?
                    .value;
                if !combo.is_active {
                    return Err(ServiceError::Unavailable(format!(
                        "Combo '{}' is inactive",
                        combo.name
                    )));
                }
                Ok(OrderLine {
                    item_id: selected.item_id,
                    item_type: ItemType::Combo,
                    name: combo.name,
                    image_url: combo.image_url,
                    quantity: selected.quantity,
                    unit_price: combo.combo_price,
                    total_price: combo.combo_price * quantity,
                })
            }
        }
    }

    /// Removes the ordered lines from the user's cart, if any.
    async fn clear_ordered_lines(
        &self,
        user_id: Uuid,
        selected: &[SelectedItem],
    ) -> Result<(), ServiceError> {
        let Some(versioned) = self.carts.find_by_user(user_id).await? else {
            return Ok(());
        };

        let mut cart = versioned.value;
        let before = cart.lines.len();
        for item in selected {
            cart.remove_line(item.item_id, item.item_type);
        }
        if cart.lines.len() == before {
            return Ok(());
        }
        cart.updated_at = Utc::now();

        self.carts.save(cart, Some(versioned.version)).await?;
        Ok(())
    }
}

/// One caller-selected `(item, type, quantity)` triple.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SelectedItem {
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub quantity: u32,
}

/// Input for [`CheckoutService::create_order`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderInput {
    pub items: Vec<SelectedItem>,
    pub payment_method: PaymentMethod,
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "Customer phone is required"))]
    pub customer_phone: String,
    #[validate(length(min = 1, message = "Customer address is required"))]
    pub customer_address: String,
    #[validate(email(message = "Customer email must be valid"))]
    pub customer_email: Option<String>,
    pub shipping_fee: Decimal,
    pub notes: Option<String>,
}

/// Builds an order number of the form `<prefix>-<yyyyMMdd>-<8 alphanumerics>`.
fn generate_order_number(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().format("%Y%m%d"),
        suffix.to_uppercase()
    )
}
