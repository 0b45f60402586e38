use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus},
    repository::OrderRepository,
};

use super::RequestContext;

/// Validates and applies order lifecycle transitions, and serves order reads.
///
/// The transition table lives on [`OrderStatus::can_transition_to`]; this
/// service adds the ownership check, milestone stamping, and persistence.
#[derive(Clone)]
pub struct OrderStatusService {
    orders: Arc<dyn OrderRepository>,
    event_sender: Arc<EventSender>,
}

impl OrderStatusService {
    pub fn new(orders: Arc<dyn OrderRepository>, event_sender: Arc<EventSender>) -> Self {
        Self {
            orders,
            event_sender,
        }
    }

    /// Moves an order to `new_status`.
    ///
    /// Fails with `NotFound` for an absent order, `Unauthorized` when the
    /// caller is neither owner nor privileged, and `InvalidTransition` when
    /// the pair is not in the transition table. On success the matching
    /// milestone timestamp is stamped and the order persisted.
    #[instrument(skip(self, ctx), fields(order_id = %order_id, new_status = %new_status, updated_by = %ctx.username))]
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderDetail, ServiceError> {
        let versioned = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let mut order = versioned.value;
        if !ctx.can_access(order.user_id) {
            warn!(order_id = %order_id, caller = %ctx.user_id, "Status update denied");
            return Err(ServiceError::Unauthorized(format!(
                "User {} may not modify order {}",
                ctx.user_id, order_id
            )));
        }

        let old_status = order.status;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::invalid_transition(old_status, new_status));
        }

        order.apply_status(new_status, Utc::now());
        self.orders.update(order.clone(), versioned.version).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await;

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %new_status,
            "Order status updated"
        );
        Ok(OrderDetail::from(order))
    }

    /// Retrieves one order; restricted to the owner or a privileged caller.
    #[instrument(skip(self, ctx), fields(order_id = %order_id))]
    pub async fn get_order(
        &self,
        ctx: &RequestContext,
        order_id: Uuid,
    ) -> Result<OrderDetail, ServiceError> {
        let versioned = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if !ctx.can_access(versioned.value.user_id) {
            return Err(ServiceError::Unauthorized(format!(
                "User {} may not view order {}",
                ctx.user_id, order_id
            )));
        }
        Ok(OrderDetail::from(versioned.value))
    }

    /// The caller's own orders, newest first.
    #[instrument(skip(self, ctx), fields(user_id = %ctx.user_id))]
    pub async fn list_orders(&self, ctx: &RequestContext) -> Result<Vec<OrderDetail>, ServiceError> {
        let orders = self.orders.list_by_user(ctx.user_id).await?;
        Ok(orders.into_iter().map(OrderDetail::from).collect())
    }

    /// Every order in the system, newest first; privileged callers only.
    #[instrument(skip(self, ctx), fields(caller = %ctx.username))]
    pub async fn list_all_orders(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<OrderDetail>, ServiceError> {
        if !ctx.is_privileged {
            return Err(ServiceError::Unauthorized(
                "Listing all orders requires a privileged caller".to_string(),
            ));
        }
        let orders = self.orders.list_all().await?;
        Ok(orders.into_iter().map(OrderDetail::from).collect())
    }
}

/// Read projection of an order returned by checkout and the query paths.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub items: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub shipping_fee: Decimal,
    pub final_amount: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub processing_at: Option<DateTime<Utc>>,
    pub shipping_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
}

impl From<Order> for OrderDetail {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            items: order.items,
            total_amount: order.total_amount,
            shipping_fee: order.shipping_fee,
            final_amount: order.final_amount,
            status: order.status,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_address: order.customer_address,
            customer_email: order.customer_email,
            notes: order.notes,
            created_at: order.created_at,
            created_by: order.created_by,
            confirmed_at: order.confirmed_at,
            processing_at: order.processing_at,
            shipping_at: order.shipping_at,
            delivered_at: order.delivered_at,
            completed_at: order.completed_at,
            canceled_at: order.canceled_at,
            paid_at: order.paid_at,
            refunded_at: order.refunded_at,
        }
    }
}
