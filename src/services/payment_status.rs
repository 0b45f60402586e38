use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{OrderStatus, PaymentMethod, PaymentStatus},
    repository::OrderRepository,
};

use super::{order_status::OrderDetail, RequestContext};

/// Validates and applies payment transitions.
///
/// Payment confirmation is a trusted caller-supplied transition; there is no
/// gateway integration here. A successful `Paid` transition on an
/// online-payment order also advances the order status to `Confirmed`.
#[derive(Clone)]
pub struct PaymentStatusService {
    orders: Arc<dyn OrderRepository>,
    event_sender: Arc<EventSender>,
}

impl PaymentStatusService {
    pub fn new(orders: Arc<dyn OrderRepository>, event_sender: Arc<EventSender>) -> Self {
        Self {
            orders,
            event_sender,
        }
    }

    /// Moves an order's payment status to `new_status`.
    ///
    /// Same load/validate/apply/persist shape as the order status machine.
    /// Side effect: `Paid` on an `OnlinePayment` order confirms the order;
    /// an order already at or past `Confirmed` is left untouched — a
    /// double payment confirmation must be tolerated, not rejected.
    #[instrument(skip(self, ctx), fields(order_id = %order_id, new_status = %new_status, updated_by = %ctx.username))]
    pub async fn update_payment_status(
        &self,
        ctx: &RequestContext,
        order_id: Uuid,
        new_status: PaymentStatus,
    ) -> Result<OrderDetail, ServiceError> {
        let versioned = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let mut order = versioned.value;
        if !ctx.can_access(order.user_id) {
            warn!(order_id = %order_id, caller = %ctx.user_id, "Payment update denied");
            return Err(ServiceError::Unauthorized(format!(
                "User {} may not modify order {}",
                ctx.user_id, order_id
            )));
        }

        let old_status = order.payment_status;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::invalid_transition(old_status, new_status));
        }

        let now = Utc::now();
        order.apply_payment_status(new_status, now);

        // Online payments confirm the order once paid. Only Pending orders
        // move; anything at or past Confirmed already went through
        // confirmation, so the cascade is skipped rather than failed.
        let mut cascade = None;
        if new_status == PaymentStatus::Paid
            && order.payment_method == PaymentMethod::OnlinePayment
        {
            if order.status == OrderStatus::Pending {
                order.apply_status(OrderStatus::Confirmed, now);
                cascade = Some((OrderStatus::Pending, OrderStatus::Confirmed));
            } else {
                debug!(
                    order_id = %order_id,
                    status = %order.status,
                    "Order already confirmed; payment cascade skipped"
                );
            }
        }

        self.orders.update(order.clone(), versioned.version).await?;

        self.event_sender
            .send_or_log(Event::PaymentStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await;
        if let Some((old, new)) = cascade {
            self.event_sender
                .send_or_log(Event::OrderStatusChanged {
                    order_id,
                    old_status: old,
                    new_status: new,
                })
                .await;
        }

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %new_status,
            cascaded = cascade.is_some(),
            "Payment status updated"
        );
        Ok(OrderDetail::from(order))
    }
}
