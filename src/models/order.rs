use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use super::cart::ItemType;

/// Order lifecycle states.
///
/// `Canceled` and `Completed` are terminal; see [`OrderStatus::can_transition_to`]
/// for the full transition table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipping,
    Delivered,
    Completed,
    Canceled,
}

impl OrderStatus {
    /// The order status transition table.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Canceled)
                | (Confirmed, Processing)
                | (Confirmed, Canceled)
                | (Processing, Shipping)
                | (Processing, Canceled)
                | (Shipping, Delivered)
                | (Shipping, Canceled)
                | (Delivered, Completed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }
}

/// Payment lifecycle states. `Refunded` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// The payment status transition table.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Failed) | (Failed, Pending) | (Failed, Paid) | (Paid, Refunded)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Refunded)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum PaymentMethod {
    /// Cash on delivery; confirmed at creation without a gateway step.
    Cod,
    /// Paid through a gateway; confirmation follows the Paid payment event.
    OnlinePayment,
}

/// A price/name/image snapshot taken at order-creation time.
///
/// Never re-joined against the catalog: later catalog edits cannot
/// retroactively alter a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// A finalized, trackable order.
///
/// Created by the checkout engine only. After creation, `status`,
/// `payment_status` and their milestone timestamps are the sole mutable
/// fields, and only the two state machines mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
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

impl Order {
    /// Applies an already-validated status transition, stamping the matching
    /// milestone timestamp. Callers must have checked the transition table.
    pub fn apply_status(&mut self, new_status: OrderStatus, at: DateTime<Utc>) {
        self.status = new_status;
        match new_status {
            OrderStatus::Pending => {}
            OrderStatus::Confirmed => self.confirmed_at = Some(at),
            OrderStatus::Processing => self.processing_at = Some(at),
            OrderStatus::Shipping => self.shipping_at = Some(at),
            OrderStatus::Delivered => self.delivered_at = Some(at),
            OrderStatus::Completed => self.completed_at = Some(at),
            OrderStatus::Canceled => self.canceled_at = Some(at),
        }
    }

    /// Applies an already-validated payment transition and its timestamp.
    pub fn apply_payment_status(&mut self, new_status: PaymentStatus, at: DateTime<Utc>) {
        self.payment_status = new_status;
        match new_status {
            PaymentStatus::Paid => self.paid_at = Some(at),
            PaymentStatus::Refunded => self.refunded_at = Some(at),
            PaymentStatus::Pending | PaymentStatus::Failed => {}
        }
    }
}
