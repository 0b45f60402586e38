//! The order lifecycle services.

use uuid::Uuid;

pub mod cart;
pub mod checkout;
pub mod order_status;
pub mod payment_status;
pub mod pricing;

pub use cart::CartService;
pub use checkout::CheckoutService;
pub use order_status::OrderStatusService;
pub use payment_status::PaymentStatusService;
pub use pricing::ComboPricingService;

/// Trusted caller identity supplied by the transport layer.
///
/// This crate does not authenticate; it only consumes these fields for
/// ownership and privilege checks.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub username: String,
    /// Admin/manager flag for caller-restricted operations.
    pub is_privileged: bool,
}

impl RequestContext {
    pub fn new(user_id: Uuid, username: impl Into<String>, is_privileged: bool) -> Self {
        Self {
            user_id,
            username: username.into(),
            is_privileged,
        }
    }

    /// Whether the caller may act on resources owned by `owner_id`.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_privileged || self.user_id == owner_id
    }
}
