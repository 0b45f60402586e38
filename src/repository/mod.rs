//! Persistence seams consumed by the services.
//!
//! Each aggregate gets a keyed repository with optimistic-version writes: a
//! save carries the version the writer read, and a mismatch fails with
//! [`ServiceError::Conflict`] instead of silently overwriting a concurrent
//! writer's change. The services perform no retry; a conflicted request
//! fails and may be re-issued by the caller.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{Cart, Combo, Order, Product},
};

pub mod memory;

pub use memory::InMemoryStore;

/// An entity together with the store version it was read at.
#[derive(Debug, Clone, Serialize)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Keyed store for carts, one per user.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Versioned<Cart>>, ServiceError>;

    /// Compare-and-swap save. `expected = None` inserts and fails if a cart
    /// for the user already exists; `Some(v)` replaces only if the stored
    /// version is still `v`. Returns the new version.
    async fn save(&self, cart: Cart, expected: Option<u64>) -> Result<u64, ServiceError>;
}

/// Keyed store for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Versioned<Order>>, ServiceError>;

    /// Inserts a new order; fails with `Conflict` on a duplicate id.
    async fn insert(&self, order: Order) -> Result<u64, ServiceError>;

    /// Compare-and-swap update of an existing order. Returns the new version.
    async fn update(&self, order: Order, expected: u64) -> Result<u64, ServiceError>;

    /// The user's orders, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ServiceError>;

    /// All orders, newest first. Callers gate this behind a privilege check.
    async fn list_all(&self) -> Result<Vec<Order>, ServiceError>;
}

/// Read access to the product/combo catalog, plus the single write path the
/// pricing engine uses when it mutates a combo.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, ServiceError>;

    async fn find_product_by_code(&self, code: &str) -> Result<Option<Product>, ServiceError>;

    async fn find_combo(&self, combo_id: Uuid) -> Result<Option<Versioned<Combo>>, ServiceError>;

    /// Compare-and-swap save; `expected = None` inserts a new combo.
    async fn save_combo(&self, combo: Combo, expected: Option<u64>) -> Result<u64, ServiceError>;
}
