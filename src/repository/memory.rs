//! DashMap-backed repositories for tests and embedded use.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{Cart, Combo, Order, Product},
};

use super::{CartRepository, CatalogRepository, OrderRepository, Versioned};

/// In-memory keyed store implementing all three repository traits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    carts: DashMap<Uuid, Versioned<Cart>>,
    orders: DashMap<Uuid, Versioned<Order>>,
    products: DashMap<Uuid, Product>,
    combos: DashMap<Uuid, Versioned<Combo>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or replaces a catalog product. Product writes are outside the
    /// engine's scope, so this bypasses versioning.
    pub fn upsert_product(&self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Deletes a catalog product, mirroring a catalog-side removal.
    pub fn remove_product(&self, product_id: Uuid) {
        self.products.remove(&product_id);
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

fn cas_save<T: Clone>(
    map: &DashMap<Uuid, Versioned<T>>,
    key: Uuid,
    value: T,
    expected: Option<u64>,
    what: &str,
) -> Result<u64, ServiceError> {
    match map.entry(key) {
        Entry::Occupied(mut occupied) => match expected {
            Some(v) if v == occupied.get().version => {
                let next = v + 1;
                occupied.insert(Versioned {
                    value,
                    version: next,
                });
                Ok(next)
            }
            Some(v) => Err(ServiceError::Conflict(format!(
                "{} {} changed concurrently (expected version {}, found {})",
                what,
                key,
                v,
                occupied.get().version
            ))),
            None => Err(ServiceError::Conflict(format!(
                "{} {} already exists",
                what, key
            ))),
        },
        Entry::Vacant(vacant) => match expected {
            None => {
                vacant.insert(Versioned { value, version: 1 });
                Ok(1)
            }
            Some(v) => Err(ServiceError::Conflict(format!(
                "{} {} no longer exists (expected version {})",
                what, key, v
            ))),
        },
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Versioned<Cart>>, ServiceError> {
        Ok(self.carts.get(&user_id).map(|entry| entry.clone()))
    }

    async fn save(&self, cart: Cart, expected: Option<u64>) -> Result<u64, ServiceError> {
        cas_save(&self.carts, cart.user_id, cart, expected, "Cart for user")
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Versioned<Order>>, ServiceError> {
        Ok(self.orders.get(&order_id).map(|entry| entry.clone()))
    }

    async fn insert(&self, order: Order) -> Result<u64, ServiceError> {
        cas_save(&self.orders, order.id, order, None, "Order")
    }

    async fn update(&self, order: Order, expected: u64) -> Result<u64, ServiceError> {
        cas_save(&self.orders, order.id, order, Some(expected), "Order")
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ServiceError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.value.user_id == user_id)
            .map(|entry| entry.value.clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, ServiceError> {
        let mut orders: Vec<Order> = self.orders.iter().map(|e| e.value.clone()).collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn find_product(&self, product_id: Uuid) -> Result<Option<Product>, ServiceError> {
        Ok(self.products.get(&product_id).map(|p| p.clone()))
    }

    async fn find_product_by_code(&self, code: &str) -> Result<Option<Product>, ServiceError> {
        // Linear scan; the catalog contract has no secondary index.
        Ok(self
            .products
            .iter()
            .find(|p| p.code == code)
            .map(|p| p.clone()))
    }

    async fn find_combo(&self, combo_id: Uuid) -> Result<Option<Versioned<Combo>>, ServiceError> {
        Ok(self.combos.get(&combo_id).map(|entry| entry.clone()))
    }

    async fn save_combo(&self, combo: Combo, expected: Option<u64>) -> Result<u64, ServiceError> {
        cas_save(&self.combos, combo.id, combo, expected, "Combo")
    }
}
