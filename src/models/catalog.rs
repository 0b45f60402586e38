use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Availability status of a catalog product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum ProductStatus {
    Active,
    OutOfStock,
    Pending,
}

impl ProductStatus {
    /// Only active products can be placed on an order.
    pub fn is_purchasable(self) -> bool {
        matches!(self, ProductStatus::Active)
    }
}

/// The canonical product shape this engine reads from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Human-facing catalog code; combos reference products by code.
    pub code: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: Decimal,
    pub discount_percentage: Decimal,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bundle of catalog products sold at a single combo price.
///
/// `original_price` is derived, not authoritative: it is recomputed from
/// current catalog prices whenever the combo's product list or combo price
/// changes, and `discount_percentage` follows from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub product_codes: Vec<String>,
    pub original_price: Decimal,
    pub combo_price: Decimal,
    pub discount_percentage: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}
