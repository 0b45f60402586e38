use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Cart, CartLine, ItemType},
    repository::{CartRepository, CatalogRepository},
};

/// Maintains one cart per user as a mutable line-item list.
///
/// Carts are created lazily on the first add and only ever emptied, never
/// deleted. Existence of referenced items is checked against the catalog on
/// add; enrichment joins happen on read.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogRepository>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        catalog: Arc<dyn CatalogRepository>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            carts,
            catalog,
            event_sender,
        }
    }

    /// Adds an item to the user's cart, merging quantities on duplicates.
    ///
    /// The item must exist in the catalog (`NotFound` otherwise). If a line
    /// for `(item_id, item_type)` already exists its quantity is increased,
    /// not overwritten.
    #[instrument(skip(self, input), fields(user_id = %user_id, item_id = %input.item_id, quantity = input.quantity))]
    pub async fn add_item(&self, user_id: Uuid, input: AddItemInput) -> Result<(), ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        self.ensure_item_exists(input.item_id, input.item_type)
            .await?;

        let (mut cart, expected) = match self.carts.find_by_user(user_id).await? {
            Some(versioned) => (versioned.value, Some(versioned.version)),
            None => (Cart::new(user_id), None),
        };

        if let Some(line) = cart.line_mut(input.item_id, input.item_type) {
            line.quantity += input.quantity;
        } else {
            cart.lines.push(CartLine {
                item_id: input.item_id,
                item_type: input.item_type,
                quantity: input.quantity,
            });
        }
        cart.updated_at = Utc::now();

        self.carts.save(cart, expected).await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                user_id,
                item_id: input.item_id,
                item_type: input.item_type,
                quantity: input.quantity,
            })
            .await;

        info!(user_id = %user_id, item_id = %input.item_id, "Item added to cart");
        Ok(())
    }

    /// Removes the listed lines from the user's cart.
    ///
    /// Fails with `NotFound` when the user has no cart and `ValidationError`
    /// when the list is empty; removing a line that is not present is a
    /// no-op.
    #[instrument(skip(self, input), fields(user_id = %user_id, count = input.items.len()))]
    pub async fn remove_items(
        &self,
        user_id: Uuid,
        input: RemoveItemsInput,
    ) -> Result<(), ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "No items specified for removal".to_string(),
            ));
        }

        let versioned = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart for user {} not found", user_id)))?;

        let mut cart = versioned.value;
        let before = cart.lines.len();
        for item in &input.items {
            cart.remove_line(item.item_id, item.item_type);
        }
        let removed = before - cart.lines.len();
        cart.updated_at = Utc::now();

        self.carts.save(cart, Some(versioned.version)).await?;

        self.event_sender
            .send_or_log(Event::CartItemsRemoved { user_id, removed })
            .await;

        info!(user_id = %user_id, removed = removed, "Cart lines removed");
        Ok(())
    }

    /// Overwrites a line's quantity in place.
    ///
    /// A non-positive `new_quantity` is a no-op, as is an absent cart or
    /// line; this operation never creates lines.
    #[instrument(skip(self), fields(user_id = %user_id, item_id = %item_id, new_quantity = new_quantity))]
    pub async fn update_item_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        item_type: ItemType,
        new_quantity: i32,
    ) -> Result<(), ServiceError> {
        if new_quantity <= 0 {
            return Ok(());
        }
        let new_quantity = new_quantity as u32;

        let Some(versioned) = self.carts.find_by_user(user_id).await? else {
            return Ok(());
        };

        let mut cart = versioned.value;
        let Some(line) = cart.line_mut(item_id, item_type) else {
            return Ok(());
        };
        line.quantity = new_quantity;
        cart.updated_at = Utc::now();

        self.carts.save(cart, Some(versioned.version)).await?;
        Ok(())
    }

    /// Joins the stored cart against current catalog data.
    ///
    /// A user with no stored cart gets an empty view. Lines whose catalog
    /// item has vanished since being added are omitted from the view (they
    /// stay in the stored cart).
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let Some(versioned) = self.carts.find_by_user(user_id).await? else {
            return Ok(CartView::empty(user_id));
        };

        let mut lines = Vec::with_capacity(versioned.value.lines.len());
        for line in &versioned.value.lines {
            match line.item_type {
                ItemType::Product => {
                    let Some(product) = self.catalog.find_product(line.item_id).await? else {
                        continue;
                    };
                    lines.push(CartLineView {
                        item_id: line.item_id,
                        item_type: ItemType::Product,
                        name: product.name,
                        image_url: product.image_url,
                        quantity: line.quantity,
                        unit_price: product.price,
                        line_total: product.price * Decimal::from(line.quantity),
                        discount_percentage: product.discount_percentage,
                        products: Vec::new(),
                    });
                }
                ItemType::Combo => {
                    let Some(combo) = self.catalog.find_combo(line.item_id).await? else {
                        continue;
                    };
                    let combo = combo.value;
                    let mut products = Vec::with_capacity(combo.product_codes.len());
                    for code in &combo.product_codes {
                        if let Some(product) = self.catalog.find_product_by_code(code).await? {
                            products.push(ComboProductSummary {
                                code: product.code,
                                name: product.name,
                                price: product.price,
                                image_url: product.image_url,
                            });
                        }
                    }
                    lines.push(CartLineView {
                        item_id: line.item_id,
                        item_type: ItemType::Combo,
                        name: combo.name,
                        image_url: combo.image_url,
                        quantity: line.quantity,
                        unit_price: combo.combo_price,
                        line_total: combo.combo_price * Decimal::from(line.quantity),
                        discount_percentage: combo.discount_percentage,
                        products,
                    });
                }
            }
        }

        let total_amount = lines.iter().map(|l| l.line_total).sum();
        Ok(CartView {
            user_id,
            lines,
            total_amount,
        })
    }

    async fn ensure_item_exists(
        &self,
        item_id: Uuid,
        item_type: ItemType,
    ) -> Result<(), ServiceError> {
        let exists = match item_type {
            ItemType::Product => self.catalog.find_product(item_id).await?.is_some(),
            ItemType::Combo => self.catalog.find_combo(item_id).await?.is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "{} {} not found",
                item_type, item_id
            )))
        }
    }
}

/// Input for adding an item to a cart.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddItemInput {
    pub item_id: Uuid,
    pub item_type: ItemType,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

/// A `(item, type)` reference used for removal.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CartItemRef {
    pub item_id: Uuid,
    pub item_type: ItemType,
}

/// Input for removing lines from a cart.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveItemsInput {
    pub items: Vec<CartItemRef>,
}

/// Constituent product of a combo line, for display.
#[derive(Debug, Clone, Serialize)]
pub struct ComboProductSummary {
    pub code: String,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
}

/// One enriched cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub discount_percentage: Decimal,
    /// Constituent product summaries; empty for product lines.
    pub products: Vec<ComboProductSummary>,
}

/// The user's cart joined against current catalog data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub user_id: Uuid,
    pub lines: Vec<CartLineView>,
    pub total_amount: Decimal,
}

impl CartView {
    fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            lines: Vec::new(),
            total_amount: Decimal::ZERO,
        }
    }
}
