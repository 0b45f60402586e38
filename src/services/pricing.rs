use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::Combo,
    repository::CatalogRepository,
};

/// Derives a combo's original price and discount percentage from its
/// constituent products.
///
/// A combo's `original_price` is never authoritative: it is the sum of the
/// current catalog prices of its product codes, recomputed on combo creation
/// and whenever the product list or combo price changes.
#[derive(Clone)]
pub struct ComboPricingService {
    catalog: Arc<dyn CatalogRepository>,
    event_sender: Arc<EventSender>,
}

impl ComboPricingService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, event_sender: Arc<EventSender>) -> Self {
        Self {
            catalog,
            event_sender,
        }
    }

    /// Sums the current catalog price of each referenced product.
    ///
    /// Product codes that resolve to nothing contribute zero; a combo whose
    /// constituents have vanished is a pricing concern, not an error at this
    /// layer.
    #[instrument(skip(self, product_codes), fields(codes = product_codes.len()))]
    pub async fn compute_original_price(
        &self,
        product_codes: &[String],
    ) -> Result<Decimal, ServiceError> {
        let mut total = Decimal::ZERO;
        for code in product_codes {
            if let Some(product) = self.catalog.find_product_by_code(code).await? {
                total += product.price;
            }
        }
        Ok(total)
    }

    /// Sets `original_price` and the derived `discount_percentage`, guarding
    /// division by zero.
    pub fn recompute_discount(combo: &mut Combo, original_price: Decimal) {
        combo.original_price = original_price;
        combo.discount_percentage = if original_price > Decimal::ZERO {
            (Decimal::ONE_HUNDRED - combo.combo_price / original_price * Decimal::ONE_HUNDRED)
                .round_dp(2)
        } else {
            Decimal::ZERO
        };
    }

    /// Reprices a combo against the live catalog and persists the result.
    ///
    /// Invoked by catalog-side callers on combo creation and whenever the
    /// combo's product codes or combo price are updated.
    #[instrument(skip(self), fields(combo_id = %combo_id))]
    pub async fn reprice_combo(
        &self,
        combo_id: Uuid,
        updated_by: &str,
    ) -> Result<Combo, ServiceError> {
        let versioned = self
            .catalog
            .find_combo(combo_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Combo {} not found", combo_id)))?;

        let mut combo = versioned.value;
        let original_price = self.compute_original_price(&combo.product_codes).await?;
        Self::recompute_discount(&mut combo, original_price);
        combo.updated_at = Utc::now();
        combo.updated_by = Some(updated_by.to_string());

        self.catalog
            .save_combo(combo.clone(), Some(versioned.version))
            .await?;

        self.event_sender
            .send_or_log(Event::ComboRepriced {
                combo_id,
                original_price,
                discount_percentage: combo.discount_percentage,
            })
            .await;

        info!(
            combo_id = %combo_id,
            original_price = %original_price,
            discount = %combo.discount_percentage,
            "Combo repriced"
        );
        Ok(combo)
    }
}
