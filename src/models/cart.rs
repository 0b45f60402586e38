use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Kind of catalog item a cart or order line points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum ItemType {
    Product,
    Combo,
}

/// One `(item, type, quantity)` entry in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub quantity: u32,
}

/// A user's shopping cart: at most one line per `(item_id, item_type)` pair.
///
/// Created lazily on the first add and never deleted, only emptied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: Uuid,
    pub lines: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn line_mut(&mut self, item_id: Uuid, item_type: ItemType) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.item_id == item_id && l.item_type == item_type)
    }

    /// Removes the matching line; removing a non-present line is a no-op.
    pub fn remove_line(&mut self, item_id: Uuid, item_type: ItemType) {
        self.lines
            .retain(|l| !(l.item_id == item_id && l.item_type == item_type));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_line_is_noop_when_absent() {
        let mut cart = Cart::new(Uuid::new_v4());
        cart.lines.push(CartLine {
            item_id: Uuid::new_v4(),
            item_type: ItemType::Product,
            quantity: 2,
        });

        cart.remove_line(Uuid::new_v4(), ItemType::Combo);
        assert_eq!(cart.lines.len(), 1);
    }

    #[test]
    fn test_remove_line_matches_on_item_and_type() {
        let item_id = Uuid::new_v4();
        let mut cart = Cart::new(Uuid::new_v4());
        cart.lines.push(CartLine {
            item_id,
            item_type: ItemType::Product,
            quantity: 1,
        });
        cart.lines.push(CartLine {
            item_id,
            item_type: ItemType::Combo,
            quantity: 1,
        });

        cart.remove_line(item_id, ItemType::Product);

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].item_type, ItemType::Combo);
    }
}
