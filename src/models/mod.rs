pub mod cart;
pub mod catalog;
pub mod order;

pub use cart::{Cart, CartLine, ItemType};
pub use catalog::{Combo, Product, ProductStatus};
pub use order::{Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus};
