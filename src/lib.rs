//! # combocart
//!
//! Order lifecycle engine for an e-commerce backend that sells bundles
//! ("combos") of catalog items: the path from a shopping cart to a
//! finalized, trackable order.
//!
//! The engine is made of six components:
//!
//! - **Combo pricing** ([`services::ComboPricingService`]) derives a combo's
//!   original price and discount percentage from its constituent products.
//! - **Cart management** ([`services::CartService`]) maintains one cart per
//!   user as a mutable line-item list.
//! - **Checkout** ([`services::CheckoutService`]) converts a selection of
//!   items into an immutable order with snapshotted prices, then clears the
//!   ordered lines from the cart.
//! - **Order status** ([`services::OrderStatusService`]) and **payment
//!   status** ([`services::PaymentStatusService`]) are the two independent
//!   state machines that govern what can happen to an order after creation.
//!
//! Catalog storage, the document store, authentication and HTTP transport
//! are external collaborators reached through the traits in [`repository`]
//! and the [`services::RequestContext`] identity the transport supplies.
//! [`repository::InMemoryStore`] backs tests and embedded use.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use combocart::{
//!     config::AppConfig,
//!     events::EventSender,
//!     repository::InMemoryStore,
//!     services::{CartService, CheckoutService, OrderStatusService, RequestContext},
//! };
//!
//! let store = Arc::new(InMemoryStore::new());
//! let config = Arc::new(AppConfig::default());
//! let (events, _rx) = EventSender::channel(config.event_channel_capacity);
//! let events = Arc::new(events);
//!
//! let order_status = Arc::new(OrderStatusService::new(store.clone(), events.clone()));
//! let carts = CartService::new(store.clone(), store.clone(), events.clone());
//! let checkout = CheckoutService::new(
//!     store.clone(), store.clone(), store.clone(),
//!     order_status, events, config,
//! );
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

pub use config::{load_config, AppConfig};
pub use errors::ServiceError;
pub use events::{Event, EventSender};
pub use models::{
    Cart, CartLine, Combo, ItemType, Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
    Product, ProductStatus,
};
pub use services::RequestContext;
