//! Shopping Cart Domain Module
//!
//! Client-side cart reconciliation:
//! - Domain models (Cart, CartItem, wire envelopes)
//! - Reconciliation helpers (derived counts, optimistic projection)
//! - Cart state snapshots with optimistic update/revert
//! - The cart manager that drives the REST API

pub mod helpers;
pub mod manager;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use manager::{CartManager, Session, SharedCart};
pub use models::{Cart, CartId, CartItem, ItemId, ProductId, ProductSnapshot};
pub use state::CartState;
