//! Stand-in Cart REST API
//!
//! An in-memory implementation of the cart endpoints the client consumes,
//! used for local development and integration tests:
//! - Stored records and application state
//! - Rendering and merge helpers
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use state::{AppState, Product, SharedState};
