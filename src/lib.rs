//! Storefront Cart Library
//!
//! Client-side cart reconciliation for the storefront: guest and user carts,
//! optimistic quantity updates, stock-limited errors and guest-to-user merge,
//! all driven through the storefront REST API.

// Domain modules
pub mod cart;

// Client plumbing
pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;

// Stand-in REST API
pub mod backend;
pub mod router;
