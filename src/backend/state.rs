//! Stand-in API State
//!
//! In-memory carts and catalog for the stand-in REST API.

use crate::cart::models::{CartId, ItemId, ProductId};
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

// =============================================================================
// Stored Records
// =============================================================================

/// Catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: f64, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
        }
    }
}

/// A cart line as stored; prices are looked up when the cart is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLine {
    pub id: ItemId,
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct StoredCart {
    pub id: CartId,
    /// Bearer token of the owning user; `None` for guest carts
    pub owner: Option<String>,
    pub lines: Vec<StoredLine>,
    pub discount: f64,
    pub status: String,
}

impl StoredCart {
    pub fn new(id: CartId, owner: Option<String>) -> Self {
        Self {
            id,
            owner,
            lines: Vec::new(),
            discount: 0.0,
            status: "active".to_string(),
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// Carts keyed by id. DashMap allows concurrent access without external Mutexes.
    pub carts: DashMap<CartId, StoredCart>,

    pub products: DashMap<ProductId, Product>,

    /// Bearer token -> that user's cart
    pub user_carts: DashMap<String, CartId>,

    next_item_id: AtomicU64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// State seeded with the demo catalog.
    pub fn new() -> Self {
        Self::with_catalog(demo_catalog())
    }

    pub fn with_catalog(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = DashMap::new();
        for product in products {
            catalog.insert(product.id.clone(), product);
        }
        Self {
            carts: DashMap::new(),
            products: catalog,
            user_carts: DashMap::new(),
            next_item_id: AtomicU64::new(1),
        }
    }

    pub fn next_item_id(&self) -> ItemId {
        ItemId::from(self.next_item_id.fetch_add(1, Ordering::Relaxed))
    }
}

fn demo_catalog() -> Vec<Product> {
    vec![
        Product::new(1u64, "Ceramic Mug", 12.5, 25),
        Product::new(2u64, "Notebook", 4.0, 100),
        Product::new(3u64, "Desk Lamp", 39.99, 2),
        Product::new(4u64, "Wireless Mouse", 24.0, 10),
    ]
}
