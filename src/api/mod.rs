//! Cart API Transport
//!
//! `CartApi` is the seam between the cart manager and the REST backend. The
//! manager only ever sees whole cart snapshots or an `ApiError`.

mod http;

pub use http::HttpCartApi;

use crate::cart::models::{Cart, CartId, ItemId, ProductId};
use crate::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait CartApi: Send + Sync {
    /// Fetches an existing cart. A stale id yields a 404 `ApiError`.
    async fn fetch_cart(&self, cart_id: &CartId) -> ApiResult<Cart>;

    /// Creates a new cart, or resolves the authenticated user's cart.
    async fn create_cart(&self) -> ApiResult<Cart>;

    async fn add_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: u32,
    ) -> ApiResult<Cart>;

    async fn update_item(&self, cart_id: &CartId, item_id: &ItemId, quantity: u32)
        -> ApiResult<Cart>;

    async fn remove_item(&self, cart_id: &CartId, item_id: &ItemId) -> ApiResult<Cart>;

    /// Folds a guest cart into the authenticated user's cart and returns the
    /// merged result under the user cart's id.
    async fn merge_cart(&self, guest_cart_id: &CartId) -> ApiResult<Cart>;
}
