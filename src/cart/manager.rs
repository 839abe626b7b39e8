//! Cart Manager
//!
//! Owns the active cart for one session. Every mutation is a request/response
//! round trip whose result replaces the local cart wholesale; the only local
//! edit is the provisional quantity shown while `update_quantity` is in flight.
//!
//! Mutations are sequenced through an async gate, so overlapping calls run
//! one after another instead of racing. Reads never wait on the gate, and a
//! queued quantity change is on display before it reaches the gate.

use super::helpers::{format_item_summary, project_quantity};
use super::models::{Cart, CartId, CartItem, ItemId, ProductId};
use super::state::CartState;
use crate::api::CartApi;
use crate::error::{CartError, CartResult};
use crate::notify::{Notice, Notifier};
use crate::storage::CartIdStore;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;

const LOAD_FAILED: &str = "Failed to load cart";
const ADD_FAILED: &str = "Failed to add item to cart";
const UPDATE_FAILED: &str = "Failed to update cart";
const REMOVE_FAILED: &str = "Failed to remove item from cart";
const MERGE_FAILED: &str = "Failed to merge cart";
const REFRESH_FAILED: &str = "Failed to refresh cart";

const ADDED: &str = "Added to cart";
const REMOVED: &str = "Item removed from cart";

/// Who the cart belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// Unauthenticated; the cart id is persisted client-side.
    Guest,
    /// Authenticated; the server associates the cart with the account.
    User,
}

/// Shared handle injected into every consumer of the cart.
pub type SharedCart = Arc<CartManager>;

pub struct CartManager {
    api: Arc<dyn CartApi>,
    store: Arc<dyn CartIdStore>,
    notifier: Arc<dyn Notifier>,
    session: RwLock<Session>,
    state: RwLock<CartState>,
    gate: Mutex<()>,
}

impl CartManager {
    pub fn new(
        api: Arc<dyn CartApi>,
        store: Arc<dyn CartIdStore>,
        notifier: Arc<dyn Notifier>,
        session: Session,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            session: RwLock::new(session),
            state: RwLock::new(CartState::default()),
            gate: Mutex::new(()),
        }
    }

    pub fn shared(self) -> SharedCart {
        Arc::new(self)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Cheap snapshot of everything consumers render.
    pub fn state(&self) -> CartState {
        self.state.read().clone()
    }

    pub fn cart(&self) -> Option<Arc<Cart>> {
        self.state.read().cart().cloned()
    }

    pub fn items(&self) -> Arc<[CartItem]> {
        self.state.read().items()
    }

    pub fn item_count(&self) -> u32 {
        self.state.read().item_count()
    }

    pub fn subtotal(&self) -> f64 {
        self.state.read().subtotal()
    }

    pub fn discount(&self) -> f64 {
        self.state.read().discount()
    }

    pub fn total_price(&self) -> f64 {
        self.state.read().total_price()
    }

    pub fn cart_id(&self) -> Option<CartId> {
        self.state.read().cart_id().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading()
    }

    pub fn session(&self) -> Session {
        *self.session.read()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Resolves the initial cart: the persisted guest cart when there is one,
    /// otherwise a fresh cart. A stale persisted id falls back to a fresh cart
    /// without telling the user. Does nothing once a cart is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> CartResult<()> {
        let _gate = self.gate.lock().await;
        if self.state.read().cart().is_some() {
            return Ok(());
        }

        let result = self.resolve_initial_cart().await;
        let result = match result {
            Ok(cart) => {
                tracing::info!(cart_id = %cart.id, items = cart.items.len(), "cart loaded");
                let cart_id = cart.id.clone();
                {
                    let mut state = self.state.write();
                    state.commit(cart);
                    state.finish_loading();
                }
                self.remember_guest_cart(&cart_id);
                Ok(())
            }
            Err(err) => {
                self.state.write().finish_loading();
                Err(err)
            }
        };
        self.report(result, LOAD_FAILED, None)
    }

    /// Adds `quantity` of a product and adopts the server's cart.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> CartResult<()> {
        let result = self.add_inner(&product_id, quantity).await;
        self.report(result, ADD_FAILED, Some(ADDED))
    }

    /// Shows `quantity` immediately, then confirms it with the server or
    /// rolls back to the previous cart.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(&self, item_id: ItemId, quantity: u32) -> CartResult<()> {
        let result = self.update_inner(&item_id, quantity).await;
        self.report(result, UPDATE_FAILED, None)
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_from_cart(&self, item_id: ItemId) -> CartResult<()> {
        let result = self.remove_inner(&item_id).await;
        self.report(result, REMOVE_FAILED, Some(REMOVED))
    }

    /// Folds the guest cart into the user's cart right after login. On
    /// success the manager adopts the merged cart, switches to a user
    /// session and only then forgets the persisted guest id.
    #[tracing::instrument(skip(self))]
    pub async fn merge_cart(&self, guest_cart_id: CartId) -> CartResult<()> {
        let result = self.merge_inner(&guest_cart_id).await;
        self.report(result, MERGE_FAILED, None)
    }

    /// Merges whichever guest cart this session owns: the persisted id, or
    /// the active cart while still a guest. Returns `false` when there is
    /// nothing to merge.
    pub async fn merge_persisted_guest_cart(&self) -> CartResult<bool> {
        if self.session() == Session::User {
            return Ok(false);
        }
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "could not read persisted guest cart id");
                None
            }
        };
        let Some(guest_cart_id) = stored.or_else(|| self.cart_id()) else {
            return Ok(false);
        };
        self.merge_cart(guest_cart_id).await.map(|()| true)
    }

    /// Re-reads the active cart from the server. A cart that disappeared is
    /// replaced by a fresh one, as during the initial load.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> CartResult<()> {
        let result = self.refresh_inner().await;
        self.report(result, REFRESH_FAILED, None)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn resolve_initial_cart(&self) -> CartResult<Cart> {
        let persisted = if self.session() == Session::Guest {
            match self.store.load() {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring unreadable guest cart id");
                    None
                }
            }
        } else {
            None
        };

        match persisted {
            Some(cart_id) => self.fetch_or_create(&cart_id).await,
            None => Ok(self.api.create_cart().await?),
        }
    }

    async fn fetch_or_create(&self, cart_id: &CartId) -> CartResult<Cart> {
        match self.api.fetch_cart(cart_id).await {
            Ok(cart) => Ok(cart),
            Err(err) if err.is_not_found() => {
                tracing::warn!(%cart_id, "cart no longer exists, creating a new one");
                Ok(self.api.create_cart().await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn add_inner(&self, product_id: &ProductId, quantity: u32) -> CartResult<()> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let _gate = self.gate.lock().await;
        let cart_id = self.active_cart_id()?;

        let cart = self
            .api
            .add_item(&cart_id, product_id, quantity)
            .await
            .map_err(CartError::from_api)?;
        self.adopt(&cart_id, cart)
    }

    async fn update_inner(&self, item_id: &ItemId, quantity: u32) -> CartResult<()> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        {
            let mut state = self.state.write();
            let projected = project_update(state.cart(), item_id, quantity)?;
            state.preview(projected);
        }

        let _gate = self.gate.lock().await;

        // Earlier mutations may have landed while this one queued; project
        // again on top of whatever the server confirmed last.
        let (cart_id, pending) = {
            let mut state = self.state.write();
            match project_update(state.confirmed_cart(), item_id, quantity) {
                Ok(projected) => (projected.id.clone(), state.begin_optimistic(projected)),
                Err(err) => {
                    state.rollback();
                    return Err(err);
                }
            }
        };

        match self.api.update_item(&cart_id, item_id, quantity).await {
            Ok(cart) if cart.id == cart_id => {
                pending.confirm(&mut self.state.write(), cart);
                Ok(())
            }
            Ok(cart) => {
                pending.revert(&mut self.state.write());
                Err(CartError::CartMismatch {
                    expected: cart_id,
                    actual: cart.id,
                })
            }
            Err(err) => {
                tracing::debug!(%item_id, "rolling back optimistic quantity");
                pending.revert(&mut self.state.write());
                Err(CartError::from_api(err))
            }
        }
    }

    async fn remove_inner(&self, item_id: &ItemId) -> CartResult<()> {
        let _gate = self.gate.lock().await;
        let cart_id = {
            let state = self.state.read();
            let cart = state.cart().ok_or(CartError::NotLoaded)?;
            if cart.item(item_id).is_none() {
                return Err(CartError::UnknownItem(item_id.clone()));
            }
            cart.id.clone()
        };

        let cart = self
            .api
            .remove_item(&cart_id, item_id)
            .await
            .map_err(CartError::from_api)?;
        self.adopt(&cart_id, cart)
    }

    async fn merge_inner(&self, guest_cart_id: &CartId) -> CartResult<()> {
        let _gate = self.gate.lock().await;
        if self.session() == Session::User {
            return Err(CartError::AlreadyMerged);
        }

        let cart = self
            .api
            .merge_cart(guest_cart_id)
            .await
            .map_err(CartError::from_api)?;
        tracing::info!(
            guest = %guest_cart_id,
            merged = %cart.id,
            items = %format_item_summary(&cart.items),
            "guest cart merged"
        );

        {
            let mut state = self.state.write();
            state.commit(cart);
            state.finish_loading();
        }
        *self.session.write() = Session::User;

        if let Err(err) = self.store.clear() {
            tracing::error!(error = %err, "merged cart adopted but guest cart id could not be cleared");
        }
        Ok(())
    }

    async fn refresh_inner(&self) -> CartResult<()> {
        let _gate = self.gate.lock().await;
        let cart_id = self.active_cart_id()?;

        let cart = self.fetch_or_create(&cart_id).await?;
        let fresh_id = cart.id.clone();
        self.state.write().commit(cart);
        if fresh_id != cart_id {
            self.remember_guest_cart(&fresh_id);
        }
        Ok(())
    }

    fn active_cart_id(&self) -> CartResult<CartId> {
        self.state
            .read()
            .cart_id()
            .cloned()
            .ok_or(CartError::NotLoaded)
    }

    /// Commits a mutation response, refusing one that belongs to another cart.
    fn adopt(&self, expected: &CartId, cart: Cart) -> CartResult<()> {
        if &cart.id != expected {
            return Err(CartError::CartMismatch {
                expected: expected.clone(),
                actual: cart.id,
            });
        }
        tracing::debug!(cart_id = %cart.id, items = %format_item_summary(&cart.items), "cart updated");
        self.state.write().commit(cart);
        Ok(())
    }

    fn remember_guest_cart(&self, cart_id: &CartId) {
        if self.session() != Session::Guest {
            return;
        }
        if let Err(err) = self.store.save(cart_id) {
            tracing::warn!(error = %err, %cart_id, "could not persist guest cart id");
        }
    }

    fn report<T>(&self, result: CartResult<T>, failure: &str, success: Option<&str>) -> CartResult<T> {
        match &result {
            Ok(_) => {
                if let Some(message) = success {
                    self.notifier.notify(Notice::success(message));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "cart operation failed");
                self.notifier.notify(Notice::error(err.user_message(failure)));
            }
        }
        result
    }
}

/// Projects `quantity` onto `cart`, refusing unknown items and quantities
/// above the stock the server reported.
fn project_update(cart: Option<&Arc<Cart>>, item_id: &ItemId, quantity: u32) -> CartResult<Cart> {
    let cart = cart.ok_or(CartError::NotLoaded)?;
    let item = cart
        .item(item_id)
        .ok_or_else(|| CartError::UnknownItem(item_id.clone()))?;
    if let Some(stock) = item.product.stock {
        if quantity > stock {
            return Err(CartError::StockLimited { available: stock });
        }
    }
    project_quantity(cart, item_id, quantity).ok_or_else(|| CartError::UnknownItem(item_id.clone()))
}
