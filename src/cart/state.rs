//! Cart State
//!
//! The in-memory snapshot the cart manager exposes to consumers. Cloning a
//! `CartState` is cheap: the cart and its items are shared behind `Arc`s, and
//! `items()` hands back the same allocation until a mutation replaces it.

use super::helpers::normalize_cart;
use super::models::{Cart, CartId, CartItem};
use std::sync::Arc;

/// Snapshot of the cart as seen by consumers.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Option<Arc<Cart>>,
    items: Arc<[CartItem]>,
    loading: bool,
    /// Last server-confirmed cart while a projection is on display.
    confirmed: Option<Snapshot>,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            cart: None,
            items: Arc::from(Vec::new()),
            loading: true,
            confirmed: None,
        }
    }
}

impl CartState {
    pub fn cart(&self) -> Option<&Arc<Cart>> {
        self.cart.as_ref()
    }

    /// Current line items. The returned `Arc` is pointer-equal across reads
    /// until the cart changes.
    pub fn items(&self) -> Arc<[CartItem]> {
        Arc::clone(&self.items)
    }

    pub fn cart_id(&self) -> Option<&CartId> {
        self.cart.as_ref().map(|c| &c.id)
    }

    pub fn item_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, |c| c.item_count)
    }

    pub fn subtotal(&self) -> f64 {
        self.cart.as_ref().map_or(0.0, |c| c.subtotal)
    }

    pub fn discount(&self) -> f64 {
        self.cart.as_ref().map_or(0.0, |c| c.discount)
    }

    pub fn total_price(&self) -> f64 {
        self.cart.as_ref().map_or(0.0, |c| c.total_price)
    }

    /// True until the initial load resolves; never true again afterwards.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while an optimistic change awaits server confirmation.
    pub fn is_provisional(&self) -> bool {
        self.confirmed.is_some()
    }

    /// The last cart the server confirmed, ignoring any projection on display.
    pub(crate) fn confirmed_cart(&self) -> Option<&Arc<Cart>> {
        match &self.confirmed {
            Some(snapshot) => snapshot.cart.as_ref(),
            None => self.cart.as_ref(),
        }
    }

    /// Adopts a server-confirmed cart wholesale.
    pub(crate) fn commit(&mut self, cart: Cart) {
        self.replace(normalize_cart(cart));
        self.confirmed = None;
    }

    pub(crate) fn finish_loading(&mut self) {
        self.loading = false;
    }

    /// Puts `projected` on display without waiting for anything. The
    /// confirmed cart is remembered once, so stacked projections share a
    /// single rollback point.
    pub(crate) fn preview(&mut self, projected: Cart) {
        if self.confirmed.is_none() {
            self.confirmed = Some(Snapshot {
                cart: self.cart.clone(),
                items: Arc::clone(&self.items),
            });
        }
        self.replace(projected);
    }

    /// Shows `projected` while its request is in flight. The returned guard
    /// either confirms the server's answer or restores the confirmed cart.
    pub(crate) fn begin_optimistic(&mut self, projected: Cart) -> OptimisticUpdate {
        self.preview(projected);
        OptimisticUpdate { _pending: () }
    }

    /// Drops any projection on display and restores the confirmed cart.
    pub(crate) fn rollback(&mut self) {
        if let Some(previous) = self.confirmed.take() {
            self.cart = previous.cart;
            self.items = previous.items;
        }
    }

    fn replace(&mut self, cart: Cart) {
        self.items = Arc::from(cart.items.as_slice());
        self.cart = Some(Arc::new(cart));
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    cart: Option<Arc<Cart>>,
    items: Arc<[CartItem]>,
}

/// Pending optimistic change: either confirmed with the server's cart or
/// reverted to the exact snapshot the server last confirmed.
#[derive(Debug)]
#[must_use = "an optimistic update must be committed or reverted"]
pub struct OptimisticUpdate {
    _pending: (),
}

impl OptimisticUpdate {
    pub(crate) fn confirm(self, state: &mut CartState, confirmed: Cart) {
        state.commit(confirmed);
    }

    pub(crate) fn revert(self, state: &mut CartState) {
        state.rollback();
    }
}
