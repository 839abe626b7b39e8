//! Stand-in API Helpers
//!
//! Cart rendering, line merging and id allocation for the stand-in API.

use super::state::{Product, StoredCart, StoredLine};
use crate::cart::models::{Cart, CartId, CartItem, ProductId, ProductSnapshot};
use dashmap::DashMap;
use uuid::Uuid;

/// Returns the provided `cart_id` or creates a new UUID-based id when `None`.
pub fn get_or_create_cart_id(cart_id: Option<CartId>) -> CartId {
    cart_id.unwrap_or_else(|| CartId::new(Uuid::new_v4().simple().to_string()))
}

/// Builds the wire cart from stored lines, pricing each line from the catalog.
///
/// Lines whose product left the catalog are skipped.
pub fn render_cart(cart: &StoredCart, products: &DashMap<ProductId, Product>) -> Cart {
    let items: Vec<CartItem> = cart
        .lines
        .iter()
        .filter_map(|line| {
            let product = products.get(&line.product_id)?;
            Some(CartItem {
                id: line.id.clone(),
                product: ProductSnapshot {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    stock: Some(product.stock),
                },
                quantity: line.quantity,
                unit_price: product.price,
                total_price: product.price * line.quantity as f64,
            })
        })
        .collect();

    let item_count = items.iter().map(|i| i.quantity).sum();
    let subtotal: f64 = items.iter().map(|i| i.total_price).sum();
    let discount = cart.discount.min(subtotal);

    Cart {
        id: cart.id.clone(),
        items,
        item_count,
        subtotal,
        discount,
        total_price: subtotal - discount,
        status: cart.status.clone(),
    }
}

/// Merges `incoming` lines into `target`, summing quantities for products
/// already present and appending the rest.
///
/// Every resulting quantity is capped at `stock_of(product)`; lines left with
/// nothing in stock are dropped. Appended lines keep their ids; summed lines
/// keep the target's id. Returns how many units were dropped by the cap.
pub fn merge_lines(
    target: &mut Vec<StoredLine>,
    incoming: Vec<StoredLine>,
    stock_of: impl Fn(&ProductId) -> u32,
) -> u32 {
    let mut dropped: u32 = 0;
    for mut line in incoming {
        let stock = stock_of(&line.product_id);
        if let Some(existing) = target.iter_mut().find(|l| l.product_id == line.product_id) {
            let wanted = existing.quantity.saturating_add(line.quantity);
            let kept = wanted.min(stock);
            dropped = dropped.saturating_add(wanted - kept);
            existing.quantity = kept;
        } else {
            let kept = line.quantity.min(stock);
            dropped = dropped.saturating_add(line.quantity - kept);
            if kept > 0 {
                line.quantity = kept;
                target.push(line);
            }
        }
    }
    dropped
}

/// Produces a human-readable one-line summary for stored lines.
///
/// Example output: `"2x #1, 1x #3"`.
pub fn format_line_summary(lines: &[StoredLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}x #{}", l.quantity, l.product_id))
        .collect::<Vec<_>>()
        .join(", ")
}
