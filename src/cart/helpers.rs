//! Cart Reconciliation Helpers
//!
//! Small pure functions used by the cart state and manager: derived counts,
//! the optimistic quantity projection, and log formatting.

use super::models::{Cart, CartItem, ItemId};

/// Sum of item quantities. This is the only number the client derives itself.
pub fn derived_item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|i| i.quantity).sum()
}

/// Brings a server snapshot in line with the `itemCount == sum(quantity)`
/// invariant. Money fields are left exactly as the server sent them.
pub fn normalize_cart(mut cart: Cart) -> Cart {
    let derived = derived_item_count(&cart.items);
    if cart.item_count != derived {
        tracing::warn!(
            cart_id = %cart.id,
            reported = cart.item_count,
            derived,
            "server item count disagrees with item quantities"
        );
        cart.item_count = derived;
    }
    cart
}

/// Returns a copy of `cart` with `item_id` set to `quantity`, or `None` when
/// the item is not in the cart.
///
/// Only the line quantity and the derived item count change; unit and total
/// prices stay at their last confirmed values until the server answers.
pub fn project_quantity(cart: &Cart, item_id: &ItemId, quantity: u32) -> Option<Cart> {
    let mut projected = cart.clone();
    let item = projected.items.iter_mut().find(|i| &i.id == item_id)?;
    item.quantity = quantity;
    projected.item_count = derived_item_count(&projected.items);
    Some(projected)
}

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x Mug, 1x Pen"`.
pub fn format_item_summary(items: &[CartItem]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.product.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::models::{CartId, ProductSnapshot};

    fn item(id: u64, name: &str, quantity: u32, price: f64) -> CartItem {
        CartItem {
            id: ItemId::from(id),
            product: ProductSnapshot {
                id: id.into(),
                name: name.into(),
                price,
                stock: None,
            },
            quantity,
            unit_price: price,
            total_price: price * quantity as f64,
        }
    }

    fn cart(items: Vec<CartItem>, item_count: u32) -> Cart {
        Cart {
            id: CartId::from("c1"),
            items,
            item_count,
            subtotal: 12.0,
            discount: 2.0,
            total_price: 10.0,
            status: "active".into(),
        }
    }

    #[test]
    fn normalize_replaces_drifted_count() {
        let fixed = normalize_cart(cart(vec![item(1, "Mug", 2, 3.0), item(2, "Pen", 3, 2.0)], 4));
        assert_eq!(fixed.item_count, 5);
        assert_eq!(fixed.total_price, 10.0);
    }

    #[test]
    fn projection_touches_quantity_only() {
        let original = cart(vec![item(1, "Mug", 2, 3.0)], 2);
        let projected = project_quantity(&original, &ItemId::from(1u64), 5).unwrap();

        assert_eq!(projected.items[0].quantity, 5);
        assert_eq!(projected.item_count, 5);
        assert_eq!(projected.items[0].total_price, 6.0);
        assert_eq!(projected.subtotal, original.subtotal);
        assert!(project_quantity(&original, &ItemId::from(9u64), 1).is_none());
    }

    #[test]
    fn summary_lists_quantities_and_names() {
        let items = vec![item(1, "Mug", 2, 3.0), item(2, "Pen", 1, 2.0)];
        assert_eq!(format_item_summary(&items), "2x Mug, 1x Pen");
    }
}
