//! Cart Domain Models
//!
//! Wire and domain types for the storefront cart: the cart snapshot, its line
//! items, and the JSON envelopes exchanged with the REST API.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Accepts an identifier written either as a JSON string or an integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_id!(
    /// Backend-assigned cart identifier. Immutable once assigned.
    CartId
);
opaque_id!(
    /// Identifies a line within a cart (not the product).
    ItemId
);
opaque_id!(
    /// Catalog product identifier.
    ProductId
);

// =============================================================================
// Cart Domain Models
// =============================================================================

/// Product data embedded in a cart line at the time it was added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: f64,

    /// Stock reported by the server, when it includes it in the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ItemId,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub unit_price: f64,

    /// `unit_price * quantity`, as confirmed by the server
    pub total_price: f64,
}

/// Server-authoritative cart snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,

    #[serde(default)]
    pub items: Vec<CartItem>,

    #[serde(default)]
    pub item_count: u32,

    #[serde(default)]
    pub subtotal: f64,

    #[serde(default)]
    pub discount: f64,

    #[serde(default)]
    pub total_price: f64,

    /// Lifecycle tag such as `active`; opaque to the client
    #[serde(default)]
    pub status: String,
}

impl Cart {
    pub fn item(&self, item_id: &ItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == item_id)
    }
}

// =============================================================================
// Wire Envelopes
// =============================================================================

/// Success envelope: `{ success, data }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Field-level detail attached to an error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<u32>,
}

/// Error envelope: `{ status, message, data? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorDetail>,
}

/// Body of `POST /cart/{cartId}/items`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PUT /cart/{cartId}/items/{itemId}`
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// Body of `POST /cart/merge`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeCartRequest {
    pub guest_cart_id: CartId,
}
