//! Error types for the cart client
//!
//! Errors are split by layer: `ApiError` for the HTTP transport,
//! `StorageError` for the persisted guest cart id and `CartError` for the
//! manager boundary that turns everything into user-facing notices.

use crate::cart::models::{CartId, ErrorDetail, ItemId};
use thiserror::Error;

/// Failure talking to the cart REST API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with a non-success status and an error envelope.
    #[error("request failed with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        detail: Option<ErrorDetail>,
    },

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// A response arrived but did not match the envelope contract.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for a 404, which on cart fetch means the cart expired or was deleted.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Available stock reported by a 400 stock-limited response.
    pub fn available_quantity(&self) -> Option<u32> {
        match self {
            ApiError::Status {
                status: 400,
                detail: Some(detail),
                ..
            } => detail.available_quantity,
            _ => None,
        }
    }
}

/// Failure reading or writing the persisted guest cart id.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cart id store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart id store is corrupt: {0}")]
    Format(#[from] serde_json::Error),

    #[error("no platform data directory available for the cart id store")]
    NoDataDir,
}

/// Failure of a cart manager operation.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Only {available} items available in stock")]
    StockLimited { available: u32 },

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("item {0} is not in the cart")]
    UnknownItem(ItemId),

    #[error("cart has not been loaded")]
    NotLoaded,

    #[error("cart has already been merged into a user cart")]
    AlreadyMerged,

    #[error("server returned cart {actual} while cart {expected} is active")]
    CartMismatch { expected: CartId, actual: CartId },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Lifts a transport error, promoting the stock-limited envelope to its own variant.
    pub fn from_api(err: ApiError) -> Self {
        match err.available_quantity() {
            Some(available) => CartError::StockLimited { available },
            None => CartError::Api(err),
        }
    }

    /// The message shown to the user, falling back to `generic` for
    /// anything that is not stock-limited.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            CartError::StockLimited { .. } => self.to_string(),
            _ => generic.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
pub type CartResult<T> = Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_error(available: Option<u32>) -> ApiError {
        ApiError::Status {
            status: 400,
            message: "Insufficient stock".into(),
            detail: Some(ErrorDetail {
                field: Some("quantity".into()),
                available_quantity: available,
            }),
        }
    }

    #[test]
    fn stock_limited_message_names_available_quantity() {
        let err = CartError::from_api(stock_error(Some(2)));
        assert_eq!(err.to_string(), "Only 2 items available in stock");
        assert_eq!(
            err.user_message("Failed to add item to cart"),
            "Only 2 items available in stock"
        );
    }

    #[test]
    fn bad_request_without_quantity_stays_generic() {
        let err = CartError::from_api(stock_error(None));
        assert!(matches!(err, CartError::Api(_)));
        assert_eq!(
            err.user_message("Failed to add item to cart"),
            "Failed to add item to cart"
        );
    }

    #[test]
    fn not_found_is_only_404() {
        let missing = ApiError::Status {
            status: 404,
            message: "Cart not found".into(),
            detail: None,
        };
        assert!(missing.is_not_found());
        assert!(!ApiError::Network("refused".into()).is_not_found());
        assert!(!stock_error(Some(1)).is_not_found());
    }
}
