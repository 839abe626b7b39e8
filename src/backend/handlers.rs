//! REST API handlers for the stand-in cart backend
//!
//! Every success returns `{ success, data: Cart }`; every failure returns the
//! `{ status, message, data? }` error envelope the cart client understands.

use super::{helpers::*, state::*};
use crate::cart::models::{
    AddItemRequest, ApiEnvelope, ApiErrorBody, Cart, CartId, ErrorDetail, ItemId,
    MergeCartRequest, UpdateItemRequest,
};
use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/cart", post(create_cart))
        .route("/cart/merge", post(merge_cart))
        .route("/cart/:cart_id", get(get_cart))
        .route("/cart/:cart_id/items", post(add_item))
        .route(
            "/cart/:cart_id/items/:item_id",
            put(update_item).delete(remove_item),
        )
}

// =============================================================================
// Error Envelope
// =============================================================================

#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
    detail: Option<ErrorDetail>,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    fn cart_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Cart not found")
    }

    fn item_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Cart item not found")
    }

    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: Some(ErrorDetail {
                field: Some(field.to_string()),
                available_quantity: None,
            }),
        }
    }

    fn insufficient_stock(available: u32) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Insufficient stock".to_string(),
            detail: Some(ErrorDetail {
                field: Some("quantity".to_string()),
                available_quantity: Some(available),
            }),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            status: self.status.as_u16(),
            message: self.message,
            data: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiReply = Result<Json<ApiEnvelope<Cart>>, ApiFailure>;

fn reply(state: &AppState, cart_id: &CartId) -> ApiReply {
    let cart = state
        .carts
        .get(cart_id)
        .ok_or_else(ApiFailure::cart_not_found)?;
    Ok(Json(ApiEnvelope::ok(render_cart(&cart, &state.products))))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn available_stock(state: &AppState, line_product: &crate::cart::models::ProductId) -> u32 {
    state.products.get(line_product).map_or(0, |p| p.stock)
}

/// Finds the user's cart or opens a new one for them.
fn user_cart_id(state: &AppState, token: &str) -> CartId {
    let cart_id = state
        .user_carts
        .entry(token.to_string())
        .or_insert_with(|| get_or_create_cart_id(None))
        .clone();
    state
        .carts
        .entry(cart_id.clone())
        .or_insert_with(|| StoredCart::new(cart_id.clone(), Some(token.to_string())));
    cart_id
}

// =============================================================================
// Handlers
// =============================================================================

/// Endpoint: POST /cart
/// Opens a guest cart, or resolves the caller's user cart when authenticated.
async fn create_cart(State(state): State<SharedState>, headers: HeaderMap) -> ApiReply {
    let cart_id = match bearer_token(&headers) {
        Some(token) => user_cart_id(&state, &token),
        None => {
            let cart_id = get_or_create_cart_id(None);
            state
                .carts
                .insert(cart_id.clone(), StoredCart::new(cart_id.clone(), None));
            tracing::debug!(%cart_id, "guest cart created");
            cart_id
        }
    };
    reply(&state, &cart_id)
}

/// Endpoint: GET /cart/:cart_id
async fn get_cart(State(state): State<SharedState>, Path(cart_id): Path<String>) -> ApiReply {
    reply(&state, &CartId::from(cart_id))
}

/// Endpoint: POST /cart/:cart_id/items
/// Adds to an existing line for the same product, otherwise appends a line.
async fn add_item(
    State(state): State<SharedState>,
    Path(cart_id): Path<String>,
    Json(payload): Json<AddItemRequest>,
) -> ApiReply {
    let cart_id = CartId::from(cart_id);
    if payload.quantity == 0 {
        return Err(ApiFailure::invalid("quantity", "quantity must be greater than 0"));
    }
    let stock = match state.products.get(&payload.product_id) {
        Some(product) => product.stock,
        None => return Err(ApiFailure::invalid("productId", "Product not found")),
    };

    {
        let mut cart = state
            .carts
            .get_mut(&cart_id)
            .ok_or_else(ApiFailure::cart_not_found)?;

        let existing = cart
            .lines
            .iter()
            .position(|l| l.product_id == payload.product_id);
        let in_cart = existing.map_or(0, |idx| cart.lines[idx].quantity);
        let wanted = match in_cart.checked_add(payload.quantity) {
            Some(wanted) if wanted <= stock => wanted,
            _ => return Err(ApiFailure::insufficient_stock(stock)),
        };

        match existing {
            Some(idx) => cart.lines[idx].quantity = wanted,
            None => {
                let id = state.next_item_id();
                cart.lines.push(StoredLine {
                    id,
                    product_id: payload.product_id.clone(),
                    quantity: payload.quantity,
                });
            }
        }
        tracing::debug!(%cart_id, lines = %format_line_summary(&cart.lines), "item added");
    }

    reply(&state, &cart_id)
}

/// Endpoint: PUT /cart/:cart_id/items/:item_id
async fn update_item(
    State(state): State<SharedState>,
    Path((cart_id, item_id)): Path<(String, String)>,
    Json(payload): Json<UpdateItemRequest>,
) -> ApiReply {
    let cart_id = CartId::from(cart_id);
    let item_id = ItemId::from(item_id);
    if payload.quantity == 0 {
        return Err(ApiFailure::invalid("quantity", "quantity must be greater than 0"));
    }

    {
        let mut cart = state
            .carts
            .get_mut(&cart_id)
            .ok_or_else(ApiFailure::cart_not_found)?;
        let line = cart
            .lines
            .iter_mut()
            .find(|l| l.id == item_id)
            .ok_or_else(ApiFailure::item_not_found)?;

        let stock = available_stock(&state, &line.product_id);
        if payload.quantity > stock {
            return Err(ApiFailure::insufficient_stock(stock));
        }
        line.quantity = payload.quantity;
    }

    reply(&state, &cart_id)
}

/// Endpoint: DELETE /cart/:cart_id/items/:item_id
async fn remove_item(
    State(state): State<SharedState>,
    Path((cart_id, item_id)): Path<(String, String)>,
) -> ApiReply {
    let cart_id = CartId::from(cart_id);
    let item_id = ItemId::from(item_id);

    {
        let mut cart = state
            .carts
            .get_mut(&cart_id)
            .ok_or_else(ApiFailure::cart_not_found)?;
        let before = cart.lines.len();
        cart.lines.retain(|l| l.id != item_id);
        if cart.lines.len() == before {
            return Err(ApiFailure::item_not_found());
        }
    }

    reply(&state, &cart_id)
}

/// Endpoint: POST /cart/merge
/// Folds a guest cart into the caller's user cart. Duplicate products are
/// summed and capped at stock; the guest cart is left behind with status `merged`.
async fn merge_cart(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<MergeCartRequest>,
) -> ApiReply {
    let Some(token) = bearer_token(&headers) else {
        return Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
        ));
    };

    let guest_lines = {
        let mut guest = state
            .carts
            .get_mut(&payload.guest_cart_id)
            .ok_or_else(ApiFailure::cart_not_found)?;
        if guest.owner.is_some() {
            return Err(ApiFailure::invalid("guestCartId", "Not a guest cart"));
        }
        guest.status = "merged".to_string();
        std::mem::take(&mut guest.lines)
    };

    let user_cart_id = user_cart_id(&state, &token);
    if let Some(mut user_cart) = state.carts.get_mut(&user_cart_id) {
        let dropped = merge_lines(&mut user_cart.lines, guest_lines, |product| {
            available_stock(&state, product)
        });
        if dropped > 0 {
            tracing::warn!(cart_id = %user_cart_id, dropped, "merged quantities capped at stock");
        }
        tracing::info!(
            guest = %payload.guest_cart_id,
            cart_id = %user_cart_id,
            lines = %format_line_summary(&user_cart.lines),
            "guest cart merged"
        );
    }

    reply(&state, &user_cart_id)
}
