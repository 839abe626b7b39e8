//! HTTP implementation of `CartApi` over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Url};

use super::CartApi;
use crate::cart::models::{
    AddItemRequest, ApiEnvelope, ApiErrorBody, Cart, CartId, ItemId, MergeCartRequest, ProductId,
    UpdateItemRequest,
};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// Talks to the storefront REST API rooted at `base_url`.
pub struct HttpCartApi {
    client: Client,
    base_url: Url,
    bearer: RwLock<Option<String>>,
}

impl HttpCartApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| ApiError::Network(format!("invalid API base URL {raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Network(format!("API base URL {raw} cannot carry a path")));
        }
        Ok(Self {
            client,
            base_url,
            bearer: RwLock::new(None),
        })
    }

    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Self::new(config.api_base_url.clone(), config.timeout)
    }

    /// Sets the token sent with every request once the user has logged in.
    pub fn set_bearer_token(&self, token: Option<String>) {
        *self.bearer.write() = token;
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base path, percent-encoding each one so an
    /// id can never reach a different route.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Network(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.bearer.read().as_deref() {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Cart> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ApiErrorBody>(&body) {
                Ok(err) => ApiError::Status {
                    status: err.status,
                    message: err.message,
                    detail: err.data,
                },
                Err(_) => ApiError::Status {
                    status: status.as_u16(),
                    message: String::from_utf8_lossy(&body).into_owned(),
                    detail: None,
                },
            });
        }

        let envelope: ApiEnvelope<Cart> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Decode("envelope reported success=false".into()));
        }
        Ok(envelope.data)
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn fetch_cart(&self, cart_id: &CartId) -> ApiResult<Cart> {
        tracing::debug!(%cart_id, "fetching cart");
        let url = self.url(&["cart", cart_id.as_str()])?;
        self.send(self.client.get(url)).await
    }

    async fn create_cart(&self) -> ApiResult<Cart> {
        tracing::debug!("creating cart");
        self.send(self.client.post(self.url(&["cart"])?)).await
    }

    async fn add_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: u32,
    ) -> ApiResult<Cart> {
        let body = AddItemRequest {
            product_id: product_id.clone(),
            quantity,
        };
        let url = self.url(&["cart", cart_id.as_str(), "items"])?;
        self.send(self.client.post(url).json(&body)).await
    }

    async fn update_item(
        &self,
        cart_id: &CartId,
        item_id: &ItemId,
        quantity: u32,
    ) -> ApiResult<Cart> {
        let url = self.url(&["cart", cart_id.as_str(), "items", item_id.as_str()])?;
        self.send(self.client.put(url).json(&UpdateItemRequest { quantity }))
            .await
    }

    async fn remove_item(&self, cart_id: &CartId, item_id: &ItemId) -> ApiResult<Cart> {
        let url = self.url(&["cart", cart_id.as_str(), "items", item_id.as_str()])?;
        self.send(self.client.delete(url)).await
    }

    async fn merge_cart(&self, guest_cart_id: &CartId) -> ApiResult<Cart> {
        let body = MergeCartRequest {
            guest_cart_id: guest_cart_id.clone(),
        };
        let url = self.url(&["cart", "merge"])?;
        self.send(self.client.post(url).json(&body)).await
    }
}
