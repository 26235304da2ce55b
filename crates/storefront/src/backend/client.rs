//! HTTP implementation of the backend client.

use std::sync::Arc;

use emporium_core::{
    Cart, CartChange, Category, CategoryId, CategoryInput, CheckoutRequest, Order, OrderId,
    Product, ProductId, ProductInput, ProductPage, ProductQuery, Review, ReviewInput, Wishlist,
    WishlistChange,
};
use moka::future::Cache;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::wire::{
    AddCartItemRequest, AddWishlistItemRequest, AuthResponse, CartSnapshot, ErrorBody,
    LoginRequest, RegisterRequest, SetQuantityRequest, WishlistSnapshot,
};
use super::{BackendError, CallContext};
use crate::config::BackendConfig;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the commerce backend.
///
/// Categories are cached per locale; admin category writes invalidate them.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("emporium-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        ctx: &CallContext,
        segments: &[&str],
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(segments)?;
        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, ctx.locale().as_tag());
        if let Some(token) = ctx.token() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        Ok(builder)
    }

    /// Send a request and return the raw body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, BackendError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned server error"
                );
            } else {
                debug!(status = %status, "Backend refused request");
            }
            return Err(BackendError::from_status(
                status,
                ErrorBody::message_from(&body),
            ));
        }

        Ok(body)
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        segments: &[&str],
    ) -> Result<T, BackendError> {
        self.execute(self.request(Method::GET, ctx, segments)?)
            .await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        ctx: &CallContext,
        segments: &[&str],
        body: &B,
    ) -> Result<T, BackendError> {
        self.execute(self.request(method, ctx, segments)?.json(body))
            .await
    }

    async fn delete(&self, ctx: &CallContext, segments: &[&str]) -> Result<(), BackendError> {
        self.send(self.request(Method::DELETE, ctx, segments)?)
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] or [`BackendError::Rejected`]
    /// for bad credentials.
    #[instrument(skip(self, ctx, password))]
    pub async fn login(
        &self,
        ctx: &CallContext,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, BackendError> {
        self.send_json(
            Method::POST,
            ctx,
            &["users", "login"],
            &LoginRequest { email, password },
        )
        .await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] when the email is taken or input
    /// is invalid.
    #[instrument(skip(self, ctx, password))]
    pub async fn register(
        &self,
        ctx: &CallContext,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, BackendError> {
        self.send_json(
            Method::POST,
            ctx,
            &["users", "register"],
            &RegisterRequest {
                user_name,
                email,
                password,
            },
        )
        .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, ctx), fields(page = query.page))]
    pub async fn list_products(
        &self,
        ctx: &CallContext,
        query: &ProductQuery,
    ) -> Result<ProductPage, BackendError> {
        let builder = self
            .request(Method::GET, ctx, &["products"])?
            .query(&query.to_query_pairs());
        self.execute(builder).await
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown IDs.
    #[instrument(skip(self, ctx), fields(product_id = %id))]
    pub async fn get_product(
        &self,
        ctx: &CallContext,
        id: &ProductId,
    ) -> Result<Product, BackendError> {
        self.get(ctx, &["products", id.as_str()]).await
    }

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the input or the role.
    #[instrument(skip(self, ctx, input), fields(title = %input.title))]
    pub async fn create_product(
        &self,
        ctx: &CallContext,
        input: &ProductInput,
    ) -> Result<Product, BackendError> {
        self.send_json(Method::POST, ctx, &["products"], input)
            .await
    }

    /// Update a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the input or the role.
    #[instrument(skip(self, ctx, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        ctx: &CallContext,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, BackendError> {
        self.send_json(Method::PATCH, ctx, &["products", id.as_str()], input)
            .await
    }

    /// Delete a product (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the role or the product is gone.
    #[instrument(skip(self, ctx), fields(product_id = %id))]
    pub async fn delete_product(
        &self,
        ctx: &CallContext,
        id: &ProductId,
    ) -> Result<(), BackendError> {
        self.delete(ctx, &["products", id.as_str()]).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List categories, cached per locale.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, ctx))]
    pub async fn list_categories(&self, ctx: &CallContext) -> Result<Vec<Category>, BackendError> {
        let key = CacheKey::Categories(ctx.locale());
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get(ctx, &["category"]).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Fetch one category, cached per locale.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown IDs.
    #[instrument(skip(self, ctx), fields(category_id = %id))]
    pub async fn get_category(
        &self,
        ctx: &CallContext,
        id: &CategoryId,
    ) -> Result<Category, BackendError> {
        let key = CacheKey::Category(id.clone(), ctx.locale());
        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let category: Category = self.get(ctx, &["category", id.as_str()]).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    /// Create a category (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the input or the role.
    #[instrument(skip(self, ctx, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        ctx: &CallContext,
        input: &CategoryInput,
    ) -> Result<Category, BackendError> {
        let category = self
            .send_json(Method::POST, ctx, &["category"], input)
            .await?;
        self.invalidate_categories();
        Ok(category)
    }

    /// Update a category (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the input or the role.
    #[instrument(skip(self, ctx, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        ctx: &CallContext,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, BackendError> {
        let category = self
            .send_json(Method::PATCH, ctx, &["category", id.as_str()], input)
            .await?;
        self.invalidate_categories();
        Ok(category)
    }

    /// Delete a category (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the role or the category is gone.
    #[instrument(skip(self, ctx), fields(category_id = %id))]
    pub async fn delete_category(
        &self,
        ctx: &CallContext,
        id: &CategoryId,
    ) -> Result<(), BackendError> {
        self.delete(ctx, &["category", id.as_str()]).await?;
        self.invalidate_categories();
        Ok(())
    }

    /// Drop every cached category entry.
    pub fn invalidate_categories(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the account's remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is refused.
    #[instrument(skip(self, ctx))]
    pub async fn get_cart(&self, ctx: &CallContext) -> Result<Cart, BackendError> {
        let snapshot: CartSnapshot = self.get(ctx, &["cart"]).await?;
        Ok(Cart::from_lines(snapshot.items))
    }

    /// Send one cart change and return the backend's resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the change.
    #[instrument(skip(self, ctx))]
    pub async fn apply_cart_change(
        &self,
        ctx: &CallContext,
        change: &CartChange,
    ) -> Result<Cart, BackendError> {
        let builder = match change {
            CartChange::Insert {
                product_id,
                quantity,
            } => self
                .request(Method::POST, ctx, &["cart"])?
                .json(&AddCartItemRequest {
                    product_id: product_id.clone(),
                    quantity: *quantity,
                }),
            CartChange::SetQuantity {
                product_id,
                quantity,
            } => self
                .request(Method::PATCH, ctx, &["cart", product_id.as_str()])?
                .json(&SetQuantityRequest {
                    quantity: *quantity,
                }),
            CartChange::Remove { product_id } => {
                self.request(Method::DELETE, ctx, &["cart", product_id.as_str()])?
            }
            CartChange::Clear => self.request(Method::DELETE, ctx, &["cart"])?,
        };
        let snapshot: CartSnapshot = self.execute(builder).await?;
        Ok(Cart::from_lines(snapshot.items))
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Fetch the account's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is refused.
    #[instrument(skip(self, ctx))]
    pub async fn get_wishlist(&self, ctx: &CallContext) -> Result<Wishlist, BackendError> {
        let snapshot: WishlistSnapshot = self.get(ctx, &["wishlist"]).await?;
        Ok(Wishlist::from_items(snapshot.items))
    }

    /// Send one wishlist change and return the backend's resulting wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the change.
    #[instrument(skip(self, ctx))]
    pub async fn apply_wishlist_change(
        &self,
        ctx: &CallContext,
        change: &WishlistChange,
    ) -> Result<Wishlist, BackendError> {
        let builder = match change {
            WishlistChange::Add { product_id } => self
                .request(Method::POST, ctx, &["wishlist"])?
                .json(&AddWishlistItemRequest {
                    product_id: product_id.clone(),
                }),
            WishlistChange::Remove { product_id } => {
                self.request(Method::DELETE, ctx, &["wishlist", product_id.as_str()])?
            }
        };
        let snapshot: WishlistSnapshot = self.execute(builder).await?;
        Ok(Wishlist::from_items(snapshot.items))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order from the account's remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the order.
    #[instrument(skip(self, ctx, request), fields(payment = request.payment_method.as_str()))]
    pub async fn place_order(
        &self,
        ctx: &CallContext,
        request: &CheckoutRequest,
    ) -> Result<Order, BackendError> {
        self.send_json(Method::POST, ctx, &["order"], request)
            .await
    }

    /// List the account's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, ctx))]
    pub async fn list_orders(&self, ctx: &CallContext) -> Result<Vec<Order>, BackendError> {
        self.get(ctx, &["order"]).await
    }

    /// Fetch one of the account's orders.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown or foreign orders.
    #[instrument(skip(self, ctx), fields(order_id = %id))]
    pub async fn get_order(&self, ctx: &CallContext, id: &OrderId) -> Result<Order, BackendError> {
        self.get(ctx, &["order", id.as_str()]).await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// List a product's reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, ctx), fields(product_id = %product_id))]
    pub async fn list_reviews(
        &self,
        ctx: &CallContext,
        product_id: &ProductId,
    ) -> Result<Vec<Review>, BackendError> {
        let builder = self
            .request(Method::GET, ctx, &["reviews"])?
            .query(&[("product", product_id.as_str())]);
        self.execute(builder).await
    }

    /// Post a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the review.
    #[instrument(skip(self, ctx, input), fields(product_id = %input.product_id))]
    pub async fn create_review(
        &self,
        ctx: &CallContext,
        input: &ReviewInput,
    ) -> Result<Review, BackendError> {
        self.send_json(Method::POST, ctx, &["reviews"], input)
            .await
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Probe the backend without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), BackendError> {
        let ctx = CallContext::anonymous(emporium_core::Locale::default());
        self.send(self.request(Method::GET, &ctx, &["category"])?)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig::with_url(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client("http://backend.test/api");
        let url = client.endpoint(&["products", "p1"]).unwrap();
        assert_eq!(url.as_str(), "http://backend.test/api/products/p1");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let client = client("http://backend.test/");
        let url = client.endpoint(&["cart", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://backend.test/cart/a%2Fb%20c");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let client = client("http://127.0.0.1:9/");
        let err = client.ping().await.unwrap_err();
        assert!(matches!(err, BackendError::Http(_)));
        assert!(err.is_server_side());
    }
}
