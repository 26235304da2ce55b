//! Cart service.
//!
//! Every mutation follows the same steps: snapshot the session cart, apply
//! the operation locally (which validates it and yields a [`CartChange`]),
//! store the optimistic result, then send the change to the backend. The
//! backend's cart replaces the snapshot on success; the pre-mutation
//! snapshot is restored on failure. Guests never reach the backend.

use emporium_core::{Cart, CartChange, CartError, ProductId};
use tracing::instrument;

use super::ServiceError;
use crate::backend::BackendClient;
use crate::error::add_breadcrumb;
use crate::middleware::Shopper;
use crate::models::session_keys;

/// Cart operations for one shopper.
pub struct CartService<'a> {
    backend: &'a BackendClient,
    shopper: &'a Shopper,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, shopper: &'a Shopper) -> Self {
        Self { backend, shopper }
    }

    /// The session's cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn current(&self) -> Result<Cart, ServiceError> {
        Ok(self
            .shopper
            .session
            .get::<Cart>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    /// Replace the session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn store(&self, cart: &Cart) -> Result<(), ServiceError> {
        self.shopper.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    /// Reload the cart from the backend when signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend or session fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Cart, ServiceError> {
        if !self.shopper.is_signed_in() {
            return self.current().await;
        }
        let cart = self
            .backend
            .get_cart(&self.shopper.call_context())
            .await?;
        self.store(&cart).await?;
        Ok(cart)
    }

    /// Add units of a product, merging with an existing line.
    ///
    /// The product is fetched first so the stock check and prices are fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown, stock is short, or the
    /// backend refuses the change.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, ServiceError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity.into());
        }
        let product = self
            .backend
            .get_product(&self.shopper.call_context(), product_id)
            .await?;
        add_breadcrumb("cart", "Add to cart", &[("product_id", product_id.as_str())]);
        self.apply(|cart| cart.add(product, quantity)).await
    }

    /// Add one unit to a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is missing, stock is short, or the
    /// backend refuses the change.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn increment(&self, product_id: &ProductId) -> Result<Cart, ServiceError> {
        self.apply(|cart| cart.increment(product_id)).await
    }

    /// Remove one unit from a line, never going below one.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is missing or holds a single unit, or
    /// the backend refuses the change.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn decrement(&self, product_id: &ProductId) -> Result<Cart, ServiceError> {
        self.apply(|cart| cart.decrement(product_id)).await
    }

    /// Set an absolute quantity on a line.
    ///
    /// # Errors
    ///
    /// Returns an error for zero, a missing line, short stock, or a backend
    /// refusal.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ServiceError> {
        self.apply(|cart| cart.set_quantity(product_id, quantity))
            .await
    }

    /// Drop a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is missing or the backend refuses.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<Cart, ServiceError> {
        self.apply(|cart| cart.remove(product_id)).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, ServiceError> {
        self.apply(|cart| Ok(cart.clear())).await
    }

    async fn apply<F>(&self, op: F) -> Result<Cart, ServiceError>
    where
        F: FnOnce(&mut Cart) -> Result<CartChange, CartError>,
    {
        let previous = self.current().await?;
        let mut optimistic = previous.clone();
        let change = op(&mut optimistic)?;
        self.store(&optimistic).await?;

        if !self.shopper.is_signed_in() {
            return Ok(optimistic);
        }

        match self
            .backend
            .apply_cart_change(&self.shopper.call_context(), &change)
            .await
        {
            Ok(confirmed) => {
                self.store(&confirmed).await?;
                Ok(confirmed)
            }
            Err(err) => {
                tracing::warn!(error = %err, ?change, "Cart change rejected, rolling back");
                self.store(&previous).await?;
                Err(err.into())
            }
        }
    }
}
