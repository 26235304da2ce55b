//! Wishlist service.
//!
//! Same optimistic protocol as the cart service. Wishlists exist only for
//! signed-in shoppers.

use emporium_core::{ProductId, Wishlist, WishlistChange};
use tracing::instrument;

use super::{CartService, ServiceError};
use crate::backend::BackendClient;
use crate::middleware::Shopper;
use crate::models::session_keys;

/// Wishlist operations for one shopper.
pub struct WishlistService<'a> {
    backend: &'a BackendClient,
    shopper: &'a Shopper,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, shopper: &'a Shopper) -> Self {
        Self { backend, shopper }
    }

    /// The session's wishlist snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn current(&self) -> Result<Wishlist, ServiceError> {
        Ok(self
            .shopper
            .session
            .get::<Wishlist>(session_keys::WISHLIST)
            .await?
            .unwrap_or_default())
    }

    /// Replace the session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn store(&self, wishlist: &Wishlist) -> Result<(), ServiceError> {
        self.shopper
            .session
            .insert(session_keys::WISHLIST, wishlist)
            .await?;
        Ok(())
    }

    /// Reload the wishlist from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SignInRequired`] for guests, or a backend or
    /// session error.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Wishlist, ServiceError> {
        self.require_user()?;
        let wishlist = self
            .backend
            .get_wishlist(&self.shopper.call_context())
            .await?;
        self.store(&wishlist).await?;
        Ok(wishlist)
    }

    /// Save the product if absent, otherwise unsave it. Returns whether the
    /// product is saved afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error for guests, unknown products, or backend refusals.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle(&self, product_id: &ProductId) -> Result<bool, ServiceError> {
        self.require_user()?;
        let current = self.current().await?;
        if current.contains(product_id) {
            self.remove(product_id).await?;
            return Ok(false);
        }

        let product = self
            .backend
            .get_product(&self.shopper.call_context(), product_id)
            .await?;
        let mut next = current.clone();
        let change = next.toggle(product);
        self.sync(current, next, change).await?;
        Ok(true)
    }

    /// Unsave a product. A product that is not saved is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error for guests or backend refusals.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<Wishlist, ServiceError> {
        self.require_user()?;
        let current = self.current().await?;
        let mut next = current.clone();
        match next.remove(product_id) {
            Some(change) => self.sync(current, next, change).await,
            None => Ok(current),
        }
    }

    /// Add one unit to the cart, then unsave the product.
    ///
    /// # Errors
    ///
    /// Returns an error if either step fails. A failed cart add leaves the
    /// wishlist untouched.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn move_to_cart(&self, product_id: &ProductId) -> Result<(), ServiceError> {
        self.require_user()?;
        CartService::new(self.backend, self.shopper)
            .add(product_id, 1)
            .await?;
        self.remove(product_id).await?;
        Ok(())
    }

    async fn sync(
        &self,
        previous: Wishlist,
        optimistic: Wishlist,
        change: WishlistChange,
    ) -> Result<Wishlist, ServiceError> {
        self.store(&optimistic).await?;
        match self
            .backend
            .apply_wishlist_change(&self.shopper.call_context(), &change)
            .await
        {
            Ok(confirmed) => {
                self.store(&confirmed).await?;
                Ok(confirmed)
            }
            Err(err) => {
                tracing::warn!(error = %err, ?change, "Wishlist change rejected, rolling back");
                self.store(&previous).await?;
                Err(err.into())
            }
        }
    }

    const fn require_user(&self) -> Result<(), ServiceError> {
        if self.shopper.is_signed_in() {
            Ok(())
        } else {
            Err(ServiceError::SignInRequired)
        }
    }
}
