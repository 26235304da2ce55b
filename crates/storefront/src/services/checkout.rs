//! Checkout service.

use emporium_core::{Cart, CheckoutDraft, Order};
use tracing::instrument;

use super::{CartService, ServiceError};
use crate::backend::BackendClient;
use crate::error::add_breadcrumb;
use crate::middleware::Shopper;

/// Order placement for one signed-in shopper.
pub struct CheckoutService<'a> {
    backend: &'a BackendClient,
    shopper: &'a Shopper,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, shopper: &'a Shopper) -> Self {
        Self { backend, shopper }
    }

    /// Validate the form, place the order and empty the local cart.
    ///
    /// The backend prices the order from the remote cart, so the cart is
    /// refreshed first to refuse empty checkouts before calling it.
    ///
    /// # Errors
    ///
    /// Returns an error for guests, invalid input, an empty cart, or a
    /// backend refusal.
    #[instrument(skip(self, draft))]
    pub async fn place_order(&self, draft: &CheckoutDraft) -> Result<Order, ServiceError> {
        if !self.shopper.is_signed_in() {
            return Err(ServiceError::SignInRequired);
        }
        let request = draft.validate()?;

        let carts = CartService::new(self.backend, self.shopper);
        let cart = carts.refresh().await?;
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let order = self
            .backend
            .place_order(&self.shopper.call_context(), &request)
            .await?;
        add_breadcrumb("checkout", "Order placed", &[("order_id", order.id.as_str())]);
        tracing::info!(order_id = %order.id, total = %order.total, "Order placed");

        carts.store(&Cart::new()).await?;
        Ok(order)
    }
}
