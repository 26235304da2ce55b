//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Optimistic cart updates against the session snapshot and the
//!   remote cart
//! - `wishlist` - The same protocol for the wishlist (signed-in only)
//! - `auth` - Sign-in, registration and sign-out, including the guest cart
//!   merge
//! - `checkout` - Order placement
//!
//! Services return [`ServiceError`]; handlers turn it into a toast.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod wishlist;

pub use auth::AuthService;
pub use cart::CartService;
pub use checkout::CheckoutService;
pub use wishlist::WishlistService;

use emporium_core::{CartError, DraftError, EmailError};
use thiserror::Error;

use crate::backend::BackendError;
use crate::error::AppError;

/// Errors from storefront services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The cart refused the operation locally.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Form input failed validation.
    #[error(transparent)]
    Draft(#[from] DraftError),

    /// Email address failed validation.
    #[error(transparent)]
    Email(#[from] EmailError),

    /// Other invalid input.
    #[error("{0}")]
    Invalid(String),

    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Checkout with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The operation needs a signed-in user.
    #[error("Please sign in first")]
    SignInRequired,
}

impl ServiceError {
    /// Message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(err) => err.user_message(),
            Self::Session(_) => "Something went wrong, please try again".to_string(),
            Self::Cart(err) => capitalize(&err.to_string()),
            Self::Draft(err) => capitalize(&err.to_string()),
            Self::Email(err) => capitalize(&err.to_string()),
            Self::Invalid(_) | Self::EmptyCart | Self::SignInRequired => self.to_string(),
        }
    }

    /// Whether the shopper's backend token was refused.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Backend(BackendError::Unauthorized))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Backend(BackendError::Unauthorized) => Self::SessionExpired,
            ServiceError::SignInRequired => Self::SignInRequired,
            ServiceError::Backend(err) => Self::Backend(err),
            ServiceError::Session(err) => Self::Session(err),
            other => Self::BadRequest(other.user_message()),
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use emporium_core::ProductId;

    use super::*;

    #[test]
    fn test_user_messages_are_capitalized() {
        let err = ServiceError::Cart(CartError::OutOfStock { available: 2 });
        assert_eq!(err.user_message(), "Only 2 in stock");

        let err = ServiceError::Cart(CartError::NotInCart(ProductId::new("p1")));
        assert!(err.user_message().starts_with("Product p1"));
    }

    #[test]
    fn test_unauthorized_becomes_session_expired() {
        let err = ServiceError::Backend(BackendError::Unauthorized);
        assert!(err.is_unauthorized());
        assert!(matches!(AppError::from(err), AppError::SessionExpired));
    }

    #[test]
    fn test_empty_cart_is_bad_request() {
        assert!(matches!(
            AppError::from(ServiceError::EmptyCart),
            AppError::BadRequest(msg) if msg == "Your cart is empty"
        ));
    }
}
