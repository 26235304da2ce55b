//! Authentication service.
//!
//! The backend owns accounts and passwords; this service exchanges
//! credentials for a token, keeps the identity in the session, and folds
//! the guest cart into the account's cart.

use emporium_core::{Cart, Email, Wishlist};
use secrecy::SecretString;
use tracing::instrument;

use super::{CartService, ServiceError, WishlistService};
use crate::backend::{BackendClient, BackendError};
use crate::backend::wire::AuthResponse;
use crate::middleware::{Shopper, clear_identity, set_current_user};
use crate::models::{CurrentUser, Toast};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Longest display name accepted at registration.
const MAX_USER_NAME_LENGTH: usize = 64;

/// Sign-in and registration for one shopper.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
    shopper: &'a Shopper,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, shopper: &'a Shopper) -> Self {
        Self { backend, shopper }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed email, bad credentials, or a backend
    /// or session failure.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, ServiceError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(ServiceError::Invalid("Password is required".to_string()));
        }

        let auth = self
            .backend
            .login(&self.shopper.call_context(), email.as_str(), password)
            .await
            .map_err(|err| match err {
                BackendError::Unauthorized => {
                    ServiceError::Invalid("Invalid email or password".to_string())
                }
                other => other.into(),
            })?;
        self.establish(auth, email).await
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input, a taken email, or a backend or
    /// session failure.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, ServiceError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(ServiceError::Invalid("Name is required".to_string()));
        }
        if user_name.chars().count() > MAX_USER_NAME_LENGTH {
            return Err(ServiceError::Invalid(format!(
                "Name must be at most {MAX_USER_NAME_LENGTH} characters"
            )));
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        let auth = self
            .backend
            .register(
                &self.shopper.call_context(),
                user_name,
                email.as_str(),
                password,
            )
            .await?;
        self.establish(auth, email).await
    }

    /// Sign out: forget the identity and both snapshots.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ServiceError> {
        clear_identity(&self.shopper.session).await?;
        self.shopper.session.cycle_id().await?;
        Ok(())
    }

    /// Store the identity, merge the guest cart and load remote snapshots.
    async fn establish(
        &self,
        auth: AuthResponse,
        submitted_email: Email,
    ) -> Result<CurrentUser, ServiceError> {
        let email = Email::parse(&auth.user.email).unwrap_or(submitted_email);
        let user = CurrentUser {
            id: auth.user.id,
            user_name: auth.user.user_name,
            email,
            role: auth.user.role,
            token: SecretString::from(auth.token),
        };
        set_current_user(&self.shopper.session, &user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User signed in");

        let signed_in = Shopper {
            user: Some(user.clone()),
            ..self.shopper.clone()
        };
        self.merge_guest_cart(&signed_in).await?;

        let wishlist = WishlistService::new(self.backend, &signed_in);
        if let Err(err) = wishlist.refresh().await {
            tracing::warn!(error = %err, "Could not load wishlist after sign-in");
            wishlist.store(&Wishlist::new()).await?;
        }

        Ok(user)
    }

    /// Replay the guest cart onto the account's remote cart.
    ///
    /// Lines that fail to merge are skipped with a toast; sign-in itself
    /// never fails because of them.
    async fn merge_guest_cart(&self, signed_in: &Shopper) -> Result<(), ServiceError> {
        let carts = CartService::new(self.backend, signed_in);
        let guest = carts.current().await?;
        let ctx = signed_in.call_context();

        let mut remote = match self.backend.get_cart(&ctx).await {
            Ok(cart) => cart,
            Err(err) => {
                tracing::warn!(error = %err, "Could not load cart after sign-in");
                carts.store(&Cart::new()).await?;
                return Ok(());
            }
        };

        if guest.is_empty() {
            carts.store(&remote).await?;
            return Ok(());
        }

        let before_merge = remote.clone();
        let changes = remote.merge(guest);
        let mut failed = 0usize;
        for change in &changes {
            if let Err(err) = self.backend.apply_cart_change(&ctx, change).await {
                tracing::warn!(error = %err, ?change, "Guest cart line not merged");
                failed += 1;
            }
        }
        if failed > 0 {
            Toast::info("Some items from your previous cart could not be kept")
                .push(&signed_in.session)
                .await?;
        }

        let confirmed = match self.backend.get_cart(&ctx).await {
            Ok(cart) => cart,
            Err(err) => {
                tracing::warn!(error = %err, "Could not confirm merged cart");
                unconfirmed_snapshot(remote, before_merge, failed)
            }
        };
        carts.store(&confirmed).await
    }
}

/// Best local guess at the remote cart when the post-merge fetch fails.
///
/// The merged cart is only trusted when every change was applied; otherwise
/// it may hold lines the backend never accepted.
fn unconfirmed_snapshot(merged: Cart, before_merge: Cart, failed: usize) -> Cart {
    if failed == 0 { merged } else { before_merge }
}

/// Check password length bounds.
///
/// # Errors
///
/// Returns [`ServiceError::Invalid`] when the password is too short or long.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Invalid(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > 128 {
        return Err(ServiceError::Invalid(
            "Password must be at most 128 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(200)).is_err());
    }
}
