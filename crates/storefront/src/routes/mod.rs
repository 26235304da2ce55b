//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness
//! GET  /health/ready              - Backend readiness
//!
//! # Catalog
//! GET  /products                  - Product listing (?page ?category ?q ?sort)
//! GET  /products/{id}             - Product detail with reviews
//! POST /products/{id}/reviews     - Post a review (auth)
//! GET  /categories                - Category listing
//! GET  /categories/{id}           - Products in a category
//!
//! # Cart (guests keep a session cart)
//! GET  /cart                      - Cart page
//! GET  /cart/count                - Cart count badge (fragment)
//! POST /cart/add                  - Add to cart
//! POST /cart/increment            - +1
//! POST /cart/decrement            - -1, never below 1
//! POST /cart/update               - Set quantity
//! POST /cart/remove               - Remove line
//! POST /cart/clear                - Empty cart
//!
//! # Wishlist (auth)
//! GET  /wishlist                  - Wishlist page
//! POST /wishlist/toggle           - Save or unsave
//! POST /wishlist/remove           - Unsave
//! POST /wishlist/move-to-cart     - Add to cart and unsave
//!
//! # Checkout (auth)
//! GET  /checkout                  - Checkout form
//! POST /checkout                  - Place order
//!
//! # Account (auth)
//! GET  /account                   - Overview
//! GET  /account/orders            - Order history
//! GET  /account/orders/{id}       - Order detail
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action (rate limited)
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action (rate limited)
//! POST /auth/logout               - Logout action
//!
//! POST /locale                    - Switch display language
//!
//! # Admin (admin role)
//! GET  /admin                     - Redirect to products
//! GET  /admin/products            - Product table
//! GET  /admin/products/new        - New product form
//! POST /admin/products            - Create product
//! GET  /admin/products/{id}/edit  - Edit product form
//! POST /admin/products/{id}       - Update product
//! POST /admin/products/{id}/delete - Delete product
//! GET  /admin/categories          - Category table and new form
//! POST /admin/categories          - Create category
//! GET  /admin/categories/{id}/edit - Edit category form
//! POST /admin/categories/{id}     - Update category
//! POST /admin/categories/{id}/delete - Delete category
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod locale;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    handler::Handler,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::backend::BackendError;
use crate::error::AppError;
use crate::middleware::{Shopper, auth_rate_limiter, auth::is_local_path};
use crate::models::Toast;
use crate::services::ServiceError;
use crate::state::AppState;

// =============================================================================
// Shared Handler Helpers
// =============================================================================

/// Finish a form POST: queue a toast for the outcome and redirect.
///
/// Failures become error toasts rather than error pages. A refused token or
/// a guest hitting an account-only action still short-circuits to sign-in.
pub(crate) async fn toast_and_redirect<T>(
    shopper: &Shopper,
    result: Result<T, ServiceError>,
    success: Option<Toast>,
    to: &str,
) -> Result<Response, AppError> {
    match result {
        Ok(_) => {
            if let Some(toast) = success {
                toast.push(&shopper.session).await?;
            }
        }
        Err(err @ (ServiceError::SignInRequired | ServiceError::Backend(BackendError::Unauthorized))) => {
            return Err(err.into());
        }
        Err(err) => {
            if let ServiceError::Backend(backend) = &err
                && backend.is_server_side()
            {
                let event_id = sentry::capture_error(&err);
                tracing::error!(error = %err, sentry_event_id = %event_id, "Backend call failed");
            }
            Toast::error(err.user_message())
                .push(&shopper.session)
                .await?;
        }
    }
    Ok(Redirect::to(to).into_response())
}

/// Pick a safe redirect target from an optional form field.
pub(crate) fn return_path<'a>(requested: Option<&'a str>, fallback: &'a str) -> &'a str {
    requested.filter(|p| is_local_path(p)).unwrap_or(fallback)
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).post(auth::login.layer(auth_rate_limiter())),
        )
        .route(
            "/register",
            get(auth::register_page).post(auth::register.layer(auth_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::create_review))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/remove", post(wishlist::remove))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route(
            "/products",
            get(admin::products).post(admin::create_product),
        )
        .route("/products/new", get(admin::new_product))
        .route("/products/{id}", post(admin::update_product))
        .route("/products/{id}/edit", get(admin::edit_product))
        .route("/products/{id}/delete", post(admin::delete_product))
        .route(
            "/categories",
            get(admin::categories).post(admin::create_category),
        )
        .route("/categories/{id}", post(admin::update_category))
        .route("/categories/{id}/edit", get(admin::edit_category))
        .route("/categories/{id}/delete", post(admin::delete_category))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .route("/locale", post(locale::switch))
        .nest("/admin", admin_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_path_rejects_foreign_targets() {
        assert_eq!(return_path(Some("/products/p1"), "/cart"), "/products/p1");
        assert_eq!(return_path(Some("https://evil.test"), "/cart"), "/cart");
        assert_eq!(return_path(Some("//evil.test"), "/cart"), "/cart");
        assert_eq!(return_path(None, "/cart"), "/cart");
    }
}
