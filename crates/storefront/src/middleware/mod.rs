//! Request and response middleware for the storefront.
//!
//! Applied in `app()`, outermost first: Sentry, `TraceLayer`, request ID,
//! security headers, session, then identity expiry closest to the handlers.
//! The auth forms additionally sit behind a governor rate limit.
//!
//! The extractors in [`auth`] and [`shopper`] read the session that the
//! session layer attaches.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod shopper;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, clear_identity,
    session_expiry_middleware, set_current_user, take_return_to,
};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use shopper::{PageContext, Shopper};
