//! Value types shared by the storefront and its tests.
//!
//! Identifiers are opaque strings minted by the backend; prices pair a
//! decimal amount with a display currency.

pub mod email;
pub mod id;
pub mod locale;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{CategoryId, OrderId, ProductId, ReviewId, UserId};
pub use locale::Locale;
pub use price::{CurrencyCode, Price};
pub use status::{OrderStatus, PaymentMethod, Rating, Role, SortOrder};
