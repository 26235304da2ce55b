//! Request and response bodies that only exist on the wire.
//!
//! Domain types that the backend returns verbatim (products, orders,
//! reviews) live in `emporium_core`; this module holds the envelopes.

use emporium_core::{CartLine, ProductId, Role, UserId, WishlistItem};
use serde::{Deserialize, Serialize};

/// `POST /users/login` body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /users/register` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub user_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Account record returned with a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUser {
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountUser,
}

/// Remote cart snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// Remote wishlist snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WishlistSnapshot {
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

/// `POST /cart` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `PATCH /cart/{productId}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

/// `POST /wishlist` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWishlistItemRequest {
    pub product_id: ProductId,
}

/// Error envelope. Backends disagree on the field name, so accept both.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best-effort message extraction from a raw error body.
    #[must_use]
    pub fn message_from(body: &str) -> String {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| body.chars().take(200).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message_field() {
        assert_eq!(
            ErrorBody::message_from(r#"{"message":"Out of stock"}"#),
            "Out of stock"
        );
        assert_eq!(ErrorBody::message_from(r#"{"error":"Nope"}"#), "Nope");
    }

    #[test]
    fn test_error_body_falls_back_to_raw_text() {
        assert_eq!(ErrorBody::message_from("Bad Gateway"), "Bad Gateway");
        assert_eq!(ErrorBody::message_from(&"x".repeat(500)).len(), 200);
    }

    #[test]
    fn test_register_request_is_camel_case() {
        let body = RegisterRequest {
            user_name: "sam",
            email: "sam@example.com",
            password: "pw",
        };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["userName"], "sam");
    }
}
