//! Session-related types.
//!
//! Everything the storefront remembers between requests lives in the
//! session: the signed-in identity, cart and wishlist snapshots, the chosen
//! locale, pending toasts and where to return after sign-in.

use emporium_core::{Email, Role, UserId};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::backend::CallContext;
use emporium_core::Locale;

/// Session-stored user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub user_name: String,
    pub email: Email,
    pub role: Role,
    /// Backend bearer token.
    #[serde(with = "secret_token")]
    pub token: SecretString,
}

impl CurrentUser {
    /// Whether the user may use the admin pages.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Backend call context for this user.
    #[must_use]
    pub fn call_context(&self, locale: Locale) -> CallContext {
        CallContext::authenticated(self.token.clone(), locale)
    }
}

/// The session store must hold the token in clear; keep it a `SecretString`
/// everywhere else.
mod secret_token {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(token: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(token.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart snapshot.
    pub const CART: &str = "cart";

    /// Key for the wishlist snapshot.
    pub const WISHLIST: &str = "wishlist";

    /// Key for the chosen locale.
    pub const LOCALE: &str = "locale";

    /// Key for toasts waiting to be shown.
    pub const TOASTS: &str = "toasts";

    /// Key for the path to return to after sign-in.
    pub const RETURN_TO: &str = "return_to";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_current_user_round_trips_token() {
        let user = CurrentUser {
            id: UserId::new("u1"),
            user_name: "sam".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            role: Role::Customer,
            token: SecretString::from("tok-123"),
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: CurrentUser = serde_json::from_str(&json).unwrap();
        assert_eq!(back.token.expose_secret(), "tok-123");
        assert!(!back.is_admin());
    }

    #[test]
    fn test_debug_redacts_token() {
        let user = CurrentUser {
            id: UserId::new("u1"),
            user_name: "sam".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            role: Role::Admin,
            token: SecretString::from("tok-123"),
        };
        assert!(!format!("{user:?}").contains("tok-123"));
    }
}
