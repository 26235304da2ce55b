//! Orders and checkout input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::DraftError;
use crate::types::{OrderId, OrderStatus, PaymentMethod, ProductId};

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub phone: String,
}

/// A line of a placed order, priced at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of item quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity))
    }
}

/// Body of an order placement. The backend prices the order from the
/// account's remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Raw checkout form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutDraft {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub payment_method: String,
}

impl CheckoutDraft {
    /// Validate into a checkout request.
    ///
    /// # Errors
    ///
    /// Returns a [`DraftError`] when an address field is blank, the phone
    /// number has fewer than 7 digits, or the payment method is unknown.
    pub fn validate(&self) -> Result<CheckoutRequest, DraftError> {
        let field = |value: &str, name: &'static str| {
            let value = value.trim();
            if value.is_empty() {
                Err(DraftError::Missing(name))
            } else {
                Ok(value.to_string())
            }
        };

        let phone = field(&self.phone, "phone")?;
        if phone.chars().filter(char::is_ascii_digit).count() < 7 {
            return Err(DraftError::Invalid {
                field: "phone",
                reason: "must contain at least 7 digits".to_string(),
            });
        }

        let payment_method = self
            .payment_method
            .trim()
            .parse::<PaymentMethod>()
            .map_err(|reason| DraftError::Invalid {
                field: "payment method",
                reason,
            })?;

        Ok(CheckoutRequest {
            shipping_address: ShippingAddress {
                full_name: field(&self.full_name, "full name")?,
                street: field(&self.street, "street")?,
                city: field(&self.city, "city")?,
                phone,
            },
            payment_method,
        })
    }
}
