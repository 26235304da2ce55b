//! Type-safe price representation using decimal arithmetic.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

/// Largest unit price the storefront accepts, from the backend or a form.
///
/// Keeps line and cart totals far inside `Decimal`'s range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Round a monetary amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Deserialize a unit price, rejecting amounts above [`MAX_UNIT_PRICE`].
///
/// # Errors
///
/// Fails when the value is not a decimal or exceeds the cap.
pub fn deserialize_unit_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
    if amount.abs() > MAX_UNIT_PRICE {
        return Err(D::Error::custom(format!(
            "price {amount} exceeds {MAX_UNIT_PRICE}"
        )));
    }
    Ok(amount)
}

/// Optional form of [`deserialize_unit_price`]. Pair with `#[serde(default)]`.
///
/// # Errors
///
/// Fails when a present value is not a decimal or exceeds the cap.
pub fn deserialize_optional_unit_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Capped(#[serde(deserialize_with = "deserialize_unit_price")] Decimal);

    Ok(Option::<Capped>::deserialize(deserializer)?.map(|Capped(amount)| amount))
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            round_money(self.amount)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    EGP,
    SAR,
    AED,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::EGP => "E£",
            Self::SAR => "SAR ",
            Self::AED => "AED ",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::EGP => "EGP",
            Self::SAR => "SAR",
            Self::AED => "AED",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "EGP" => Ok(Self::EGP),
            "SAR" => Ok(Self::SAR),
            "AED" => Ok(Self::AED),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        let price = Price::new(Decimal::new(5, 0), CurrencyCode::USD);
        assert_eq!(price.display(), "$5.00");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::EUR);
        assert_eq!(price.display(), "€10.01");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("egp".parse::<CurrencyCode>().unwrap(), CurrencyCode::EGP);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
