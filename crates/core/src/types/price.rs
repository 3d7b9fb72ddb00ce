//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative monetary amount in the store's currency.
///
/// Amounts are decimal (never floating point) and expressed in the
/// currency's standard unit, e.g. dollars rather than cents. The backend
/// owns all price computation; this type only guards against nonsense
/// values crossing the wire boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an integer number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert!(Price::new(Decimal::new(-1, 2)).is_err());
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_from_cents() {
        let price = Price::from_cents(1999).unwrap();
        assert_eq!(price.to_string(), "19.99");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Price, _> = serde_json::from_str("\"12.50\"");
        assert!(ok.is_ok());

        let bad: Result<Price, _> = serde_json::from_str("\"-3.00\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialize_as_decimal_string() {
        let price = Price::from_cents(250).unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"2.50\"");
    }
}
