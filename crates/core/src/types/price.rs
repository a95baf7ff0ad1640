//! Type-safe price representation using decimal arithmetic.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing a price from API strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("amount must not be negative: {0}")]
    Negative(String),
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

    /// Parse a price from the decimal string and currency code returned by
    /// Shopify (`{"amount": "19.9", "currencyCode": "EUR"}`).
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the amount is not a decimal or is negative.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = parse_amount(amount)?;
        Ok(Self::new(amount, CurrencyCode::from(currency_code)))
    }

    /// Format for display with two decimals (e.g., `€19.90`, `SEK 12.00`).
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }

    /// Format an optional price, using `-` when there is nothing to show.
    #[must_use]
    pub fn display_or_dash(price: Option<&Self>) -> String {
        price.map_or_else(|| "-".to_string(), Self::display)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount.round_dp(2);
        match self.currency_code.symbol() {
            Some(symbol) => write!(f, "{symbol}{amount:.2}"),
            None => write!(f, "{} {amount:.2}", self.currency_code.code()),
        }
    }
}

/// Parse a non-negative decimal amount.
///
/// # Errors
///
/// Returns `PriceError` if the string is not a decimal or is negative.
pub fn parse_amount(raw: &str) -> Result<Decimal, PriceError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|_| PriceError::InvalidAmount(raw.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative(raw.to_string()));
    }
    Ok(amount)
}

/// ISO 4217 currency codes.
///
/// The common storefront currencies get their own variant (and a display
/// symbol); anything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    Other(String),
}

impl CurrencyCode {
    /// Display symbol, if the currency has a well-known one.
    #[must_use]
    pub const fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::USD | Self::CAD | Self::AUD => Some("$"),
            Self::EUR => Some("€"),
            Self::GBP => Some("£"),
            Self::Other(_) => None,
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Self::USD,
            "EUR" => Self::EUR,
            "GBP" => Self::GBP,
            "CAD" => Self::CAD,
            "AUD" => Self::AUD,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.code().to_string()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
