//! Cart line quantities.
//!
//! A cart line always holds at least one unit. Setting a line to zero units is
//! expressed as [`QuantityChange::Remove`], never as a zero [`Quantity`].

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when converting raw numbers into a [`Quantity`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantity must be at least 1")]
    Zero,
    #[error("quantity out of range: {0}")]
    OutOfRange(i64),
}

/// Number of units on a cart line (always >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(QuantityError::Zero)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = u32::try_from(value).map_err(|_| QuantityError::OutOfRange(value))?;
        Self::try_from(value)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        Self::from(quantity.get())
    }
}

/// Requested change to an existing cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Set the line to this many units.
    Set(Quantity),
    /// Drop the line from the cart.
    Remove,
}

impl From<u32> for QuantityChange {
    fn from(value: u32) -> Self {
        Quantity::new(value).map_or(Self::Remove, Self::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_quantity() {
        assert_eq!(Quantity::new(0), None);
        assert_eq!(Quantity::try_from(0_u32), Err(QuantityError::Zero));
        assert_eq!(Quantity::try_from(-3_i64), Err(QuantityError::OutOfRange(-3)));
    }

    #[test]
    fn test_quantity_change_zero_means_remove() {
        assert_eq!(QuantityChange::from(0), QuantityChange::Remove);
        assert_eq!(
            QuantityChange::from(3),
            QuantityChange::Set(Quantity::new(3).unwrap_or(Quantity::ONE))
        );
    }

    #[test]
    fn test_default_is_one() {
        assert_eq!(Quantity::default().get(), 1);
        assert_eq!(i64::from(Quantity::ONE), 1);
    }
}
