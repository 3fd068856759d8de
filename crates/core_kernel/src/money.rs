//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//!
//! Unlike a ledger amount, a quoted amount is never rounded implicitly: the
//! fare engine rounds at explicit points of its settlement sequence and
//! deliberately keeps the full precision of a currency conversion.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ISO code of the base currency all reference prices are expressed in
pub const BASE_CURRENCY: &str = "CLP";

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid exchange rate for {currency}: {rate}")]
    InvalidRate { currency: String, rate: Decimal },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A three-letter, ISO 4217 style currency code
///
/// Codes are normalized to upper case on parse, so `"usd"` and `"USD"`
/// name the same currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidCurrencyCode` unless the input is exactly
    /// three ASCII letters
    pub fn parse(code: &str) -> Result<Self, MoneyError> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// The base currency (Chilean peso)
    pub fn clp() -> Self {
        Self(BASE_CURRENCY.to_string())
    }

    /// Returns true for the base currency
    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Rounds half away from zero to `dp` decimal places
///
/// This is the rounding used for fares, commissions and payouts:
/// `round(x * 10^dp) / 10^dp` with midpoints moving away from zero.
pub fn round_amount(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// A monetary amount with associated currency
///
/// The amount is kept at full precision; use [`Money::round_dp`] to round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Creates an amount in the base currency
    pub fn clp(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::clp())
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Rounds half away from zero to `dp` decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Self {
            amount: round_amount(self.amount, dp),
            currency: self.currency.clone(),
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency.clone()))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency.clone()))
    }

    /// Multiplies by a scalar (e.g., for rate calculations)
    pub fn checked_mul(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency.clone()))
    }

    /// Expresses a base-currency amount in the rate's target currency
    ///
    /// The result is not rounded.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyMismatch` if this amount is not in the base currency
    pub fn convert(&self, rate: &ExchangeRate) -> Result<Money, MoneyError> {
        if !self.currency.is_base() {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                BASE_CURRENCY.to_string(),
            ));
        }
        Ok(Self::new(rate.to_target(self.amount)?, rate.target().clone()))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}

/// Exchange rate between the base currency and a target currency
///
/// The rate is quoted as **units of base currency per one unit of the target
/// currency** (e.g. `950` for USD means 950 CLP buy one dollar). Converting a
/// base amount into the target therefore divides by the rate, and converting
/// back multiplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    target: CurrencyCode,
    base_per_unit: Decimal,
}

impl ExchangeRate {
    /// Creates a rate for `target`
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidRate` for zero or negative rates, and for a
    /// base-currency rate other than one
    pub fn new(target: CurrencyCode, base_per_unit: Decimal) -> Result<Self, MoneyError> {
        let invalid = base_per_unit <= Decimal::ZERO
            || (target.is_base() && base_per_unit != Decimal::ONE);
        if invalid {
            return Err(MoneyError::InvalidRate {
                currency: target.to_string(),
                rate: base_per_unit,
            });
        }
        Ok(Self {
            target,
            base_per_unit,
        })
    }

    /// The identity rate for the base currency
    pub fn identity() -> Self {
        Self {
            target: CurrencyCode::clp(),
            base_per_unit: Decimal::ONE,
        }
    }

    /// Returns the target currency
    pub fn target(&self) -> &CurrencyCode {
        &self.target
    }

    /// Returns base-currency units per one target unit
    pub fn value(&self) -> Decimal {
        self.base_per_unit
    }

    /// Returns true if this is the base-currency identity
    pub fn is_identity(&self) -> bool {
        self.base_per_unit == Decimal::ONE
    }

    /// Converts a base-currency amount into the target currency
    pub fn to_target(&self, base_amount: Decimal) -> Result<Decimal, MoneyError> {
        if self.is_identity() {
            return Ok(base_amount);
        }
        base_amount
            .checked_div(self.base_per_unit)
            .ok_or(MoneyError::Overflow)
    }

    /// Converts a target-currency amount back into the base currency
    pub fn to_base(&self, target_amount: Decimal) -> Result<Decimal, MoneyError> {
        target_amount
            .checked_mul(self.base_per_unit)
            .ok_or(MoneyError::Overflow)
    }
}

/// Represents a fractional rate (e.g., a commission share)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.20 for 20%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value without range checks
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a fraction in `[0, 1)`
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` if the value is out of range
    pub fn fraction(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value >= Decimal::ONE {
            return Err(MoneyError::InvalidAmount(format!(
                "rate {} is outside [0, 1)",
                value
            )));
        }
        Ok(Self { value })
    }

    /// Creates a rate from a percentage (e.g., 20 for 20%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / Decimal::ONE_HUNDRED,
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * Decimal::ONE_HUNDRED
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Result<Money, MoneyError> {
        money.checked_mul(self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn conversion_round_trips_through_base(
            minor in 1i64..10_000_000_000i64,
            rate_minor in 1i64..100_000_000i64,
        ) {
            let amount = Decimal::new(minor, 2);
            let rate = ExchangeRate::new(
                CurrencyCode::parse("USD").unwrap(),
                Decimal::new(rate_minor, 4),
            ).unwrap();

            let back = rate.to_base(rate.to_target(amount).unwrap()).unwrap();
            prop_assert!((back - amount).abs() <= Decimal::new(1, 10));
        }

        #[test]
        fn rounding_moves_at_most_half_a_unit(
            minor in -1_000_000_000i64..1_000_000_000i64,
            dp in 0u32..4u32,
        ) {
            let value = Decimal::new(minor, 5);
            let rounded = round_amount(value, dp);
            let half_unit = Decimal::new(5, dp + 1);
            prop_assert!((rounded - value).abs() <= half_unit);
        }
    }
}
