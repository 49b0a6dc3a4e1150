//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    33.33 × 3 = 99.99000000000001  ❌ WRONG!                             │
//! │                                                                         │
//! │  Summed over thousands of orders in an analytics report, the drift     │
//! │  shows up as revenue totals that disagree with the order rows.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    "33.33" ──parse──► 3333 × 3 = 9999 ──to_fixed2──► "99.99"           │
//! │    The decimal string never touches an f64.                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! // Parse untrusted input (checkout form, plan form)
//! let price: Money = "500.00".parse().unwrap();
//! let fee = Money::parse("60").unwrap();
//!
//! let total = price * 2 + fee;
//! assert_eq!(total.to_fixed2(), "1060.00");
//! ```

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents, paisa, ...).
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──┬──► Order.subtotal_cents (× quantity)
///                       │
/// Variant.price_cents ──┘
///
/// ShippingClass.fee_cents ──► Order.shipping_fee_cents
///
/// subtotal + shipping_fee ──► Order.total_cents ──► Analytics revenue
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_fixed2(), "10.99");
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses an exact decimal string such as `"33.33"`.
    ///
    /// ## Accepted Forms
    /// ```text
    /// "500"     → 50000
    /// "500.5"   → 50050
    /// "500.50"  → 50050
    /// "0.010"   → 1       (trailing zeros are not precision)
    /// "-3.10"   → -310
    /// "1.005"   → error   (sub-cent precision)
    /// "1e3"     → error
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        Self::parse_field(input, "amount")
    }

    /// Like [`Money::parse`], but names the offending field in the error.
    pub fn parse_field(input: &str, field: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let s = input.trim();
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (major, minor) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if major.is_empty() && minor.is_empty() {
            return Err(invalid("must be a decimal number"));
        }
        if !major.bytes().all(|b| b.is_ascii_digit()) || !minor.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must be a decimal number"));
        }

        let minor = minor.trim_end_matches('0');
        if minor.len() > 2 {
            return Err(invalid("must have at most two decimal places"));
        }

        let major_value: i64 = if major.is_empty() {
            0
        } else {
            major.parse().map_err(|_| invalid("is too large"))?
        };
        let minor_value: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| invalid("must be a decimal number"))? * 10,
            _ => minor.parse().map_err(|_| invalid("must be a decimal number"))?,
        };

        let cents = major_value
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor_value))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Formats with exactly two decimal places and no currency symbol.
    ///
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(106000).to_fixed2(), "1060.00");
    /// assert_eq!(Money::from_cents(-5).to_fixed2(), "-0.05");
    /// ```
    pub fn to_fixed2(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Unit price: 33.33
    /// Quantity: 3
    ///      │
    ///      ▼
    /// checked_mul_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Subtotal: 99.99 (exactly)
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed2())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Serde adapter that writes money as a two-decimal string (`"1060.00"`).
///
/// API responses use this so clients never see minor units or floats:
/// ```rust,ignore
/// #[serde(with = "storefront_core::money::fixed2")]
/// pub revenue: Money,
/// ```
pub mod fixed2 {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(money: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&money.to_fixed2())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Money::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `i64` minor-unit columns (`price_cents: 50000` is
/// written as `"500.00"`).
pub mod cents_fixed2 {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&Money::from_cents(*cents).to_fixed2())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Money::parse(&raw).map(|m| m.cents()).map_err(serde::de::Error::custom)
    }

    /// Same, for optional amounts (`null` stays `null`).
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::Money;

        pub fn serialize<S: Serializer>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
            match cents {
                Some(c) => serializer.serialize_some(&Money::from_cents(*c).to_fixed2()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|r| Money::parse(&r).map(|m| m.cents()).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A percentage held in basis points (1/100 of a percent).
///
/// `3333` means `33.33%`. Serialises as a two-decimal JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percent from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// `part / whole × 100`, rounded half-up to two decimal places.
    ///
    /// A zero `whole` yields `0%` instead of dividing by zero.
    ///
    /// ```rust
    /// use storefront_core::money::Percent;
    ///
    /// assert_eq!(Percent::from_ratio(1, 3).bps(), 3333);
    /// assert_eq!(Percent::from_ratio(2, 3).bps(), 6667);
    /// assert_eq!(Percent::from_ratio(0, 0).bps(), 0);
    /// ```
    pub fn from_ratio(part: u64, whole: u64) -> Self {
        if whole == 0 {
            return Percent(0);
        }
        let bps = (u128::from(part) * 10_000 + u128::from(whole) / 2) / u128::from(whole);
        Percent(u32::try_from(bps).unwrap_or(u32::MAX))
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage number (for display only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Generates a new opaque entity id (UUID v4).
///
/// Random rather than sequential so one tenant cannot walk another
/// tenant's order numbers.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
