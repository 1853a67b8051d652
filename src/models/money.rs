//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) so that sums and averages are
//! exact and "rounded to 2 decimals" falls out of the representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount accepted anywhere: one trillion units.
    ///
    /// Stays below 2^53 cents so spreadsheet floats still hold every cent.
    pub const MAX: Money = Money(100_000_000_000_000);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use notas_cli::models::Money;
    /// let amount = Money::from_cents(125050); // $1250.50
    /// assert_eq!(amount.to_string(), "$1250.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Convert a floating point amount, rounding half away from zero to cents
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > Self::MAX.0 as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// The amount as a floating point number of units (for spreadsheets)
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a money amount from a string
    ///
    /// Accepts "750.50", "750.5", "750", "$750.50" and "-10". Digits past
    /// the cents are only allowed when they are zeros, and the magnitude is
    /// capped at [`Money::MAX`].
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();
        let invalid = || MoneyParseError::InvalidFormat(trimmed.to_string());

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);

        let (whole, frac) = rest.split_once('.').unwrap_or((rest, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.chars().skip(2).any(|c| c != '0') {
            return Err(MoneyParseError::TooManyDecimals(trimmed.to_string()));
        }

        let whole = whole.trim_start_matches('0');
        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| MoneyParseError::OutOfRange(trimmed.to_string()))?
        };

        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let cents = digits.next().unwrap_or(0) * 10 + digits.next().unwrap_or(0);

        let total = units
            .checked_mul(100)
            .and_then(|u| u.checked_add(cents))
            .filter(|t| *t <= Self::MAX.0)
            .ok_or_else(|| MoneyParseError::OutOfRange(trimmed.to_string()))?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// Sum that fails instead of wrapping
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum of a sequence, `None` if it would leave `-MAX..=MAX`
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
            .filter(|total| total.0.abs() <= Self::MAX.0)
    }

    /// Arithmetic mean of a set of amounts, rounded half-up to the cent.
    ///
    /// Returns `None` for an empty set.
    pub fn mean<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        let (sum, count) = amounts
            .into_iter()
            .fold((0i128, 0i128), |(s, n), m| (s + m.0 as i128, n + 1));
        if count == 0 {
            return None;
        }
        let doubled = 2 * sum;
        let rounded = if doubled >= 0 {
            (doubled + count) / (2 * count)
        } else {
            (doubled - count) / (2 * count)
        };
        Some(Money(rounded as i64))
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.units().abs(), self.cents_part())
        } else {
            format!("{}{}.{:02}", symbol, self.units(), self.cents_part())
        }
    }

    /// Plain decimal form without a symbol ("1250.50")
    pub fn to_decimal_string(&self) -> String {
        self.format_with_symbol("")
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooManyDecimals(String),
    OutOfRange(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: '{}'", s),
            MoneyParseError::TooManyDecimals(s) => {
                write!(f, "Amounts take at most two decimal places: '{}'", s)
            }
            MoneyParseError::OutOfRange(s) => {
                write!(f, "Amount '{}' is larger than {}", s, Money::MAX)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}
