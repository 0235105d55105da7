//! Money amounts in integer cents
//!
//! Amounts entered on the command line go through [`Money::parse`]; every
//! amount shown to the user goes through [`Money::format_with_currency`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// An amount in cents of the configured currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use fedha::models::Money;
    /// let amount = Money::from_cents(1050);
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Largest amount accepted from input or stored in a running total
    pub const MAX: Money = Money(100_000_000_000_000);

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Share of `whole` as a percentage, 0.0 when `whole` is zero
    pub fn percent_of(&self, whole: Money) -> f64 {
        if whole.is_zero() {
            0.0
        } else {
            self.0 as f64 / whole.0 as f64 * 100.0
        }
    }

    /// Parse a money amount from a string
    ///
    /// Accepts "10.50", "-10.50", "1,250.00", "$10.50", "10"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        Self::parse_with_currency(s, "$")
    }

    /// Parse an amount that may carry the given currency label or "$"
    ///
    /// At most two decimal places are accepted and the magnitude is capped
    /// at [`Money::MAX`].
    pub fn parse_with_currency(s: &str, currency: &str) -> Result<Self, MoneyParseError> {
        let invalid = || MoneyParseError::InvalidFormat(s.to_string());
        let trimmed = s.trim();

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped.trim_start()),
            None => (false, trimmed),
        };
        let rest = strip_label(rest, currency)
            .or_else(|| rest.strip_prefix('$'))
            .unwrap_or(rest);
        let cleaned: String = rest.trim().chars().filter(|c| *c != ',').collect();

        let (units, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (units.is_empty() && fraction.is_empty()) || !all_digits(units) || !all_digits(fraction)
        {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }

        let too_large = || MoneyParseError::TooLarge(s.to_string());
        let units: i64 = if units.is_empty() {
            0
        } else {
            units.parse().map_err(|_| too_large())?
        };
        let fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .filter(|c| *c <= Self::MAX.0)
            .ok_or_else(too_large)?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0
            .checked_add(other.0)
            .filter(|c| c.abs() <= Self::MAX.0)
            .map(Self)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0
            .checked_sub(other.0)
            .filter(|c| c.abs() <= Self::MAX.0)
            .map(Self)
    }

    /// Total of `amounts`, or `None` once it leaves the `-MAX..=MAX` range
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |total, m| total.checked_add(m))
    }

    /// Format with a currency label and thousands separators, e.g. "KES 1,250.00"
    pub fn format_with_currency(&self, currency: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}{} {}.{:02}",
            sign,
            currency,
            group_thousands(self.units().abs()),
            self.cents_part()
        )
    }
}

/// `s` without a leading `currency` label (case-insensitive)
fn strip_label<'s>(s: &'s str, currency: &str) -> Option<&'s str> {
    let label = currency.trim();
    if label.is_empty() {
        return None;
    }
    let head = s.get(..label.len())?;
    head.eq_ignore_ascii_case(label).then(|| &s[label.len()..])
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.is_negative() {
            format!("-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            format!("{}.{:02}", self.units(), self.cents_part())
        };
        f.pad(&text)
    }
}

// Operators saturate so report totals never panic; writes that must stay
// exact go through the checked_* methods.
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
        iter.fold(Self::zero(), |total, m| total + m)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    #[error("Invalid money format: {0}")]
    InvalidFormat(String),

    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(String),

    #[error("Amount is too large: {0}")]
    TooLarge(String),
}
