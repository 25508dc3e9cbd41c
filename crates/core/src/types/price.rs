//! Whole-rupee price representation.
//!
//! The store sells in a single currency and every catalog price is a whole
//! number of rupees, so amounts are plain `u64` values. Conversion to the
//! provider's minor unit (paise) happens only at the payment boundary.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// Number of minor units (paise) in one rupee.
pub const MINOR_UNITS_PER_RUPEE: u64 = 100;

/// An amount of money in whole rupees.
///
/// Arithmetic saturates rather than wrapping, so pricing stays total even for
/// absurd carts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(0);

    /// Create a price from a whole-rupee amount.
    #[must_use]
    pub const fn new(rupees: u64) -> Self {
        Self(rupees)
    }

    /// Whole-rupee amount.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Amount in minor units (paise), as expected by the payment provider.
    #[must_use]
    pub const fn minor_units(&self) -> u64 {
        self.0.saturating_mul(MINOR_UNITS_PER_RUPEE)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction (floors at zero).
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Currency this amount is denominated in.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        CurrencyCode::INR
    }
}

impl From<u64> for Price {
    fn from(rupees: u64) -> Self {
        Self(rupees)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Price {
    /// Formats as `₹1,528` using Indian digit grouping.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.currency().symbol(), format_inr(self.0))
    }
}

/// ISO 4217 currency codes accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
}

impl CurrencyCode {
    /// ISO code as sent to the payment provider.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
        }
    }
}

/// Group digits the Indian way: the last three digits, then pairs.
///
/// `1528` → `1,528`, `100000` → `1,00,000`, `12345678` → `1,23,45,678`.
#[must_use]
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}
