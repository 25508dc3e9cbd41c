//! Coupon code validation.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;

/// Errors raised when building a coupon configuration.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CouponConfigError {
    #[error("coupon code cannot be blank")]
    BlankCode,
    #[error("discount rate must be between 0 and 1, got {0}")]
    RateOutOfRange(Decimal),
}

/// Valid coupon codes and the percentage they take off the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponConfig {
    codes: BTreeSet<String>,
    discount_rate: Decimal,
}

impl CouponConfig {
    /// Build a configuration. Codes are stored normalized.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank code or a rate outside `[0, 1]`.
    pub fn new<I, S>(codes: I, discount_rate: Decimal) -> Result<Self, CouponConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if discount_rate < Decimal::ZERO || discount_rate > Decimal::ONE {
            return Err(CouponConfigError::RateOutOfRange(discount_rate));
        }
        let codes = codes
            .into_iter()
            .map(|code| {
                let normalized = normalize(code.as_ref());
                if normalized.is_empty() {
                    Err(CouponConfigError::BlankCode)
                } else {
                    Ok(normalized)
                }
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            codes,
            discount_rate,
        })
    }

    #[must_use]
    pub const fn discount_rate(&self) -> Decimal {
        self.discount_rate
    }

    /// Normalized codes, sorted.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

impl Default for CouponConfig {
    /// `REPX10` for 10% off.
    fn default() -> Self {
        Self {
            codes: BTreeSet::from(["REPX10".to_string()]),
            discount_rate: Decimal::new(10, 2),
        }
    }
}

/// Trim and upper-case a user-entered code.
#[must_use]
pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Checks entered codes against a [`CouponConfig`].
#[derive(Debug, Clone, Default)]
pub struct CouponValidator {
    config: CouponConfig,
}

impl CouponValidator {
    #[must_use]
    pub const fn new(config: CouponConfig) -> Self {
        Self { config }
    }

    /// Whether the code, once normalized, is an exact match for a valid code.
    #[must_use]
    pub fn validate(&self, code: &str) -> bool {
        self.config.codes.contains(&normalize(code))
    }

    #[must_use]
    pub const fn config(&self) -> &CouponConfig {
        &self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_case_and_whitespace_variants() {
        let validator = CouponValidator::default();
        assert!(validator.validate("REPX10"));
        assert!(validator.validate("repx10"));
        assert!(validator.validate(" REPX10 "));
        assert!(validator.validate("\tRePx10\n"));
    }

    #[test]
    fn test_rejects_partial_and_other_codes() {
        let validator = CouponValidator::default();
        assert!(!validator.validate(""));
        assert!(!validator.validate("REPX"));
        assert!(!validator.validate("REPX100"));
        assert!(!validator.validate("REP X10"));
        assert!(!validator.validate("SAVE20"));
    }

    #[test]
    fn test_config_normalizes_codes() {
        let config = CouponConfig::new([" gym20 ", "REPX10"], Decimal::new(20, 2)).unwrap();
        assert_eq!(config.codes().collect::<Vec<_>>(), vec!["GYM20", "REPX10"]);
        assert!(CouponValidator::new(config).validate("Gym20"));
    }

    #[test]
    fn test_config_rejects_bad_input() {
        assert_eq!(
            CouponConfig::new(["  "], Decimal::new(10, 2)),
            Err(CouponConfigError::BlankCode)
        );
        assert!(matches!(
            CouponConfig::new(["X"], Decimal::new(15, 1)),
            Err(CouponConfigError::RateOutOfRange(_))
        ));
        assert!(matches!(
            CouponConfig::new(["X"], Decimal::new(-1, 2)),
            Err(CouponConfigError::RateOutOfRange(_))
        ));
    }
}
