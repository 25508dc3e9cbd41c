//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Nothing is required; every variable has a working default.
//!
//! - `REPX_HOST` - Bind address (default: 127.0.0.1)
//! - `REPX_PORT` - Listen port (default: 3000)
//! - `REPX_BASE_URL` - Public URL; `https://` enables secure cookies
//! - `REPX_DATA_DIR` - Directory for cart snapshots (default: in-memory only)
//! - `REPX_CATALOG_PATH` - JSON catalog file (default: built-in catalog)
//! - `RAZORPAY_KEY_ID` - Payment provider key (default: demo mode)
//! - `REPX_FREE_SHIPPING_THRESHOLD` - Subtotals above this ship free (default: 1499)
//! - `REPX_FLAT_SHIPPING_FEE` - Shipping fee otherwise (default: 49)
//! - `REPX_COUPON_CODES` - Comma-separated coupon codes (default: REPX10)
//! - `REPX_COUPON_RATE` - Coupon discount rate (default: 0.10)
//! - `REPX_CHECKOUT_TIMEOUT_SECS` - Abandon unanswered checkouts after this (default: 900, 0 disables)
//! - `REPX_SHOPPER_IDLE_SECS` - Drop idle shoppers from memory after this (default: 3600)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use repx_core::{CheckoutConfig, CouponConfig, Price, PricingConfig, PricingEngine};
use rust_decimal::Decimal;
use thiserror::Error;

const DEFAULT_CHECKOUT_TIMEOUT_SECS: u64 = 15 * 60;
const DEFAULT_SHOPPER_IDLE_SECS: u64 = 60 * 60;

/// Provider timeout for a number of seconds; `0` disables it.
fn checkout_timeout(secs: u64) -> Result<Option<TimeDelta>, &'static str> {
    if secs == 0 {
        return Ok(None);
    }
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .map(Some)
        .ok_or("out of range")
}

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Snapshot directory; `None` keeps carts in memory
    pub data_dir: Option<PathBuf>,
    /// Catalog file; `None` uses the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// Razorpay key ID; `None` runs checkout in demo mode
    pub razorpay_key_id: Option<String>,
    /// Shipping rules
    pub pricing: PricingConfig,
    /// Coupon codes and rate
    pub coupons: CouponConfig,
    /// How long an opened checkout may go unanswered
    pub checkout_timeout: Option<TimeDelta>,
    /// Idle time after which a shopper is evicted from memory
    pub shopper_idle: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            data_dir: None,
            catalog_path: None,
            razorpay_key_id: None,
            pricing: PricingConfig::default(),
            coupons: CouponConfig::default(),
            checkout_timeout: checkout_timeout(DEFAULT_CHECKOUT_TIMEOUT_SECS).unwrap_or_default(),
            shopper_idle: Duration::from_secs(DEFAULT_SHOPPER_IDLE_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);
        let defaults = Self::default();

        let pricing = PricingConfig {
            free_shipping_threshold: Price::new(env.parse_or(
                "REPX_FREE_SHIPPING_THRESHOLD",
                defaults.pricing.free_shipping_threshold.as_u64(),
            )?),
            flat_shipping_fee: Price::new(
                env.parse_or("REPX_FLAT_SHIPPING_FEE", defaults.pricing.flat_shipping_fee.as_u64())?,
            ),
        };

        let coupons = match (env.optional("REPX_COUPON_CODES"), env.optional("REPX_COUPON_RATE")) {
            (None, None) => defaults.coupons,
            (codes, rate) => {
                let codes = codes.unwrap_or_else(|| "REPX10".to_string());
                let rate = rate.map_or(Ok(defaults.coupons.discount_rate()), |raw| {
                    Decimal::from_str(raw.trim()).map_err(|e| invalid("REPX_COUPON_RATE", e))
                })?;
                CouponConfig::new(codes.split(',').filter(|c| !c.trim().is_empty()), rate)
                    .map_err(|e| invalid("REPX_COUPON_CODES", e))?
            }
        };

        let timeout_secs =
            env.parse_or("REPX_CHECKOUT_TIMEOUT_SECS", DEFAULT_CHECKOUT_TIMEOUT_SECS)?;
        let checkout_timeout = checkout_timeout(timeout_secs)
            .map_err(|e| invalid("REPX_CHECKOUT_TIMEOUT_SECS", e))?;

        Ok(Self {
            host: env.parse_or("REPX_HOST", defaults.host)?,
            port: env.parse_or("REPX_PORT", defaults.port)?,
            base_url: env.optional("REPX_BASE_URL").unwrap_or(defaults.base_url),
            data_dir: env.optional("REPX_DATA_DIR").map(PathBuf::from),
            catalog_path: env.optional("REPX_CATALOG_PATH").map(PathBuf::from),
            razorpay_key_id: env.optional("RAZORPAY_KEY_ID"),
            pricing,
            coupons,
            checkout_timeout,
            shopper_idle: Duration::from_secs(
                env.parse_or("REPX_SHOPPER_IDLE_SECS", DEFAULT_SHOPPER_IDLE_SECS)?,
            ),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", defaults.sentry_sample_rate)?,
            sentry_traces_sample_rate: env
                .parse_or("SENTRY_TRACES_SAMPLE_RATE", defaults.sentry_traces_sample_rate)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Pricing engine built from the shipping and coupon settings.
    #[must_use]
    pub fn pricing_engine(&self) -> PricingEngine {
        PricingEngine::new(self.pricing, self.coupons.clone())
    }

    /// Checkout settings with the repX branding defaults.
    #[must_use]
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            provider_key: self.razorpay_key_id.clone(),
            provider_timeout: self.checkout_timeout,
            ..CheckoutConfig::default()
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key)
            .map_or(Ok(default), |raw| raw.trim().parse().map_err(|e| invalid(key, e)))
    }
}

fn invalid(key: &str, reason: impl Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.data_dir.is_none());
        assert!(config.razorpay_key_id.is_none());
        assert_eq!(config.pricing, PricingConfig::default());
        assert_eq!(config.coupons, CouponConfig::default());
        assert_eq!(config.checkout_timeout, TimeDelta::try_minutes(15));
        assert!(!config.is_secure());
    }

    #[test]
    fn test_default_matches_empty_environment() {
        let loaded = load(&[]).unwrap();
        let default = StorefrontConfig::default();
        assert_eq!(loaded.checkout_timeout, default.checkout_timeout);
        assert_eq!(loaded.shopper_idle, default.shopper_idle);
        assert_eq!(loaded.port, default.port);
    }

    #[test]
    fn test_checkout_timeout_bounds() {
        assert_eq!(checkout_timeout(0), Ok(None));
        assert_eq!(checkout_timeout(60), Ok(TimeDelta::try_minutes(1)));
        assert!(checkout_timeout(u64::MAX).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("REPX_PORT", "8080"),
            ("REPX_BASE_URL", "https://repx.in"),
            ("REPX_DATA_DIR", "/var/lib/repx"),
            ("RAZORPAY_KEY_ID", "rzp_live_abc"),
            ("REPX_FREE_SHIPPING_THRESHOLD", "999"),
            ("REPX_COUPON_CODES", "repx10, gym20"),
            ("REPX_COUPON_RATE", "0.2"),
            ("REPX_CHECKOUT_TIMEOUT_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.is_secure());
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/repx")));
        assert_eq!(config.pricing.free_shipping_threshold, Price::new(999));
        assert_eq!(config.pricing.flat_shipping_fee, Price::new(49));
        assert_eq!(
            config.coupons.codes().collect::<Vec<_>>(),
            vec!["GYM20", "REPX10"]
        );
        assert_eq!(config.coupons.discount_rate(), Decimal::new(2, 1));
        assert!(config.checkout_timeout.is_none());

        let checkout = config.checkout_config();
        assert_eq!(checkout.provider_key.as_deref(), Some("rzp_live_abc"));
        assert_eq!(checkout.display_name, "repX");
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = load(&[("RAZORPAY_KEY_ID", "  "), ("REPX_PORT", "")]).unwrap();
        assert!(config.razorpay_key_id.is_none());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("REPX_PORT", "http")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "REPX_PORT"
        ));
        assert!(matches!(
            load(&[("REPX_COUPON_RATE", "1.5")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "REPX_COUPON_CODES"
        ));
        assert!(matches!(
            load(&[("REPX_COUPON_RATE", "ten")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "REPX_COUPON_RATE"
        ));
    }
}
