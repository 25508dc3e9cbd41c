//! Price breakdown for a cart: subtotal, coupon discount, shipping, total.
//!
//! Pricing is a pure function of the cart and the entered coupon code. Nothing
//! here is cached; callers recompute after every mutation so derived values
//! can never go stale.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::cart::Cart;
use crate::coupon::{CouponConfig, CouponValidator};
use crate::types::Price;

/// Shipping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingConfig {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Price,
    /// Fee charged on non-empty carts at or below the threshold.
    pub flat_shipping_fee: Price,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Price::new(1499),
            flat_shipping_fee: Price::new(49),
        }
    }
}

/// Derived money values for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping: Price,
    pub total: Price,
}

impl PriceBreakdown {
    /// Whether a non-empty cart qualified for free shipping.
    #[must_use]
    pub const fn ships_free(&self) -> bool {
        !self.subtotal.is_zero() && self.shipping.is_zero()
    }
}

/// Computes [`PriceBreakdown`]s from injected shipping and coupon rules.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
    coupons: CouponValidator,
}

impl PricingEngine {
    #[must_use]
    pub const fn new(config: PricingConfig, coupons: CouponConfig) -> Self {
        Self {
            config,
            coupons: CouponValidator::new(coupons),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PricingConfig {
        &self.config
    }

    #[must_use]
    pub const fn coupons(&self) -> &CouponValidator {
        &self.coupons
    }

    /// Price a cart with an optional coupon code.
    #[must_use]
    pub fn quote(&self, cart: &Cart, coupon: Option<&str>) -> PriceBreakdown {
        let subtotal: Price = cart.items().iter().map(|item| item.line_total()).sum();
        let discount = match coupon {
            Some(code) if self.coupons.validate(code) => {
                Self::discount_for(subtotal, self.coupons.config().discount_rate())
            }
            _ => Price::ZERO,
        };
        let shipping = self.shipping_for(subtotal);
        // discount ≤ subtotal because the rate is capped at 1, so this is
        // max(subtotal − discount + shipping, 0) without signed arithmetic.
        let total = subtotal.saturating_add(shipping).saturating_sub(discount);

        PriceBreakdown {
            subtotal,
            discount,
            shipping,
            total,
        }
    }

    /// `round(subtotal × rate)`, halves rounded away from zero.
    fn discount_for(subtotal: Price, rate: Decimal) -> Price {
        let exact = Decimal::from(subtotal.as_u64()).checked_mul(rate);
        exact
            .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|d| d.to_u64())
            .map_or(subtotal, Price::new)
            .min(subtotal)
    }

    fn shipping_for(&self, subtotal: Price) -> Price {
        if subtotal.is_zero() || subtotal > self.config.free_shipping_threshold {
            Price::ZERO
        } else {
            self.config.flat_shipping_fee
        }
    }
}
