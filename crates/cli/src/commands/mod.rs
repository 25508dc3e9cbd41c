//! CLI command implementations.

pub mod catalog;
pub mod quote;
pub mod snapshot;

use repx_core::{LineItem, PriceBreakdown};

/// Log a cart's lines.
fn log_items(items: &[LineItem]) {
    for item in items {
        tracing::info!(
            "  {} x {} ({}, {}) @ {} = {}",
            item.quantity,
            item.name,
            item.size,
            item.color,
            item.unit_price,
            item.line_total()
        );
    }
}

/// Log a price breakdown.
fn log_breakdown(quote: &PriceBreakdown) {
    tracing::info!("  Subtotal: {}", quote.subtotal);
    if !quote.discount.is_zero() {
        tracing::info!("  Discount: -{}", quote.discount);
    }
    if quote.ships_free() {
        tracing::info!("  Shipping: FREE");
    } else {
        tracing::info!("  Shipping: {}", quote.shipping);
    }
    tracing::info!("  Total:    {}", quote.total);
}
