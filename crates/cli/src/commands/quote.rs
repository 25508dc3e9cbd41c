//! Price an ad-hoc cart.

use std::str::FromStr;

use repx_core::{
    CartStore, CatalogError, Color, MemoryStore, PersistenceAdapter, ProductId, Size,
};
use repx_storefront::catalog::{CatalogLoadError, load_catalog};
use repx_storefront::config::StorefrontConfig;
use thiserror::Error;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),

    /// An item does not match the catalog.
    #[error("Item {item}: {source}")]
    Item {
        item: String,
        #[source]
        source: CatalogError,
    },
}

/// One `--item` argument: `<id>[:<size>[:<color>]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub product_id: ProductId,
    pub size: Option<Size>,
    pub color: Option<Color>,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let product_id = parts
            .next()
            .unwrap_or_default()
            .parse::<ProductId>()
            .map_err(|e| format!("invalid product id in {s:?}: {e}"))?;
        let size = parts
            .next()
            .filter(|p| !p.is_empty())
            .map(Size::from_str)
            .transpose()
            .map_err(|e| e.to_string())?;
        let color = parts
            .next()
            .map(Color::parse)
            .transpose()
            .map_err(|e| e.to_string())?;

        Ok(Self {
            product_id,
            size,
            color,
        })
    }
}

/// Build a throwaway cart from `items` and log its breakdown.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or an item does not
/// match the catalog.
pub fn quote(
    config: &StorefrontConfig,
    items: &[ItemSpec],
    coupon: Option<&str>,
) -> Result<(), QuoteError> {
    let catalog = load_catalog(config.catalog_path.as_deref())?;
    let engine = config.pricing_engine();
    let mut cart = CartStore::restore(PersistenceAdapter::new(MemoryStore::new()));

    for item in items {
        let selection = catalog
            .select(item.product_id, item.size, item.color.as_ref())
            .map_err(|source| QuoteError::Item {
                item: item.product_id.to_string(),
                source,
            })?;
        cart.add_item(&selection);
    }
    cart.set_coupon(coupon);

    tracing::info!("Cart ({} items):", cart.item_count());
    super::log_items(cart.items());
    if let Some(code) = cart.coupon() {
        if engine.coupons().validate(code) {
            tracing::info!("  Coupon {} applied", code.trim().to_uppercase());
        } else {
            tracing::warn!("  Coupon {code:?} is not valid");
        }
    }
    super::log_breakdown(&cart.pricing(&engine));
    Ok(())
}
