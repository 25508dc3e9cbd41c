//! List the catalog.

use repx_core::Color;
use repx_storefront::catalog::{CatalogLoadError, load_catalog};
use repx_storefront::config::StorefrontConfig;

/// Log every product with its price, colours and tags.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub fn list(config: &StorefrontConfig) -> Result<(), CatalogLoadError> {
    let catalog = load_catalog(config.catalog_path.as_deref())?;

    for product in catalog.products() {
        let colors: Vec<&str> = product.colors().iter().map(Color::as_str).collect();
        let tags = if product.tags().is_empty() {
            String::new()
        } else {
            format!(" [{}]", product.tags().join(", "))
        };
        tracing::info!(
            "{:>3}  {:<24} {:>8}  {}{}",
            product.id(),
            product.name(),
            product.price().to_string(),
            colors.join("/"),
            tags
        );
    }
    Ok(())
}
