//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use repx_core::{Catalog, PricingEngine};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::catalog::{CatalogLoadError, load_catalog};
use crate::config::StorefrontConfig;
use crate::shopper::{Shopper, ShopperHandle};
use crate::storage::{SharedStore, shared_store};

/// Most shoppers kept in memory at once.
const MAX_SHOPPERS: u64 = 10_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, pricing rules and live shoppers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    pricing: PricingEngine,
    store: SharedStore,
    shoppers: Cache<Uuid, ShopperHandle>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogLoadError> {
        let catalog = load_catalog(config.catalog_path.as_deref())?;
        let store = shared_store(config.data_dir.as_deref());
        Ok(Self::with_parts(config, catalog, store))
    }

    /// Create application state from already-built parts.
    #[must_use]
    pub fn with_parts(config: StorefrontConfig, catalog: Catalog, store: SharedStore) -> Self {
        let shoppers = Cache::builder()
            .max_capacity(MAX_SHOPPERS)
            .time_to_idle(config.shopper_idle)
            .build();
        let pricing = config.pricing_engine();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                pricing,
                store,
                shoppers,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn pricing(&self) -> &PricingEngine {
        &self.inner.pricing
    }

    /// Get the shopper's handle, restoring the cart snapshot on first use.
    ///
    /// Evicted shoppers are restored the same way, together with any checkout
    /// still awaiting payment.
    pub async fn shopper(&self, id: Uuid) -> ShopperHandle {
        self.inner
            .shoppers
            .get_with(id, async {
                tracing::debug!(shopper_id = %id, "Restoring shopper");
                Arc::new(Mutex::new(Shopper::restore(
                    id,
                    Arc::clone(&self.inner.store),
                    self.inner.config.checkout_config(),
                )))
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use repx_core::{CheckoutStatus, MemoryStore, PaymentResponse, ProductId, StartOutcome};

    use super::*;

    fn state() -> AppState {
        let catalog = load_catalog(None).unwrap();
        AppState::with_parts(
            StorefrontConfig::default(),
            catalog,
            Arc::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn test_same_shopper_shares_state() {
        let state = state();
        let id = Uuid::new_v4();

        {
            let handle = state.shopper(id).await;
            let mut shopper = handle.lock().await;
            let selection = state.catalog().select(ProductId::new(1), None, None).unwrap();
            shopper.edit_cart().unwrap().add_item(&selection);
        }

        let handle = state.shopper(id).await;
        assert_eq!(handle.lock().await.cart().item_count(), 1);

        let other = state.shopper(Uuid::new_v4()).await;
        assert!(other.lock().await.cart().is_empty());
    }

    #[tokio::test]
    async fn test_evicted_shopper_restores_from_snapshot() {
        let state = state();
        let id = Uuid::new_v4();
        {
            let handle = state.shopper(id).await;
            let selection = state.catalog().select(ProductId::new(2), None, None).unwrap();
            handle.lock().await.edit_cart().unwrap().add_item(&selection);
        }

        state.inner.shoppers.invalidate(&id).await;

        let handle = state.shopper(id).await;
        assert_eq!(handle.lock().await.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_evicted_shopper_keeps_checkout_awaiting_payment() {
        let config = StorefrontConfig {
            checkout_timeout: None,
            ..StorefrontConfig::default()
        };
        let state = AppState::with_parts(
            config,
            load_catalog(None).unwrap(),
            Arc::new(MemoryStore::new()),
        );
        let id = Uuid::new_v4();

        let attempt = {
            let handle = state.shopper(id).await;
            let mut shopper = handle.lock().await;
            let selection = state.catalog().select(ProductId::new(3), None, None).unwrap();
            shopper.edit_cart().unwrap().add_item(&selection);
            match shopper.start_checkout(state.pricing()) {
                StartOutcome::Opened { request, .. } => request.attempt_id,
                other => panic!("expected widget to open, got {other:?}"),
            }
        };

        state.inner.shoppers.invalidate(&id).await;

        let handle = state.shopper(id).await;
        let mut shopper = handle.lock().await;
        assert_eq!(shopper.checkout().status(), CheckoutStatus::AwaitingProvider);
        shopper
            .complete_checkout(attempt, PaymentResponse::new(Some("pay_1".into())))
            .unwrap();
        assert!(shopper.cart().is_empty());
    }
}
