//! Inspect persisted cart snapshots.

use std::path::Path;

use repx_core::{Durability, PersistenceAdapter};
use repx_storefront::config::StorefrontConfig;
use repx_storefront::storage::{FileSnapshotStore, shopper_key};
use uuid::Uuid;

/// Load a shopper's snapshot and log its contents, durability and totals.
///
/// Loading never fails; an unreadable snapshot is reported as degraded.
pub fn show(config: &StorefrontConfig, data_dir: &Path, shopper: Uuid) {
    let key = shopper_key(shopper);
    let adapter = PersistenceAdapter::with_key(FileSnapshotStore::new(data_dir), key);
    let restored = adapter.load();

    tracing::info!("Snapshot {} in {}", adapter.key(), data_dir.display());
    match &restored.durability {
        Durability::Durable => tracing::info!("  Durability: durable"),
        Durability::Degraded(reason) => {
            tracing::warn!("  Durability: degraded ({reason})");
        }
    }

    if restored.cart.is_empty() {
        tracing::info!("  (empty cart)");
        return;
    }
    super::log_items(restored.cart.items());
    super::log_breakdown(&config.pricing_engine().quote(&restored.cart, None));
}
