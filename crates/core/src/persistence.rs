//! Best-effort cart snapshots.
//!
//! A [`SnapshotStore`] is a minimal string key-value slot. The
//! [`PersistenceAdapter`] encodes the cart as a JSON array of line items and
//! never lets a storage failure escape: loads fall back to an empty cart and
//! saves are dropped, with the outcome reported as a [`Durability`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::cart::{Cart, CartError, LineItem};
use crate::types::Durability;

/// Default name of the snapshot slot.
pub const SNAPSHOT_KEY: &str = "repx_cart";

/// Failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a snapshot could not be used.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot violates cart invariants: {0}")]
    Invalid(#[from] CartError),
}

/// A durable string key-value slot.
pub trait SnapshotStore {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }
}

/// Process-local store. Survives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Result of [`PersistenceAdapter::load`].
#[derive(Debug)]
pub struct Restored {
    pub cart: Cart,
    pub durability: Durability,
}

/// Loads and saves a cart under one named slot of a [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct PersistenceAdapter<S> {
    store: S,
    key: String,
}

impl<S: SnapshotStore> PersistenceAdapter<S> {
    /// Adapter over the default `repx_cart` slot.
    pub fn new(store: S) -> Self {
        Self::with_key(store, SNAPSHOT_KEY)
    }

    /// Adapter over a custom slot, e.g. one per shopper.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the snapshot. Never fails: anything unusable yields an empty cart.
    ///
    /// A missing slot is a normal first visit and counts as durable.
    pub fn load(&self) -> Restored {
        match self.try_load() {
            Ok(cart) => Restored {
                cart: cart.unwrap_or_default(),
                durability: Durability::Durable,
            },
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding unusable cart snapshot");
                Restored {
                    cart: Cart::new(),
                    durability: Durability::Degraded(e.to_string()),
                }
            }
        }
    }

    fn try_load(&self) -> Result<Option<Cart>, PersistenceError> {
        let Some(raw) = self.store.read(&self.key)? else {
            return Ok(None);
        };
        let items: Vec<LineItem> = serde_json::from_str(&raw)?;
        Ok(Some(Cart::from_items(items)?))
    }

    /// Write the snapshot. A failed write is dropped and reported.
    pub fn save(&self, cart: &Cart) -> Durability {
        let result = serde_json::to_string(cart)
            .map_err(PersistenceError::from)
            .and_then(|json| {
                self.store
                    .write(&self.key, &json)
                    .map_err(PersistenceError::from)
            });

        match result {
            Ok(()) => Durability::Durable,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Cart snapshot not saved");
                Durability::Degraded(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Color, Price, ProductId, Size};

    /// Store whose backend is always down.
    struct Offline;

    impl SnapshotStore for Offline {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    fn sample_cart() -> Cart {
        let black = Color::parse("Black").unwrap();
        Cart::from_items(vec![
            LineItem {
                product_id: ProductId::new(1),
                name: "Beast Mode Tee".into(),
                unit_price: Price::new(899),
                image_ref: "/images/beastmode.jpg".into(),
                size: Size::Large,
                color: black.clone(),
                quantity: 2,
            },
            LineItem {
                product_id: ProductId::new(3),
                name: "One More Rep Tee".into(),
                unit_price: Price::new(849),
                image_ref: "/images/onemore.jpg".into(),
                size: Size::Small,
                color: black,
                quantity: 1,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_slot_is_empty_and_durable() {
        let adapter = PersistenceAdapter::new(MemoryStore::new());
        let restored = adapter.load();
        assert!(restored.cart.is_empty());
        assert!(restored.durability.is_durable());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let store = MemoryStore::new();
        let adapter = PersistenceAdapter::new(&store);
        assert!(adapter.save(&sample_cart()).is_durable());

        let restored = adapter.load();
        assert_eq!(restored.cart, sample_cart());
        assert!(store.read(SNAPSHOT_KEY).unwrap().unwrap().starts_with('['));
    }

    #[test]
    fn test_malformed_snapshot_degrades_to_empty() {
        let store = MemoryStore::new();
        store.write(SNAPSHOT_KEY, "{not json").unwrap();
        let restored = PersistenceAdapter::new(&store).load();
        assert!(restored.cart.is_empty());
        assert!(!restored.durability.is_durable());
    }

    #[test]
    fn test_invariant_violating_snapshot_degrades_to_empty() {
        let store = MemoryStore::new();
        let line = r#"{"productId":1,"name":"Tee","unitPrice":899,"imageRef":"","size":"L","color":"Black","quantity":1}"#;
        store.write(SNAPSHOT_KEY, &format!("[{line},{line}]")).unwrap();
        let restored = PersistenceAdapter::new(&store).load();
        assert!(restored.cart.is_empty());
        assert!(matches!(
            restored.durability,
            Durability::Degraded(reason) if reason.contains("invariants")
        ));
    }

    #[test]
    fn test_offline_store_never_errors() {
        let adapter = PersistenceAdapter::new(Offline);
        let restored = adapter.load();
        assert!(restored.cart.is_empty());
        assert!(!restored.durability.is_durable());
        assert!(!adapter.save(&sample_cart()).is_durable());
    }

    #[test]
    fn test_custom_key() {
        let store = MemoryStore::new();
        let adapter = PersistenceAdapter::with_key(&store, "repx_cart:abc");
        adapter.save(&sample_cart());
        assert!(store.read("repx_cart:abc").unwrap().is_some());
        assert!(store.read(SNAPSHOT_KEY).unwrap().is_none());
    }
}
