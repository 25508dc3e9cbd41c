//! Per-shopper server state.
//!
//! A shopper's cart is snapshotted on every change. The checkout attempt that
//! is awaiting Razorpay is kept in a second slot next to it, so a shopper
//! dropped from memory (idle eviction, restart) can still be paid for.

use std::sync::Arc;

use repx_core::{
    AttemptId, CartStore, CheckoutConfig, CheckoutError, CheckoutOrchestrator, Notice,
    PaymentResponse, PendingAttempt, PersistenceAdapter, PricingEngine, SnapshotStore,
    StartOutcome,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::razorpay::{CheckoutOptions, RazorpayCheckout};
use crate::storage::{SharedStore, checkout_key, shopper_key};

/// Checkout orchestrator used by the storefront.
pub type ShopperCheckout = CheckoutOrchestrator<RazorpayCheckout>;

/// Shared, lockable handle to one shopper.
pub type ShopperHandle = Arc<Mutex<Shopper>>;

/// The cart is frozen while the shopper is paying for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("checkout {0} is awaiting payment; cancel it before changing the cart")]
pub struct CartLocked(pub AttemptId);

/// One browser session's cart and checkout.
///
/// Requests for the same shopper are serialized by the [`ShopperHandle`]
/// mutex, so cart mutations and checkout transitions never interleave.
pub struct Shopper {
    cart: CartStore<SharedStore>,
    checkout: ShopperCheckout,
    store: SharedStore,
    checkout_key: String,
}

impl Shopper {
    /// Restore a shopper's cart and any checkout still awaiting payment.
    #[must_use]
    pub fn restore(id: Uuid, store: SharedStore, config: CheckoutConfig) -> Self {
        let persistence = PersistenceAdapter::with_key(Arc::clone(&store), shopper_key(id));
        let mut shopper = Self {
            cart: CartStore::restore(persistence),
            checkout: CheckoutOrchestrator::new(config, RazorpayCheckout),
            store,
            checkout_key: checkout_key(id),
        };
        if let Some(pending) = shopper.load_pending() {
            shopper.checkout.resume(pending);
        }
        shopper
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<SharedStore> {
        &self.cart
    }

    #[must_use]
    pub const fn checkout(&self) -> &ShopperCheckout {
        &self.checkout
    }

    /// The cart, for changes.
    ///
    /// # Errors
    ///
    /// Returns [`CartLocked`] while an attempt awaits the provider, since the
    /// success callback clears whatever the cart then holds.
    pub fn edit_cart(&mut self) -> Result<&mut CartStore<SharedStore>, CartLocked> {
        match self.checkout.pending() {
            Some(pending) => Err(CartLocked(pending.attempt_id)),
            None => Ok(&mut self.cart),
        }
    }

    /// Start checkout for the current cart.
    pub fn start_checkout(&mut self, pricing: &PricingEngine) -> StartOutcome<CheckoutOptions> {
        let outcome = self.checkout.start(&self.cart, pricing);
        self.save_pending();
        outcome
    }

    /// Apply the provider's success callback.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if the attempt is not the pending one.
    pub fn complete_checkout(
        &mut self,
        attempt_id: AttemptId,
        response: PaymentResponse,
    ) -> Result<Notice, CheckoutError> {
        let notice = self.checkout.complete(&mut self.cart, attempt_id, response)?;
        self.save_pending();
        Ok(notice)
    }

    /// Abandon the pending checkout, keeping the cart.
    pub fn cancel_checkout(&mut self) -> Option<PendingAttempt> {
        let cancelled = self.checkout.cancel();
        if cancelled.is_some() {
            self.save_pending();
        }
        cancelled
    }

    fn load_pending(&self) -> Option<PendingAttempt> {
        let raw = match self.store.read(&self.checkout_key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %self.checkout_key, error = %e, "Pending checkout unreadable");
                return None;
            }
        };
        serde_json::from_str::<Option<PendingAttempt>>(&raw)
            .inspect_err(|e| {
                tracing::warn!(key = %self.checkout_key, error = %e, "Pending checkout malformed");
            })
            .ok()
            .flatten()
    }

    fn save_pending(&self) {
        let result = serde_json::to_string(&self.checkout.pending())
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .write(&self.checkout_key, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            tracing::warn!(key = %self.checkout_key, %error, "Pending checkout not saved");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use repx_core::{CheckoutStatus, MemoryStore, ProductId};

    use super::*;
    use crate::catalog::load_catalog;

    fn shopper_with_item(id: Uuid, store: &SharedStore) -> Shopper {
        let catalog = load_catalog(None).unwrap();
        let mut shopper = Shopper::restore(id, Arc::clone(store), CheckoutConfig::default());
        let selection = catalog.select(ProductId::new(1), None, None).unwrap();
        shopper.edit_cart().unwrap().add_item(&selection);
        shopper
    }

    fn opened_attempt(shopper: &mut Shopper) -> AttemptId {
        match shopper.start_checkout(&PricingEngine::default()) {
            StartOutcome::Opened { request, .. } => request.attempt_id,
            other => panic!("expected widget to open, got {other:?}"),
        }
    }

    #[test]
    fn test_cart_locked_while_awaiting_payment() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut shopper = shopper_with_item(Uuid::new_v4(), &store);
        let attempt = opened_attempt(&mut shopper);

        assert_eq!(shopper.edit_cart().err(), Some(CartLocked(attempt)));

        shopper.cancel_checkout().unwrap();
        assert!(shopper.edit_cart().is_ok());
        assert_eq!(shopper.cart().item_count(), 1);
    }

    #[test]
    fn test_pending_attempt_survives_restore() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let id = Uuid::new_v4();
        let attempt = {
            let mut shopper = shopper_with_item(id, &store);
            opened_attempt(&mut shopper)
        };

        let mut restored = Shopper::restore(id, Arc::clone(&store), CheckoutConfig::default());
        assert_eq!(restored.checkout().status(), CheckoutStatus::AwaitingProvider);
        restored
            .complete_checkout(attempt, PaymentResponse::new(Some("pay_1".into())))
            .unwrap();
        assert!(restored.cart().is_empty());

        let again = Shopper::restore(id, store, CheckoutConfig::default());
        assert_eq!(again.checkout().status(), CheckoutStatus::Idle);
    }

    #[test]
    fn test_malformed_pending_slot_is_ignored() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let id = Uuid::new_v4();
        store.write(&checkout_key(id), "{not json").unwrap();

        let shopper = Shopper::restore(id, store, CheckoutConfig::default());
        assert_eq!(shopper.checkout().status(), CheckoutStatus::Idle);
    }
}
