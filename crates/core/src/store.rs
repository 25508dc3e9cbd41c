//! Mutable cart state with write-through persistence.

use crate::cart::{Cart, IdentityKey, LineItem};
use crate::catalog::Selection;
use crate::persistence::{PersistenceAdapter, SnapshotStore};
use crate::pricing::{PriceBreakdown, PricingEngine};
use crate::types::Durability;

/// Owns a shopper's cart and entered coupon.
///
/// Every mutation that changes the cart writes a snapshot immediately. The
/// coupon is session-only and is not part of the snapshot.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    coupon: Option<String>,
    persistence: PersistenceAdapter<S>,
    durability: Durability,
}

impl<S: SnapshotStore> CartStore<S> {
    /// Start a session, restoring whatever the snapshot holds.
    pub fn restore(persistence: PersistenceAdapter<S>) -> Self {
        let restored = persistence.load();
        tracing::debug!(
            key = persistence.key(),
            lines = restored.cart.len(),
            durable = restored.durability.is_durable(),
            "Cart restored"
        );
        Self {
            cart: restored.cart,
            coupon: None,
            persistence,
            durability: restored.durability,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Total units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// The coupon code as entered, if any.
    #[must_use]
    pub fn coupon(&self) -> Option<&str> {
        self.coupon.as_deref()
    }

    /// Outcome of the most recent snapshot load or save.
    #[must_use]
    pub const fn durability(&self) -> &Durability {
        &self.durability
    }

    /// Current totals. Recomputed on every call.
    #[must_use]
    pub fn pricing(&self, engine: &PricingEngine) -> PriceBreakdown {
        engine.quote(&self.cart, self.coupon())
    }

    /// Add one unit of a catalog selection. Returns the line's new quantity.
    pub fn add_item(&mut self, selection: &Selection<'_>) -> u32 {
        let quantity = self.cart.add(selection);
        tracing::debug!(
            product_id = %selection.product.id(),
            size = %selection.size,
            color = %selection.color,
            quantity,
            "Cart item added"
        );
        self.persist();
        quantity
    }

    /// Change a line's quantity by `delta`, never going below 1.
    ///
    /// Returns `None` (and writes nothing) if no line has this key.
    pub fn update_quantity(&mut self, key: &IdentityKey, delta: i64) -> Option<u32> {
        let quantity = self.cart.update_quantity(key, delta)?;
        tracing::debug!(%key, delta, quantity, "Cart quantity updated");
        self.persist();
        Some(quantity)
    }

    /// Remove the matching line. No-op if absent.
    pub fn remove_item(&mut self, key: &IdentityKey) -> Option<LineItem> {
        let removed = self.cart.remove(key)?;
        tracing::debug!(%key, "Cart item removed");
        self.persist();
        Some(removed)
    }

    /// Empty the cart and forget the coupon.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.coupon = None;
        tracing::debug!("Cart cleared");
        self.persist();
    }

    /// Record the entered coupon. Blank input clears it.
    ///
    /// The code is kept as typed; validation happens at pricing time.
    pub fn set_coupon(&mut self, code: Option<&str>) {
        self.coupon = code
            .filter(|c| !c.trim().is_empty())
            .map(ToOwned::to_owned);
    }

    fn persist(&mut self) {
        self.durability = self.persistence.save(&self.cart);
    }
}
