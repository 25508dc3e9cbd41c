//! End-to-end cart, pricing and checkout through `repx-core`.
//!
//! Uses the built-in catalog and the storefront's Razorpay provider, with an
//! in-memory snapshot store standing in for durable storage.

#![allow(clippy::unwrap_used)]

use chrono::{TimeDelta, Utc};
use repx_core::{
    CartStore, Catalog, CheckoutConfig, CheckoutOrchestrator, CheckoutStatus, Color, MemoryStore,
    Notice, PaymentProvider, PaymentRequest, PaymentResponse, PersistenceAdapter, Price,
    PricingEngine, ProductId, ProviderError, SkipReason, SnapshotStore, StartOutcome,
};
use repx_core::persistence::SNAPSHOT_KEY;
use repx_storefront::catalog::load_catalog;
use repx_storefront::razorpay::RazorpayCheckout;

fn catalog() -> Catalog {
    load_catalog(None).unwrap()
}

fn add(store: &mut CartStore<&MemoryStore>, catalog: &Catalog, id: u32) {
    let selection = catalog.select(ProductId::new(id), None, None).unwrap();
    store.add_item(&selection);
}

fn live_config() -> CheckoutConfig {
    CheckoutConfig {
        provider_key: Some("rzp_test_1DP5mmOlF5G5ag".to_string()),
        ..CheckoutConfig::default()
    }
}

#[test]
fn test_coupon_and_free_shipping_scenario() {
    let backing = MemoryStore::new();
    let catalog = catalog();
    let engine = PricingEngine::default();
    let mut store = CartStore::restore(PersistenceAdapter::new(&backing));

    add(&mut store, &catalog, 1);
    add(&mut store, &catalog, 2);
    store.set_coupon(Some("repx10"));

    let quote = store.pricing(&engine);
    assert_eq!(quote.subtotal, Price::new(1698));
    assert_eq!(quote.discount, Price::new(170));
    assert_eq!(quote.shipping, Price::ZERO);
    assert_eq!(quote.total, Price::new(1528));
    assert_eq!(quote.total.to_string(), "₹1,528");
}

#[test]
fn test_flat_shipping_scenario() {
    let backing = MemoryStore::new();
    let catalog = catalog();
    let mut store = CartStore::restore(PersistenceAdapter::new(&backing));
    add(&mut store, &catalog, 3);

    let quote = store.pricing(&PricingEngine::default());
    assert_eq!(quote.subtotal, Price::new(849));
    assert_eq!(quote.discount, Price::ZERO);
    assert_eq!(quote.shipping, Price::new(49));
    assert_eq!(quote.total, Price::new(898));
}

#[test]
fn test_successful_payment_clears_cart_and_snapshot() {
    let backing = MemoryStore::new();
    let catalog = catalog();
    let engine = PricingEngine::default();
    let mut store = CartStore::restore(PersistenceAdapter::new(&backing));
    add(&mut store, &catalog, 1);
    add(&mut store, &catalog, 2);
    store.set_coupon(Some("REPX10"));

    let mut checkout = CheckoutOrchestrator::new(live_config(), RazorpayCheckout);
    let StartOutcome::Opened {
        request,
        handle,
        notices,
    } = checkout.start(&store, &engine)
    else {
        panic!("checkout should open");
    };
    assert!(notices.is_empty());
    assert_eq!(request.amount, 152_800);
    assert_eq!(handle.amount, 152_800);
    assert_eq!(handle.currency, "INR");
    assert_eq!(checkout.status(), CheckoutStatus::AwaitingProvider);

    // Cart is untouched until the provider reports success.
    assert_eq!(store.item_count(), 2);

    let notice = checkout
        .complete(
            &mut store,
            request.attempt_id,
            PaymentResponse::new(Some("pay_29QQoUBi66xm2f".to_string())),
        )
        .unwrap();
    assert_eq!(
        notice.message(),
        "Payment success! Payment ID: pay_29QQoUBi66xm2f"
    );
    assert!(store.is_empty());
    assert_eq!(store.pricing(&engine).total, Price::ZERO);
    assert_eq!(backing.read(SNAPSHOT_KEY).unwrap().as_deref(), Some("[]"));
    assert_eq!(checkout.status(), CheckoutStatus::Idle);
}

#[test]
fn test_empty_cart_checkout_is_noop() {
    let backing = MemoryStore::new();
    let store = CartStore::restore(PersistenceAdapter::new(&backing));
    let mut checkout = CheckoutOrchestrator::new(live_config(), RazorpayCheckout);

    let outcome = checkout.start(&store, &PricingEngine::default());
    assert!(matches!(outcome, StartOutcome::Skipped(SkipReason::EmptyCart)));
    assert_eq!(checkout.status(), CheckoutStatus::Idle);
    assert!(checkout.last_outcome().is_none());
}

#[test]
fn test_demo_mode_without_key() {
    let backing = MemoryStore::new();
    let catalog = catalog();
    let mut store = CartStore::restore(PersistenceAdapter::new(&backing));
    add(&mut store, &catalog, 4);

    let mut checkout = CheckoutOrchestrator::new(CheckoutConfig::default(), RazorpayCheckout);
    let StartOutcome::Opened {
        handle, notices, ..
    } = checkout.start(&store, &PricingEngine::default())
    else {
        panic!("demo checkout should open");
    };
    assert_eq!(handle.key, "rzp_test_xxxxxxxx");
    assert_eq!(notices, vec![Notice::DemoMode]);
}

#[test]
fn test_provider_failure_keeps_cart() {
    struct ScriptNotLoaded;

    impl PaymentProvider for ScriptNotLoaded {
        type Handle = ();

        fn open(&self, _request: &PaymentRequest) -> Result<(), ProviderError> {
            Err(ProviderError::Open("Razorpay is not defined".to_string()))
        }
    }

    let backing = MemoryStore::new();
    let catalog = catalog();
    let mut store = CartStore::restore(PersistenceAdapter::new(&backing));
    add(&mut store, &catalog, 5);
    let before = backing.read(SNAPSHOT_KEY).unwrap();

    let mut checkout = CheckoutOrchestrator::new(live_config(), ScriptNotLoaded);
    let StartOutcome::Failed { notices, .. } = checkout.start(&store, &PricingEngine::default())
    else {
        panic!("checkout should fail to open");
    };
    assert_eq!(notices, vec![Notice::CheckoutFailed]);
    assert_eq!(
        Notice::CheckoutFailed.message(),
        "Unable to open checkout. Please try again."
    );
    assert_eq!(checkout.status(), CheckoutStatus::Idle);
    assert_eq!(store.item_count(), 1);
    assert_eq!(backing.read(SNAPSHOT_KEY).unwrap(), before);
}

#[test]
fn test_cart_survives_restart() {
    let backing = MemoryStore::new();
    let catalog = catalog();
    {
        let mut store = CartStore::restore(PersistenceAdapter::new(&backing));
        add(&mut store, &catalog, 1);
        add(&mut store, &catalog, 1);
        let navy = Color::parse("Navy").unwrap();
        let selection = catalog
            .select(ProductId::new(2), None, Some(&navy))
            .unwrap();
        store.add_item(&selection);
    }

    let store = CartStore::restore(PersistenceAdapter::new(&backing));
    assert!(store.durability().is_durable());
    assert_eq!(store.items().len(), 2);
    assert_eq!(store.item_count(), 3);
    let second = store.items().get(1).unwrap();
    assert_eq!(second.color.as_str(), "Navy");
    // Coupons are session-only.
    assert_eq!(store.coupon(), None);
}

#[test]
fn test_abandoned_checkout_expires() {
    let backing = MemoryStore::new();
    let catalog = catalog();
    let engine = PricingEngine::default();
    let mut store = CartStore::restore(PersistenceAdapter::new(&backing));
    add(&mut store, &catalog, 1);

    let config = CheckoutConfig {
        provider_timeout: TimeDelta::try_minutes(15),
        ..live_config()
    };
    let mut checkout = CheckoutOrchestrator::new(config, RazorpayCheckout);
    let opened_at = Utc::now();
    let StartOutcome::Opened { request: first, .. } = checkout.start_at(&store, &engine, opened_at)
    else {
        panic!("checkout should open");
    };

    let later = opened_at + TimeDelta::try_minutes(20).unwrap();
    let StartOutcome::Opened { request: second, .. } = checkout.start_at(&store, &engine, later)
    else {
        panic!("expired attempt should be replaced");
    };
    assert_ne!(first.attempt_id, second.attempt_id);

    // The stale attempt's callback no longer matches.
    assert!(
        checkout
            .complete(&mut store, first.attempt_id, PaymentResponse::new(None))
            .is_err()
    );
    assert_eq!(store.item_count(), 1);
}
