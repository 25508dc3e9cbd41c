//! repX Core - cart, pricing and checkout engine.
//!
//! This crate holds the storefront's business rules and is shared by:
//! - `storefront` - JSON API serving the catalog, carts and checkout
//! - `cli` - Command-line tools for inspecting the catalog, quotes and snapshots
//!
//! # Architecture
//!
//! The core crate does no network or file I/O of its own. Durable storage
//! comes in through [`persistence::SnapshotStore`] and the payment widget
//! through [`checkout::PaymentProvider`], so every rule here can be exercised
//! in plain unit tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, variants, contacts and statuses
//! - [`catalog`] - Read-only product catalog and variant selection
//! - [`cart`] - Line items and merge-by-identity cart semantics
//! - [`coupon`] - Coupon code normalization and validation
//! - [`pricing`] - Subtotal, discount, shipping and total
//! - [`persistence`] - Best-effort JSON snapshots of the cart
//! - [`store`] - Cart state with write-through persistence
//! - [`checkout`] - Checkout state machine around an external payment provider

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod persistence;
pub mod pricing;
pub mod store;
pub mod types;

pub use cart::{Cart, CartError, IdentityKey, LineItem};
pub use catalog::{Catalog, CatalogError, Product, Selection};
pub use checkout::{
    CheckoutConfig, CheckoutError, CheckoutOrchestrator, CheckoutOutcome, Notice, PaymentProvider,
    PaymentRequest, PaymentResponse, PendingAttempt, ProviderError, SkipReason, StartOutcome,
};
pub use coupon::{CouponConfig, CouponConfigError, CouponValidator};
pub use persistence::{MemoryStore, PersistenceAdapter, SnapshotStore, StoreError};
pub use pricing::{PriceBreakdown, PricingConfig, PricingEngine};
pub use store::CartStore;
pub use types::*;
