//! Core types for the repX storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod price;
pub mod status;
pub mod variant;

pub use contact::{ContactError, Email, Phone, PrefillContact};
pub use id::{AttemptId, ProductId};
pub use price::{CurrencyCode, MINOR_UNITS_PER_RUPEE, Price, format_inr};
pub use status::{CheckoutStatus, Durability};
pub use variant::{Color, Size, VariantError};
