//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the shopper's UUID, which names their cart snapshot slot.
    pub const SHOPPER_ID: &str = "shopper_id";
}
