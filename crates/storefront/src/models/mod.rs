//! Types stored outside the core domain, such as session keys.

pub mod session;

pub use session::keys as session_keys;
