//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (one `http_request` span per request)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. Session layer (tower-sessions, in-memory store)
//!
//! [`CurrentShopper`] is an extractor rather than a layer; it runs only for
//! routes that touch a cart.

pub mod request_id;
pub mod session;
pub mod shopper;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use shopper::CurrentShopper;
