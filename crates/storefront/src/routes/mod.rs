//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Catalog
//! GET  /api/products                    - Product listing
//! GET  /api/products/{id}               - Product detail
//!
//! # Cart (every response is the full cart view)
//! GET  /api/cart                        - Cart, totals and coupon
//! POST /api/cart/add                    - Add one unit {productId, size?, color?}
//! POST /api/cart/update                 - Change quantity {productId, size, color, delta}
//! POST /api/cart/remove                 - Remove line {productId, size, color}
//! POST /api/cart/clear                  - Empty cart
//! POST /api/cart/coupon                 - Enter or clear coupon {code}
//!
//! # Checkout
//! GET  /api/checkout                    - Checkout state
//! POST /api/checkout                    - Start checkout, returns widget options
//! POST /api/checkout/{attempt}/success  - Provider success callback
//! POST /api/checkout/cancel             - Abandon pending checkout
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/coupon", post(cart::coupon))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::start))
        .route("/cancel", post(checkout::cancel))
        .route("/{attempt}/success", post(checkout::success))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
