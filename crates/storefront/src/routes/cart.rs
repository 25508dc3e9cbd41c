//! Cart route handlers.
//!
//! Every handler answers with the full [`CartView`] so the client can redraw
//! the drawer, badge and totals from one response. Pricing is recomputed on
//! each request.
//!
//! While a checkout awaits payment the cart is frozen: mutations answer
//! `409 Conflict` until the attempt completes or is cancelled.

use axum::{Json, extract::State};
use repx_core::{
    CartStore, Color, Durability, IdentityKey, LineItem, Price, PriceBreakdown, PricingEngine,
    ProductId, SnapshotStore, Size,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentShopper;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemView {
    #[serde(flatten)]
    pub item: LineItem,
    pub line_total: Price,
    pub line_total_display: String,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        let line_total = item.line_total();
        Self {
            item: item.clone(),
            line_total,
            line_total_display: line_total.to_string(),
        }
    }
}

/// Totals display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingView {
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    pub ships_free: bool,
    pub total_display: String,
}

impl From<PriceBreakdown> for PricingView {
    fn from(breakdown: PriceBreakdown) -> Self {
        Self {
            ships_free: breakdown.ships_free(),
            total_display: breakdown.total.to_string(),
            breakdown,
        }
    }
}

/// The entered coupon and whether it currently applies.
#[derive(Debug, Clone, Serialize)]
pub struct CouponView {
    pub code: String,
    pub applied: bool,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<LineItemView>,
    pub item_count: u64,
    pub coupon: Option<CouponView>,
    pub pricing: PricingView,
    pub durability: Durability,
}

impl CartView {
    /// Snapshot a cart store for display.
    #[must_use]
    pub fn build<S: SnapshotStore>(cart: &CartStore<S>, engine: &PricingEngine) -> Self {
        Self {
            items: cart.items().iter().map(LineItemView::from).collect(),
            item_count: cart.item_count(),
            coupon: cart.coupon().map(|code| CouponView {
                code: code.to_string(),
                applied: engine.coupons().validate(code),
            }),
            pricing: cart.pricing(engine).into(),
            durability: cart.durability().clone(),
        }
    }
}

/// Add to cart request. Size and colour default to the product card's preselection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub size: Option<Size>,
    pub color: Option<Color>,
}

/// Identifies one cart line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: ProductId,
    pub size: Size,
    pub color: Color,
}

impl LineRequest {
    fn key(self) -> IdentityKey {
        IdentityKey::new(self.product_id, self.size, self.color)
    }
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(flatten)]
    pub line: LineRequest,
    pub delta: i64,
}

/// Coupon entry request. A missing or blank code clears the coupon.
#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: Option<String>,
}

/// Display the cart.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn show(State(state): State<AppState>, shopper: CurrentShopper) -> Json<CartView> {
    let shopper = shopper.lock().await;
    Json(CartView::build(shopper.cart(), state.pricing()))
}

/// Add one unit of a product variant.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn add(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let selection =
        state
            .catalog()
            .select(request.product_id, request.size, request.color.as_ref())?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", selection.product.id().to_string()),
            ("size", selection.size.to_string()),
            ("color", selection.color.to_string()),
        ],
    );

    let mut shopper = shopper.lock().await;
    shopper.edit_cart()?.add_item(&selection);
    Ok(Json(CartView::build(shopper.cart(), state.pricing())))
}

/// Change a line's quantity. Quantities never drop below 1.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn update(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut shopper = shopper.lock().await;
    shopper
        .edit_cart()?
        .update_quantity(&request.line.key(), request.delta);
    Ok(Json(CartView::build(shopper.cart(), state.pricing())))
}

/// Remove a line. Unknown lines are ignored.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn remove(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Json(request): Json<LineRequest>,
) -> Result<Json<CartView>> {
    let mut shopper = shopper.lock().await;
    shopper.edit_cart()?.remove_item(&request.key());
    Ok(Json(CartView::build(shopper.cart(), state.pricing())))
}

/// Empty the cart.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn clear(
    State(state): State<AppState>,
    shopper: CurrentShopper,
) -> Result<Json<CartView>> {
    let mut shopper = shopper.lock().await;
    shopper.edit_cart()?.clear();
    Ok(Json(CartView::build(shopper.cart(), state.pricing())))
}

/// Enter or clear the coupon code.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn coupon(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Json(request): Json<CouponRequest>,
) -> Result<Json<CartView>> {
    let mut shopper = shopper.lock().await;
    shopper.edit_cart()?.set_coupon(request.code.as_deref());
    Ok(Json(CartView::build(shopper.cart(), state.pricing())))
}
