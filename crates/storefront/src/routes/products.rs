//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use repx_core::{Product, ProductId, Size};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    /// Price formatted for display, e.g. `₹899`.
    pub price_display: String,
    pub sizes: [Size; 5],
    pub default_size: Size,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            price_display: product.price().to_string(),
            product: product.clone(),
            sizes: Size::ALL,
            default_size: Size::default(),
        }
    }
}

/// Catalog listing response.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductView>,
}

/// List the catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<ProductsResponse> {
    Json(ProductsResponse {
        products: state.catalog().products().iter().map(ProductView::from).collect(),
    })
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<u32>) -> Result<Json<ProductView>> {
    let id = ProductId::new(id);
    state
        .catalog()
        .get(id)
        .map(|product| Json(ProductView::from(product)))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
