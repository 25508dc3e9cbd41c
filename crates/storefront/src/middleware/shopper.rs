//! Shopper extractor.
//!
//! Resolves the shopper for the current session, minting a new shopper ID the
//! first time a browser shows up.

use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::session_keys;
use crate::shopper::ShopperHandle;
use crate::state::AppState;

/// Extractor yielding the current shopper.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(shopper: CurrentShopper) -> impl IntoResponse {
///     let shopper = shopper.lock().await;
///     shopper.cart().item_count().to_string()
/// }
/// ```
pub struct CurrentShopper {
    pub id: Uuid,
    handle: ShopperHandle,
}

impl Deref for CurrentShopper {
    type Target = ShopperHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl FromRequestParts<AppState> for CurrentShopper {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let id = match session.get::<Uuid>(session_keys::SHOPPER_ID).await? {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                session.insert(session_keys::SHOPPER_ID, id).await?;
                tracing::debug!(shopper_id = %id, "New shopper");
                id
            }
        };
        tracing::Span::current().record("shopper_id", tracing::field::display(id));

        Ok(Self {
            id,
            handle: state.shopper(id).await,
        })
    }
}
