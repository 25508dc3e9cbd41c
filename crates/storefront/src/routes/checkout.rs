//! Checkout route handlers.
//!
//! `POST /api/checkout` returns the Razorpay options object; the browser opens
//! the widget with it and, on success, posts the payment ID back to the
//! attempt's `success` URL.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use repx_core::{
    AttemptId, CheckoutOutcome, CheckoutStatus, Notice, PaymentResponse, PendingAttempt,
    SkipReason, StartOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentShopper;
use crate::razorpay::CheckoutOptions;
use crate::routes::cart::CartView;
use crate::state::AppState;

/// A notice with its display text.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeView {
    #[serde(flatten)]
    pub notice: Notice,
    pub message: String,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            message: notice.message(),
            notice,
        }
    }
}

fn notice_views(notices: Vec<Notice>) -> Vec<NoticeView> {
    notices.into_iter().map(NoticeView::from).collect()
}

/// Checkout state display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub status: CheckoutStatus,
    pub pending: Option<PendingAttempt>,
    pub last_outcome: Option<CheckoutOutcome>,
}

/// Result of starting checkout.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StartResponse {
    Skipped {
        reason: SkipReason,
    },
    InProgress {
        pending: PendingAttempt,
    },
    #[serde(rename_all = "camelCase")]
    Opened {
        attempt_id: AttemptId,
        success_url: String,
        options: CheckoutOptions,
        notices: Vec<NoticeView>,
    },
    Failed {
        error: String,
        notices: Vec<NoticeView>,
    },
}

impl IntoResponse for StartResponse {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Skipped { .. } | Self::Opened { .. } => StatusCode::OK,
            Self::InProgress { .. } => StatusCode::CONFLICT,
            Self::Failed { .. } => StatusCode::BAD_GATEWAY,
        };
        (status, Json(self)).into_response()
    }
}

/// Provider success callback body, as Razorpay's handler receives it.
#[derive(Debug, Default, Deserialize)]
pub struct SuccessRequest {
    pub razorpay_payment_id: Option<String>,
}

/// Response to a confirmed payment.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub notice: NoticeView,
    pub cart: CartView,
}

/// Response to a cancellation.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: Option<PendingAttempt>,
    pub status: CheckoutStatus,
}

/// Display the shopper's checkout state.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id))]
pub async fn show(shopper: CurrentShopper) -> Json<CheckoutView> {
    let shopper = shopper.lock().await;
    Json(CheckoutView {
        status: shopper.checkout().status(),
        pending: shopper.checkout().pending().cloned(),
        last_outcome: shopper.checkout().last_outcome().cloned(),
    })
}

/// Start checkout for the current cart.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn start(State(state): State<AppState>, shopper: CurrentShopper) -> StartResponse {
    let mut shopper = shopper.lock().await;

    match shopper.start_checkout(state.pricing()) {
        StartOutcome::Skipped(reason) => StartResponse::Skipped { reason },
        StartOutcome::InProgress(pending) => StartResponse::InProgress { pending },
        StartOutcome::Opened {
            request,
            handle,
            notices,
        } => StartResponse::Opened {
            attempt_id: request.attempt_id,
            success_url: format!("/api/checkout/{}/success", request.attempt_id),
            options: handle,
            notices: notice_views(notices),
        },
        StartOutcome::Failed { error, notices } => StartResponse::Failed {
            error: error.to_string(),
            notices: notice_views(notices),
        },
    }
}

/// Provider success continuation.
#[instrument(skip(state, shopper), fields(shopper_id = %shopper.id))]
pub async fn success(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    Path(attempt): Path<String>,
    body: Bytes,
) -> Result<Json<SuccessResponse>> {
    let attempt_id: AttemptId = attempt
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid attempt id {attempt:?}")))?;
    // Demo-mode callbacks may arrive with no body at all.
    let body: SuccessRequest = if body.is_empty() {
        SuccessRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let mut shopper = shopper.lock().await;
    let notice =
        shopper.complete_checkout(attempt_id, PaymentResponse::new(body.razorpay_payment_id))?;

    Ok(Json(SuccessResponse {
        notice: notice.into(),
        cart: CartView::build(shopper.cart(), state.pricing()),
    }))
}

/// Abandon the pending checkout, keeping the cart.
#[instrument(skip(shopper), fields(shopper_id = %shopper.id))]
pub async fn cancel(shopper: CurrentShopper) -> Json<CancelResponse> {
    let mut shopper = shopper.lock().await;
    let cancelled = shopper.cancel_checkout();
    Json(CancelResponse {
        cancelled,
        status: shopper.checkout().status(),
    })
}
