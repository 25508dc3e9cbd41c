//! Checkout orchestration.
//!
//! ```text
//! Idle ──start──▶ Preparing ──open ok──▶ AwaitingProvider ──complete──▶ Success ──▶ Idle
//!                     │                        │                                  (cart cleared)
//!                     └──open failed──▶ Failed ──▶ Idle                 cancel / expiry ──▶ Idle
//! ```
//!
//! Opening the provider widget is fire-and-forget: [`CheckoutOrchestrator::start`]
//! returns as soon as the provider accepts the request. The provider's success
//! continuation arrives later through [`CheckoutOrchestrator::complete`],
//! carrying the attempt ID that `start` issued.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::SnapshotStore;
use crate::pricing::PricingEngine;
use crate::store::CartStore;
use crate::types::{AttemptId, CheckoutStatus, CurrencyCode, Price, PrefillContact};

/// Provider key used when none is configured. The widget opens in test mode
/// and no real payment can be taken.
pub const DEMO_PROVIDER_KEY: &str = "rzp_test_xxxxxxxx";

/// Payment ID reported when the provider's success callback omits one.
pub const DEMO_PAYMENT_ID: &str = "demo";

/// Branding and provider settings for payment requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Provider key; `None` runs checkout in demo mode.
    pub provider_key: Option<String>,
    pub display_name: String,
    pub description: String,
    pub image: Option<String>,
    pub prefill: PrefillContact,
    pub theme_color: String,
    /// Value of the `brand` note attached to every payment.
    pub brand: String,
    /// How long an opened widget may go unanswered before a new `start`
    /// replaces it. `None` waits forever.
    pub provider_timeout: Option<TimeDelta>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            provider_key: None,
            display_name: "repX".to_string(),
            description: "repX Order".to_string(),
            image: Some("/favicon.ico".to_string()),
            prefill: PrefillContact::placeholder(),
            theme_color: "#111827".to_string(),
            brand: "repX".to_string(),
            provider_timeout: None,
        }
    }
}

/// Widget colour theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub color: String,
}

/// Everything the provider needs to open its widget for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub attempt_id: AttemptId,
    pub provider_key: String,
    /// Total in minor units (paise).
    pub amount: u64,
    pub currency: CurrencyCode,
    pub display_name: String,
    pub description: String,
    pub image: Option<String>,
    pub prefill: PrefillContact,
    pub theme: Theme,
    pub notes: BTreeMap<String, String>,
}

impl PaymentRequest {
    /// Whether the request was built with the demo key.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.provider_key == DEMO_PROVIDER_KEY
    }
}

/// Construction or open failure reported synchronously by a provider.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("payment widget could not be constructed: {0}")]
    Construct(String),
    #[error("payment widget could not be opened: {0}")]
    Open(String),
}

/// An external payment integration.
///
/// `open` must return promptly; the eventual payment result is delivered
/// separately to [`CheckoutOrchestrator::complete`].
pub trait PaymentProvider {
    /// Whatever the caller needs to actually show the widget (e.g. the
    /// options object handed to the browser).
    type Handle;

    /// Construct the widget for `request` and tell it to open.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the widget cannot be built or opened.
    fn open(&self, request: &PaymentRequest) -> Result<Self::Handle, ProviderError>;
}

/// Payload of the provider's success continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResponse {
    pub payment_id: String,
}

impl PaymentResponse {
    /// Build a response, substituting `"demo"` when the provider sent no ID.
    #[must_use]
    pub fn new(payment_id: Option<String>) -> Self {
        let payment_id = payment_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEMO_PAYMENT_ID.to_owned());
        Self { payment_id }
    }
}

/// User-visible notice. All checkout messaging goes through this one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No provider key configured; proceeding with the demo key.
    DemoMode,
    /// The provider confirmed payment.
    PaymentSucceeded { payment_id: String },
    /// The widget could not be opened.
    CheckoutFailed,
}

impl Notice {
    /// Text shown to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::DemoMode => {
                "Add RAZORPAY_KEY_ID to use live checkout. Proceeding with demo order...".to_string()
            }
            Self::PaymentSucceeded { payment_id } => {
                format!("Payment success! Payment ID: {payment_id}")
            }
            Self::CheckoutFailed => "Unable to open checkout. Please try again.".to_string(),
        }
    }
}

/// An attempt whose widget is open and whose result has not arrived.
///
/// Serializable so a host can keep it alongside the cart snapshot and
/// [`resume`](CheckoutOrchestrator::resume) it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttempt {
    pub attempt_id: AttemptId,
    pub amount: Price,
    pub opened_at: DateTime<Utc>,
}

/// How the most recent attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Paid {
        attempt_id: AttemptId,
        payment_id: String,
    },
    Failed {
        reason: String,
    },
    Cancelled {
        attempt_id: AttemptId,
    },
    Expired {
        attempt_id: AttemptId,
    },
}

/// Why `start` did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyCart,
    NothingToPay,
}

/// Result of [`CheckoutOrchestrator::start`].
#[derive(Debug)]
pub enum StartOutcome<H> {
    /// Cart empty or total zero; still `Idle`.
    Skipped(SkipReason),
    /// An earlier attempt is still awaiting the provider.
    InProgress(PendingAttempt),
    /// The widget is open; now `AwaitingProvider`.
    Opened {
        request: PaymentRequest,
        handle: H,
        notices: Vec<Notice>,
    },
    /// The provider refused to open; back to `Idle`, cart untouched.
    Failed {
        error: ProviderError,
        notices: Vec<Notice>,
    },
}

/// Success continuation that does not match the pending attempt.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("no checkout is awaiting the payment provider (attempt {0})")]
    NotAwaiting(AttemptId),
    #[error("payment callback for attempt {got} does not match pending attempt {expected}")]
    AttemptMismatch { expected: AttemptId, got: AttemptId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Preparing,
    AwaitingProvider(PendingAttempt),
    Success,
    Failed,
}

impl Phase {
    const fn status(&self) -> CheckoutStatus {
        match self {
            Self::Idle => CheckoutStatus::Idle,
            Self::Preparing => CheckoutStatus::Preparing,
            Self::AwaitingProvider(_) => CheckoutStatus::AwaitingProvider,
            Self::Success => CheckoutStatus::Success,
            Self::Failed => CheckoutStatus::Failed,
        }
    }
}

/// Drives one shopper's checkout attempts against a [`PaymentProvider`].
#[derive(Debug)]
pub struct CheckoutOrchestrator<P> {
    config: CheckoutConfig,
    provider: P,
    phase: Phase,
    last_outcome: Option<CheckoutOutcome>,
}

impl<P: PaymentProvider> CheckoutOrchestrator<P> {
    pub const fn new(config: CheckoutConfig, provider: P) -> Self {
        Self {
            config,
            provider,
            phase: Phase::Idle,
            last_outcome: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> CheckoutStatus {
        self.phase.status()
    }

    /// The attempt currently awaiting the provider, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingAttempt> {
        match &self.phase {
            Phase::AwaitingProvider(pending) => Some(pending),
            _ => None,
        }
    }

    #[must_use]
    pub const fn last_outcome(&self) -> Option<&CheckoutOutcome> {
        self.last_outcome.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Begin checkout for the store's current cart.
    pub fn start<S: SnapshotStore>(
        &mut self,
        store: &CartStore<S>,
        pricing: &PricingEngine,
    ) -> StartOutcome<P::Handle> {
        self.start_at(store, pricing, Utc::now())
    }

    /// [`start`](Self::start) with an explicit clock reading.
    pub fn start_at<S: SnapshotStore>(
        &mut self,
        store: &CartStore<S>,
        pricing: &PricingEngine,
        now: DateTime<Utc>,
    ) -> StartOutcome<P::Handle> {
        if let Phase::AwaitingProvider(pending) = &self.phase {
            if !self.has_expired(pending, now) {
                return StartOutcome::InProgress(pending.clone());
            }
            let attempt_id = pending.attempt_id;
            tracing::warn!(%attempt_id, "Payment provider never answered; abandoning attempt");
            self.last_outcome = Some(CheckoutOutcome::Expired { attempt_id });
            self.transition(Phase::Idle);
        }

        let quote = store.pricing(pricing);
        if store.is_empty() {
            return StartOutcome::Skipped(SkipReason::EmptyCart);
        }
        if quote.total.is_zero() {
            return StartOutcome::Skipped(SkipReason::NothingToPay);
        }

        self.transition(Phase::Preparing);
        let mut notices = Vec::new();
        let provider_key = match self.config.provider_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_owned(),
            _ => {
                tracing::warn!("No payment provider key configured; using demo key");
                notices.push(Notice::DemoMode);
                DEMO_PROVIDER_KEY.to_owned()
            }
        };

        let request = PaymentRequest {
            attempt_id: AttemptId::generate(),
            provider_key,
            amount: quote.total.minor_units(),
            currency: quote.total.currency(),
            display_name: self.config.display_name.clone(),
            description: self.config.description.clone(),
            image: self.config.image.clone(),
            prefill: self.config.prefill.clone(),
            theme: Theme {
                color: self.config.theme_color.clone(),
            },
            notes: BTreeMap::from([("brand".to_string(), self.config.brand.clone())]),
        };

        match self.provider.open(&request) {
            Ok(handle) => {
                tracing::info!(
                    attempt_id = %request.attempt_id,
                    amount = request.amount,
                    demo = request.is_demo(),
                    "Payment widget opened"
                );
                self.transition(Phase::AwaitingProvider(PendingAttempt {
                    attempt_id: request.attempt_id,
                    amount: quote.total,
                    opened_at: now,
                }));
                StartOutcome::Opened {
                    request,
                    handle,
                    notices,
                }
            }
            Err(error) => {
                tracing::warn!(attempt_id = %request.attempt_id, %error, "Payment widget failed to open");
                self.transition(Phase::Failed);
                self.last_outcome = Some(CheckoutOutcome::Failed {
                    reason: error.to_string(),
                });
                self.transition(Phase::Idle);
                notices.push(Notice::CheckoutFailed);
                StartOutcome::Failed { error, notices }
            }
        }
    }

    /// Provider success continuation: clear the cart and report the payment.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if nothing is pending or the attempt ID does
    /// not match; state and cart are left unchanged.
    pub fn complete<S: SnapshotStore>(
        &mut self,
        store: &mut CartStore<S>,
        attempt_id: AttemptId,
        response: PaymentResponse,
    ) -> Result<Notice, CheckoutError> {
        match &self.phase {
            Phase::AwaitingProvider(pending) if pending.attempt_id == attempt_id => {}
            Phase::AwaitingProvider(pending) => {
                return Err(CheckoutError::AttemptMismatch {
                    expected: pending.attempt_id,
                    got: attempt_id,
                });
            }
            _ => return Err(CheckoutError::NotAwaiting(attempt_id)),
        }

        tracing::info!(%attempt_id, payment_id = %response.payment_id, "Payment succeeded");
        self.transition(Phase::Success);
        store.clear();
        self.last_outcome = Some(CheckoutOutcome::Paid {
            attempt_id,
            payment_id: response.payment_id.clone(),
        });
        self.transition(Phase::Idle);

        Ok(Notice::PaymentSucceeded {
            payment_id: response.payment_id,
        })
    }

    /// Re-enter `AwaitingProvider` for an attempt opened by an earlier
    /// orchestrator for the same cart. Only takes effect when idle; returns
    /// whether the attempt is now pending.
    pub fn resume(&mut self, pending: PendingAttempt) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        tracing::info!(attempt_id = %pending.attempt_id, "Resuming checkout awaiting payment");
        self.transition(Phase::AwaitingProvider(pending));
        true
    }

    /// Abandon the pending attempt, keeping the cart. Returns what was pending.
    pub fn cancel(&mut self) -> Option<PendingAttempt> {
        let Phase::AwaitingProvider(pending) = &self.phase else {
            return None;
        };
        let pending = pending.clone();
        tracing::info!(attempt_id = %pending.attempt_id, "Checkout cancelled");
        self.last_outcome = Some(CheckoutOutcome::Cancelled {
            attempt_id: pending.attempt_id,
        });
        self.transition(Phase::Idle);
        Some(pending)
    }

    fn has_expired(&self, pending: &PendingAttempt, now: DateTime<Utc>) -> bool {
        self.config
            .provider_timeout
            .is_some_and(|timeout| now.signed_duration_since(pending.opened_at) >= timeout)
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!(from = ?self.phase.status(), to = ?next.status(), "Checkout state changed");
        self.phase = next;
    }
}
