//! Razorpay Checkout integration.
//!
//! The widget itself runs in the shopper's browser. Opening a checkout here
//! means validating the request and producing the options object the browser
//! passes to `new Razorpay(options).open()`. The payment result comes back
//! through `POST /api/checkout/{attempt}/success`.

use std::collections::BTreeMap;

use repx_core::checkout::Theme;
use repx_core::{CurrencyCode, PaymentProvider, PaymentRequest, PrefillContact, ProviderError};
use serde::Serialize;

/// Key prefixes Razorpay issues.
const KEY_PREFIXES: [&str; 2] = ["rzp_test_", "rzp_live_"];

/// Options object for the Razorpay Checkout widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    /// Amount in paise.
    pub amount: u64,
    pub currency: &'static str,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub prefill: PrefillContact,
    pub notes: BTreeMap<String, String>,
    pub theme: Theme,
}

/// [`PaymentProvider`] backed by Razorpay's browser widget.
#[derive(Debug, Clone, Copy, Default)]
pub struct RazorpayCheckout;

impl PaymentProvider for RazorpayCheckout {
    type Handle = CheckoutOptions;

    fn open(&self, request: &PaymentRequest) -> Result<CheckoutOptions, ProviderError> {
        if !KEY_PREFIXES
            .iter()
            .any(|prefix| request.provider_key.starts_with(prefix))
        {
            return Err(ProviderError::Construct(
                "Razorpay key ID must start with rzp_test_ or rzp_live_".to_string(),
            ));
        }
        if request.currency != CurrencyCode::INR {
            return Err(ProviderError::Construct(format!(
                "unsupported currency {}",
                request.currency.code()
            )));
        }
        if request.amount == 0 {
            return Err(ProviderError::Open("amount must be positive".to_string()));
        }

        Ok(CheckoutOptions {
            key: request.provider_key.clone(),
            amount: request.amount,
            currency: request.currency.code(),
            name: request.display_name.clone(),
            description: request.description.clone(),
            image: request.image.clone(),
            prefill: request.prefill.clone(),
            notes: request.notes.clone(),
            theme: request.theme.clone(),
        })
    }
}
