//! # Payment Provider Seams
//!
//! Traits the gateway uses to talk to a payment provider.
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │   PaymentStrategy (trait)    │   │   WebhookVerifier (trait)    │
//! │  ├── create_checkout()       │   │  └── verify()                │
//! │  └── provider_name()         │   │                              │
//! └──────────────────────────────┘   └──────────────────────────────┘
//!                ▲                                  ▲
//!  ┌─────────────┴─────────────┐    ┌───────────────┴──────────────┐
//!  │  StripeCheckoutStrategy   │    │    StripeWebhookVerifier     │
//!  └───────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Webhook verification is a separate capability so a gateway can run
//! without a webhook endpoint at all.

use crate::error::GatewayResult;
use crate::session::{CheckoutRequest, CheckoutSession, WebhookEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// Placeholder the provider substitutes with the real session id on redirect
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Creates hosted checkout sessions with a payment provider.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a checkout session and return the redirect URL.
    ///
    /// Exactly one provider call is made; failures are returned as-is and
    /// never retried here.
    async fn create_checkout(&self, request: &CheckoutRequest) -> GatewayResult<CheckoutSession>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Authenticates inbound webhook deliveries.
pub trait WebhookVerifier: Send + Sync {
    /// Verify a signature over the exact raw body and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, unmodified
    /// * `signature` - Signature header from the request
    fn verify(&self, payload: &[u8], signature: &str) -> GatewayResult<WebhookEvent>;

    /// Header carrying the signature
    fn signature_header(&self) -> &'static str;
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Type alias for a shared webhook verifier
pub type BoxedWebhookVerifier = Arc<dyn WebhookVerifier>;

/// Redirect URLs used in checkout
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Public base URL of the gateway (e.g., "https://drivex.se")
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            success_path: "/success".to_string(),
            cancel_path: "/cancel".to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}{}", self.base_url, self.success_path)
    }

    /// Success URL with the provider's session id placeholder appended
    pub fn success_url_with_session(&self) -> String {
        format!("{}?session_id={}", self.success_url(), SESSION_ID_PLACEHOLDER)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
