//! # checkout-stripe
//!
//! Stripe provider for the checkout gateway.
//!
//! - **StripeCheckoutStrategy** creates hosted Checkout Sessions with one
//!   `price_data` line item per package.
//! - **StripeWebhookVerifier** checks `Stripe-Signature` headers and parses
//!   the event envelope.
//! - **WebhookHandler** / **dispatch_webhook_event** route verified events by type.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_stripe::{StripeCheckoutStrategy, StripeConfig};
//!
//! let config = StripeConfig::from_env()?;
//! let strategy = StripeCheckoutStrategy::new(config.clone())?;
//! let verifier = StripeWebhookVerifier::from_config(&config);
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use checkout_stripe::{dispatch_webhook_event, LoggingWebhookHandler};
//!
//! let event = verifier.verify(&body, signature)?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{
    dispatch_webhook_event, sign_payload, CheckoutCompletedData, LoggingWebhookHandler,
    StripeWebhookVerifier, WebhookHandler, SIGNATURE_HEADER,
};
