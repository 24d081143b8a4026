//! # checkout-core
//!
//! Core types and traits for the checkout gateway.
//!
//! This crate provides:
//! - `Package` and `Catalog` for the static package table
//! - `CheckoutRequest`, `CheckoutSession` and `WebhookEvent` for the checkout flow
//! - `PaymentStrategy` and `WebhookVerifier` traits for payment providers
//! - `CheckoutGateway`, which validates a package id and delegates to a strategy
//! - `GatewayError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{Catalog, CheckoutGateway, CheckoutUrls};
//!
//! let catalog = Arc::new(Catalog::builtin()?);
//! let gateway = CheckoutGateway::new(catalog, strategy, CheckoutUrls::new("https://drivex.se"));
//!
//! // Redirect the customer to session.checkout_url
//! let session = gateway.create_session("daily").await?;
//! ```

pub mod error;
pub mod gateway;
pub mod package;
pub mod session;
pub mod strategy;

// Re-exports for convenience
pub use error::{GatewayError, GatewayResult};
pub use gateway::CheckoutGateway;
pub use package::{Catalog, Currency, Package, MINOR_UNITS_PER_UNIT};
pub use session::{
    CheckoutMode, CheckoutRequest, CheckoutSession, LineItem, WebhookEvent, WebhookEventType,
};
pub use strategy::{
    BoxedPaymentStrategy, BoxedWebhookVerifier, CheckoutUrls, PaymentStrategy, WebhookVerifier,
    SESSION_ID_PLACEHOLDER,
};
