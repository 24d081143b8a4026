//! # Checkout Types
//!
//! Checkout request, session and webhook event types.
//! None of these are persisted; they live for one request.

use crate::package::{Catalog, Currency, Package};
use crate::strategy::CheckoutUrls;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The single line item sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Package the item was built from
    pub package_id: String,

    /// Name shown on the hosted checkout page
    pub name: String,

    /// Description shown under the name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Price per unit, in the smallest currency unit
    pub unit_amount: i64,

    pub quantity: u32,
}

impl LineItem {
    /// Create a line item for one unit of a package
    pub fn from_package(catalog: &Catalog, package: &Package) -> Self {
        Self {
            package_id: package.id.clone(),
            name: catalog.display_name(package),
            description: Some(package.description.clone()).filter(|d| !d.is_empty()),
            unit_amount: package.unit_amount(),
            quantity: 1,
        }
    }
}

/// Checkout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// One-time payment
    #[default]
    Payment,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
        }
    }
}

/// A validated request for a hosted checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub line_item: LineItem,

    pub currency: Currency,

    #[serde(default)]
    pub mode: CheckoutMode,

    /// Redirect target after payment; may contain the provider's session placeholder
    pub success_url: String,

    /// Redirect target if the customer backs out
    pub cancel_url: String,

    /// Idempotency key (one per client request)
    pub idempotency_key: String,

    /// Metadata echoed back by the provider on webhook events
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl CheckoutRequest {
    /// Build the request for one unit of `package`
    pub fn for_package(catalog: &Catalog, package: &Package, urls: &CheckoutUrls) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("package_id".to_string(), package.id.clone());

        Self {
            line_item: LineItem::from_package(catalog, package),
            currency: catalog.currency(),
            mode: CheckoutMode::Payment,
            success_url: urls.success_url_with_session(),
            cancel_url: urls.cancel_url(),
            idempotency_key: Uuid::new_v4().to_string(),
            metadata,
        }
    }

    /// Total charged for this request, in the smallest currency unit
    pub fn total(&self) -> i64 {
        self.line_item.unit_amount * i64::from(self.line_item.quantity)
    }
}

/// A provider-hosted checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider session id (e.g., "cs_test_...")
    pub session_id: String,

    /// Provider name
    pub provider: String,

    /// URL to redirect the customer to
    pub checkout_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Webhook event types the gateway reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// `checkout.session.completed`
    CheckoutCompleted,
    /// `payment_intent.payment_failed`
    PaymentFailed,
    /// Anything else, carrying the raw type tag
    Unknown(String),
}

impl WebhookEventType {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
            "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::CheckoutCompleted => "checkout.session.completed",
            WebhookEventType::PaymentFailed => "payment_intent.payment_failed",
            WebhookEventType::Unknown(other) => other,
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event_id: String,

    pub event_type: WebhookEventType,

    pub provider: String,

    /// The event's `data.object` payload, untouched
    pub object: serde_json::Map<String, serde_json::Value>,

    pub created_at: DateTime<Utc>,
}

impl WebhookEvent {
    /// String field of the event object
    pub fn object_str(&self, key: &str) -> Option<&str> {
        self.object.get(key).and_then(|v| v.as_str())
    }
}
