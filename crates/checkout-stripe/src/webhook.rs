//! # Stripe Webhook Handling
//!
//! Signature verification and event dispatch for Stripe webhooks.
//!
//! Stripe signs each delivery with a `Stripe-Signature` header of the form
//! `t=<unix seconds>,v1=<hex hmac>[,v1=...]`. The HMAC-SHA256 is computed over
//! `"<t>." || raw body`, so the body must reach [`StripeWebhookVerifier`]
//! byte-for-byte as received.

use crate::config::{StripeConfig, DEFAULT_WEBHOOK_TOLERANCE_SECS};
use checkout_core::{
    Currency, GatewayError, GatewayResult, WebhookEvent, WebhookEventType, WebhookVerifier,
    MINOR_UNITS_PER_UNIT,
};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header Stripe puts the signature in
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Verifies `Stripe-Signature` headers against the endpoint's signing secret
#[derive(Debug, Clone)]
pub struct StripeWebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
        }
    }

    /// Build a verifier if the config carries a webhook secret
    pub fn from_config(config: &StripeConfig) -> Option<Self> {
        config.webhook_secret.as_ref().map(|secret| Self {
            secret: secret.clone(),
            tolerance_secs: config.webhook_tolerance_secs,
        })
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify against an explicit clock (unix seconds)
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> GatewayResult<WebhookEvent> {
        let header = parse_signature_header(signature)?;

        let mac = signing_mac(&self.secret, header.timestamp, payload)?;
        let valid = header.signatures.iter().any(|sig| match hex::decode(sig) {
            Ok(bytes) => mac.clone().verify_slice(&bytes).is_ok(),
            Err(_) => false,
        });

        if !valid {
            return Err(GatewayError::WebhookVerificationFailed(
                "No signatures found matching the expected signature for payload".to_string(),
            ));
        }

        if (now - header.timestamp).abs() > self.tolerance_secs {
            return Err(GatewayError::WebhookVerificationFailed(
                "Timestamp outside the tolerance zone".to_string(),
            ));
        }

        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            GatewayError::WebhookVerificationFailed(format!("Invalid event payload: {}", e))
        })?;

        debug!("Verified Stripe webhook: id={}, type={}", event.id, event.event_type);

        Ok(WebhookEvent {
            event_id: event.id,
            event_type: WebhookEventType::from_type(&event.event_type),
            provider: "stripe".to_string(),
            object: event.data.object,
            created_at: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
        })
    }
}

impl WebhookVerifier for StripeWebhookVerifier {
    fn verify(&self, payload: &[u8], signature: &str) -> GatewayResult<WebhookEvent> {
        self.verify_at(payload, signature, Utc::now().timestamp())
    }

    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }
}

// =============================================================================
// Signature Scheme
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> GatewayResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(GatewayError::WebhookVerificationFailed(
            "Unable to extract timestamp and signatures from header".to_string(),
        )),
    }
}

fn signing_mac(secret: &str, timestamp: i64, payload: &[u8]) -> GatewayResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produce a `Stripe-Signature` header value for `payload`.
///
/// Mirrors what Stripe sends; used to exercise webhook endpoints locally.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> GatewayResult<String> {
    let mac = signing_mac(secret, timestamp, payload)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// Dispatch
// =============================================================================

/// Fields of a `checkout.session.completed` event object
#[derive(Debug, Clone, Default)]
pub struct CheckoutCompletedData {
    pub session_id: Option<String>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    /// Amount charged, in the smallest currency unit
    pub amount_total: Option<i64>,
    pub currency: Option<Currency>,
    pub payment_status: Option<String>,
    pub package_id: Option<String>,
}

impl CheckoutCompletedData {
    /// Read from a webhook event; every field is optional
    pub fn from_event(event: &WebhookEvent) -> Self {
        let obj = &event.object;
        let details = obj.get("customer_details");
        let detail = |key: &str| {
            details
                .and_then(|d| d.get(key))
                .and_then(|v| v.as_str())
                .map(String::from)
        };

        Self {
            session_id: event.object_str("id").map(String::from),
            customer_email: detail("email")
                .or_else(|| event.object_str("customer_email").map(String::from)),
            customer_name: detail("name"),
            amount_total: obj.get("amount_total").and_then(|v| v.as_i64()),
            currency: event.object_str("currency").and_then(Currency::from_code),
            payment_status: event.object_str("payment_status").map(String::from),
            package_id: obj
                .get("metadata")
                .and_then(|m| m.get("package_id"))
                .and_then(|v| v.as_str())
                .map(String::from),
        }
    }

    /// Amount in whole currency units
    pub fn amount(&self) -> Option<f64> {
        self.amount_total
            .map(|minor| minor as f64 / MINOR_UNITS_PER_UNIT as f64)
    }

    /// Check if payment was successful
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

/// Webhook event handler trait
///
/// Default methods only log; override them to persist or notify.
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed
    fn on_checkout_completed(&self, data: CheckoutCompletedData) -> GatewayResult<()> {
        info!(
            session_id = data.session_id.as_deref().unwrap_or("unknown"),
            customer_email = ?data.customer_email,
            customer_name = ?data.customer_name,
            amount = %data.amount().map(|a| format!("{:.2}", a)).unwrap_or_default(),
            currency = %data.currency.map(|c| c.to_string()).unwrap_or_default(),
            payment_status = ?data.payment_status,
            paid = data.is_paid(),
            package_id = ?data.package_id,
            "Payment successful"
        );
        Ok(())
    }

    /// Called when a payment fails
    fn on_payment_failed(&self, event: &WebhookEvent) -> GatewayResult<()> {
        warn!(
            payment_intent = event.object_str("id").unwrap_or("unknown"),
            "Payment failed"
        );
        Ok(())
    }

    /// Called for every other event type
    fn on_unhandled_event(&self, event: &WebhookEvent) -> GatewayResult<()> {
        info!(event_type = %event.event_type, "Unhandled event type");
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a verified webhook event to the matching handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> GatewayResult<()> {
    match &event.event_type {
        WebhookEventType::CheckoutCompleted => {
            handler.on_checkout_completed(CheckoutCompletedData::from_event(event))
        }
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::Unknown(_) => handler.on_unhandled_event(event),
    }
}
