//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API.
//! Every package is sold as a single ad-hoc `price_data` line item.

use crate::config::StripeConfig;
use async_trait::async_trait;
use checkout_core::{
    CheckoutRequest, CheckoutSession, GatewayError, GatewayResult, PaymentStrategy,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page, so card data never touches the gateway.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                GatewayError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Form parameters for `POST /v1/checkout/sessions`
    fn form_params(request: &CheckoutRequest) -> Vec<(String, String)> {
        let item = &request.line_item;

        let mut params: Vec<(String, String)> = vec![
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("mode".to_string(), request.mode.as_str().to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            (
                "line_items[0][price_data][currency]".to_string(),
                request.currency.as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                item.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                item.name.clone(),
            ),
        ];

        if let Some(ref desc) = item.description {
            params.push((
                "line_items[0][price_data][product_data][description]".to_string(),
                desc.clone(),
            ));
        }

        params.push((
            "line_items[0][quantity]".to_string(),
            item.quantity.to_string(),
        ));

        let mut metadata: Vec<_> = request.metadata.iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        params
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request), fields(package_id = %request.line_item.package_id))]
    async fn create_checkout(&self, request: &CheckoutRequest) -> GatewayResult<CheckoutSession> {
        let form_params = Self::form_params(request);

        debug!(
            "Creating Stripe checkout session: unit_amount={}, currency={}, mode={}",
            request.line_item.unit_amount,
            request.currency.as_str(),
            request.mode.as_str()
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                let error = error_response.error;
                let message = match (error.code, error.param) {
                    (Some(code), Some(param)) => {
                        format!("{} (code={}, param={})", error.message, code, param)
                    }
                    (Some(code), None) => format!("{} (code={})", error.message, code),
                    _ => error.message,
                };
                return Err(GatewayError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message,
                });
            }

            return Err(GatewayError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                GatewayError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        let checkout_url = session_response.url.ok_or_else(|| {
            GatewayError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("session {} has no redirect url", session_response.id),
            }
        })?;

        info!(
            "Created Stripe checkout session: id={}, url={}",
            session_response.id, checkout_url
        );

        Ok(CheckoutSession {
            session_id: session_response.id,
            provider: PROVIDER.to_string(),
            checkout_url,
            payment_intent_id: session_response.payment_intent,
            expires_at: session_response
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    param: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout_core::{Catalog, CheckoutUrls};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn daily_request() -> CheckoutRequest {
        let catalog = Catalog::builtin().unwrap();
        let daily = catalog.get("daily").unwrap();
        CheckoutRequest::for_package(&catalog, daily, &CheckoutUrls::new("https://drivex.se"))
    }

    fn strategy(server: &MockServer) -> StripeCheckoutStrategy {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789", None)
            .with_api_base_url(server.uri());
        StripeCheckoutStrategy::new(config).unwrap()
    }

    #[test]
    fn test_form_params() {
        let params = StripeCheckoutStrategy::form_params(&daily_request());
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("payment_method_types[0]"), Some("card"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("sek"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("199000"));
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("DriveX Dagspaket")
        );
        assert_eq!(get("line_items[0][quantity]"), Some("1"));
        assert_eq!(get("metadata[package_id]"), Some("daily"));
        assert_eq!(
            get("success_url"),
            Some("https://drivex.se/success?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(get("cancel_url"), Some("https://drivex.se/cancel"));
    }

    #[tokio::test]
    async fn test_create_checkout_posts_minor_units() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_abc123"))
            .and(header_exists("idempotency-key"))
            .and(body_string_contains("unit_amount%5D=199000"))
            .and(body_string_contains("mode=payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_a1",
                "object": "checkout.session",
                "url": "https://checkout.stripe.com/c/pay/cs_test_a1",
                "payment_intent": null,
                "expires_at": 1_700_086_400
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = strategy(&server)
            .create_checkout(&daily_request())
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_a1");
        assert_eq!(
            session.checkout_url,
            "https://checkout.stripe.com/c/pay/cs_test_a1"
        );
        assert_eq!(session.provider, "stripe");
        assert!(session.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_stripe_error_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Invalid API Key provided: sk_test_***123",
                    "type": "invalid_request_error"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = strategy(&server)
            .create_checkout(&daily_request())
            .await
            .unwrap_err();

        match err {
            GatewayError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert!(message.starts_with("Invalid API Key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparsable_body_is_serialization_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = strategy(&server)
            .create_checkout(&daily_request())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_error() {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789", None)
            .with_api_base_url("http://127.0.0.1:9");
        let err = StripeCheckoutStrategy::new(config)
            .unwrap()
            .create_checkout(&daily_request())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::NetworkError(_)));
    }
}
