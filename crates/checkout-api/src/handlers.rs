//! # Request Handlers
//!
//! Axum request handlers for the checkout gateway.

use crate::state::AppState;
use crate::views;
use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use checkout_core::{Currency, GatewayError, Package};
use checkout_stripe::dispatch_webhook_event;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{error, info, instrument, warn};

pub const INVALID_PACKAGE_MESSAGE: &str = "Invalid package selected";
pub const SESSION_FAILED_MESSAGE: &str = "Payment session creation failed";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout session request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    /// Catalog key of the package to buy
    #[serde(default)]
    pub package_type: Option<String>,
}

/// Package selection read from either a JSON or a url-encoded form body.
///
/// An unreadable body yields an empty package id, which the gateway rejects
/// as an unknown package.
#[derive(Debug, Default)]
pub struct PackageSelection {
    pub package_type: String,
}

impl<S> FromRequest<S> for PackageSelection
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            Form::<CreateCheckoutSessionRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|rejection| rejection.body_text())
        } else {
            Json::<CreateCheckoutSessionRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|rejection| rejection.body_text())
        };

        match body {
            Ok(body) => Ok(Self {
                package_type: body.package_type.unwrap_or_default(),
            }),
            Err(reason) => {
                warn!("Unreadable checkout request: {}", reason);
                Ok(Self::default())
            }
        }
    }
}

/// Create checkout session response
#[derive(Debug, Serialize)]
pub struct CreateCheckoutSessionResponse {
    /// Checkout URL (redirect user here)
    pub url: String,
}

/// Catalog response for front-end initialization
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse<'a> {
    pub publishable_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<&'a str>,
    pub currency: Currency,
    pub packages: &'a [Package],
}

/// Webhook acknowledgment
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

fn status_of(err: &GatewayError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Client-facing form of a checkout error; provider detail stays in the logs
fn checkout_error_to_response(err: &GatewayError) -> (StatusCode, Json<ErrorResponse>) {
    let status = status_of(err);
    let message = if status.is_client_error() {
        INVALID_PACKAGE_MESSAGE
    } else {
        SESSION_FAILED_MESSAGE
    };
    (status, Json(ErrorResponse::new(message)))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "webhooks": state.webhooks_enabled(),
    }))
}

/// Catalog page
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(views::index_page(state.catalog(), &state.publishable_key))
}

/// Catalog and publishable key as JSON
pub async fn list_packages(State(state): State<AppState>) -> Response {
    let catalog = state.catalog();
    // Serialized here, while the borrowed response still points into `state`
    Json(CatalogResponse {
        publishable_key: &state.publishable_key,
        brand: catalog.brand(),
        currency: catalog.currency(),
        packages: catalog.packages(),
    })
    .into_response()
}

/// Create a checkout session for one package
#[instrument(skip_all)]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    selection: PackageSelection,
) -> Result<Json<CreateCheckoutSessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session = state
        .gateway
        .create_session(&selection.package_type)
        .await
        .map_err(|e| checkout_error_to_response(&e))?;

    Ok(Json(CreateCheckoutSessionResponse {
        url: session.checkout_url,
    }))
}

/// Handle a provider webhook delivery
#[instrument(skip_all)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, (StatusCode, String)> {
    let Some(verifier) = state.webhooks.as_ref() else {
        return Err((StatusCode::NOT_FOUND, "Webhooks are not enabled".to_string()));
    };

    let header_name = verifier.signature_header();
    let signature = headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Webhook without {} header", header_name);
            (
                StatusCode::BAD_REQUEST,
                format!("Webhook Error: No {} header value was provided", header_name),
            )
        })?;

    let event = verifier.verify(&body, signature).map_err(|e| {
        warn!("Webhook verification failed: {}", e);
        (status_of(&e), format!("Webhook Error: {}", e))
    })?;

    info!(
        "Received webhook: type={}, id={}",
        event.event_type, event.event_id
    );

    // The provider retries anything that is not acknowledged
    if let Err(e) = dispatch_webhook_event(state.webhook_handler.as_ref(), &event) {
        error!("Webhook handler error for {}: {}", event.event_id, e);
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Checkout success page
pub async fn checkout_success(
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Html<String> {
    Html(views::success_page(params.get("session_id").map(String::as_str)))
}

/// Checkout cancel page
pub async fn checkout_cancel() -> Html<String> {
    Html(views::cancel_page())
}

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error");
        assert_eq!(err.error, "Test error");
    }

    #[test]
    fn test_invalid_package_is_client_error() {
        let (status, Json(body)) = checkout_error_to_response(&GatewayError::InvalidPackage {
            package_id: "nope".into(),
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, INVALID_PACKAGE_MESSAGE);
    }

    #[test]
    fn test_provider_detail_is_hidden() {
        let (status, Json(body)) = checkout_error_to_response(
            &GatewayError::SessionCreationFailed("Invalid API Key provided: sk_test_***".into()),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, SESSION_FAILED_MESSAGE);
    }

    #[test]
    fn test_status_follows_error_taxonomy() {
        assert_eq!(
            status_of(&GatewayError::WebhookVerificationFailed("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&GatewayError::NetworkError("timeout".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
