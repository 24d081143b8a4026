//! # Routes
//!
//! Axum router configuration for the checkout gateway.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

/// Create the main application router
///
/// Routes:
/// - Pages:
///   - GET  / - Package catalog
///   - GET  /success - Checkout success page
///   - GET  /cancel - Checkout cancel page
///
/// - API:
///   - GET  /api/packages - Catalog and publishable key
///   - POST /create-checkout-session - Create checkout session
///   - GET  /health - Health check
///
/// - Webhooks (only when a signing secret is configured):
///   - POST /webhook - Provider webhook receiver
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/success", get(handlers::checkout_success))
        .route("/cancel", get(handlers::checkout_cancel))
        .route("/health", get(handlers::health))
        .route("/api/packages", get(handlers::list_packages))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        );

    // Webhook body must reach the verifier unmodified
    if state.webhooks_enabled() {
        router = router.route("/webhook", post(handlers::webhook));
    }

    router
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Turn a handler panic into a 500 instead of dropping the connection
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(handlers::ErrorResponse::new("Internal server error")),
    )
        .into_response()
}
