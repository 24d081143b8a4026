//! # checkout-api
//!
//! HTTP API layer for the checkout gateway.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Catalog pages and checkout session creation
//! - Optional webhook receiver for payment events
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Package catalog page |
//! | GET | `/api/packages` | Catalog and publishable key |
//! | GET | `/success` | Checkout success page |
//! | GET | `/cancel` | Checkout cancel page |
//! | GET | `/health` | Health check |
//! | POST | `/create-checkout-session` | Create checkout session |
//! | POST | `/webhook` | Provider webhook (when enabled) |

pub mod handlers;
pub mod routes;
pub mod state;
pub mod views;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
