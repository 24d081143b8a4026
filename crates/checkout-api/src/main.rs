//! # Checkout Gateway
//!
//! Hosted checkout for a fixed package catalog.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...   # optional, enables /webhook
//! export BASE_URL=https://drivex.se
//!
//! # Run the server
//! checkout-gateway
//! ```

use checkout_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    print_banner();

    // Fails fast on missing secrets or a broken catalog
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Packages loaded: {} ({})",
        state.catalog().len(),
        state.catalog().currency()
    );
    info!("Payment provider: {}", state.gateway.provider_name());
    info!(
        "Webhooks: {}",
        if state.webhooks_enabled() { "enabled" } else { "disabled" }
    );

    let base_url = state.config.base_url.clone();
    let webhooks = state.webhooks_enabled();
    let app = routes::create_router(state);

    info!("Server running on http://{}", addr);

    if !is_prod {
        info!("Catalog: {}/", base_url);
        info!("Checkout: POST {}/create-checkout-session", base_url);
        if webhooks {
            info!("Webhook: POST {}/webhook", base_url);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_banner() {
    println!(
        r#"
  Checkout Gateway
  ━━━━━━━━━━━━━━━━━━━━━━━
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
