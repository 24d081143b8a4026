//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup; every field is immutable afterwards.

use anyhow::Context;
use checkout_core::{
    BoxedPaymentStrategy, BoxedWebhookVerifier, Catalog, CheckoutGateway, CheckoutUrls,
};
use checkout_stripe::{
    LoggingWebhookHandler, StripeCheckoutStrategy, StripeConfig, StripeWebhookVerifier,
    WebhookHandler,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for redirects
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit catalog file; searched for when unset
    pub packages_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", p))?,
            None => 3000,
        };

        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            base_url,
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            packages_file: var("PACKAGES_FILE").map(PathBuf::from),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog lookup and session creation
    pub gateway: CheckoutGateway,
    /// Publishable key handed to the browser
    pub publishable_key: String,
    /// Webhook verifier; `None` means the webhook route is not mounted
    pub webhooks: Option<BoxedWebhookVerifier>,
    /// Receives verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the state from the environment with the Stripe provider
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let stripe = StripeConfig::from_env().context("Failed to load Stripe config")?;

        let catalog = load_catalog(config.packages_file.as_deref())?;
        tracing::info!(
            "Stripe mode: {}",
            if stripe.is_test_mode() { "test" } else { "live" }
        );

        let verifier = StripeWebhookVerifier::from_config(&stripe)
            .map(|v| Arc::new(v) as BoxedWebhookVerifier);
        let publishable_key = stripe.publishable_key.clone();
        let strategy =
            StripeCheckoutStrategy::new(stripe).context("Failed to initialize Stripe")?;

        Ok(Self::from_parts(
            config,
            catalog,
            Arc::new(strategy),
            publishable_key,
            verifier,
        ))
    }

    /// Assemble state from explicit components
    pub fn from_parts(
        config: AppConfig,
        catalog: Catalog,
        strategy: BoxedPaymentStrategy,
        publishable_key: impl Into<String>,
        webhooks: Option<BoxedWebhookVerifier>,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.base_url);
        Self {
            gateway: CheckoutGateway::new(Arc::new(catalog), strategy, urls),
            publishable_key: publishable_key.into(),
            webhooks,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            config,
        }
    }

    /// Builder: replace the webhook event handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        self.gateway.catalog()
    }

    pub fn webhooks_enabled(&self) -> bool {
        self.webhooks.is_some()
    }
}

/// Load the package catalog.
///
/// An explicit file must exist and parse. Otherwise `config/packages.toml` is
/// searched for, falling back to the built-in catalog.
pub fn load_catalog(explicit: Option<&Path>) -> anyhow::Result<Catalog> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = Catalog::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded {} packages from {}", catalog.len(), path.display());
        return Ok(catalog);
    }

    let config_paths = [
        "config/packages.toml",
        "../config/packages.toml",
        "../../config/packages.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = Catalog::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path))?;
            tracing::info!("Loaded {} packages from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    tracing::info!("No catalog file found, using built-in packages");
    Catalog::builtin().context("Built-in catalog is invalid")
}
