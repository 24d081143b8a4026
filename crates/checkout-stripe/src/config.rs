//! # Stripe Configuration
//!
//! Configuration management for the Stripe integration.
//! All secrets are loaded from environment variables.

use checkout_core::{GatewayError, GatewayResult};
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Default webhook timestamp tolerance (5 minutes)
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...), handed to the browser
    pub publishable_key: String,

    /// Webhook signing secret (whsec_...); `None` disables the webhook endpoint
    pub webhook_secret: Option<String>,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,

    /// Maximum age of a webhook signature timestamp, in seconds
    pub webhook_tolerance_secs: i64,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    ///
    /// Optional:
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `STRIPE_API_BASE`
    pub fn from_env() -> GatewayResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> GatewayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = var("STRIPE_SECRET_KEY").ok_or_else(|| {
            GatewayError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        let publishable_key = var("STRIPE_PUBLISHABLE_KEY").ok_or_else(|| {
            GatewayError::Configuration("STRIPE_PUBLISHABLE_KEY not set".to_string())
        })?;

        let webhook_secret = var("STRIPE_WEBHOOK_SECRET");

        // Validate key formats
        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            return Err(GatewayError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if !publishable_key.starts_with("pk_test_") && !publishable_key.starts_with("pk_live_") {
            return Err(GatewayError::Configuration(
                "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        if let Some(ref secret) = webhook_secret {
            if !secret.starts_with("whsec_") {
                return Err(GatewayError::Configuration(
                    "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
                ));
            }
        }

        let mut config = Self::new(secret_key, publishable_key, webhook_secret);
        if let Some(base) = var("STRIPE_API_BASE") {
            config = config.with_api_base_url(base);
        }
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        secret_key: impl Into<String>,
        publishable_key: impl Into<String>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            webhook_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            webhook_tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Whether a webhook signing secret is configured
    pub fn webhooks_enabled(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_secret"),
        ]))
        .unwrap();

        assert!(config.is_test_mode());
        assert!(config.webhooks_enabled());
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.webhook_tolerance_secs, 300);
    }

    #[test]
    fn test_webhook_secret_is_optional() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_live_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_live_xyz789"),
            ("STRIPE_WEBHOOK_SECRET", ""),
        ]))
        .unwrap();

        assert!(!config.is_test_mode());
        assert!(!config.webhooks_enabled());
    }

    #[test]
    fn test_missing_secret_key_fails() {
        let err = StripeConfig::from_lookup(lookup(&[(
            "STRIPE_PUBLISHABLE_KEY",
            "pk_test_xyz789",
        )]))
        .unwrap_err();

        assert!(err.to_string().contains("STRIPE_SECRET_KEY"));
    }

    #[test]
    fn test_key_formats_are_checked() {
        assert!(StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "pk_test_wrong"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
        ]))
        .is_err());

        assert!(StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_WEBHOOK_SECRET", "secret"),
        ]))
        .is_err());
    }

    #[test]
    fn test_api_base_override() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc123"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz789"),
            ("STRIPE_API_BASE", "http://localhost:12111/"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:12111");
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789", None);
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }
}
