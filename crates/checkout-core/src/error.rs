//! # Gateway Error Types
//!
//! Typed error handling for the checkout gateway.
//! All gateway operations return `Result<T, GatewayError>`.

use thiserror::Error;

/// Core error type for catalog, checkout and webhook operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration errors (missing keys, invalid catalog)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Client asked for a package that is not in the catalog
    #[error("Invalid package: {package_id}")]
    InvalidPackage { package_id: String },

    /// Checkout session could not be created by the provider
    #[error("Checkout session creation failed: {0}")]
    SessionCreationFailed(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook signature or envelope verification failed
    #[error("{0}")]
    WebhookVerificationFailed(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GatewayError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Configuration(_) => 500,
            GatewayError::InvalidPackage { .. } => 400,
            GatewayError::SessionCreationFailed(_) => 500,
            GatewayError::ProviderError { .. } => 502,
            GatewayError::NetworkError(_) => 503,
            GatewayError::WebhookVerificationFailed(_) => 400,
            GatewayError::Internal(_) => 500,
            GatewayError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::InvalidPackage {
                package_id: "x".into()
            }
            .status_code(),
            400
        );
        assert_eq!(
            GatewayError::SessionCreationFailed("boom".into()).status_code(),
            500
        );
        assert_eq!(
            GatewayError::WebhookVerificationFailed("bad".into()).status_code(),
            400
        );
    }

    #[test]
    fn test_verification_message_is_bare() {
        let err = GatewayError::WebhookVerificationFailed("Signature mismatch".into());
        assert_eq!(err.to_string(), "Signature mismatch");
    }
}
