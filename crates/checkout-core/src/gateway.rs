//! # Checkout Gateway
//!
//! Maps a client-supplied package id to a hosted checkout session.

use crate::error::{GatewayError, GatewayResult};
use crate::package::Catalog;
use crate::session::{CheckoutRequest, CheckoutSession};
use crate::strategy::{BoxedPaymentStrategy, CheckoutUrls};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Session creation over an injected catalog and payment strategy
#[derive(Clone)]
pub struct CheckoutGateway {
    catalog: Arc<Catalog>,
    strategy: BoxedPaymentStrategy,
    urls: CheckoutUrls,
}

impl CheckoutGateway {
    pub fn new(catalog: Arc<Catalog>, strategy: BoxedPaymentStrategy, urls: CheckoutUrls) -> Self {
        Self {
            catalog,
            strategy,
            urls,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn urls(&self) -> &CheckoutUrls {
        &self.urls
    }

    pub fn provider_name(&self) -> &'static str {
        self.strategy.provider_name()
    }

    /// Validate `package_id` and build the provider request for it.
    ///
    /// Unknown ids fail with [`GatewayError::InvalidPackage`].
    pub fn prepare(&self, package_id: &str) -> GatewayResult<CheckoutRequest> {
        let package = self
            .catalog
            .get(package_id)
            .ok_or_else(|| GatewayError::InvalidPackage {
                package_id: package_id.to_string(),
            })?;

        Ok(CheckoutRequest::for_package(&self.catalog, package, &self.urls))
    }

    /// Create a checkout session for one unit of `package_id`.
    ///
    /// Provider failures are logged in full and collapsed into
    /// [`GatewayError::SessionCreationFailed`].
    #[instrument(skip(self), fields(provider = self.strategy.provider_name()))]
    pub async fn create_session(&self, package_id: &str) -> GatewayResult<CheckoutSession> {
        let request = match self.prepare(package_id) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected checkout: {}", e);
                return Err(e);
            }
        };

        info!(
            "Creating checkout: package={}, amount={} {}",
            package_id,
            request.total(),
            request.currency
        );

        let session = self.strategy.create_checkout(&request).await.map_err(|e| {
            error!("Checkout provider error: {}", e);
            GatewayError::SessionCreationFailed(e.to_string())
        })?;

        info!("Created checkout session: {}", session.session_id);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::PaymentStrategy;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStrategy {
        requests: Mutex<Vec<CheckoutRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentStrategy for RecordingStrategy {
        async fn create_checkout(
            &self,
            request: &CheckoutRequest,
        ) -> GatewayResult<CheckoutSession> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(GatewayError::ProviderError {
                    provider: "mock".into(),
                    message: "Invalid API Key provided".into(),
                });
            }
            Ok(CheckoutSession {
                session_id: "cs_test_1".into(),
                provider: "mock".into(),
                checkout_url: "https://checkout.example/cs_test_1".into(),
                payment_intent_id: None,
                expires_at: None,
                created_at: Utc::now(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    fn gateway(strategy: Arc<RecordingStrategy>) -> CheckoutGateway {
        CheckoutGateway::new(
            Arc::new(Catalog::builtin().unwrap()),
            strategy,
            CheckoutUrls::new("https://drivex.se"),
        )
    }

    #[tokio::test]
    async fn test_daily_sends_minor_units() {
        let strategy = Arc::new(RecordingStrategy::default());
        let session = gateway(strategy.clone())
            .create_session("daily")
            .await
            .unwrap();

        assert_eq!(session.checkout_url, "https://checkout.example/cs_test_1");

        let requests = strategy.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].line_item.unit_amount, 199000);
    }

    #[tokio::test]
    async fn test_unknown_package_skips_provider() {
        let strategy = Arc::new(RecordingStrategy::default());
        let err = gateway(strategy.clone())
            .create_session("doesnotexist")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::InvalidPackage { .. }));
        assert!(strategy.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_collapsed() {
        let strategy = Arc::new(RecordingStrategy {
            fail: true,
            ..Default::default()
        });
        let err = gateway(strategy.clone())
            .create_session("weekly")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::SessionCreationFailed(_)));
        assert_eq!(err.status_code(), 500);
        assert_eq!(strategy.requests.lock().unwrap().len(), 1);
    }
}
