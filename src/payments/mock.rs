use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use super::{CheckoutParams, CheckoutSession, PaymentError, PaymentGateway};

/// Mock [`PaymentGateway`] for tests and local development. Sessions
/// redirect straight to the success URL; every created session is
/// recorded so tests can assert how many were opened.
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    sessions: Mutex<Vec<CheckoutParams>>,
}

impl MockPaymentGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn created_sessions(&self) -> Vec<CheckoutParams> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let session_id = format!("cs_mock_{}", Uuid::new_v4());
        let checkout_url = format!("{}&session_id={session_id}", params.success_url);

        tracing::info!(
            user_id = %params.user_id,
            driver_id = %params.driver_id,
            "Mock checkout session created"
        );

        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(params.clone());

        Ok(CheckoutSession {
            session_id,
            checkout_url,
        })
    }
}
