use async_trait::async_trait;
use thiserror::Error;

use crate::models::id::{DriverId, UserId};

mod mock;
mod stripe;
pub mod webhook;

pub use mock::MockPaymentGateway;
pub use stripe::StripeGateway;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Missing signature")]
    MissingSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("payment gateway error: {0}")]
    Provider(String),
}

/// Everything the gateway needs to host a single-use, single-line-item
/// payment page. The ids ride along as metadata so the webhook — which
/// has no session context — can identify who and what to unlock.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub customer_email: String,
    pub user_id: UserId,
    pub driver_id: DriverId,
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted payment session created at the gateway.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

/// Payment gateway boundary. Only checkout-session creation goes out
/// through this trait; confirmations come back in through the signed
/// webhook ([`webhook`]).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError>;
}
