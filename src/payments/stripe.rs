use async_trait::async_trait;
use serde::Deserialize;

use super::{CheckoutParams, CheckoutSession, PaymentError, PaymentGateway};
use crate::config;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe-backed [`PaymentGateway`] talking to the hosted Checkout
/// API. Sessions are single-use: one line item of the flat unlock
/// price, card payments only, expiring per gateway defaults.
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    price_id: String,
}

impl StripeGateway {
    pub fn new(config: &config::Payment) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        Ok(Self {
            http,
            secret_key: config.secret_key.clone(),
            price_id: config.price_id.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[tracing::instrument(skip_all, name = "payments.stripe.create_checkout_session")]
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let user_id = params.user_id.to_string();
        let driver_id = params.driver_id.to_string();
        let form: [(&str, &str); 9] = [
            ("mode", "payment"),
            ("customer_email", &params.customer_email),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", &self.price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", &params.success_url),
            ("cancel_url", &params.cancel_url),
            ("metadata[user_id]", &user_id),
            ("metadata[driver_id]", &driver_id),
        ];

        let response = self
            .http
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(format!(
                "checkout session request failed with {status}: {body}"
            )));
        }

        let session = response
            .json::<SessionResponse>()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        let checkout_url = session
            .url
            .ok_or_else(|| PaymentError::Provider("gateway returned no session URL".into()))?;

        Ok(CheckoutSession {
            session_id: session.id,
            checkout_url,
        })
    }
}
