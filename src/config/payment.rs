use serde::Deserialize;

/// Configuration for the payment gateway.
#[derive(Debug, Deserialize)]
pub struct Payment {
    /// API secret key for the payment gateway.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_PAYMENT_SECRET_KEY` or `STRIPE_SECRET_KEY`
    pub secret_key: String,
    /// Price identifier of the flat unlock fee.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_PAYMENT_PRICE_ID` or `STRIPE_PRICE_ID`
    pub price_id: String,
    /// Shared secret used to verify inbound webhook signatures.
    ///
    /// **Environment variables**:
    /// - `DRIVER_LEADS_PAYMENT_WEBHOOK_SECRET` or `STRIPE_WEBHOOK_SECRET`
    pub webhook_secret: String,
}
