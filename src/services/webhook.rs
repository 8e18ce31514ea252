use crate::error::{ApiError, ErrorCategory};
use crate::models::InsertUnlock;
use crate::payments::webhook::{self, WebhookEvent};
use crate::store::Store;
use crate::App;

/// Raw gateway notification: body bytes plus the signature header,
/// exactly as received. Nothing is parsed before the signature holds.
#[derive(Debug)]
pub struct ProcessPaymentEvent {
    pub payload: Vec<u8>,
    pub signature: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A paid unlock was durably recorded (or re-recorded).
    Recorded,
    /// Acknowledged without effect: unhandled event type, or a
    /// completed checkout missing its unlock metadata.
    Ignored,
}

impl ProcessPaymentEvent {
    /// Converts a completed payment into a permanent unlock.
    ///
    /// Failure semantics are asymmetric on purpose: signature and
    /// payload problems are client errors the gateway must not retry,
    /// while a failed durable write surfaces as a server error so the
    /// gateway's at-least-once redelivery can repair it later.
    #[tracing::instrument(skip_all, name = "services.unlocks.process_webhook")]
    pub async fn perform(self, app: &App) -> Result<WebhookOutcome, ApiError> {
        let Some(signature) = self.signature.as_deref() else {
            return Err(ApiError::new(ErrorCategory::InvalidRequest).message("Missing signature"));
        };

        webhook::verify_signature(
            &self.payload,
            signature,
            &app.config.payment.webhook_secret,
        )?;

        let event = webhook::parse_event(&self.payload)
            .map_err(|error| ApiError::new(ErrorCategory::InvalidRequest).message(error.to_string()))?;

        match event {
            WebhookEvent::CheckoutCompleted {
                user_id: Some(user_id),
                driver_id: Some(driver_id),
                payment_intent,
            } => {
                let unlock = InsertUnlock::builder()
                    .user_id(user_id)
                    .driver_id(driver_id)
                    .payment_intent(
                        payment_intent.unwrap_or_else(|| "checkout_session_completed".to_string()),
                    )
                    .build();

                app.store.upsert_unlock(unlock).await?;

                tracing::info!(
                    user.id = %user_id,
                    driver.id = %driver_id,
                    "Recorded paid unlock"
                );
                Ok(WebhookOutcome::Recorded)
            }
            WebhookEvent::CheckoutCompleted { .. } => {
                // Redelivery cannot repair missing metadata, so this is
                // acknowledged rather than escalated.
                tracing::warn!("Completed checkout event without unlock metadata");
                Ok(WebhookOutcome::Ignored)
            }
            WebhookEvent::Unknown { event_type } => {
                tracing::debug!(%event_type, "Ignoring unhandled webhook event");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }
}
