//! Inbound payment-gateway webhook handling: signature verification
//! over the raw body, then parsing into a [`WebhookEvent`].

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::PaymentError;
use crate::models::id::{DriverId, UserId};

type HmacSha256 = Hmac<Sha256>;

/// How far an event's `t=` timestamp may drift from our clock before
/// the signature is rejected as a possible replay.
const SIGNATURE_TOLERANCE_SECS: i64 = 5 * 60;

/// Parsed gateway notification.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    /// A hosted checkout finished with a completed payment. The ids
    /// are `None` when the session carries no (or malformed) unlock
    /// metadata; the caller acknowledges those without granting.
    CheckoutCompleted {
        user_id: Option<UserId>,
        driver_id: Option<DriverId>,
        payment_intent: Option<String>,
    },
    /// Unrecognized or unhandled event type, acknowledged and ignored.
    Unknown { event_type: String },
}

/// Verifies the `t=...,v1=...` signature header against the shared
/// webhook secret. Must be called on the raw request body before any
/// semantic content is parsed.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str) -> Result<(), PaymentError> {
    verify_signature_at(payload, header, secret, Utc::now().timestamp())
}

fn verify_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let Some(timestamp) = timestamp else {
        return Err(PaymentError::InvalidSignature);
    };

    if candidates.is_empty() {
        return Err(PaymentError::InvalidSignature);
    }

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(PaymentError::InvalidSignature);
    }

    for candidate in candidates {
        let Ok(decoded) = hex::decode(candidate) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| PaymentError::Provider(e.to_string()))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // verify_slice is constant-time
        if mac.verify_slice(&decoded).is_ok() {
            return Ok(());
        }
    }

    Err(PaymentError::InvalidSignature)
}

/// Parses a verified payload into a [`WebhookEvent`].
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
    let value: serde_json::Value =
        serde_json::from_slice(payload).map_err(|e| PaymentError::Provider(e.to_string()))?;

    let event_type = value["type"]
        .as_str()
        .ok_or_else(|| PaymentError::Provider("Missing event type".into()))?;

    match event_type {
        "checkout.session.completed" => {
            let session = &value["data"]["object"];
            let metadata = &session["metadata"];

            Ok(WebhookEvent::CheckoutCompleted {
                user_id: metadata["user_id"]
                    .as_str()
                    .and_then(|raw| raw.parse().ok()),
                driver_id: metadata["driver_id"]
                    .as_str()
                    .and_then(|raw| raw.parse().ok()),
                payment_intent: session["payment_intent"].as_str().map(|s| s.to_string()),
            })
        }
        _ => Ok(WebhookEvent::Unknown {
            event_type: event_type.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    const SECRET: &str = "whsec_test123secret456";

    fn compute_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let payload = b"{\"type\":\"checkout.session.completed\"}";
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", compute_signature(payload, SECRET, now));

        assert!(verify_signature_at(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let payload = b"{\"type\":\"checkout.session.completed\"}";
        let now = 1_700_000_000;
        let header = format!(
            "t={now},v1={}",
            compute_signature(payload, "wrong_secret", now)
        );

        assert!(matches!(
            verify_signature_at(payload, &header, SECRET, now),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_modified_payload() {
        let payload = b"{\"type\":\"checkout.session.completed\"}";
        let tampered = b"{\"type\":\"checkout.session.completed\",\"extra\":true}";
        let now = 1_700_000_000;
        let header = format!("t={now},v1={}", compute_signature(payload, SECRET, now));

        assert!(verify_signature_at(tampered, &header, SECRET, now).is_err());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let payload = b"{\"type\":\"checkout.session.completed\"}";
        let now = 1_700_000_000;
        let then = now - 600;
        let header = format!("t={then},v1={}", compute_signature(payload, SECRET, then));

        assert!(verify_signature_at(payload, &header, SECRET, now).is_err());
    }

    #[test]
    fn rejects_garbage_header() {
        let payload = b"{}";
        let now = 1_700_000_000;

        assert!(verify_signature_at(payload, "garbage", SECRET, now).is_err());
        assert!(verify_signature_at(payload, "", SECRET, now).is_err());
        assert!(verify_signature_at(payload, "t=abc,v1=zz", SECRET, now).is_err());
    }

    #[test]
    fn accepts_any_matching_v1_candidate() {
        // Secret rotation sends two v1 entries; one match suffices.
        let payload = b"{}";
        let now = 1_700_000_000;
        let good = compute_signature(payload, SECRET, now);
        let bad = compute_signature(payload, "old_secret", now);
        let header = format!("t={now},v1={bad},v1={good}");

        assert!(verify_signature_at(payload, &header, SECRET, now).is_ok());
    }

    #[test]
    fn parses_completed_checkout() {
        let user_id = Uuid::new_v4();
        let driver_id = Uuid::new_v4();
        let payload = json!({
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_123",
                    "payment_intent": "pi_456",
                    "metadata": {
                        "user_id": user_id.to_string(),
                        "driver_id": driver_id.to_string(),
                    },
                },
            },
        });

        let event = parse_event(payload.to_string().as_bytes()).unwrap();
        match event {
            WebhookEvent::CheckoutCompleted {
                user_id: parsed_user,
                driver_id: parsed_driver,
                payment_intent,
            } => {
                assert_eq!(parsed_user, Some(UserId(user_id)));
                assert_eq!(parsed_driver, Some(DriverId(driver_id)));
                assert_eq!(payment_intent.as_deref(), Some("pi_456"));
            }
            other => panic!("expected CheckoutCompleted, got {other:?}"),
        }
    }

    #[test]
    fn malformed_metadata_becomes_none() {
        let payload = json!({
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "metadata": { "user_id": "not-a-uuid" },
                },
            },
        });

        let event = parse_event(payload.to_string().as_bytes()).unwrap();
        match event {
            WebhookEvent::CheckoutCompleted {
                user_id, driver_id, ..
            } => {
                assert_eq!(user_id, None);
                assert_eq!(driver_id, None);
            }
            other => panic!("expected CheckoutCompleted, got {other:?}"),
        }
    }

    #[test]
    fn unknown_events_fall_through() {
        let payload = json!({ "type": "invoice.paid", "data": {} });
        let event = parse_event(payload.to_string().as_bytes()).unwrap();
        assert!(matches!(
            event,
            WebhookEvent::Unknown { event_type } if event_type == "invoice.paid"
        ));
    }
}
