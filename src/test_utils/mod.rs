//! Helpers for exercising the unlock gate against hermetic backends:
//! an in-memory store, a recording mock gateway, and an in-memory
//! document store, so no external service is needed to run the suite.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::fmt::Debug;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::SessionClaims;
use crate::config;
use crate::documents::MemoryDocumentStore;
use crate::error::ApiError;
use crate::extract::SessionUser;
use crate::models::id::{DriverId, UserId};
use crate::models::{Driver, InsertDriver, InsertDriverPrivate, InsertUnlock, Role};
use crate::payments::MockPaymentGateway;
use crate::store::{MemoryStore, Store};
use crate::App;

pub struct TestHarness {
    pub app: App,
    pub store: Arc<MemoryStore>,
    pub payments: Arc<MockPaymentGateway>,
    pub documents: Arc<MemoryDocumentStore>,
}

#[must_use]
pub fn build_test_app() -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let payments = Arc::new(MockPaymentGateway::new());
    let documents = Arc::new(MemoryDocumentStore::new());

    let app = App::with_parts(
        config::Server::for_tests(),
        store.clone(),
        payments.clone(),
        documents.clone(),
    );

    TestHarness {
        app,
        store,
        payments,
        documents,
    }
}

pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub token: String,
}

impl TestUser {
    #[must_use]
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// Mints an authenticated user the way the identity provider would:
/// a fresh id plus a signed session token.
pub fn recruiter(app: &App, email: &str) -> TestUser {
    let id = UserId(Uuid::new_v4());
    let token = SessionClaims::generate(id, email)
        .encode(app)
        .expect("test token should encode");

    TestUser {
        id,
        email: email.to_string(),
        token,
    }
}

/// [`recruiter`], promoted to the admin role.
pub async fn admin(app: &App, store: &MemoryStore, email: &str) -> TestUser {
    let user = recruiter(app, email);
    store
        .set_profile_role(user.id, Role::Admin)
        .await
        .expect("role update should succeed");
    user
}

pub async fn seed_driver(store: &MemoryStore) -> Driver {
    store
        .insert_driver(
            InsertDriver::builder()
                .first_name("Joe")
                .last_initial("D")
                .city("Dallas")
                .state("TX")
                .experience_years(5)
                .endorsements(vec!["hazmat".to_string()])
                .build(),
        )
        .await
        .expect("driver insert should succeed")
}

pub async fn seed_driver_with_private(store: &MemoryStore) -> Driver {
    let driver = seed_driver(store).await;
    store
        .insert_driver_private(
            InsertDriverPrivate::builder()
                .driver_id(driver.id)
                .phone("555-0100")
                .email("driver@example.com")
                .cdl_number("CDL-12345")
                .build(),
        )
        .await
        .expect("private insert should succeed");
    driver
}

pub async fn seed_unlock(store: &MemoryStore, user_id: UserId, driver_id: DriverId) {
    store
        .upsert_unlock(
            InsertUnlock::builder()
                .user_id(user_id)
                .driver_id(driver_id)
                .payment_intent("pi_seeded")
                .build(),
        )
        .await
        .expect("unlock upsert should succeed");
}

/// Signs a payload exactly like the gateway does, yielding the value
/// of the signature header.
#[must_use]
pub fn sign_webhook_payload(payload: &[u8], secret: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

/// A `checkout.session.completed` event body carrying our unlock
/// metadata, as the gateway would deliver it.
#[must_use]
pub fn checkout_completed_event(
    user_id: UserId,
    driver_id: DriverId,
    payment_intent: Option<&str>,
) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_123",
                "payment_intent": payment_intent,
                "metadata": {
                    "user_id": user_id.to_string(),
                    "driver_id": driver_id.to_string(),
                },
            },
        },
    }))
    .expect("event body should serialize")
}

pub trait TestResultExt {
    /// Serializes the error side into [`serde_json::Value`] for
    /// assertions on the wire shape; panics on `Ok`.
    fn expect_error_json(self) -> serde_json::Value;
}

impl<T: Debug> TestResultExt for std::result::Result<T, ApiError> {
    fn expect_error_json(self) -> serde_json::Value {
        match self {
            Ok(okay) => panic!("unexpected value Ok({okay:?}), expected error"),
            Err(error) => serde_json::to_value(error).unwrap(),
        }
    }
}
