use bon::Builder;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::id::{DriverId, UserId};

/// Permanent entitlement for one recruiter to view one driver's
/// private data. Its existence is the sole source of truth for
/// access; the payment gateway is never consulted at read time.
///
/// At most one row exists per `(user_id, driver_id)` pair.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Unlock {
    pub user_id: UserId,
    pub driver_id: DriverId,
    pub stripe_payment_intent: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Builder)]
pub struct InsertUnlock {
    pub user_id: UserId,
    pub driver_id: DriverId,
    #[builder(into)]
    pub payment_intent: String,
}
