use bon::Builder;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::id::{DriverId, UserId};

/// Public marketplace listing for one truck driver. Contact details
/// live in [`DriverPrivate`](super::DriverPrivate), never here.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Driver {
    pub id: DriverId,
    /// Owning user if the driver self-registered; admin-provisioned
    /// listings have no owner. Not part of the public payload.
    #[serde(skip_serializing)]
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_initial: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub living_city: Option<String>,
    pub living_state: Option<String>,
    pub dob: Option<NaiveDate>,
    pub driver_type: DriverType,
    pub experience_years: i32,
    pub endorsements: Vec<String>,
    pub status: DriverStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "driver_type", rename_all = "snake_case")]
pub enum DriverType {
    Company,
    OwnerOperator,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "driver_status", rename_all = "snake_case")]
pub enum DriverStatus {
    Active,
    Passive,
    #[default]
    Unset,
}

#[derive(Debug, Builder)]
pub struct InsertDriver {
    pub user_id: Option<UserId>,
    #[builder(into)]
    pub first_name: String,
    #[builder(into)]
    pub last_initial: String,
    #[builder(into)]
    pub city: Option<String>,
    #[builder(into)]
    pub state: Option<String>,
    #[builder(into)]
    pub living_city: Option<String>,
    #[builder(into)]
    pub living_state: Option<String>,
    pub dob: Option<NaiveDate>,
    #[builder(default = DriverType::Company)]
    pub driver_type: DriverType,
    #[builder(default)]
    pub experience_years: i32,
    #[builder(default)]
    pub endorsements: Vec<String>,
    #[builder(default)]
    pub status: DriverStatus,
}

/// Exact-match predicates for the public listing. Every field is
/// optional; absent fields do not constrain the result.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DriverFilter {
    pub state: Option<String>,
    pub driver_type: Option<DriverType>,
    pub status: Option<DriverStatus>,
}
