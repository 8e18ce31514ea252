use bon::Builder;
use sqlx::FromRow;

use super::id::DriverId;

/// Sensitive contact bundle, one-to-one with a driver. Only readable
/// through the unlock gate; never serialized wholesale into responses.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DriverPrivate {
    pub driver_id: DriverId,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cdl_number: Option<String>,
    pub cdl_file_path: Option<String>,
}

#[derive(Debug, Builder)]
pub struct InsertDriverPrivate {
    pub driver_id: DriverId,
    #[builder(into)]
    pub phone: Option<String>,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub cdl_number: Option<String>,
    #[builder(into)]
    pub cdl_file_path: Option<String>,
}
