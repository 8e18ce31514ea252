use async_trait::async_trait;
use thiserror::Error;

use crate::models::id::{DriverId, UserId};
use crate::models::{
    Driver, DriverFilter, DriverPrivate, DriverStatus, InsertDriver, InsertDriverPrivate,
    InsertUnlock, Role, Unlock,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("conflicting record: {0}")]
    Conflict(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence boundary of the unlock gate. Queried with exact-match
/// predicates only; the `unlocks` uniqueness constraint enforced by
/// every backend is the concurrency-safety mechanism for grants.
#[async_trait]
pub trait Store: Send + Sync {
    /// One-time startup work (migrations for the Postgres backend).
    async fn setup(&self) -> Result<()> {
        Ok(())
    }

    async fn find_driver(&self, id: DriverId) -> Result<Option<Driver>>;
    async fn find_driver_by_owner(&self, user_id: UserId) -> Result<Option<Driver>>;
    async fn list_drivers(&self, filter: &DriverFilter) -> Result<Vec<Driver>>;
    async fn insert_driver(&self, driver: InsertDriver) -> Result<Driver>;
    async fn update_driver_status(&self, id: DriverId, status: DriverStatus) -> Result<Driver>;

    /// Removes the driver together with its private bundle and every
    /// unlock pointing at it. Returns whether a row was deleted.
    async fn delete_driver(&self, id: DriverId) -> Result<bool>;

    async fn insert_driver_private(&self, private: InsertDriverPrivate) -> Result<DriverPrivate>;
    async fn get_driver_private(&self, driver_id: DriverId) -> Result<Option<DriverPrivate>>;
    async fn set_cdl_file_path(&self, driver_id: DriverId, path: &str) -> Result<()>;

    async fn find_unlock(&self, user_id: UserId, driver_id: DriverId) -> Result<Option<Unlock>>;

    /// Records a paid unlock. Conflicts on `(user_id, driver_id)`
    /// update the payment reference in place, so re-delivery of the
    /// same gateway event neither errors nor duplicates the grant.
    async fn upsert_unlock(&self, unlock: InsertUnlock) -> Result<Unlock>;

    async fn get_profile_role(&self, user_id: UserId) -> Result<Option<Role>>;
    async fn set_profile_role(&self, user_id: UserId, role: Role) -> Result<()>;
}
