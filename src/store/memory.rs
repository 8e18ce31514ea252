use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use super::{Result, Store, StoreError};
use crate::models::id::{DriverId, UserId};
use crate::models::{
    Driver, DriverFilter, DriverPrivate, DriverStatus, InsertDriver, InsertDriverPrivate,
    InsertUnlock, Role, Unlock,
};

/// In-memory [`Store`] backend for tests and local development.
///
/// Mirrors the relational semantics the Postgres backend relies on:
/// one private bundle per driver, at most one unlock per
/// `(user, driver)` pair, and cascading deletes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    fail_private_inserts: AtomicBool,
}

#[derive(Debug, Default)]
struct Inner {
    drivers: HashMap<DriverId, Driver>,
    private: HashMap<DriverId, DriverPrivate>,
    unlocks: HashMap<(UserId, DriverId), Unlock>,
    profiles: HashMap<UserId, Role>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: makes every following `insert_driver_private` call
    /// fail until switched off, to exercise compensating rollbacks.
    pub fn fail_private_inserts(&self, fail: bool) {
        self.fail_private_inserts.store(fail, Ordering::SeqCst);
    }

    /// Total number of unlock rows, across all pairs.
    #[must_use]
    pub fn unlock_count(&self) -> usize {
        self.read().unlocks.len()
    }

    fn lock(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_driver(&self, id: DriverId) -> Result<Option<Driver>> {
        Ok(self.read().drivers.get(&id).cloned())
    }

    async fn find_driver_by_owner(&self, user_id: UserId) -> Result<Option<Driver>> {
        Ok(self
            .read()
            .drivers
            .values()
            .find(|driver| driver.user_id == Some(user_id))
            .cloned())
    }

    async fn list_drivers(&self, filter: &DriverFilter) -> Result<Vec<Driver>> {
        let mut drivers = self
            .read()
            .drivers
            .values()
            .filter(|driver| {
                filter
                    .state
                    .as_ref()
                    .map_or(true, |state| driver.state.as_ref() == Some(state))
                    && filter
                        .driver_type
                        .map_or(true, |kind| driver.driver_type == kind)
                    && filter.status.map_or(true, |status| driver.status == status)
            })
            .cloned()
            .collect::<Vec<_>>();

        drivers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(drivers)
    }

    async fn insert_driver(&self, driver: InsertDriver) -> Result<Driver> {
        let row = Driver {
            id: DriverId(Uuid::new_v4()),
            user_id: driver.user_id,
            first_name: driver.first_name,
            last_initial: driver.last_initial,
            city: driver.city,
            state: driver.state,
            living_city: driver.living_city,
            living_state: driver.living_state,
            dob: driver.dob,
            driver_type: driver.driver_type,
            experience_years: driver.experience_years,
            endorsements: driver.endorsements,
            status: driver.status,
            created_at: Utc::now(),
        };

        self.lock().drivers.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_driver_status(&self, id: DriverId, status: DriverStatus) -> Result<Driver> {
        let mut inner = self.lock();
        let driver = inner.drivers.get_mut(&id).ok_or(StoreError::NotFound)?;
        driver.status = status;
        Ok(driver.clone())
    }

    async fn delete_driver(&self, id: DriverId) -> Result<bool> {
        let mut inner = self.lock();
        let existed = inner.drivers.remove(&id).is_some();
        if existed {
            inner.private.remove(&id);
            inner.unlocks.retain(|(_, driver_id), _| *driver_id != id);
        }
        Ok(existed)
    }

    async fn insert_driver_private(&self, private: InsertDriverPrivate) -> Result<DriverPrivate> {
        if self.fail_private_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected private-insert failure".into()));
        }

        let mut inner = self.lock();
        if inner.private.contains_key(&private.driver_id) {
            return Err(StoreError::Conflict(format!(
                "driver_private already exists for driver {}",
                private.driver_id
            )));
        }

        let row = DriverPrivate {
            driver_id: private.driver_id,
            phone: private.phone,
            email: private.email,
            cdl_number: private.cdl_number,
            cdl_file_path: private.cdl_file_path,
        };

        inner.private.insert(row.driver_id, row.clone());
        Ok(row)
    }

    async fn get_driver_private(&self, driver_id: DriverId) -> Result<Option<DriverPrivate>> {
        Ok(self.read().private.get(&driver_id).cloned())
    }

    async fn set_cdl_file_path(&self, driver_id: DriverId, path: &str) -> Result<()> {
        let mut inner = self.lock();
        let private = inner
            .private
            .get_mut(&driver_id)
            .ok_or(StoreError::NotFound)?;

        private.cdl_file_path = Some(path.to_string());
        Ok(())
    }

    async fn find_unlock(&self, user_id: UserId, driver_id: DriverId) -> Result<Option<Unlock>> {
        Ok(self.read().unlocks.get(&(user_id, driver_id)).cloned())
    }

    async fn upsert_unlock(&self, unlock: InsertUnlock) -> Result<Unlock> {
        let mut inner = self.lock();
        let key = (unlock.user_id, unlock.driver_id);

        let row = match inner.unlocks.get(&key) {
            // Idempotent re-delivery: refresh the payment reference,
            // keep the original grant.
            Some(existing) => Unlock {
                stripe_payment_intent: unlock.payment_intent,
                ..existing.clone()
            },
            None => Unlock {
                user_id: unlock.user_id,
                driver_id: unlock.driver_id,
                stripe_payment_intent: unlock.payment_intent,
                created_at: Utc::now(),
            },
        };

        inner.unlocks.insert(key, row.clone());
        Ok(row)
    }

    async fn get_profile_role(&self, user_id: UserId) -> Result<Option<Role>> {
        Ok(self.read().profiles.get(&user_id).copied())
    }

    async fn set_profile_role(&self, user_id: UserId, role: Role) -> Result<()> {
        self.lock().profiles.insert(user_id, role);
        Ok(())
    }
}
