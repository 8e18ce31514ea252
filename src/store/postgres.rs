use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::{Result, Store, StoreError};
use crate::config;
use crate::models::id::{DriverId, UserId};
use crate::models::{
    Driver, DriverFilter, DriverPrivate, DriverStatus, InsertDriver, InsertDriverPrivate,
    InsertUnlock, Role, Unlock,
};

/// Postgres-backed [`Store`]. Holds a lazily-connected pool so
/// construction stays synchronous at startup.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn connect(config: &config::Database) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size.get())
            .acquire_timeout(Duration::from_secs(config.timeout_secs.get()))
            .connect_lazy(&config.url)?;

        Ok(Self { pool })
    }
}

fn map_err(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Backend(error.to_string()),
    }
}

#[async_trait]
impl Store for PgStore {
    #[tracing::instrument(skip_all, name = "db.setup")]
    async fn setup(&self) -> Result<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    #[tracing::instrument(skip_all, name = "db.drivers.find")]
    async fn find_driver(&self, id: DriverId) -> Result<Option<Driver>> {
        sqlx::query_as::<_, Driver>(r#"SELECT * FROM "drivers" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.drivers.find_by_owner")]
    async fn find_driver_by_owner(&self, user_id: UserId) -> Result<Option<Driver>> {
        sqlx::query_as::<_, Driver>(r#"SELECT * FROM "drivers" WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.drivers.list")]
    async fn list_drivers(&self, filter: &DriverFilter) -> Result<Vec<Driver>> {
        sqlx::query_as::<_, Driver>(
            r#"SELECT * FROM "drivers"
               WHERE ($1::driver_status IS NULL OR status = $1)
                 AND ($2::driver_type IS NULL OR driver_type = $2)
                 AND ($3::text IS NULL OR state = $3)
               ORDER BY created_at DESC"#,
        )
        .bind(filter.status)
        .bind(filter.driver_type)
        .bind(filter.state.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.drivers.insert")]
    async fn insert_driver(&self, driver: InsertDriver) -> Result<Driver> {
        sqlx::query_as::<_, Driver>(
            r#"INSERT INTO "drivers"
               (user_id, first_name, last_initial, city, state, living_city,
                living_state, dob, driver_type, experience_years, endorsements, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING *"#,
        )
        .bind(driver.user_id)
        .bind(&driver.first_name)
        .bind(&driver.last_initial)
        .bind(&driver.city)
        .bind(&driver.state)
        .bind(&driver.living_city)
        .bind(&driver.living_state)
        .bind(driver.dob)
        .bind(driver.driver_type)
        .bind(driver.experience_years)
        .bind(&driver.endorsements)
        .bind(driver.status)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.drivers.update_status")]
    async fn update_driver_status(&self, id: DriverId, status: DriverStatus) -> Result<Driver> {
        sqlx::query_as::<_, Driver>(
            r#"UPDATE "drivers" SET status = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?
        .ok_or(StoreError::NotFound)
    }

    #[tracing::instrument(skip_all, name = "db.drivers.delete")]
    async fn delete_driver(&self, id: DriverId) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM "drivers" WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, name = "db.driver_private.insert")]
    async fn insert_driver_private(&self, private: InsertDriverPrivate) -> Result<DriverPrivate> {
        sqlx::query_as::<_, DriverPrivate>(
            r#"INSERT INTO "driver_private" (driver_id, phone, email, cdl_number, cdl_file_path)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(private.driver_id)
        .bind(&private.phone)
        .bind(&private.email)
        .bind(&private.cdl_number)
        .bind(&private.cdl_file_path)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.driver_private.get")]
    async fn get_driver_private(&self, driver_id: DriverId) -> Result<Option<DriverPrivate>> {
        sqlx::query_as::<_, DriverPrivate>(
            r#"SELECT * FROM "driver_private" WHERE driver_id = $1"#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.driver_private.set_cdl_file_path")]
    async fn set_cdl_file_path(&self, driver_id: DriverId, path: &str) -> Result<()> {
        let result =
            sqlx::query(r#"UPDATE "driver_private" SET cdl_file_path = $2 WHERE driver_id = $1"#)
                .bind(driver_id)
                .bind(path)
                .execute(&self.pool)
                .await
                .map_err(map_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, name = "db.unlocks.find")]
    async fn find_unlock(&self, user_id: UserId, driver_id: DriverId) -> Result<Option<Unlock>> {
        sqlx::query_as::<_, Unlock>(
            r#"SELECT * FROM "unlocks" WHERE user_id = $1 AND driver_id = $2"#,
        )
        .bind(user_id)
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    // The conflict target doubles as the concurrency guard: two
    // deliveries racing on the same pair cannot produce two rows.
    #[tracing::instrument(skip_all, name = "db.unlocks.upsert")]
    async fn upsert_unlock(&self, unlock: InsertUnlock) -> Result<Unlock> {
        sqlx::query_as::<_, Unlock>(
            r#"INSERT INTO "unlocks" (user_id, driver_id, stripe_payment_intent)
               VALUES ($1, $2, $3)
               ON CONFLICT (user_id, driver_id)
               DO UPDATE SET stripe_payment_intent = EXCLUDED.stripe_payment_intent
               RETURNING *"#,
        )
        .bind(unlock.user_id)
        .bind(unlock.driver_id)
        .bind(&unlock.payment_intent)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.profiles.get_role")]
    async fn get_profile_role(&self, user_id: UserId) -> Result<Option<Role>> {
        sqlx::query_scalar::<_, Role>(r#"SELECT role FROM "profiles" WHERE user_id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    #[tracing::instrument(skip_all, name = "db.profiles.set_role")]
    async fn set_profile_role(&self, user_id: UserId, role: Role) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO "profiles" (user_id, role) VALUES ($1, $2)
               ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role"#,
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        Ok(())
    }
}
