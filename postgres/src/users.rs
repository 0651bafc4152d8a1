//! `UserRepository` on `PostgreSQL`.

use crate::rows::{USER_COLUMNS, lock_event, save_availability, user_from_row};
use crate::{PostgresStore, db_err, unique_violation_as};
use chrono::{DateTime, Utc};
use sqlx::Row;
use ticketing_core::DomainError;
use ticketing_core::inventory;
use ticketing_core::model::{NewUser, ProfileUpdate, User, UserCredentials};
use ticketing_core::store::{StoreError, StoreFuture, UserRepository};
use ticketing_core::types::{EventId, Role, UserId};

impl UserRepository for PostgresStore {
    fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let query = format!(
                "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $6)
                 RETURNING {USER_COLUMNS}"
            );
            let row = sqlx::query(&query)
                .bind(*UserId::new().as_uuid())
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| unique_violation_as(e, StoreError::email_taken()))?;

            let created = user_from_row(&row)?;
            tracing::info!(user_id = %created.id, role = %created.role, "User created");
            Ok(created)
        })
    }

    fn get_user(&self, id: UserId) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
            let row = sqlx::query(&query)
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::user_not_found)?;
            user_from_row(&row)
        })
    }

    fn find_credentials(&self, email: String) -> StoreFuture<'_, Option<UserCredentials>> {
        Box::pin(async move {
            let query = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
            let row = sqlx::query(&query)
                .bind(&email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

            row.map(|row| {
                Ok(UserCredentials {
                    user: user_from_row(&row)?,
                    password_hash: row.try_get("password_hash").map_err(db_err)?,
                })
            })
            .transpose()
        })
    }

    fn list_users(&self) -> StoreFuture<'_, Vec<User>> {
        Box::pin(async move {
            let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
            let rows = sqlx::query(&query)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
            rows.iter().map(user_from_row).collect()
        })
    }

    fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, User> {
        Box::pin(async move {
            // Empty strings clear optional contact fields.
            let query = format!(
                "UPDATE users SET
                    name = COALESCE($2, name),
                    email = COALESCE($3, email),
                    phone = CASE WHEN $4::TEXT IS NULL THEN phone ELSE NULLIF($4, '') END,
                    address = CASE WHEN $5::TEXT IS NULL THEN address ELSE NULLIF($5, '') END,
                    profile_picture = CASE WHEN $6::TEXT IS NULL THEN profile_picture
                                           ELSE NULLIF($6, '') END,
                    updated_at = $7
                 WHERE id = $1
                 RETURNING {USER_COLUMNS}"
            );
            let row = sqlx::query(&query)
                .bind(*id.as_uuid())
                .bind(update.name)
                .bind(update.email)
                .bind(update.phone)
                .bind(update.address)
                .bind(update.profile_picture)
                .bind(now)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| unique_violation_as(e, StoreError::email_taken()))?
                .ok_or_else(StoreError::user_not_found)?;
            user_from_row(&row)
        })
    }

    fn update_role(&self, id: UserId, role: Role, now: DateTime<Utc>) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let query = format!(
                "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
            );
            let row = sqlx::query(&query)
                .bind(*id.as_uuid())
                .bind(role.as_str())
                .bind(now)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::user_not_found)?;

            tracing::info!(user_id = %id, role = %role, "User role changed");
            user_from_row(&row)
        })
    }

    fn update_password(
        &self,
        email: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let query = format!(
                "UPDATE users SET password_hash = $2, updated_at = $3
                 WHERE email = $1
                 RETURNING {USER_COLUMNS}"
            );
            let row = sqlx::query(&query)
                .bind(&email)
                .bind(&password_hash)
                .bind(now)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::user_not_found)?;
            user_from_row(&row)
        })
    }

    fn delete_user(&self, id: UserId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(*id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::user_not_found)?;

            let organizes: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM events WHERE organizer_id = $1)")
                    .bind(*id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_err)?;
            if organizes {
                return Err(DomainError::UserHasEvents.into());
            }

            let held = sqlx::query(
                "SELECT event_id, ticket_count FROM bookings
                 WHERE user_id = $1 AND status = 'confirmed'
                 ORDER BY event_id
                 FOR UPDATE",
            )
            .bind(*id.as_uuid())
            .fetch_all(&mut *tx)
            .await
            .map_err(db_err)?;

            for row in &held {
                let event_id = EventId::from_uuid(row.try_get("event_id").map_err(db_err)?);
                let ticket_count: i32 = row.try_get("ticket_count").map_err(db_err)?;

                let mut event = lock_event(&mut tx, event_id).await?;
                inventory::release(&mut event, ticket_count);
                save_availability(&mut tx, &event).await?;
            }

            sqlx::query("DELETE FROM bookings WHERE user_id = $1")
                .bind(*id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(*id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;

            tracing::info!(user_id = %id, released_bookings = held.len(), "User deleted");
            Ok(())
        })
    }
}
