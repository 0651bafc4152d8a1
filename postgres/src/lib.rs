//! `PostgreSQL` storage for the event ticketing service.
//!
//! [`PostgresStore`] implements the repository traits from `ticketing-core`
//! on a shared [`PgPool`]. Queries are built at runtime with `sqlx::query`,
//! so no database is needed at compile time.
//!
//! Every operation that moves tickets runs in one transaction that locks the
//! event row (`SELECT ... FOR UPDATE`) before applying the inventory rules,
//! so concurrent bookings for the last seats are serialized.
//!
//! # Example
//!
//! ```ignore
//! use ticketing_postgres::PostgresStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresStore::new("postgres://localhost/ticketing").await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bookings;
mod events;
mod rows;
mod users;

use sqlx::PgPool;
use ticketing_core::store::{StoreError, StoreFuture, StoreHealth};

/// `PostgreSQL`-backed store for users, events and bookings.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to `database_url` with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(db_err)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }
}

impl StoreHealth for PostgresStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
            Ok(())
        })
    }
}

/// Maps a driver error, counting it.
pub(crate) fn db_err(e: sqlx::Error) -> StoreError {
    metrics::counter!("ticketing_store_errors_total").increment(1);
    tracing::warn!(error = %e, "Database error");
    StoreError::Database(e.to_string())
}

/// Maps a unique-constraint violation to a conflict.
pub(crate) fn unique_violation_as(e: sqlx::Error, conflict: StoreError) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return conflict;
        }
    }
    db_err(e)
}

/// Maps a foreign-key violation to a missing record.
pub(crate) fn foreign_key_violation_as(e: sqlx::Error, missing: StoreError) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_foreign_key_violation() {
            return missing;
        }
    }
    db_err(e)
}
