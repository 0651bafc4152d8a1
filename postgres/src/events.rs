//! `EventRepository` on `PostgreSQL`.

use crate::rows::{EVENT_SELECT, event_from_row, like_pattern, lock_event};
use crate::{PostgresStore, db_err, foreign_key_violation_as};
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use ticketing_core::DomainError;
use ticketing_core::model::{Event, EventQuery, EventSort, EventUpdate, NewEvent};
use ticketing_core::store::{EventRepository, StoreError, StoreFuture};
use ticketing_core::types::{EventId, EventStatus};

impl EventRepository for PostgresStore {
    fn create_event(&self, event: NewEvent, now: DateTime<Utc>) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let id = EventId::new();
            sqlx::query(
                "INSERT INTO events
                    (id, title, description, date, location, price, total_tickets,
                     available_tickets, image, organizer_id, status, category,
                     created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9, $10, $11, $12, $12)",
            )
            .bind(*id.as_uuid())
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(event.price)
            .bind(event.total_tickets)
            .bind(&event.image)
            .bind(*event.organizer.as_uuid())
            .bind(EventStatus::Pending.as_str())
            .bind(&event.category)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| foreign_key_violation_as(e, StoreError::user_not_found()))?;

            tracing::info!(event_id = %id, organizer = %event.organizer, "Event created");
            self.get_event(id).await
        })
    }

    fn get_event(&self, id: EventId) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let query = format!("{EVENT_SELECT} WHERE e.id = $1");
            let row = sqlx::query(&query)
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::event_not_found)?;
            event_from_row(&row)
        })
    }

    fn list_events(&self, query: EventQuery) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let mut builder = QueryBuilder::<Postgres>::new(EVENT_SELECT);
            builder.push(" WHERE TRUE");

            if let Some(status) = query.status {
                builder.push(" AND e.status = ").push_bind(status.as_str());
            }
            if let Some(organizer) = query.organizer {
                builder
                    .push(" AND e.organizer_id = ")
                    .push_bind(*organizer.as_uuid());
            }
            if let Some(category) = query.category {
                builder
                    .push(" AND LOWER(e.category) = LOWER(")
                    .push_bind(category)
                    .push(")");
            }
            if let Some(search) = query.search {
                let pattern = like_pattern(&search);
                builder
                    .push(" AND (e.title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR e.description ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR e.location ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }

            builder.push(match query.sort {
                EventSort::DateAscending => " ORDER BY e.date ASC, e.created_at ASC",
                EventSort::NewestFirst => " ORDER BY e.created_at DESC",
            });

            let rows = builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
            rows.iter().map(event_from_row).collect()
        })
    }

    fn update_event(
        &self,
        id: EventId,
        update: EventUpdate,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            let mut event = lock_event(&mut tx, id).await?;
            event.apply_update(update, now)?;

            sqlx::query(
                "UPDATE events SET
                    title = $2, description = $3, date = $4, location = $5, price = $6,
                    total_tickets = $7, available_tickets = $8, image = $9, status = $10,
                    category = $11, updated_at = $12
                 WHERE id = $1",
            )
            .bind(*id.as_uuid())
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.location)
            .bind(event.price)
            .bind(event.total_tickets)
            .bind(event.available_tickets)
            .bind(&event.image)
            .bind(event.status.as_str())
            .bind(&event.category)
            .bind(event.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;

            tracing::info!(
                event_id = %id,
                total_tickets = event.total_tickets,
                available_tickets = event.available_tickets,
                "Event updated"
            );
            Ok(event)
        })
    }

    fn set_status(
        &self,
        id: EventId,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let result = sqlx::query("UPDATE events SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(*id.as_uuid())
                .bind(status.as_str())
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::event_not_found());
            }

            tracing::info!(event_id = %id, status = %status, "Event status changed");
            self.get_event(id).await
        })
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
                .bind(*id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::event_not_found)?;

            let confirmed: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bookings WHERE event_id = $1 AND status = 'confirmed'",
            )
            .bind(*id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
            if confirmed > 0 {
                return Err(DomainError::EventHasBookings.into());
            }

            sqlx::query("DELETE FROM bookings WHERE event_id = $1")
                .bind(*id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
            sqlx::query("DELETE FROM events WHERE id = $1")
                .bind(*id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;

            tracing::info!(event_id = %id, "Event deleted");
            Ok(())
        })
    }

    fn count_confirmed_bookings(&self, id: EventId) -> StoreFuture<'_, i64> {
        Box::pin(async move {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM bookings WHERE event_id = $1 AND status = 'confirmed'",
            )
            .bind(*id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
        })
    }
}
