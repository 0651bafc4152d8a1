//! `BookingRepository` on `PostgreSQL`.

use crate::rows::{BOOKING_SELECT, booking_from_row, lock_event, save_availability};
use crate::{PostgresStore, db_err};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres, QueryBuilder, Row};
use ticketing_core::DomainError;
use ticketing_core::inventory;
use ticketing_core::model::{Booking, BookingQuery, BookingReceipt, UserSummary};
use ticketing_core::store::{BookingRepository, StoreError, StoreFuture};
use ticketing_core::types::{BookingId, BookingStatus, EventId, UserId};

/// Loads a booking and locks its row until the transaction ends.
async fn lock_booking(conn: &mut PgConnection, id: BookingId) -> Result<Booking, StoreError> {
    let query = format!("{BOOKING_SELECT} WHERE b.id = $1 FOR UPDATE OF b");
    let row = sqlx::query(&query)
        .bind(*id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .ok_or_else(StoreError::booking_not_found)?;
    booking_from_row(&row)
}

/// Gives the tickets of a confirmed booking back to its event.
async fn release_tickets(conn: &mut PgConnection, booking: &mut Booking) -> Result<(), StoreError> {
    let mut event = lock_event(conn, booking.event.id).await?;
    let change = inventory::release(&mut event, booking.ticket_count);
    save_availability(conn, &event).await?;

    booking.event = event.summary();
    tracing::debug!(
        booking_id = %booking.id,
        previous_available = change.previous_available,
        current_available = change.current_available,
        "Tickets released"
    );
    Ok(())
}

impl BookingRepository for PostgresStore {
    fn book_tickets(
        &self,
        user: UserId,
        event: EventId,
        ticket_count: i32,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, BookingReceipt> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
                .bind(*user.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::user_not_found)?;
            let booker = UserSummary {
                id: user,
                name: row.try_get("name").map_err(db_err)?,
                email: row.try_get("email").map_err(db_err)?,
            };

            let mut locked = lock_event(&mut tx, event).await?;
            let reservation = inventory::reserve(&mut locked, ticket_count)?;
            locked.updated_at = now;
            save_availability(&mut tx, &locked).await?;

            let id = BookingId::new();
            sqlx::query(
                "INSERT INTO bookings
                    (id, user_id, event_id, ticket_count, total_price, status, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
            )
            .bind(*id.as_uuid())
            .bind(*user.as_uuid())
            .bind(*event.as_uuid())
            .bind(ticket_count)
            .bind(reservation.total_price)
            .bind(BookingStatus::Confirmed.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;

            tracing::info!(
                booking_id = %id,
                event_id = %event,
                user_id = %user,
                ticket_count,
                available_tickets = reservation.change.current_available,
                "Tickets booked"
            );

            Ok(BookingReceipt {
                booking: Booking {
                    id,
                    user: booker,
                    event: locked.summary(),
                    ticket_count,
                    total_price: reservation.total_price,
                    status: BookingStatus::Confirmed,
                    created_at: now,
                    updated_at: now,
                },
                event: locked,
                change: reservation.change,
            })
        })
    }

    fn get_booking(&self, id: BookingId) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let query = format!("{BOOKING_SELECT} WHERE b.id = $1");
            let row = sqlx::query(&query)
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?
                .ok_or_else(StoreError::booking_not_found)?;
            booking_from_row(&row)
        })
    }

    fn list_bookings(&self, query: BookingQuery) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let mut builder = QueryBuilder::<Postgres>::new(BOOKING_SELECT);
            builder.push(" WHERE TRUE");
            if let Some(user) = query.user {
                builder.push(" AND b.user_id = ").push_bind(*user.as_uuid());
            }
            if let Some(event) = query.event {
                builder.push(" AND b.event_id = ").push_bind(*event.as_uuid());
            }
            builder.push(" ORDER BY b.created_at DESC, b.id");

            let rows = builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
            rows.iter().map(booking_from_row).collect()
        })
    }

    fn cancel_booking(&self, id: BookingId, now: DateTime<Utc>) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            let mut booking = lock_booking(&mut tx, id).await?;
            if !booking.is_confirmed() {
                return Err(DomainError::BookingAlreadyCancelled.into());
            }

            release_tickets(&mut tx, &mut booking).await?;

            sqlx::query("UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(*id.as_uuid())
                .bind(BookingStatus::Cancelled.as_str())
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;

            booking.status = BookingStatus::Cancelled;
            booking.updated_at = now;
            tracing::info!(booking_id = %id, ticket_count = booking.ticket_count, "Booking cancelled");
            Ok(booking)
        })
    }

    fn delete_booking(&self, id: BookingId) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(db_err)?;

            let mut booking = lock_booking(&mut tx, id).await?;
            if booking.is_confirmed() {
                release_tickets(&mut tx, &mut booking).await?;
            }

            sqlx::query("DELETE FROM bookings WHERE id = $1")
                .bind(*id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

            tx.commit().await.map_err(db_err)?;

            tracing::info!(booking_id = %id, "Booking deleted");
            Ok(booking)
        })
    }
}
