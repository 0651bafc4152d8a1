//! Booking endpoints under `/bookings`.

use crate::error::AppError;
use crate::extractors::{ApiJson, ApiPath, SessionUser};
use crate::metrics;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use ticketing_core::access::{
    ensure_booking_owner, ensure_booking_owner_or_admin, ensure_event_owner, require_role,
};
use ticketing_core::inventory::{self, TicketChange};
use ticketing_core::model::{Booking, BookingQuery};
use ticketing_core::types::{BookingId, EventId, Role};
use ticketing_core::DomainError;

/// `POST /bookings` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Event to book
    pub event_id: Option<EventId>,
    /// Number of tickets
    pub ticket_count: Option<i32>,
}

/// Inventory movement reported after a booking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInfo {
    /// Available tickets before the booking
    pub previous_available_tickets: i32,
    /// Available tickets after the booking
    pub current_available_tickets: i32,
    /// Capacity
    pub total_tickets: i32,
}

impl From<TicketChange> for TicketInfo {
    fn from(change: TicketChange) -> Self {
        Self {
            previous_available_tickets: change.previous_available,
            current_available_tickets: change.current_available,
            total_tickets: change.total_tickets,
        }
    }
}

/// `POST /bookings` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    /// Human-readable outcome
    pub message: &'static str,
    /// The new booking
    pub booking: Booking,
    /// Inventory before and after
    pub ticket_info: TicketInfo,
}

/// Every booking (admin).
///
/// # Errors
///
/// 401 / 403 unless admin.
pub async fn list_bookings(
    State(state): State<AppState>,
    caller: SessionUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    require_role(&caller.actor, &[Role::Admin])?;
    Ok(Json(
        state.bookings.list_bookings(BookingQuery::default()).await?,
    ))
}

/// Bookings for an event the caller organizes.
///
/// # Errors
///
/// 401 / 403 unless the owning organizer; 404 for an unknown event.
pub async fn event_bookings(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(event_id): ApiPath<EventId>,
) -> Result<Json<Vec<Booking>>, AppError> {
    require_role(&caller.actor, &[Role::Organizer])?;
    let event = state.events.get_event(event_id).await?;
    ensure_event_owner(&caller.actor, &event, "view bookings for this event")?;

    let bookings = state
        .bookings
        .list_bookings(BookingQuery::for_event(event_id))
        .await?;
    Ok(Json(bookings))
}

/// One booking, for the user who made it or an admin.
///
/// # Errors
///
/// 401 / 403 otherwise; 404 for an unknown booking.
pub async fn get_booking(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<BookingId>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.get_booking(id).await?;
    ensure_booking_owner_or_admin(&caller.actor, &booking, "view this booking")?;
    Ok(Json(booking))
}

/// Books tickets for an approved event (user).
///
/// # Errors
///
/// - 400 for a bad ticket count, an unapproved event or too few tickets
/// - 401 / 403 unless the caller has the `user` role
/// - 404 for an unknown event
pub async fn create_booking(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiJson(body): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingConfirmation>), AppError> {
    require_role(&caller.actor, &[Role::User])?;

    let ticket_count = body.ticket_count.ok_or(DomainError::InvalidTicketCount)?;
    inventory::validate_ticket_count(ticket_count)?;
    let event_id = body
        .event_id
        .ok_or_else(|| DomainError::Validation("Please provide an event".to_string()))?;

    let receipt = state
        .bookings
        .book_tickets(caller.user.id, event_id, ticket_count, state.clock.now())
        .await?;

    metrics::booking_confirmed(ticket_count);
    tracing::info!(
        booking_id = %receipt.booking.id,
        event_id = %event_id,
        user_id = %caller.user.id,
        ticket_count,
        available_tickets = receipt.change.current_available,
        "Booking confirmed"
    );

    Ok((
        StatusCode::CREATED,
        Json(BookingConfirmation {
            message: "Booking confirmed successfully",
            booking: receipt.booking,
            ticket_info: receipt.change.into(),
        }),
    ))
}

/// Cancels one of the caller's bookings and returns its tickets (user).
///
/// # Errors
///
/// 400 if already cancelled; 401 / 403 unless the booking owner; 404 for an
/// unknown booking.
pub async fn cancel_booking(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<BookingId>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller.actor, &[Role::User])?;
    let booking = state.bookings.get_booking(id).await?;
    ensure_booking_owner(&caller.actor, &booking, "cancel this booking")?;

    let booking = state.bookings.cancel_booking(id, state.clock.now()).await?;

    metrics::booking_closed("cancelled", booking.ticket_count);
    tracing::info!(booking_id = %id, user_id = %caller.user.id, "Booking cancelled");
    Ok(Json(json!({ "message": "Booking cancelled successfully", "booking": booking })))
}

/// Deletes one of the caller's bookings, returning its tickets if it was
/// still confirmed (user).
///
/// # Errors
///
/// 401 / 403 unless the booking owner; 404 for an unknown booking.
pub async fn delete_booking(
    State(state): State<AppState>,
    caller: SessionUser,
    ApiPath(id): ApiPath<BookingId>,
) -> Result<Json<Value>, AppError> {
    require_role(&caller.actor, &[Role::User])?;
    let booking = state.bookings.get_booking(id).await?;
    ensure_booking_owner(&caller.actor, &booking, "delete this booking")?;

    let deleted = state.bookings.delete_booking(id).await?;

    let released = released_tickets(&deleted);
    metrics::booking_closed("deleted", released);
    tracing::info!(booking_id = %id, released, "Booking deleted");
    Ok(Json(json!({ "message": "Booking deleted successfully" })))
}

/// Tickets returned to the event by deleting `deleted`, judged by the status
/// the store saw when it removed the booking.
fn released_tickets(deleted: &Booking) -> i32 {
    if deleted.is_confirmed() {
        deleted.ticket_count
    } else {
        0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ticketing_core::environment::Clock;
    use ticketing_core::store::{BookingRepository, EventRepository, UserRepository};
    use ticketing_core::types::EventStatus;
    use ticketing_testing::{InMemoryStore, fixtures, test_clock};

    #[tokio::test]
    async fn released_tickets_follow_the_deleted_status() {
        let store = InMemoryStore::new();
        let now = test_clock().now();
        let organizer = store
            .create_user(fixtures::new_user("olga", Role::Organizer), now)
            .await
            .unwrap();
        let user = store
            .create_user(fixtures::new_user("uma", Role::User), now)
            .await
            .unwrap();
        let event = store
            .create_event(fixtures::new_event(organizer.id, 10), now)
            .await
            .unwrap();
        store
            .set_status(event.id, EventStatus::Approved, now)
            .await
            .unwrap();

        let kept = store.book_tickets(user.id, event.id, 3, now).await.unwrap();
        let cancelled = store.book_tickets(user.id, event.id, 2, now).await.unwrap();

        // A handler that read `cancelled` before this cancel still sees it confirmed.
        let stale = store.get_booking(cancelled.booking.id).await.unwrap();
        store.cancel_booking(cancelled.booking.id, now).await.unwrap();
        assert!(stale.is_confirmed());

        let deleted = store.delete_booking(cancelled.booking.id).await.unwrap();
        assert_eq!(released_tickets(&deleted), 0);

        let deleted = store.delete_booking(kept.booking.id).await.unwrap();
        assert_eq!(released_tickets(&deleted), 3);
        assert_eq!(
            store.get_event(event.id).await.unwrap().available_tickets,
            10
        );
    }
}
