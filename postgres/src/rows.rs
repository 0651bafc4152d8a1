//! SQL fragments and row decoding shared by the repositories.

use crate::db_err;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use ticketing_core::model::{Booking, Event, EventSummary, User, UserSummary};
use ticketing_core::store::StoreError;
use ticketing_core::types::{BookingId, BookingStatus, EventId, EventStatus, Role, UserId};
use ticketing_core::DomainError;

pub(crate) const USER_COLUMNS: &str =
    "id, name, email, role, phone, address, profile_picture, created_at, updated_at";

pub(crate) const EVENT_SELECT: &str = r"
    SELECT e.id, e.title, e.description, e.date, e.location, e.price,
           e.total_tickets, e.available_tickets, e.image, e.status, e.category,
           e.created_at, e.updated_at,
           u.id AS organizer_id, u.name AS organizer_name, u.email AS organizer_email
    FROM events e
    JOIN users u ON u.id = e.organizer_id
";

pub(crate) const BOOKING_SELECT: &str = r"
    SELECT b.id, b.ticket_count, b.total_price, b.status, b.created_at, b.updated_at,
           u.id AS user_id, u.name AS user_name, u.email AS user_email,
           e.id AS event_id, e.title AS event_title, e.date AS event_date,
           e.location AS event_location, e.price AS event_price, e.image AS event_image,
           e.total_tickets AS event_total_tickets,
           e.available_tickets AS event_available_tickets,
           e.status AS event_status
    FROM bookings b
    JOIN users u ON u.id = b.user_id
    JOIN events e ON e.id = b.event_id
";

fn corrupt(column: &str, e: &DomainError) -> StoreError {
    StoreError::Database(format!("Invalid value in column {column}: {e}"))
}

pub(crate) fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role").map_err(db_err)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        role: Role::parse(&role).map_err(|e| corrupt("role", &e))?,
        phone: row.try_get("phone").map_err(db_err)?,
        address: row.try_get("address").map_err(db_err)?,
        profile_picture: row.try_get("profile_picture").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

pub(crate) fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    let status: String = row.try_get("status").map_err(db_err)?;
    Ok(Event {
        id: EventId::from_uuid(row.try_get("id").map_err(db_err)?),
        title: row.try_get("title").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        date: row.try_get("date").map_err(db_err)?,
        location: row.try_get("location").map_err(db_err)?,
        price: row.try_get("price").map_err(db_err)?,
        total_tickets: row.try_get("total_tickets").map_err(db_err)?,
        available_tickets: row.try_get("available_tickets").map_err(db_err)?,
        image: row.try_get("image").map_err(db_err)?,
        organizer: UserSummary {
            id: UserId::from_uuid(row.try_get("organizer_id").map_err(db_err)?),
            name: row.try_get("organizer_name").map_err(db_err)?,
            email: row.try_get("organizer_email").map_err(db_err)?,
        },
        status: EventStatus::parse(&status).map_err(|e| corrupt("status", &e))?,
        category: row.try_get("category").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

pub(crate) fn booking_from_row(row: &PgRow) -> Result<Booking, StoreError> {
    let status: String = row.try_get("status").map_err(db_err)?;
    let event_status: String = row.try_get("event_status").map_err(db_err)?;
    Ok(Booking {
        id: BookingId::from_uuid(row.try_get("id").map_err(db_err)?),
        user: UserSummary {
            id: UserId::from_uuid(row.try_get("user_id").map_err(db_err)?),
            name: row.try_get("user_name").map_err(db_err)?,
            email: row.try_get("user_email").map_err(db_err)?,
        },
        event: EventSummary {
            id: EventId::from_uuid(row.try_get("event_id").map_err(db_err)?),
            title: row.try_get("event_title").map_err(db_err)?,
            date: row.try_get("event_date").map_err(db_err)?,
            location: row.try_get("event_location").map_err(db_err)?,
            price: row.try_get("event_price").map_err(db_err)?,
            image: row.try_get("event_image").map_err(db_err)?,
            total_tickets: row.try_get("event_total_tickets").map_err(db_err)?,
            available_tickets: row.try_get("event_available_tickets").map_err(db_err)?,
            status: EventStatus::parse(&event_status).map_err(|e| corrupt("status", &e))?,
        },
        ticket_count: row.try_get("ticket_count").map_err(db_err)?,
        total_price: row.try_get("total_price").map_err(db_err)?,
        status: BookingStatus::parse(&status).map_err(|e| corrupt("status", &e))?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

/// Loads an event and locks its row until the transaction ends.
pub(crate) async fn lock_event(conn: &mut PgConnection, id: EventId) -> Result<Event, StoreError> {
    let query = format!("{EVENT_SELECT} WHERE e.id = $1 FOR UPDATE OF e");
    let row = sqlx::query(&query)
        .bind(*id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .ok_or_else(StoreError::event_not_found)?;
    event_from_row(&row)
}

/// Writes back the inventory of a locked event.
pub(crate) async fn save_availability(
    conn: &mut PgConnection,
    event: &Event,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE events SET total_tickets = $2, available_tickets = $3, updated_at = $4 WHERE id = $1",
    )
    .bind(*event.id.as_uuid())
    .bind(event.total_tickets)
    .bind(event.available_tickets)
    .bind(event.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

/// Escapes `LIKE` wildcards so user input matches literally.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
