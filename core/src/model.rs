//! Documents exchanged between the store, the domain rules and the HTTP layer.
//!
//! Serialized field names follow the public JSON contract: camelCase keys and
//! `_id` for document identifiers. Password hashes live only in
//! [`UserCredentials`], which is never serialized.

use crate::error::DomainError;
use crate::inventory;
use crate::types::{BookingId, BookingStatus, EventId, EventStatus, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// Users
// ============================================================================

/// A registered account.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email (stored lowercased)
    pub email: String,
    /// Access role
    pub role: Role,
    /// Contact phone number
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Avatar URL
    pub profile_picture: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Compact form embedded in events and bookings.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// A user together with the stored password hash, used only for login.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    /// The account
    pub user: User,
    /// Argon2 PHC string
    pub password_hash: String,
}

/// Name and email of a user, embedded in other documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Account identifier
    #[serde(rename = "_id")]
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
}

/// Input for account creation.
#[derive(Clone, Debug)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login email, already normalized
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Initial role
    pub role: Role,
}

/// Partial profile change; `None` keeps the stored value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New login email
    pub email: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New postal address
    pub address: Option<String>,
    /// New avatar URL
    pub profile_picture: Option<String>,
}

// ============================================================================
// Events
// ============================================================================

/// A ticketed event.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Long description
    pub description: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue or address
    pub location: String,
    /// Price of one ticket
    pub price: f64,
    /// Capacity
    pub total_tickets: i32,
    /// Tickets not held by confirmed bookings
    pub available_tickets: i32,
    /// Image URL (empty when none)
    pub image: String,
    /// Organizer who owns the event
    pub organizer: UserSummary,
    /// Approval status
    pub status: EventStatus,
    /// Free-form category
    pub category: String,
    /// When the event was created
    pub created_at: DateTime<Utc>,
    /// When the event was last modified
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Tickets currently held by confirmed bookings.
    #[must_use]
    pub const fn booked_tickets(&self) -> i32 {
        self.total_tickets - self.available_tickets
    }

    /// Percentage of capacity that has been booked.
    #[must_use]
    pub fn booked_percentage(&self) -> f64 {
        inventory::booked_percentage(self.total_tickets, self.available_tickets)
    }

    /// Applies a partial update: resizes inventory when capacity changes and
    /// sends the event back to `pending`. Leaves the event untouched on error.
    ///
    /// # Errors
    ///
    /// See [`inventory::resize`].
    pub fn apply_update(&mut self, update: EventUpdate, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(total) = update.total_tickets {
            inventory::resize(self, total)?;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        self.status = EventStatus::Pending;
        self.updated_at = now;
        Ok(())
    }

    /// Compact form embedded in bookings.
    #[must_use]
    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id,
            title: self.title.clone(),
            date: self.date,
            location: self.location.clone(),
            price: self.price,
            image: self.image.clone(),
            total_tickets: self.total_tickets,
            available_tickets: self.available_tickets,
            status: self.status,
        }
    }
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Document<'a> {
            #[serde(rename = "_id")]
            id: EventId,
            title: &'a str,
            description: &'a str,
            date: DateTime<Utc>,
            location: &'a str,
            price: f64,
            total_tickets: i32,
            available_tickets: i32,
            image: &'a str,
            organizer: &'a UserSummary,
            status: EventStatus,
            category: &'a str,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
            booked_percentage: f64,
        }

        Document {
            id: self.id,
            title: &self.title,
            description: &self.description,
            date: self.date,
            location: &self.location,
            price: self.price,
            total_tickets: self.total_tickets,
            available_tickets: self.available_tickets,
            image: &self.image,
            organizer: &self.organizer,
            status: self.status,
            category: &self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
            booked_percentage: self.booked_percentage(),
        }
        .serialize(serializer)
    }
}

/// Event fields embedded in bookings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Event identifier
    #[serde(rename = "_id")]
    pub id: EventId,
    /// Event title
    pub title: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue or address
    pub location: String,
    /// Price of one ticket
    pub price: f64,
    /// Image URL
    pub image: String,
    /// Capacity
    pub total_tickets: i32,
    /// Tickets left
    pub available_tickets: i32,
    /// Approval status
    pub status: EventStatus,
}

/// Input for event creation.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEvent {
    /// Event title
    pub title: String,
    /// Long description
    pub description: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue or address
    pub location: String,
    /// Price of one ticket
    pub price: f64,
    /// Capacity; all tickets start available
    pub total_tickets: i32,
    /// Free-form category
    pub category: String,
    /// Image URL
    pub image: String,
    /// Owning organizer
    pub organizer: UserId,
}

/// Partial event change; `None` keeps the stored value.
///
/// Any applied update sends the event back to `pending`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New date
    pub date: Option<DateTime<Utc>>,
    /// New location
    pub location: Option<String>,
    /// New ticket price
    pub price: Option<f64>,
    /// New capacity; available tickets shift by the same delta
    pub total_tickets: Option<i32>,
    /// New category
    pub category: Option<String>,
    /// New image URL
    pub image: Option<String>,
}

/// Ordering for event listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventSort {
    /// Soonest events first
    #[default]
    DateAscending,
    /// Most recently created first
    NewestFirst,
}

/// Filter for event listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Only events with this status
    pub status: Option<EventStatus>,
    /// Only events owned by this organizer
    pub organizer: Option<UserId>,
    /// Only events in this category (case-insensitive)
    pub category: Option<String>,
    /// Case-insensitive substring of title, description or location
    pub search: Option<String>,
    /// Result ordering
    pub sort: EventSort,
}

impl EventQuery {
    /// Events visible on the public listing.
    #[must_use]
    pub fn approved() -> Self {
        Self {
            status: Some(EventStatus::Approved),
            ..Self::default()
        }
    }

    /// Events awaiting review, newest first.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            status: Some(EventStatus::Pending),
            sort: EventSort::NewestFirst,
            ..Self::default()
        }
    }

    /// Events owned by an organizer, newest first.
    #[must_use]
    pub fn organized_by(organizer: UserId) -> Self {
        Self {
            organizer: Some(organizer),
            sort: EventSort::NewestFirst,
            ..Self::default()
        }
    }

    /// Whether an event passes every filter of this query.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if self.status.is_some_and(|status| status != event.status) {
            return false;
        }
        if self.organizer.is_some_and(|organizer| organizer != event.organizer.id) {
            return false;
        }
        if let Some(category) = &self.category {
            if !event.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let found = [&event.title, &event.description, &event.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Tickets booked by a user for an event.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking identifier
    #[serde(rename = "_id")]
    pub id: BookingId,
    /// Who booked
    pub user: UserSummary,
    /// What was booked
    pub event: EventSummary,
    /// Number of tickets
    pub ticket_count: i32,
    /// Price paid (ticket price at booking time times count)
    pub total_price: f64,
    /// Lifecycle status
    pub status: BookingStatus,
    /// When the booking was made
    pub created_at: DateTime<Utc>,
    /// When the booking was last modified
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the booking still holds tickets.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// Filter for booking listings. Results are always newest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BookingQuery {
    /// Only bookings made by this user
    pub user: Option<UserId>,
    /// Only bookings for this event
    pub event: Option<EventId>,
}

impl BookingQuery {
    /// Bookings made by a user.
    #[must_use]
    pub const fn for_user(user: UserId) -> Self {
        Self {
            user: Some(user),
            event: None,
        }
    }

    /// Bookings for an event.
    #[must_use]
    pub const fn for_event(event: EventId) -> Self {
        Self {
            user: None,
            event: Some(event),
        }
    }

    /// Whether a booking passes this filter.
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        self.user.is_none_or(|user| user == booking.user.id)
            && self.event.is_none_or(|event| event == booking.event.id)
    }
}

/// Result of a successful booking.
#[derive(Clone, Debug, PartialEq)]
pub struct BookingReceipt {
    /// The new booking
    pub booking: Booking,
    /// The event after its tickets were taken
    pub event: Event,
    /// Inventory before and after
    pub change: inventory::TicketChange,
}
