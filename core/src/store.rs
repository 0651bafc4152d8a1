//! Repository traits for users, events and bookings.
//!
//! # Implementations
//!
//! - `PostgresStore` (in `ticketing-postgres`): production storage
//! - `InMemoryStore` (in `ticketing-testing`): fast, deterministic tests
//!
//! # Atomicity
//!
//! Operations that move tickets (`book_tickets`, `cancel_booking`,
//! `delete_booking`, `update_event`, `delete_user`) must read the event,
//! apply the [`inventory`](crate::inventory) rules and write the result as one
//! unit. Two concurrent bookings for the last ticket must not both succeed.
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! web layer can hold `Arc<dyn UserRepository>` and friends.

use crate::error::DomainError;
use crate::model::{
    Booking, BookingQuery, BookingReceipt, Event, EventQuery, EventUpdate, NewEvent, NewUser,
    ProfileUpdate, User, UserCredentials,
};
use crate::types::{BookingId, EventId, EventStatus, Role, UserId};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by every repository method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors returned by repositories.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Kind of record ("User", "Event", "Booking")
        resource: &'static str,
    },

    /// A unique field already belongs to another record.
    #[error("{resource} already exists")]
    Conflict {
        /// Kind of record ("User")
        resource: &'static str,
    },

    /// The operation would break a business rule.
    #[error(transparent)]
    Rule(#[from] DomainError),

    /// Database connection or query failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// A missing user.
    #[must_use]
    pub const fn user_not_found() -> Self {
        Self::NotFound { resource: "User" }
    }

    /// A missing event.
    #[must_use]
    pub const fn event_not_found() -> Self {
        Self::NotFound { resource: "Event" }
    }

    /// A missing booking.
    #[must_use]
    pub const fn booking_not_found() -> Self {
        Self::NotFound { resource: "Booking" }
    }

    /// An email already used by another account.
    #[must_use]
    pub const fn email_taken() -> Self {
        Self::Conflict { resource: "User" }
    }
}

/// Account storage.
pub trait UserRepository: Send + Sync {
    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// - `Conflict`: email already registered
    /// - `Database`: query failed
    fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> StoreFuture<'_, User>;

    /// Loads an account.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such user
    /// - `Database`: query failed
    fn get_user(&self, id: UserId) -> StoreFuture<'_, User>;

    /// Loads an account and its password hash by (normalized) email.
    ///
    /// Returns `None` when no account uses the email.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn find_credentials(&self, email: String) -> StoreFuture<'_, Option<UserCredentials>>;

    /// Lists every account, newest first.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn list_users(&self) -> StoreFuture<'_, Vec<User>>;

    /// Applies a profile update.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such user
    /// - `Conflict`: new email belongs to another account
    /// - `Database`: query failed
    fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, User>;

    /// Changes an account's role.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such user
    /// - `Database`: query failed
    fn update_role(&self, id: UserId, role: Role, now: DateTime<Utc>) -> StoreFuture<'_, User>;

    /// Replaces the password hash of the account with this email.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no account uses the email
    /// - `Database`: query failed
    fn update_password(
        &self,
        email: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, User>;

    /// Deletes an account, releasing and removing its bookings.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such user
    /// - `Rule(UserHasEvents)`: the user still organizes events
    /// - `Database`: query failed
    fn delete_user(&self, id: UserId) -> StoreFuture<'_, ()>;
}

/// Event storage.
pub trait EventRepository: Send + Sync {
    /// Inserts a pending event with every ticket available.
    ///
    /// # Errors
    ///
    /// - `NotFound`: organizer does not exist
    /// - `Database`: query failed
    fn create_event(&self, event: NewEvent, now: DateTime<Utc>) -> StoreFuture<'_, Event>;

    /// Loads an event with its organizer.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such event
    /// - `Database`: query failed
    fn get_event(&self, id: EventId) -> StoreFuture<'_, Event>;

    /// Lists events matching `query`.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn list_events(&self, query: EventQuery) -> StoreFuture<'_, Vec<Event>>;

    /// Applies an update, resizes inventory and resets the status to pending.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such event
    /// - `Rule(TicketsBelowBooked)`: capacity below tickets already booked
    /// - `Database`: query failed
    fn update_event(
        &self,
        id: EventId,
        update: EventUpdate,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Event>;

    /// Sets the approval status.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such event
    /// - `Database`: query failed
    fn set_status(
        &self,
        id: EventId,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Event>;

    /// Deletes an event and its cancelled bookings.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such event
    /// - `Rule(EventHasBookings)`: confirmed bookings exist
    /// - `Database`: query failed
    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()>;

    /// Counts confirmed bookings for an event.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn count_confirmed_bookings(&self, id: EventId) -> StoreFuture<'_, i64>;
}

/// Booking storage.
pub trait BookingRepository: Send + Sync {
    /// Reserves tickets and records a confirmed booking.
    ///
    /// # Errors
    ///
    /// - `NotFound`: event or user does not exist
    /// - `Rule(..)`: see [`inventory::reserve`](crate::inventory::reserve)
    /// - `Database`: query failed
    fn book_tickets(
        &self,
        user: UserId,
        event: EventId,
        ticket_count: i32,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, BookingReceipt>;

    /// Loads a booking with user and event.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such booking
    /// - `Database`: query failed
    fn get_booking(&self, id: BookingId) -> StoreFuture<'_, Booking>;

    /// Lists bookings matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// - `Database`: query failed
    fn list_bookings(&self, query: BookingQuery) -> StoreFuture<'_, Vec<Booking>>;

    /// Cancels a confirmed booking and returns its tickets.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such booking
    /// - `Rule(BookingAlreadyCancelled)`: already cancelled
    /// - `Database`: query failed
    fn cancel_booking(&self, id: BookingId, now: DateTime<Utc>) -> StoreFuture<'_, Booking>;

    /// Deletes a booking, returning its tickets if it was still confirmed.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such booking
    /// - `Database`: query failed
    fn delete_booking(&self, id: BookingId) -> StoreFuture<'_, Booking>;
}

/// Readiness probe for the backing store.
pub trait StoreHealth: Send + Sync {
    /// Round-trips a trivial request to the backend.
    ///
    /// # Errors
    ///
    /// - `Database`: the backend is unreachable
    fn ping(&self) -> StoreFuture<'_, ()>;
}
