//! # Ticketing Core
//!
//! Domain types and rules for the event ticketing service.
//!
//! Organizers create events, admins approve them and users book tickets.
//! This crate holds everything that does not touch I/O:
//!
//! - **types**: identifiers, roles and statuses
//! - **model**: users, events and bookings as exchanged over the API
//! - **inventory**: ticket arithmetic for booking, cancellation and resizing
//! - **access**: role and ownership checks
//! - **validation**: field checks for incoming documents
//! - **store**: repository traits implemented by the storage crates
//! - **environment**: injected dependencies such as the clock
//!
//! ## Example
//!
//! ```ignore
//! use ticketing_core::inventory;
//!
//! // Inside a store transaction, with the event row locked:
//! let reservation = inventory::reserve(&mut event, 2)?;
//! assert_eq!(reservation.change.current_available, event.available_tickets);
//! ```

pub mod access;
pub mod error;
pub mod inventory;
pub mod model;
pub mod store;
pub mod types;
pub mod validation;

pub use error::DomainError;
pub use store::StoreError;
pub use types::{BookingId, BookingStatus, EventId, EventStatus, Role, UserId};

/// Environment traits for dependency injection.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
