//! Business rule violations.

use thiserror::Error;

/// A request that breaks a ticketing rule.
///
/// Messages are user-facing and are returned verbatim in HTTP error bodies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ═══════════════════════════════════════════════════════════
    // Inventory
    // ═══════════════════════════════════════════════════════════

    /// Ticket count missing, zero or negative.
    #[error("Please specify a valid ticket count")]
    InvalidTicketCount,

    /// Bookings are only accepted for approved events.
    #[error("Cannot book tickets for an unapproved event")]
    EventNotApproved,

    /// Fewer tickets left than requested.
    #[error("Not enough tickets available. Only {available} tickets left.")]
    InsufficientTickets {
        /// Tickets still available
        available: i32,
    },

    /// An event cannot shrink below what has already been sold.
    #[error("Total tickets cannot be less than the {booked} tickets already booked")]
    TicketsBelowBooked {
        /// Tickets currently held by bookings
        booked: i32,
    },

    /// Booking was cancelled before.
    #[error("Booking is already cancelled")]
    BookingAlreadyCancelled,

    /// Events with confirmed bookings cannot be deleted.
    #[error("Cannot delete event with existing bookings")]
    EventHasBookings,

    /// Organizers must remove their events before their account goes.
    #[error("Cannot delete a user who still organizes events")]
    UserHasEvents,

    // ═══════════════════════════════════════════════════════════
    // Input
    // ═══════════════════════════════════════════════════════════

    /// Unknown role name.
    #[error("Invalid role")]
    InvalidRole,

    /// Unknown status name.
    #[error("Invalid status value")]
    InvalidStatus,

    /// Field validation failed.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // Access control
    // ═══════════════════════════════════════════════════════════

    /// Caller lacks the role or ownership required.
    #[error("{0}")]
    Forbidden(String),
}

impl DomainError {
    /// Returns `true` if this error denies access rather than rejecting input.
    #[must_use]
    pub const fn is_access_denial(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}
