//! Ticket inventory rules.
//!
//! These functions are the single source of truth for how `available_tickets`
//! moves. Stores call them inside whatever atomicity they provide (a row lock,
//! a mutex) so the invariant `0 <= available_tickets <= total_tickets` holds
//! for every committed event.
//!
//! Each operation validates first and mutates only on success.

use crate::error::DomainError;
use crate::model::Event;
use crate::types::EventStatus;
use serde::Serialize;

/// Inventory of an event before and after a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketChange {
    /// Available tickets before the change
    pub previous_available: i32,
    /// Available tickets after the change
    pub current_available: i32,
    /// Capacity after the change
    pub total_tickets: i32,
}

/// Outcome of taking tickets from an event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reservation {
    /// Inventory movement
    pub change: TicketChange,
    /// `price * ticket_count`
    pub total_price: f64,
}

/// Booking statistics for one event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    /// Capacity
    pub total_tickets: i32,
    /// Tickets held by confirmed bookings
    pub booked_tickets: i32,
    /// Tickets left
    pub available_tickets: i32,
    /// Booked share of capacity, 0 to 100
    pub percentage_booked: f64,
    /// Number of confirmed bookings
    pub total_bookings: i64,
}

/// Rejects ticket counts below one.
///
/// # Errors
///
/// Returns [`DomainError::InvalidTicketCount`] when `count < 1`.
pub const fn validate_ticket_count(count: i32) -> Result<(), DomainError> {
    if count < 1 {
        return Err(DomainError::InvalidTicketCount);
    }
    Ok(())
}

/// Takes `count` tickets from an approved event.
///
/// # Errors
///
/// - [`DomainError::InvalidTicketCount`] when `count < 1`
/// - [`DomainError::EventNotApproved`] unless the event is approved
/// - [`DomainError::InsufficientTickets`] when fewer than `count` remain
pub fn reserve(event: &mut Event, count: i32) -> Result<Reservation, DomainError> {
    validate_ticket_count(count)?;

    if event.status != EventStatus::Approved {
        return Err(DomainError::EventNotApproved);
    }
    if event.available_tickets < count {
        return Err(DomainError::InsufficientTickets {
            available: event.available_tickets,
        });
    }

    let previous = event.available_tickets;
    event.available_tickets -= count;

    Ok(Reservation {
        change: TicketChange {
            previous_available: previous,
            current_available: event.available_tickets,
            total_tickets: event.total_tickets,
        },
        total_price: event.price * f64::from(count),
    })
}

/// Returns `count` tickets to an event, never exceeding its capacity.
///
/// Releasing works regardless of approval status so cancellations always
/// give their tickets back.
pub fn release(event: &mut Event, count: i32) -> TicketChange {
    let previous = event.available_tickets;
    event.available_tickets = previous
        .saturating_add(count.max(0))
        .min(event.total_tickets);

    TicketChange {
        previous_available: previous,
        current_available: event.available_tickets,
        total_tickets: event.total_tickets,
    }
}

/// Changes the capacity of an event, shifting availability by the same delta.
///
/// # Errors
///
/// - [`DomainError::Validation`] when `new_total < 1`
/// - [`DomainError::TicketsBelowBooked`] when `new_total` is below the tickets
///   already held by bookings
pub fn resize(event: &mut Event, new_total: i32) -> Result<TicketChange, DomainError> {
    if new_total < 1 {
        return Err(DomainError::Validation(
            "Total tickets must be at least 1".to_string(),
        ));
    }

    let booked = event.booked_tickets();
    if new_total < booked {
        return Err(DomainError::TicketsBelowBooked { booked });
    }

    let previous = event.available_tickets;
    event.total_tickets = new_total;
    event.available_tickets = new_total - booked;

    Ok(TicketChange {
        previous_available: previous,
        current_available: event.available_tickets,
        total_tickets: new_total,
    })
}

/// Percentage of `total` that is no longer available; `0` for empty events.
#[must_use]
pub fn booked_percentage(total: i32, available: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    f64::from(total - available) * 100.0 / f64::from(total)
}

/// Summarizes bookings for an event.
#[must_use]
pub fn stats(event: &Event, confirmed_bookings: i64) -> TicketStats {
    TicketStats {
        total_tickets: event.total_tickets,
        booked_tickets: event.booked_tickets(),
        available_tickets: event.available_tickets,
        percentage_booked: event.booked_percentage(),
        total_bookings: confirmed_bookings,
    }
}
