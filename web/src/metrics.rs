//! Business metrics recorded by the handlers.
//!
//! Without an installed recorder these calls are no-ops, so tests need no
//! setup. The server installs the Prometheus exporter.

/// Registers descriptions for every metric emitted here.
pub fn describe() {
    metrics::describe_counter!(
        "ticketing_bookings_total",
        "Booking lifecycle transitions, labelled by status"
    );
    metrics::describe_counter!("ticketing_tickets_booked_total", "Tickets taken by bookings");
    metrics::describe_counter!(
        "ticketing_tickets_released_total",
        "Tickets returned by cancellations and deletions"
    );
    metrics::describe_counter!("ticketing_events_created_total", "Events submitted for approval");
    metrics::describe_counter!(
        "ticketing_event_status_changes_total",
        "Admin approval decisions, labelled by status"
    );
    metrics::describe_counter!("ticketing_logins_total", "Login attempts, labelled by outcome");
}

/// A confirmed booking took tickets.
pub fn booking_confirmed(ticket_count: i32) {
    metrics::counter!("ticketing_bookings_total", "status" => "confirmed").increment(1);
    metrics::counter!("ticketing_tickets_booked_total").increment(as_count(ticket_count));
}

/// A booking was cancelled or deleted. `released` is zero when it no longer
/// held tickets.
pub fn booking_closed(status: &'static str, released: i32) {
    metrics::counter!("ticketing_bookings_total", "status" => status).increment(1);
    if released > 0 {
        metrics::counter!("ticketing_tickets_released_total").increment(as_count(released));
    }
}

/// An organizer submitted an event.
pub fn event_created() {
    metrics::counter!("ticketing_events_created_total").increment(1);
}

/// An admin set an event's status.
pub fn event_status_changed(status: &'static str) {
    metrics::counter!("ticketing_event_status_changes_total", "status" => status).increment(1);
}

/// A login attempt finished.
pub fn login(outcome: &'static str) {
    metrics::counter!("ticketing_logins_total", "outcome" => outcome).increment(1);
}

fn as_count(value: i32) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
