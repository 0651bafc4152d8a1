//! Role and ownership checks.
//!
//! Handlers resolve the caller into an [`Actor`] and ask these functions
//! before touching a resource. Denials come back as
//! [`DomainError::Forbidden`] with the message shown to the client.

use crate::error::DomainError;
use crate::model::{Booking, Event};
use crate::types::{EventStatus, Role, UserId};

/// The authenticated caller of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    /// Caller's account
    pub user_id: UserId,
    /// Caller's current role
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Requires the caller's role to be one of `allowed`.
///
/// # Errors
///
/// Returns [`DomainError::Forbidden`] naming the caller's role.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), DomainError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    Err(DomainError::Forbidden(format!(
        "User role {} is not authorized to access this route",
        actor.role
    )))
}

/// Requires the caller to own the event. `action` completes the sentence
/// "Not authorized to ...".
///
/// # Errors
///
/// Returns [`DomainError::Forbidden`] if the caller is not the organizer.
pub fn ensure_event_owner(actor: &Actor, event: &Event, action: &str) -> Result<(), DomainError> {
    if event.organizer.id == actor.user_id {
        return Ok(());
    }
    Err(DomainError::Forbidden(format!("Not authorized to {action}")))
}

/// Requires the caller to have made the booking.
///
/// # Errors
///
/// Returns [`DomainError::Forbidden`] if the booking belongs to someone else.
pub fn ensure_booking_owner(
    actor: &Actor,
    booking: &Booking,
    action: &str,
) -> Result<(), DomainError> {
    if booking.user.id == actor.user_id {
        return Ok(());
    }
    Err(DomainError::Forbidden(format!("Not authorized to {action}")))
}

/// Requires the caller to have made the booking or be an admin.
///
/// # Errors
///
/// Returns [`DomainError::Forbidden`] otherwise.
pub fn ensure_booking_owner_or_admin(
    actor: &Actor,
    booking: &Booking,
    action: &str,
) -> Result<(), DomainError> {
    if actor.is_admin() {
        return Ok(());
    }
    ensure_booking_owner(actor, booking, action)
}

/// Whether the caller may see an event.
///
/// Approved events are public. Pending and declined events are visible only
/// to their organizer and to admins.
#[must_use]
pub fn can_view_event(actor: Option<&Actor>, event: &Event) -> bool {
    if event.status == EventStatus::Approved {
        return true;
    }
    actor.is_some_and(|a| a.is_admin() || a.user_id == event.organizer.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::model::UserSummary;
    use crate::types::{BookingId, BookingStatus, EventId};
    use chrono::Utc;

    fn summary(id: UserId) -> UserSummary {
        UserSummary {
            id,
            name: "Someone".to_string(),
            email: "someone@example.com".to_string(),
        }
    }

    fn event(organizer: UserId, status: EventStatus) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            title: "Gala".to_string(),
            description: "Evening gala".to_string(),
            date: now,
            location: "Ballroom".to_string(),
            price: 80.0,
            total_tickets: 50,
            available_tickets: 50,
            image: String::new(),
            organizer: summary(organizer),
            status,
            category: "Social".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn booking(owner: UserId) -> Booking {
        let e = event(UserId::new(), EventStatus::Approved);
        Booking {
            id: BookingId::new(),
            user: summary(owner),
            event: e.summary(),
            ticket_count: 1,
            total_price: 80.0,
            status: BookingStatus::Confirmed,
            created_at: e.created_at,
            updated_at: e.created_at,
        }
    }

    #[test]
    fn role_gate() {
        let user = Actor::new(UserId::new(), Role::User);
        assert!(require_role(&user, &[Role::User]).is_ok());

        let err = require_role(&user, &[Role::Organizer]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User role user is not authorized to access this route"
        );
    }

    #[test]
    fn only_organizer_owns_event() {
        let owner = Actor::new(UserId::new(), Role::Organizer);
        let other = Actor::new(UserId::new(), Role::Organizer);
        let e = event(owner.user_id, EventStatus::Pending);

        assert!(ensure_event_owner(&owner, &e, "update this event").is_ok());
        let err = ensure_event_owner(&other, &e, "update this event").unwrap_err();
        assert_eq!(err.to_string(), "Not authorized to update this event");
    }

    #[test]
    fn admin_can_view_any_booking() {
        let owner = Actor::new(UserId::new(), Role::User);
        let admin = Actor::new(UserId::new(), Role::Admin);
        let stranger = Actor::new(UserId::new(), Role::User);
        let b = booking(owner.user_id);

        assert!(ensure_booking_owner_or_admin(&owner, &b, "view this booking").is_ok());
        assert!(ensure_booking_owner_or_admin(&admin, &b, "view this booking").is_ok());
        assert!(ensure_booking_owner_or_admin(&stranger, &b, "view this booking").is_err());
        assert!(ensure_booking_owner(&admin, &b, "cancel this booking").is_err());
    }

    #[test]
    fn unapproved_events_are_private() {
        let organizer = Actor::new(UserId::new(), Role::Organizer);
        let admin = Actor::new(UserId::new(), Role::Admin);
        let visitor = Actor::new(UserId::new(), Role::User);
        let pending = event(organizer.user_id, EventStatus::Pending);
        let approved = event(organizer.user_id, EventStatus::Approved);

        assert!(can_view_event(None, &approved));
        assert!(!can_view_event(None, &pending));
        assert!(!can_view_event(Some(&visitor), &pending));
        assert!(can_view_event(Some(&organizer), &pending));
        assert!(can_view_event(Some(&admin), &pending));
    }
}
