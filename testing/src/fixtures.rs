//! Builders for test data.

use chrono::{DateTime, Duration, Utc};
use ticketing_auth::password::hash_password;
use ticketing_core::model::{NewEvent, NewUser};
use ticketing_core::types::{Role, UserId};

/// Password given to every fixture user.
pub const PASSWORD: &str = "password123";

/// Email used by [`new_user`] for a given name.
#[must_use]
pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

/// A new account named `name` with [`PASSWORD`] and email [`email_for`]`(name)`.
///
/// # Panics
///
/// Panics if hashing fails, which only happens if the RNG is unavailable.
#[must_use]
#[allow(clippy::expect_used)]
pub fn new_user(name: &str, role: Role) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email_for(name),
        password_hash: hash_password(PASSWORD).expect("fixture password should hash"),
        role,
    }
}

/// Date of every fixture event: one month after the test clock.
#[must_use]
pub fn event_date() -> DateTime<Utc> {
    crate::mocks::test_time() + Duration::days(30)
}

/// A new event with `total_tickets` seats at 25.0 each.
#[must_use]
pub fn new_event(organizer: UserId, total_tickets: i32) -> NewEvent {
    NewEvent {
        title: "Rust Conference".to_string(),
        description: "Two days of talks and workshops".to_string(),
        date: event_date(),
        location: "Amsterdam".to_string(),
        price: 25.0,
        total_tickets,
        category: "Tech".to_string(),
        image: String::new(),
        organizer,
    }
}
