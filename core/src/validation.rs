//! Field validation for incoming documents.
//!
//! Validators take ownership and return the normalized value (trimmed
//! strings) so callers store exactly what was checked.

use crate::error::DomainError;
use crate::model::{EventUpdate, NewEvent, ProfileUpdate};

/// Trims `value` and rejects it when empty.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] naming `field`.
pub fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("Please provide {field}")));
    }
    Ok(trimmed.to_string())
}

/// Ticket prices must be finite and not negative.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] otherwise.
pub fn price(value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(value)
}

/// Events need at least one ticket.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] when `value < 1`.
pub fn total_tickets(value: i32) -> Result<i32, DomainError> {
    if value < 1 {
        return Err(DomainError::Validation(
            "Total tickets must be at least 1".to_string(),
        ));
    }
    Ok(value)
}

fn optional(field: &str, value: Option<String>) -> Result<Option<String>, DomainError> {
    value.map(|v| required(field, &v)).transpose()
}

/// Validates and normalizes a new event.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] for the first invalid field.
pub fn new_event(event: NewEvent) -> Result<NewEvent, DomainError> {
    Ok(NewEvent {
        title: required("a title", &event.title)?,
        description: required("a description", &event.description)?,
        location: required("a location", &event.location)?,
        category: required("a category", &event.category)?,
        price: price(event.price)?,
        total_tickets: total_tickets(event.total_tickets)?,
        image: event.image.trim().to_string(),
        ..event
    })
}

/// Validates the fields present in an event update.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] for the first invalid field.
pub fn event_update(update: EventUpdate) -> Result<EventUpdate, DomainError> {
    Ok(EventUpdate {
        title: optional("a title", update.title)?,
        description: optional("a description", update.description)?,
        location: optional("a location", update.location)?,
        category: optional("a category", update.category)?,
        price: update.price.map(price).transpose()?,
        total_tickets: update.total_tickets.map(total_tickets).transpose()?,
        image: update.image.map(|i| i.trim().to_string()),
        date: update.date,
    })
}

/// Validates the fields present in a profile update.
///
/// Empty optional contact fields are kept as given so they can be cleared.
///
/// # Errors
///
/// Returns [`DomainError::Validation`] when the name or email is blank.
pub fn profile_update(update: ProfileUpdate) -> Result<ProfileUpdate, DomainError> {
    Ok(ProfileUpdate {
        name: optional("a name", update.name)?,
        email: optional("an email", update.email)?.map(|e| e.to_lowercase()),
        phone: update.phone.map(|p| p.trim().to_string()),
        address: update.address.map(|a| a.trim().to_string()),
        profile_picture: update.profile_picture.map(|p| p.trim().to_string()),
    })
}
