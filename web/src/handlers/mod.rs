//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod bookings;
pub mod events;
pub mod health;
pub mod users;

pub use health::health_check;
