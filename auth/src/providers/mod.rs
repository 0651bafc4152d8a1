//! Authentication providers.
//!
//! Traits for the external dependencies of the auth layer, so handlers can be
//! tested against in-memory implementations.

pub mod session;

pub use session::{SessionFuture, SessionStore};
