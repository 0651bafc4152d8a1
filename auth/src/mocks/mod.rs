//! In-memory provider implementations for tests.

pub mod session;

pub use session::MockSessionStore;
