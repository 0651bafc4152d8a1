//! # Ticketing Authentication
//!
//! Password hashing and server-side sessions for the ticketing API.
//!
//! ## Flow
//!
//! ```text
//! register: validate_password → hash_password → UserRepository::create_user
//! login:    find_credentials → verify_password → Session::start → SessionStore::create_session
//! request:  Bearer <session id> → SessionStore::touch_session → live role from UserRepository
//! logout:   SessionStore::delete_session
//! reset:    hash_password → update_password → SessionStore::delete_user_sessions
//! ```
//!
//! Tokens are opaque session identifiers; nothing about the user is encoded
//! in them, so revoking a session takes effect immediately.

pub mod error;
pub mod password;
pub mod providers;
pub mod session;
pub mod stores;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use error::{AuthError, Result};
pub use providers::SessionStore;
pub use session::{Session, SessionId};
