//! Session store trait.

use crate::error::Result;
use crate::session::{Session, SessionId};
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::pin::Pin;
use ticketing_core::types::UserId;

/// Boxed future returned by [`SessionStore`] methods.
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Session store.
///
/// This trait abstracts over session storage (Redis in production, an
/// in-memory map in tests).
///
/// # Implementation Notes
///
/// - Sessions carry their own `expires_at`; the backend TTL mirrors it
/// - `touch_session` moves `last_active` without extending expiry
/// - Explicit boxed futures so the web layer can hold `Arc<dyn SessionStore>`
pub trait SessionStore: Send + Sync {
    /// Create session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend request fails
    /// - Session ID already exists
    fn create_session(&self, session: Session, ttl: Duration) -> SessionFuture<'_, ()>;

    /// Get session, judging expiry against the wall clock.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend request fails
    /// - Session not found → `AuthError::SessionNotFound`
    /// - Session expired → `AuthError::SessionExpired`
    fn get_session(&self, session_id: SessionId) -> SessionFuture<'_, Session>;

    /// Record activity at `now` and return the updated session.
    ///
    /// Expiry is judged against `now`, so callers with an injected clock see
    /// consistent results.
    ///
    /// # Errors
    ///
    /// Same as [`get_session`](Self::get_session).
    fn touch_session(
        &self,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> SessionFuture<'_, Session>;

    /// Delete session. Deleting an unknown session succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the backend request fails.
    fn delete_session(&self, session_id: SessionId) -> SessionFuture<'_, ()>;

    /// Delete all sessions for a user, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns error if the backend request fails.
    fn delete_user_sessions(&self, user_id: UserId) -> SessionFuture<'_, usize>;
}
