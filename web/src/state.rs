//! Application state for Axum handlers.

use chrono::Duration;
use std::sync::Arc;
use ticketing_auth::SessionStore;
use ticketing_core::environment::Clock;
use ticketing_core::store::{BookingRepository, EventRepository, StoreHealth, UserRepository};

/// Session settings.
#[derive(Clone, Copy, Debug)]
pub struct AuthSettings {
    /// Lifetime of a login session.
    pub session_ttl: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::days(1),
        }
    }
}

/// Application state shared across all HTTP handlers.
///
/// Every dependency is a trait object so the same router runs on
/// `PostgresStore` + Redis in production and on in-memory doubles in tests.
#[derive(Clone)]
pub struct AppState {
    /// Account storage
    pub users: Arc<dyn UserRepository>,
    /// Event storage
    pub events: Arc<dyn EventRepository>,
    /// Booking storage
    pub bookings: Arc<dyn BookingRepository>,
    /// Login sessions
    pub sessions: Arc<dyn SessionStore>,
    /// Readiness probe for the database
    pub health: Arc<dyn StoreHealth>,
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Session settings
    pub auth: AuthSettings,
}

impl AppState {
    /// Builds state from one store that implements every repository.
    #[must_use]
    pub fn new<S>(store: S, sessions: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self
    where
        S: UserRepository
            + EventRepository
            + BookingRepository
            + StoreHealth
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            events: store.clone(),
            bookings: store.clone(),
            health: store,
            sessions,
            clock,
            auth: AuthSettings::default(),
        }
    }

    /// Overrides the session settings.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthSettings) -> Self {
        self.auth = auth;
        self
    }
}
