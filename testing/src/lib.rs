//! # Ticketing Testing
//!
//! Testing utilities for the event ticketing service.
//!
//! This crate provides:
//! - [`InMemoryStore`]: every repository trait over an in-memory map
//! - [`FixedClock`]: deterministic time
//! - [`fixtures`]: builders for users and events
//!
//! ## Example
//!
//! ```ignore
//! use ticketing_testing::{fixtures, test_clock, InMemoryStore};
//!
//! #[tokio::test]
//! async fn books_tickets() {
//!     let store = InMemoryStore::new();
//!     let now = test_clock().now();
//!     let organizer = store.create_user(fixtures::new_user("olga", Role::Organizer), now).await?;
//!     let event = store.create_event(fixtures::new_event(organizer.id, 10), now).await?;
//!     // ...
//! }
//! ```

use chrono::{DateTime, Utc};
use ticketing_core::environment::Clock;

pub mod fixtures;
pub mod store;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::TimeZone;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketing_testing::mocks::FixedClock;
    /// use ticketing_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// 2025-01-01 00:00:00 UTC, the time of [`test_clock`].
    #[must_use]
    pub fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use store::InMemoryStore;
