//! In-memory implementation of every repository trait.
//!
//! All state sits behind one mutex, so each operation is atomic the same way
//! a transaction over locked rows is in the PostgreSQL store. Documents are
//! populated on read from the current users and events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use ticketing_core::inventory;
use ticketing_core::model::{
    Booking, BookingQuery, BookingReceipt, Event, EventQuery, EventSort, EventUpdate, NewEvent,
    NewUser, ProfileUpdate, User, UserCredentials,
};
use ticketing_core::store::{
    BookingRepository, EventRepository, StoreError, StoreFuture, StoreHealth, UserRepository,
};
use ticketing_core::types::{BookingId, BookingStatus, EventId, EventStatus, Role, UserId};
use ticketing_core::DomainError;

struct UserRecord {
    user: User,
    password_hash: String,
    seq: u64,
}

struct EventRecord {
    event: Event,
    seq: u64,
}

#[derive(Clone)]
struct BookingRecord {
    id: BookingId,
    user: UserId,
    event: EventId,
    ticket_count: i32,
    total_price: f64,
    status: BookingStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    events: HashMap<EventId, EventRecord>,
    bookings: HashMap<BookingId, BookingRecord>,
    seq: u64,
}

impl State {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn email_owner(&self, email: &str) -> Option<UserId> {
        self.users
            .values()
            .find(|r| r.user.email == email)
            .map(|r| r.user.id)
    }

    fn populate_event(&self, event: &Event) -> Event {
        let mut event = event.clone();
        if let Some(organizer) = self.users.get(&event.organizer.id) {
            event.organizer = organizer.user.summary();
        }
        event
    }

    fn event(&self, id: EventId) -> Result<Event, StoreError> {
        self.events
            .get(&id)
            .map(|r| self.populate_event(&r.event))
            .ok_or_else(StoreError::event_not_found)
    }

    fn populate_booking(&self, record: &BookingRecord) -> Result<Booking, StoreError> {
        let user = self
            .users
            .get(&record.user)
            .ok_or_else(|| StoreError::Database("booking references a missing user".into()))?;
        let event = self
            .events
            .get(&record.event)
            .ok_or_else(|| StoreError::Database("booking references a missing event".into()))?;

        Ok(Booking {
            id: record.id,
            user: user.user.summary(),
            event: event.event.summary(),
            ticket_count: record.ticket_count,
            total_price: record.total_price,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Returns a confirmed booking's tickets to its event.
    fn release_booking(&mut self, record: &BookingRecord) {
        if record.status != BookingStatus::Confirmed {
            return;
        }
        if let Some(event) = self.events.get_mut(&record.event) {
            inventory::release(&mut event.event, record.ticket_count);
        }
    }

    fn confirmed_bookings(&self, event: EventId) -> i64 {
        let count = self
            .bookings
            .values()
            .filter(|b| b.event == event && b.status == BookingStatus::Confirmed)
            .count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }
}

/// Thread-safe in-memory store for users, events and bookings.
///
/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Database("Mutex lock failed".to_string()))
    }

    /// Number of bookings held, cancelled ones included (for testing).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn booking_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.bookings.len())
    }
}

impl StoreHealth for InMemoryStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.lock().map(|_| ()) })
    }
}

impl UserRepository for InMemoryStore {
    fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let mut state = self.lock()?;
            if state.email_owner(&user.email).is_some() {
                return Err(StoreError::email_taken());
            }

            let created = User {
                id: UserId::new(),
                name: user.name,
                email: user.email,
                role: user.role,
                phone: None,
                address: None,
                profile_picture: None,
                created_at: now,
                updated_at: now,
            };
            let seq = state.next_seq();
            state.users.insert(
                created.id,
                UserRecord {
                    user: created.clone(),
                    password_hash: user.password_hash,
                    seq,
                },
            );
            Ok(created)
        })
    }

    fn get_user(&self, id: UserId) -> StoreFuture<'_, User> {
        Box::pin(async move {
            self.lock()?
                .users
                .get(&id)
                .map(|r| r.user.clone())
                .ok_or_else(StoreError::user_not_found)
        })
    }

    fn find_credentials(&self, email: String) -> StoreFuture<'_, Option<UserCredentials>> {
        Box::pin(async move {
            Ok(self
                .lock()?
                .users
                .values()
                .find(|r| r.user.email == email)
                .map(|r| UserCredentials {
                    user: r.user.clone(),
                    password_hash: r.password_hash.clone(),
                }))
        })
    }

    fn list_users(&self) -> StoreFuture<'_, Vec<User>> {
        Box::pin(async move {
            let state = self.lock()?;
            let mut records: Vec<&UserRecord> = state.users.values().collect();
            records.sort_by(|a, b| (b.user.created_at, b.seq).cmp(&(a.user.created_at, a.seq)));
            Ok(records.into_iter().map(|r| r.user.clone()).collect())
        })
    }

    fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let mut state = self.lock()?;
            if let Some(email) = &update.email {
                if state.email_owner(email).is_some_and(|owner| owner != id) {
                    return Err(StoreError::email_taken());
                }
            }

            let record = state
                .users
                .get_mut(&id)
                .ok_or_else(StoreError::user_not_found)?;
            let user = &mut record.user;
            if let Some(name) = update.name {
                user.name = name;
            }
            if let Some(email) = update.email {
                user.email = email;
            }
            if let Some(phone) = update.phone {
                user.phone = Some(phone).filter(|p| !p.is_empty());
            }
            if let Some(address) = update.address {
                user.address = Some(address).filter(|a| !a.is_empty());
            }
            if let Some(picture) = update.profile_picture {
                user.profile_picture = Some(picture).filter(|p| !p.is_empty());
            }
            user.updated_at = now;
            Ok(user.clone())
        })
    }

    fn update_role(&self, id: UserId, role: Role, now: DateTime<Utc>) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let record = state
                .users
                .get_mut(&id)
                .ok_or_else(StoreError::user_not_found)?;
            record.user.role = role;
            record.user.updated_at = now;
            Ok(record.user.clone())
        })
    }

    fn update_password(
        &self,
        email: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let record = state
                .users
                .values_mut()
                .find(|r| r.user.email == email)
                .ok_or_else(StoreError::user_not_found)?;
            record.password_hash = password_hash;
            record.user.updated_at = now;
            Ok(record.user.clone())
        })
    }

    fn delete_user(&self, id: UserId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.lock()?;
            if !state.users.contains_key(&id) {
                return Err(StoreError::user_not_found());
            }
            if state.events.values().any(|r| r.event.organizer.id == id) {
                return Err(DomainError::UserHasEvents.into());
            }

            let owned: Vec<BookingRecord> = state
                .bookings
                .values()
                .filter(|b| b.user == id)
                .cloned()
                .collect();
            for record in &owned {
                state.release_booking(record);
                state.bookings.remove(&record.id);
            }
            state.users.remove(&id);
            Ok(())
        })
    }
}

impl EventRepository for InMemoryStore {
    fn create_event(&self, event: NewEvent, now: DateTime<Utc>) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let organizer = state
                .users
                .get(&event.organizer)
                .map(|r| r.user.summary())
                .ok_or_else(StoreError::user_not_found)?;

            let created = Event {
                id: EventId::new(),
                title: event.title,
                description: event.description,
                date: event.date,
                location: event.location,
                price: event.price,
                total_tickets: event.total_tickets,
                available_tickets: event.total_tickets,
                image: event.image,
                organizer,
                status: EventStatus::Pending,
                category: event.category,
                created_at: now,
                updated_at: now,
            };
            let seq = state.next_seq();
            state.events.insert(
                created.id,
                EventRecord {
                    event: created.clone(),
                    seq,
                },
            );
            Ok(created)
        })
    }

    fn get_event(&self, id: EventId) -> StoreFuture<'_, Event> {
        Box::pin(async move { self.lock()?.event(id) })
    }

    fn list_events(&self, query: EventQuery) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let state = self.lock()?;
            let mut records: Vec<(Event, u64)> = state
                .events
                .values()
                .map(|r| (state.populate_event(&r.event), r.seq))
                .filter(|(event, _)| query.matches(event))
                .collect();

            match query.sort {
                EventSort::DateAscending => {
                    records.sort_by(|(a, sa), (b, sb)| (a.date, sa).cmp(&(b.date, sb)));
                }
                EventSort::NewestFirst => {
                    records.sort_by(|(a, sa), (b, sb)| (b.created_at, sb).cmp(&(a.created_at, sa)));
                }
            }
            Ok(records.into_iter().map(|(event, _)| event).collect())
        })
    }

    fn update_event(
        &self,
        id: EventId,
        update: EventUpdate,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let record = state
                .events
                .get_mut(&id)
                .ok_or_else(StoreError::event_not_found)?;

            let mut draft = record.event.clone();
            draft.apply_update(update, now)?;
            record.event = draft;
            state.event(id)
        })
    }

    fn set_status(
        &self,
        id: EventId,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, Event> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let record = state
                .events
                .get_mut(&id)
                .ok_or_else(StoreError::event_not_found)?;
            record.event.status = status;
            record.event.updated_at = now;
            state.event(id)
        })
    }

    fn delete_event(&self, id: EventId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.lock()?;
            if !state.events.contains_key(&id) {
                return Err(StoreError::event_not_found());
            }
            if state.confirmed_bookings(id) > 0 {
                return Err(DomainError::EventHasBookings.into());
            }
            state.bookings.retain(|_, b| b.event != id);
            state.events.remove(&id);
            Ok(())
        })
    }

    fn count_confirmed_bookings(&self, id: EventId) -> StoreFuture<'_, i64> {
        Box::pin(async move { Ok(self.lock()?.confirmed_bookings(id)) })
    }
}

impl BookingRepository for InMemoryStore {
    fn book_tickets(
        &self,
        user: UserId,
        event: EventId,
        ticket_count: i32,
        now: DateTime<Utc>,
    ) -> StoreFuture<'_, BookingReceipt> {
        Box::pin(async move {
            let mut state = self.lock()?;
            if !state.users.contains_key(&user) {
                return Err(StoreError::user_not_found());
            }
            let record = state
                .events
                .get_mut(&event)
                .ok_or_else(StoreError::event_not_found)?;

            let reservation = inventory::reserve(&mut record.event, ticket_count)?;
            record.event.updated_at = now;

            let seq = state.next_seq();
            let booking = BookingRecord {
                id: BookingId::new(),
                user,
                event,
                ticket_count,
                total_price: reservation.total_price,
                status: BookingStatus::Confirmed,
                created_at: now,
                updated_at: now,
                seq,
            };
            state.bookings.insert(booking.id, booking.clone());

            Ok(BookingReceipt {
                booking: state.populate_booking(&booking)?,
                event: state.event(event)?,
                change: reservation.change,
            })
        })
    }

    fn get_booking(&self, id: BookingId) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let state = self.lock()?;
            let record = state
                .bookings
                .get(&id)
                .ok_or_else(StoreError::booking_not_found)?;
            state.populate_booking(record)
        })
    }

    fn list_bookings(&self, query: BookingQuery) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let state = self.lock()?;
            let mut records: Vec<&BookingRecord> = state
                .bookings
                .values()
                .filter(|b| query.user.is_none_or(|u| u == b.user))
                .filter(|b| query.event.is_none_or(|e| e == b.event))
                .collect();
            records.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));
            records
                .into_iter()
                .map(|r| state.populate_booking(r))
                .collect()
        })
    }

    fn cancel_booking(&self, id: BookingId, now: DateTime<Utc>) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let record = state
                .bookings
                .get(&id)
                .cloned()
                .ok_or_else(StoreError::booking_not_found)?;
            if record.status == BookingStatus::Cancelled {
                return Err(DomainError::BookingAlreadyCancelled.into());
            }

            state.release_booking(&record);
            let cancelled = BookingRecord {
                status: BookingStatus::Cancelled,
                updated_at: now,
                ..record
            };
            state.bookings.insert(id, cancelled.clone());
            state.populate_booking(&cancelled)
        })
    }

    fn delete_booking(&self, id: BookingId) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let mut state = self.lock()?;
            let record = state
                .bookings
                .get(&id)
                .cloned()
                .ok_or_else(StoreError::booking_not_found)?;

            state.release_booking(&record);
            let deleted = state.populate_booking(&record)?;
            state.bookings.remove(&id);
            Ok(deleted)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::test_clock;
    use ticketing_core::environment::Clock;

    async fn approved_event(store: &InMemoryStore, total: i32) -> (User, Event) {
        let now = test_clock().now();
        let organizer = store
            .create_user(fixtures::new_user("organizer", Role::Organizer), now)
            .await
            .unwrap();
        let event = store
            .create_event(fixtures::new_event(organizer.id, total), now)
            .await
            .unwrap();
        let event = store
            .set_status(event.id, EventStatus::Approved, now)
            .await
            .unwrap();
        (organizer, event)
    }

    async fn attendee(store: &InMemoryStore, name: &str) -> User {
        store
            .create_user(fixtures::new_user(name, Role::User), test_clock().now())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let now = test_clock().now();
        store.create_user(fixtures::new_user("ada", Role::User), now).await.unwrap();

        let err = store
            .create_user(fixtures::new_user("ada", Role::User), now)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { resource: "User" }));
    }

    #[tokio::test]
    async fn booking_then_cancel_restores_availability() {
        let store = InMemoryStore::new();
        let (_, event) = approved_event(&store, 10).await;
        let user = attendee(&store, "bea").await;
        let now = test_clock().now();

        let receipt = store.book_tickets(user.id, event.id, 4, now).await.unwrap();
        assert_eq!(receipt.event.available_tickets, 6);
        assert_eq!(receipt.change.previous_available, 10);

        store.cancel_booking(receipt.booking.id, now).await.unwrap();
        assert_eq!(store.get_event(event.id).await.unwrap().available_tickets, 10);

        let err = store.cancel_booking(receipt.booking.id, now).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rule(DomainError::BookingAlreadyCancelled)
        ));
        assert_eq!(store.get_event(event.id).await.unwrap().available_tickets, 10);
    }

    #[tokio::test]
    async fn deleting_cancelled_booking_releases_nothing() {
        let store = InMemoryStore::new();
        let (_, event) = approved_event(&store, 10).await;
        let user = attendee(&store, "cy").await;
        let now = test_clock().now();

        let kept = store.book_tickets(user.id, event.id, 2, now).await.unwrap();
        let cancelled = store.book_tickets(user.id, event.id, 3, now).await.unwrap();
        store.cancel_booking(cancelled.booking.id, now).await.unwrap();
        store.delete_booking(cancelled.booking.id).await.unwrap();
        assert_eq!(store.get_event(event.id).await.unwrap().available_tickets, 8);

        store.delete_booking(kept.booking.id).await.unwrap();
        assert_eq!(store.get_event(event.id).await.unwrap().available_tickets, 10);
    }

    #[tokio::test]
    async fn concurrent_bookings_never_oversell() {
        let store = InMemoryStore::new();
        let (_, event) = approved_event(&store, 5).await;
        let now = test_clock().now();

        let mut users = Vec::new();
        for i in 0..10 {
            users.push(attendee(&store, &format!("fan{i}")).await);
        }

        let attempts = users
            .iter()
            .map(|u| store.book_tickets(u.id, event.id, 1, now));
        let results = futures::future::join_all(attempts).await;

        let confirmed = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(confirmed, 5);
        assert_eq!(store.get_event(event.id).await.unwrap().available_tickets, 0);
    }

    #[tokio::test]
    async fn update_resizes_and_resets_status() {
        let store = InMemoryStore::new();
        let (_, event) = approved_event(&store, 10).await;
        let user = attendee(&store, "dee").await;
        let now = test_clock().now();
        store.book_tickets(user.id, event.id, 4, now).await.unwrap();

        let updated = store
            .update_event(
                event.id,
                EventUpdate {
                    total_tickets: Some(20),
                    ..EventUpdate::default()
                },
                now,
            )
            .await
            .unwrap();
        assert_eq!(updated.total_tickets, 20);
        assert_eq!(updated.available_tickets, 16);
        assert_eq!(updated.status, EventStatus::Pending);

        let err = store
            .update_event(
                event.id,
                EventUpdate {
                    total_tickets: Some(3),
                    ..EventUpdate::default()
                },
                now,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Rule(DomainError::TicketsBelowBooked { booked: 4 })
        ));
    }

    #[tokio::test]
    async fn event_with_confirmed_bookings_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let (_, event) = approved_event(&store, 10).await;
        let user = attendee(&store, "eli").await;
        let now = test_clock().now();
        let receipt = store.book_tickets(user.id, event.id, 1, now).await.unwrap();

        assert!(matches!(
            store.delete_event(event.id).await,
            Err(StoreError::Rule(DomainError::EventHasBookings))
        ));

        store.cancel_booking(receipt.booking.id, now).await.unwrap();
        store.delete_event(event.id).await.unwrap();
        assert_eq!(store.booking_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn deleting_user_releases_their_tickets() {
        let store = InMemoryStore::new();
        let (organizer, event) = approved_event(&store, 10).await;
        let user = attendee(&store, "fay").await;
        let now = test_clock().now();
        store.book_tickets(user.id, event.id, 3, now).await.unwrap();

        store.delete_user(user.id).await.unwrap();
        assert_eq!(store.get_event(event.id).await.unwrap().available_tickets, 10);

        assert!(matches!(
            store.delete_user(organizer.id).await,
            Err(StoreError::Rule(DomainError::UserHasEvents))
        ));
    }

    #[tokio::test]
    async fn listings_are_filtered_and_ordered() {
        let store = InMemoryStore::new();
        let (organizer, approved) = approved_event(&store, 10).await;
        let now = test_clock().now();
        let pending = store
            .create_event(fixtures::new_event(organizer.id, 5), now)
            .await
            .unwrap();

        let public = store.list_events(EventQuery::approved()).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, approved.id);

        let queue = store.list_events(EventQuery::pending()).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, pending.id);

        let mine = store
            .list_events(EventQuery::organized_by(organizer.id))
            .await
            .unwrap();
        assert_eq!(mine[0].id, pending.id);
        assert_eq!(mine[1].id, approved.id);
    }

    #[tokio::test]
    async fn profile_rename_shows_up_in_populated_documents() {
        let store = InMemoryStore::new();
        let (organizer, event) = approved_event(&store, 10).await;
        let now = test_clock().now();

        store
            .update_profile(
                organizer.id,
                ProfileUpdate {
                    name: Some("Renamed".to_string()),
                    ..ProfileUpdate::default()
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(store.get_event(event.id).await.unwrap().organizer.name, "Renamed");
    }
}
