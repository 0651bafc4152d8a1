//! End-to-end tests of the HTTP API over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use ticketing_auth::mocks::MockSessionStore;
use ticketing_core::environment::Clock;
use ticketing_core::store::UserRepository;
use ticketing_core::types::Role;
use ticketing_testing::{InMemoryStore, fixtures, test_clock};
use ticketing_web::{AppState, build_router};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: InMemoryStore,
    sessions: MockSessionStore,
}

impl TestApp {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let sessions = MockSessionStore::new();
        let state = AppState::new(
            store.clone(),
            Arc::new(sessions.clone()),
            Arc::new(test_clock()),
        );
        Self {
            router: build_router(state, &[]),
            store,
            sessions,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(format!("/api/v1{path}"));
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Registers through the API and returns a token.
    async fn signup(&self, name: &str, role: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "name": name,
                    "email": fixtures::email_for(name),
                    "password": fixtures::PASSWORD,
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        self.login(&fixtures::email_for(name), fixtures::PASSWORD).await
    }

    /// Admins cannot self-register; seed one in the store.
    async fn admin(&self) -> String {
        self.store
            .create_user(fixtures::new_user("Root", Role::Admin), test_clock().now())
            .await
            .unwrap();
        self.login(&fixtures::email_for("Root"), fixtures::PASSWORD).await
    }

    /// Creates an event as `organizer` and approves it as `admin`.
    async fn approved_event(&self, organizer: &str, admin: &str, total: i32) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/events",
                Some(organizer),
                Some(json!({
                    "title": "Rust Conference",
                    "description": "Two days of talks",
                    "date": fixtures::event_date(),
                    "location": "Amsterdam",
                    "price": 25.0,
                    "totalTickets": total,
                    "category": "Tech",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        assert_eq!(body["event"]["status"], "pending");
        let id = body["event"]["_id"].as_str().unwrap().to_string();

        let (status, body) = self
            .send(
                Method::PUT,
                &format!("/events/{id}/status"),
                Some(admin),
                Some(json!({ "status": "approved" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {body}");
        assert_eq!(body["message"], "Event approved successfully");
        id
    }
}

#[tokio::test]
async fn welcome_and_health() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to Online Event Ticketing System API");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = TestApp::new();
    let token = app.signup("Ada", "user").await;

    let (status, body) = app.send(Method::GET, "/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["role"], "user");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    let (status, body) = app
        .send(
            Method::PUT,
            "/users/profile",
            Some(&token),
            Some(json!({ "phone": "555-0100", "name": "Ada L." })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["phone"], "555-0100");
    assert_eq!(body["user"]["name"], "Ada L.");
}

#[tokio::test]
async fn login_response_shape() {
    let app = TestApp::new();
    app.signup("Grace", "organizer").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "GRACE@example.com", "password": fixtures::PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["role"], "organizer");
    assert!(body["user"]["id"].is_string());
}

#[tokio::test]
async fn registration_rejects_bad_input() {
    let app = TestApp::new();
    app.signup("Bob", "user").await;

    let cases = [
        (json!({ "name": "Bob", "email": "bob@example.com", "password": "secret1" }), "User already exists"),
        (json!({ "name": "Eve", "email": "eve@example.com", "password": "123" }), "Password must be at least 6 characters"),
        (json!({ "name": "Eve", "email": "not-an-email", "password": "secret1" }), "Please provide a valid email"),
        (json!({ "name": "Eve", "email": "eve@example.com", "password": "secret1", "role": "admin" }), "Invalid role"),
    ];
    for (body, message) in cases {
        let (status, response) = app.send(Method::POST, "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], message);
    }
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.signup("Carol", "user").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "carol@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn logout_and_password_reset_revoke_sessions() {
    let app = TestApp::new();
    let token = app.signup("Dave", "user").await;

    let (status, _) = app.send(Method::POST, "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::GET, "/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.login("dave@example.com", fixtures::PASSWORD).await;
    let (status, body) = app
        .send(
            Method::PUT,
            "/forgotPassword",
            None,
            Some(json!({ "email": "dave@example.com", "newPassword": "new-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(app.sessions.session_count().unwrap(), 0);

    let (status, _) = app.send(Method::GET, "/users/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    app.login("dave@example.com", "new-secret").await;
}

#[tokio::test]
async fn role_restrictions() {
    let app = TestApp::new();
    let user = app.signup("Erin", "user").await;
    let organizer = app.signup("Olga", "organizer").await;

    let (status, body) = app.send(Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token");

    let (status, body) = app.send(Method::GET, "/users", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "User role user is not authorized to access this route");

    let (status, _) = app
        .send(Method::POST, "/events", Some(&user), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&organizer),
            Some(json!({ "eventId": uuid_like(), "ticketCount": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/events/admin/pending", Some(&organizer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn uuid_like() -> String {
    "00000000-0000-4000-8000-000000000000".to_string()
}

#[tokio::test]
async fn event_visibility_follows_approval() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let organizer = app.signup("Olga", "organizer").await;
    let other = app.signup("Oscar", "organizer").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/events",
            Some(&organizer),
            Some(json!({
                "title": "Jazz Night",
                "description": "Live quartet",
                "date": fixtures::event_date(),
                "location": "Lisbon",
                "price": 10.0,
                "totalTickets": 50,
                "category": "Music",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Event created successfully and pending admin approval");
    assert_eq!(body["event"]["availableTickets"], 50);
    let id = body["event"]["_id"].as_str().unwrap().to_string();

    let (_, listed) = app.send(Method::GET, "/events", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
    let (status, _) = app.send(Method::GET, &format!("/events/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send(Method::GET, &format!("/events/{id}"), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send(Method::GET, &format!("/events/{id}"), Some(&organizer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, pending) = app.send(Method::GET, "/events/admin/pending", Some(&admin), None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["organizer"]["name"], "Olga");

    let (_, all) = app.send(Method::GET, "/events", Some(&admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/events/{id}/status"),
            Some(&admin),
            Some(json!({ "status": "published" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status value");

    app.send(
        Method::PUT,
        &format!("/events/{id}/status"),
        Some(&admin),
        Some(json!({ "status": "approved" })),
    )
    .await;
    let (_, listed) = app.send(Method::GET, "/events?category=music&search=QUARTET", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (_, listed) = app.send(Method::GET, "/events?category=tech", None, None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn booking_lifecycle() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let organizer = app.signup("Olga", "organizer").await;
    let user = app.signup("Uma", "user").await;
    let event_id = app.approved_event(&organizer, &admin, 10).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&user),
            Some(json!({ "eventId": event_id, "ticketCount": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Booking confirmed successfully");
    assert_eq!(body["ticketInfo"]["previousAvailableTickets"], 10);
    assert_eq!(body["ticketInfo"]["currentAvailableTickets"], 7);
    assert_eq!(body["ticketInfo"]["totalTickets"], 10);
    assert_eq!(body["booking"]["totalPrice"], 75.0);
    assert_eq!(body["booking"]["event"]["title"], "Rust Conference");
    let booking_id = body["booking"]["_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&user),
            Some(json!({ "eventId": event_id, "ticketCount": 8 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Not enough tickets available. Only 7 tickets left.");

    let (status, body) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&user),
            Some(json!({ "eventId": event_id, "ticketCount": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please specify a valid ticket count");

    let (_, mine) = app.send(Method::GET, "/bookings/my-bookings", Some(&user), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, for_event) = app
        .send(Method::GET, &format!("/bookings/event/{event_id}"), Some(&organizer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(for_event[0]["user"]["name"], "Uma");

    let (status, analytics) = app
        .send(Method::GET, &format!("/events/{event_id}/analytics"), Some(&organizer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analytics["bookedTickets"], 3);
    assert_eq!(analytics["totalBookings"], 1);
    assert_eq!(analytics["percentageBooked"], 30.0);
    assert_eq!(analytics["event"]["title"], "Rust Conference");

    let (status, body) = app
        .send(Method::DELETE, &format!("/events/{event_id}"), Some(&organizer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete event with existing bookings");

    let (status, body) = app
        .send(Method::PUT, &format!("/bookings/{booking_id}/cancel"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["status"], "cancelled");

    let (status, body) = app
        .send(Method::PUT, &format!("/bookings/{booking_id}/cancel"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Booking is already cancelled");

    let (_, event) = app.send(Method::GET, &format!("/events/{event_id}"), None, None).await;
    assert_eq!(event["availableTickets"], 10);

    let (status, _) = app
        .send(Method::DELETE, &format!("/events/{event_id}"), Some(&organizer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bookings_are_private_to_their_owner() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let organizer = app.signup("Olga", "organizer").await;
    let owner = app.signup("Uma", "user").await;
    let stranger = app.signup("Vic", "user").await;
    let event_id = app.approved_event(&organizer, &admin, 5).await;

    let (_, body) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&owner),
            Some(json!({ "eventId": event_id, "ticketCount": 2 })),
        )
        .await;
    let booking_id = body["booking"]["_id"].as_str().unwrap().to_string();
    let path = format!("/bookings/{booking_id}");

    let (status, body) = app.send(Method::GET, &path, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to view this booking");
    let (status, _) = app.send(Method::GET, &path, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::DELETE, &path, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, &path, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.booking_count().unwrap(), 0);

    let (_, event) = app.send(Method::GET, &format!("/events/{event_id}"), None, None).await;
    assert_eq!(event["availableTickets"], 5);
}

#[tokio::test]
async fn updating_an_event_resizes_and_requeues_it() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let organizer = app.signup("Olga", "organizer").await;
    let rival = app.signup("Rita", "organizer").await;
    let user = app.signup("Uma", "user").await;
    let event_id = app.approved_event(&organizer, &admin, 10).await;
    let path = format!("/events/{event_id}");

    app.send(
        Method::POST,
        "/bookings",
        Some(&user),
        Some(json!({ "eventId": event_id, "ticketCount": 4 })),
    )
    .await;

    let (status, body) = app
        .send(Method::PUT, &path, Some(&rival), Some(json!({ "totalTickets": 20 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to update this event");

    let (status, _) = app
        .send(Method::PUT, &path, Some(&organizer), Some(json!({ "totalTickets": 3 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::PUT, &path, Some(&organizer), Some(json!({ "totalTickets": 20 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event updated successfully and pending admin approval");
    assert_eq!(body["event"]["availableTickets"], 16);
    assert_eq!(body["event"]["status"], "pending");

    let (status, body) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&user),
            Some(json!({ "eventId": event_id, "ticketCount": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot book tickets for an unapproved event");
}

#[tokio::test]
async fn admin_manages_users() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let user = app.signup("Uma", "user").await;

    let (_, profile) = app.send(Method::GET, "/users/profile", Some(&user), None).await;
    let id = profile["_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/users/{id}/role"),
            Some(&admin),
            Some(json!({ "role": "superuser" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid role");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/users/{id}/role"),
            Some(&admin),
            Some(json!({ "role": "organizer" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "organizer");

    // The open session sees the new role immediately.
    let (status, _) = app.send(Method::GET, "/users/events", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, users) = app.send(Method::GET, "/users", Some(&admin), None).await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, _) = app.send(Method::DELETE, &format!("/users/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::GET, &format!("/users/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send(Method::GET, "/users/profile", Some(&user), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/events/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ID");
}

#[tokio::test]
async fn organizer_analytics_cover_every_event() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let organizer = app.signup("Olga", "organizer").await;
    let user = app.signup("Uma", "user").await;
    let large = app.approved_event(&organizer, &admin, 10).await;
    let small = app.approved_event(&organizer, &admin, 4).await;

    for (event_id, count) in [(&large, 3), (&small, 1)] {
        let (status, body) = app
            .send(
                Method::POST,
                "/bookings",
                Some(&user),
                Some(json!({ "eventId": event_id, "ticketCount": count })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = app
        .send(Method::GET, "/users/events/analytics", Some(&organizer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let entry = |id: &str| {
        entries.iter().find(|e| e["id"] == id).unwrap()
    };
    let large_stats = entry(large.as_str());
    assert_eq!(large_stats["title"], "Rust Conference");
    assert_eq!(large_stats["totalTickets"], 10);
    assert_eq!(large_stats["bookedTickets"], 3);
    assert_eq!(large_stats["availableTickets"], 7);
    assert_eq!(large_stats["percentageBooked"], 30.0);
    assert_eq!(large_stats["totalBookings"], 1);

    let small_stats = entry(small.as_str());
    assert_eq!(small_stats["bookedTickets"], 1);
    assert_eq!(small_stats["percentageBooked"], 25.0);

    let (status, _) = app
        .send(Method::GET, "/users/events/analytics", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_listings_respect_roles() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let organizer = app.signup("Olga", "organizer").await;
    let uma = app.signup("Uma", "user").await;
    let vic = app.signup("Vic", "user").await;
    let event_id = app.approved_event(&organizer, &admin, 10).await;

    for (token, count) in [(&uma, 2), (&vic, 1)] {
        let (status, body) = app
            .send(
                Method::POST,
                "/bookings",
                Some(token),
                Some(json!({ "eventId": event_id, "ticketCount": count })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, all) = app.send(Method::GET, "/bookings", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|b| b["event"]["title"] == "Rust Conference"));
    let mut names: Vec<&str> = all.iter().map(|b| b["user"]["name"].as_str().unwrap()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Uma", "Vic"]);

    for token in [&uma, &organizer] {
        let (status, body) = app.send(Method::GET, "/bookings", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }
    let (status, _) = app.send(Method::GET, "/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, mine) = app.send(Method::GET, "/users/bookings", Some(&uma), None).await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["ticketCount"], 2);
    assert_eq!(mine[0]["user"]["name"], "Uma");
    assert_eq!(mine[0]["event"]["location"], "Amsterdam");
    assert_eq!(mine[0]["event"]["price"], 25.0);
}

#[tokio::test]
async fn profile_updates_clear_fields_and_guard_emails() {
    let app = TestApp::new();
    let ada = app.signup("Ada", "user").await;
    app.signup("Bob", "user").await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/users/profile",
            Some(&ada),
            Some(json!({ "phone": "555-0100", "address": "1 Main St" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["phone"], "555-0100");

    let (status, body) = app
        .send(Method::PUT, "/users/profile", Some(&ada), Some(json!({ "phone": "" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"]["phone"].is_null());
    assert_eq!(body["user"]["address"], "1 Main St");

    let (status, body) = app
        .send(
            Method::PUT,
            "/users/profile",
            Some(&ada),
            Some(json!({ "email": "BOB@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ALREADY_EXISTS");
    assert_eq!(body["message"], "User already exists");

    let (_, profile) = app.send(Method::GET, "/users/profile", Some(&ada), None).await;
    assert_eq!(profile["email"], "ada@example.com");
    assert!(profile["phone"].is_null());
}
