//! Route table.
//!
//! Everything is mounted under [`API_PREFIX`]. Access rules are enforced in
//! the handlers, which know the resource being touched.

use crate::handlers::{auth, bookings, events, health, users};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Path prefix of every route.
pub const API_PREFIX: &str = "/api/v1";

/// Routes under `/users`.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route(
            "/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/bookings", get(users::my_bookings))
        .route("/events", get(users::my_events))
        .route("/events/analytics", get(users::my_events_analytics))
        .route("/:id", get(users::get_user).delete(users::delete_user))
        .route("/:id/role", put(users::update_role))
}

/// Routes under `/events`.
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route("/my-events", get(users::my_events))
        .route("/admin/pending", get(events::pending_events))
        .route(
            "/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/:id/analytics", get(events::event_analytics))
        .route("/:id/status", put(events::set_status))
}

/// Routes under `/bookings`.
fn booking_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/my-bookings", get(users::my_bookings))
        .route("/event/:event_id", get(bookings::event_bookings))
        .route(
            "/:id",
            get(bookings::get_booking).delete(bookings::delete_booking),
        )
        .route("/:id/cancel", put(bookings::cancel_booking))
}

/// The API routes without middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgotPassword", put(auth::forgot_password))
        .route("/logout", post(auth::logout))
        .nest("/users", user_routes())
        .nest("/events", event_routes())
        .nest("/bookings", booking_routes())
}

/// CORS policy for the given origins. An empty list or `*` allows any origin.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// The complete application: routes, state, tracing, correlation ids and CORS.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .nest(API_PREFIX, api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
