use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the marketing-facing walls and event listings, the
/// auth entry points, and the payment-provider webhook namespace.
///
/// Security Mandate:
/// All data retrieval handlers in this module must enforce their visibility flag
/// (`is_public` for donors, `is_active` for sponsors, `is_published` for events)
/// at the Repository level. This prevents anonymous viewing of anonymous donors,
/// retired sponsors, or draft events. The webhook endpoint authenticates with a
/// shared secret inside the handler rather than a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Endpoint for new user creation and initial profile setup. Identity is
        // managed by the external auth provider; self-service accounts are volunteers.
        .route("/register", post(handlers::register_user))
        // POST /login
        // Password-grant proxy to the external auth provider. Returns the token
        // payload the client presents as a Bearer token on portal requests.
        .route("/login", post(handlers::login))
        // GET /donors
        // The donor wall: public donors ordered by cumulative total, with tiers.
        .route("/donors", get(handlers::get_donor_wall))
        // GET /sponsors
        // The sponsor wall: active sponsors ordered by cumulative total, with tiers.
        .route("/sponsors", get(handlers::get_sponsor_wall))
        // GET /events
        // Lists published volunteer events, soonest first.
        .route("/events", get(handlers::get_events))
        // GET /events/{id}
        // Retrieves the detailed view of a single published event.
        .route("/events/{id}", get(handlers::get_event_details))
        // POST /api/webhooks/donations
        // Payment-provider callback recording a completed donation. Lives in the
        // open API namespace of the access policy; guarded by x-webhook-secret.
        .route("/api/webhooks/donations", post(handlers::donation_webhook))
}
