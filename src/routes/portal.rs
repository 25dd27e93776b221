use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Portal Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer. This module implements the core volunteer features:
/// the landing dashboard, event signups, and profile access.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware being
/// present on the router layer above this module. The route access controller has
/// already redirected anonymous visitors to /login before routing happens; the
/// extractor middleware is the second, independent line of defense.
pub fn portal_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /portal/me
        // Retrieves the currently authenticated user's profile.
        .route("/portal/me", get(handlers::get_me))
        // GET /portal/volunteer
        // The default landing dashboard: upcoming events plus the caller's signups.
        // Every role can reach it; unknown roles land here via the access policy's
        // default dashboard mapping.
        .route("/portal/volunteer", get(handlers::get_volunteer_dashboard))
        // POST/DELETE /portal/events/{id}/signup
        // Volunteer signup and withdrawal. The signup handler implements
        // **idempotency** using the composite primary key on `event_signups`
        // to prevent double signups, and enforces event capacity.
        .route(
            "/portal/events/{id}/signup",
            post(handlers::signup_for_event).delete(handlers::withdraw_signup),
        )
        // GET /portal/unauthorized
        // Terminal page for the access controller's denial redirects (403).
        .route("/portal/unauthorized", get(handlers::unauthorized_page))
}
