use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Defines the routes under the /portal/admin subtree, exclusively accessible to
/// users with the 'admin' role. These endpoints provide moderation, record-keeping
/// and statistical access for the organization's staff.
///
/// Access Control:
/// The route access controller bounces non-admin principals to the unauthorized
/// page before routing. Every handler still explicitly checks `role == "admin"`
/// as Defense-in-Depth.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /portal/admin
        // The admin dashboard: core counters across donors, sponsors, events and
        // signups. Also the landing target of the admin dashboard redirect.
        .route("/", get(handlers::get_admin_dashboard))
        // GET /portal/admin/donors
        // Lists ALL donors, including anonymous ones hidden from the public wall.
        .route("/donors", get(handlers::get_admin_donors))
        // GET /portal/admin/volunteers/{event_id}
        // The signup roster for an event, drafts included.
        .route("/volunteers/{event_id}", get(handlers::get_event_roster))
        // POST /portal/admin/events
        // Creates a volunteer event. Events start unpublished.
        .route("/events", post(handlers::create_event))
        // PUT/DELETE /portal/admin/events/{id}
        // Event detail maintenance and removal.
        .route(
            "/events/{id}",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        // PUT /portal/admin/events/{id}/publish
        // Publishes or retracts an event. This is the moderation gate that makes
        // an event visible to the public listing and signups.
        .route("/events/{id}/publish", put(handlers::publish_event))
        // POST /portal/admin/sponsors
        // Registers a sponsoring organization.
        .route("/sponsors", post(handlers::create_sponsor))
        // PUT/DELETE /portal/admin/sponsors/{id}
        // Sponsor maintenance: detail edits, retirement, removal.
        .route(
            "/sponsors/{id}",
            put(handlers::update_sponsor).delete(handlers::delete_sponsor),
        )
        // POST /portal/admin/sponsors/{id}/payments
        // Records a sponsorship payment against the cumulative total.
        .route("/sponsors/{id}/payments", post(handlers::record_sponsorship))
}
