use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Board Router Module
///
/// Defines the routes under the /portal/board subtree, accessible to 'admin' and
/// 'board_member' roles. These endpoints give the development committee oversight
/// of fundraising without granting any mutation capability.
///
/// Access Control:
/// The route access controller redirects under-privileged roles to the
/// unauthorized page before routing; the dashboard handler additionally
/// re-checks the role so the policy holds even if these routes are ever
/// mounted elsewhere.
pub fn board_routes() -> Router<AppState> {
    Router::new()
        // GET /portal/board
        // The board dashboard: totals raised/sponsored, donor tier distribution,
        // and the upcoming event count.
        .route("/", get(handlers::get_board_dashboard))
}
