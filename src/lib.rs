use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::HeaderName,
    Router,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod access;
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod tiers;

// Module for routing segregation (Public, Portal, Board, Admin).
pub mod routes;
use access::Decision;
use auth::AuthUser; // The resolved authenticated user identity.
use routes::{admin, board, portal, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas that have been decorated with
/// the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(
        handlers::get_donor_wall, handlers::get_sponsor_wall, handlers::get_events,
        handlers::get_event_details, handlers::register_user, handlers::login,
        handlers::donation_webhook, handlers::get_me, handlers::get_volunteer_dashboard,
        handlers::signup_for_event, handlers::withdraw_signup, handlers::unauthorized_page,
        handlers::get_board_dashboard, handlers::get_admin_dashboard,
        handlers::get_admin_donors, handlers::get_event_roster, handlers::create_event,
        handlers::update_event, handlers::delete_event, handlers::publish_event,
        handlers::create_sponsor, handlers::update_sponsor, handlers::delete_sponsor,
        handlers::record_sponsorship
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::User, models::Donor, models::Donation, models::Sponsor, models::Event,
            models::Signup, models::RegisterUserRequest, models::LoginRequest,
            models::AuthTokenResponse, models::DonationWebhookPayload,
            models::CreateEventRequest, models::UpdateEventRequest,
            models::CreateSponsorRequest, models::UpdateSponsorRequest,
            models::RecordSponsorshipRequest, models::DonorWallEntry,
            models::SponsorWallEntry, models::AdminDashboardStats, models::TierCount,
            models::BoardDashboardStats, models::VolunteerDashboard, models::UserProfile,
            tiers::DonationTier, tiers::SponsorTier,
        )
    ),
    tags(
        (name = "wildhaven-portal", description = "Wildhaven Conservancy Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and immutable
/// container holding all essential application services and configuration.
/// The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow handlers to selectively pull components from the shared AppState.
// This is critical for dependency injection and adhering to the Clean Architecture boundaries.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_middleware
///
/// Applies the route access controller to every request before routing.
///
/// *Mechanism*: It resolves an *optional* principal by running the `AuthUser`
/// extractor and discarding the rejection, then asks the pure `access::decide`
/// function for a verdict on the request path. `Allow` forwards the request
/// unchanged; `Redirect` short-circuits with a 303 to the target path. All
/// policy lives in `access.rs`; this function only translates the decision
/// into an HTTP response.
async fn access_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // The extractor consumes request parts; reassemble the request afterwards
    // so the inner services see it untouched.
    let (mut parts, body) = request.into_parts();
    let principal = AuthUser::from_request_parts(&mut parts, &state).await.ok();
    let request = Request::from_parts(parts, body);

    match access::decide(&path, principal.as_ref().map(|u| u.role.as_str())) {
        Decision::Allow => next.run(request).await,
        Decision::Redirect(target) => Redirect::to(target).into_response(),
    }
}

/// auth_middleware
///
/// A middleware function that enforces authentication for the portal routes.
///
/// *Mechanism*: It attempts to extract `AuthUser` from the request. Since `AuthUser`
/// implements `FromRequestParts`, if authentication (JWT validation, DB lookup) fails,
/// the extractor immediately rejects the request with a 401 Unauthorized status,
/// preventing execution of the handler. If successful, it allows the request to proceed.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))

        // Public Routes: No middleware applied.
        .merge(public::public_routes())

        // Portal Routes: Protected by the `auth_middleware`.
        // This implements the second layer of Defense-in-Depth for these routes
        // (the access controller has already redirected anonymous visitors).
        .merge(
            portal::portal_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )

        // Board Routes: Nested under '/portal/board'. The role check is performed by
        // the access controller *and* inside the handlers.
        .nest(
            "/portal/board",
            board::board_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )

        // Admin Routes: Nested under '/portal/admin'. Same double enforcement.
        .nest(
            "/portal/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )

        // Route Access Controller: every request is classified before routing,
        // producing allow-or-redirect exactly once per request.
        .layer(middleware::from_fn_with_state(state.clone(), access_middleware))

        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    // This section implements the Production Observability Stack.
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: Wraps the entire request/response lifecycle in a tracing span.
                // Uses the `trace_span_logger` to include the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: Ensures the generated x-request-id header is
                // returned to the client and injected into subsequent service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (Applied last, allowing all traffic in/out after processing)
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI.
///
/// *Goal*: Ensure every log line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    // The structured log format used by the tracing macros.
    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
