use crate::{
    AppState,
    auth::AuthUser,
    models::{
        self, AdminDashboardStats, AuthTokenResponse, BoardDashboardStats, CreateEventRequest,
        CreateSponsorRequest, Donation, DonationWebhookPayload, DonorWallEntry, Event,
        LoginRequest, RecordSponsorshipRequest, RegisterUserRequest, Signup, SponsorWallEntry,
        TierCount, UpdateEventRequest, UpdateSponsorRequest, User, UserProfile,
        VolunteerDashboard,
    },
    tiers::{donation_bands, donation_tier, sponsorship_tier},
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// SupabaseAuthResponse
///
/// Minimal struct to deserialize the response from the external auth provider's
/// /auth/v1/signup endpoint, specifically capturing the newly created user's UUID.
#[derive(Deserialize)]
struct SupabaseAuthResponse {
    id: Uuid,
}

// --- Public Handlers ---

/// get_donor_wall
///
/// [Public Route] The donor wall: all public donors ordered by cumulative total,
/// each carrying the recognition tier derived by the classifier. Donors below the
/// lowest band appear without a tier label rather than being hidden.
///
/// *Security*: The repository method applies the `is_public=true` filter
/// **unconditionally** so anonymous donors never leak to the wall.
#[utoipa::path(
    get,
    path = "/donors",
    responses((status = 200, description = "Donor wall", body = [DonorWallEntry]))
)]
pub async fn get_donor_wall(State(state): State<AppState>) -> Json<Vec<DonorWallEntry>> {
    let donors = state.repo.get_public_donors().await;
    let wall = donors
        .into_iter()
        .map(|d| DonorWallEntry {
            tier: donation_tier(d.total_donated),
            name: d.name,
            total_donated: d.total_donated,
        })
        .collect();
    Json(wall)
}

/// get_sponsor_wall
///
/// [Public Route] The sponsor wall: active sponsors ordered by cumulative
/// sponsorship total with their tier labels. Uses the sponsorship band table,
/// which is entirely independent of the donation one.
#[utoipa::path(
    get,
    path = "/sponsors",
    responses((status = 200, description = "Sponsor wall", body = [SponsorWallEntry]))
)]
pub async fn get_sponsor_wall(State(state): State<AppState>) -> Json<Vec<SponsorWallEntry>> {
    let sponsors = state.repo.get_active_sponsors().await;
    let wall = sponsors
        .into_iter()
        .map(|s| SponsorWallEntry {
            tier: sponsorship_tier(s.total_sponsored),
            organization: s.organization,
            website: s.website,
            total_sponsored: s.total_sponsored,
        })
        .collect();
    Json(wall)
}

/// get_events
///
/// [Public Route] Lists published volunteer events, soonest first.
#[utoipa::path(
    get,
    path = "/events",
    responses((status = 200, description = "Published events", body = [Event]))
)]
pub async fn get_events(State(state): State<AppState>) -> Json<Vec<models::Event>> {
    let events = state.repo.get_published_events().await;
    Json(events)
}

/// get_event_details
///
/// [Public Route] Retrieves a single event by ID, only if published.
#[utoipa::path(
    get,
    path = "/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 200, description = "Found", body = Event))
)]
pub async fn get_event_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::Event>, StatusCode> {
    match state.repo.get_published_event(id).await {
        Some(event) => Ok(Json(event)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// register_user
///
/// [Public Route] Handles initial user registration via the external auth provider.
///
/// *Flow*: Calls the provider's signup endpoint, retrieves the `auth.users.id` (UUID),
/// and then uses that ID to create the corresponding record in the application's local
/// `public.profiles` table. This ensures primary key synchronization between the
/// external auth system and our local schema.
///
/// Self-service signups always receive the 'volunteer' role. Board and admin roles
/// are granted out-of-band by an operator.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses((status = 200, description = "Registered", body = User))
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<Json<User>, StatusCode> {
    // Step 1: Call the external auth provider.
    let client = reqwest::Client::new();
    let signup_url = format!("{}/auth/v1/signup", state.config.auth_url);

    let response = client
        .post(signup_url)
        .header("apikey", &state.config.auth_api_key)
        .header("Content-Type", "application/json")
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|e| {
            tracing::error!("auth signup call failed: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if !response.status().is_success() {
        // The provider rejects e.g. duplicate emails and weak passwords.
        return Err(StatusCode::BAD_REQUEST);
    }

    // Step 2: Extract the canonical user ID from the external response.
    let auth_user = response
        .json::<SupabaseAuthResponse>()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Step 3: Create the mirrored profile in our local database.
    let new_user = User {
        id: auth_user.id,
        email: payload.email,
        role: "volunteer".to_string(),
    };

    let created_user = state.repo.create_user(new_user).await;

    Ok(Json(created_user))
}

/// login
///
/// [Public Route] Exchanges credentials for a session token via the external auth
/// provider's password grant. The token payload is forwarded to the client; this
/// application never sees or stores the password beyond the proxy call.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthTokenResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, StatusCode> {
    let client = reqwest::Client::new();
    let token_url = format!(
        "{}/auth/v1/token?grant_type=password",
        state.config.auth_url
    );

    let response = client
        .post(token_url)
        .header("apikey", &state.config.auth_api_key)
        .header("Content-Type", "application/json")
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|e| {
            tracing::error!("auth token call failed: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if !response.status().is_success() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = response
        .json::<AuthTokenResponse>()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(token))
}

/// donation_webhook
///
/// [Public Route, secret-guarded] Payment-provider callback recording a completed
/// donation. The donor is upserted by email and their cumulative total bumped; the
/// wall tier follows automatically the next time the classifier reads the total.
///
/// *Security*: The caller must present the shared secret in `x-webhook-secret`.
/// Negative amounts are out-of-domain and rejected before touching the database.
#[utoipa::path(
    post,
    path = "/api/webhooks/donations",
    request_body = DonationWebhookPayload,
    responses(
        (status = 201, description = "Recorded", body = Donation),
        (status = 400, description = "Out-of-domain amount"),
        (status = 401, description = "Bad or missing webhook secret")
    )
)]
pub async fn donation_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DonationWebhookPayload>,
) -> Result<(StatusCode, Json<Donation>), StatusCode> {
    let presented = headers
        .get("x-webhook-secret")
        .and_then(|value| value.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if presented != state.config.webhook_secret {
        return Err(StatusCode::UNAUTHORIZED);
    }

    if payload.amount < Decimal::ZERO {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.repo.record_donation(payload).await {
        Some(donation) => Ok((StatusCode::CREATED, Json(donation))),
        None => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

// --- Portal Handlers (any authenticated role) ---

/// get_me
///
/// [Authenticated Route] Provides the authenticated user's profile information,
/// resolved from the local profiles table.
#[utoipa::path(
    get,
    path = "/portal/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, StatusCode> {
    let user = state
        .repo
        .get_user(id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(UserProfile {
        id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// get_volunteer_dashboard
///
/// [Authenticated Route] The volunteer landing dashboard: upcoming published
/// events alongside the caller's own signups. This is the default dashboard every
/// role can reach; admins and board members land here only if they navigate to it.
#[utoipa::path(
    get,
    path = "/portal/volunteer",
    responses((status = 200, description = "Volunteer dashboard", body = VolunteerDashboard))
)]
pub async fn get_volunteer_dashboard(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Json<VolunteerDashboard> {
    let upcoming_events = state.repo.get_upcoming_events().await;
    let my_signups = state.repo.get_my_signups(id).await;
    Json(VolunteerDashboard {
        upcoming_events,
        my_signups,
    })
}

/// signup_for_event
///
/// [Authenticated Route] Registers the caller as a volunteer for an event.
///
/// *Idempotency*: The repository method uses the composite primary key on
/// `event_signups` to enforce the **one-signup-per-user-per-event** rule,
/// returning a 409 Conflict if violated. A full event also answers 409.
#[utoipa::path(
    post,
    path = "/portal/events/{id}/signup",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Signed up"),
        (status = 404, description = "Unknown or unpublished event"),
        (status = 409, description = "Already signed up or event full")
    )
)]
pub async fn signup_for_event(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    // Volunteers can only join events the public can see.
    let event = state
        .repo
        .get_published_event(event_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    let taken = state.repo.count_signups(event_id).await;
    if taken >= event.capacity as i64 {
        return Err(StatusCode::CONFLICT);
    }

    let signup = Signup { event_id, user_id };
    match state.repo.signup_for_event(signup).await {
        true => Ok(StatusCode::OK),
        false => Err(StatusCode::CONFLICT),
    }
}

/// withdraw_signup
///
/// [Authenticated Route] Removes the caller's signup for an event.
#[utoipa::path(
    delete,
    path = "/portal/events/{id}/signup",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Withdrawn"),
        (status = 404, description = "Not signed up")
    )
)]
pub async fn withdraw_signup(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> StatusCode {
    let signup = Signup { event_id, user_id };
    if state.repo.withdraw_signup(signup).await {
        StatusCode::NO_CONTENT
    } else {
        // Either the event doesn't exist or the caller never signed up.
        StatusCode::NOT_FOUND
    }
}

/// unauthorized_page
///
/// [Authenticated Route] Terminal target of the access controller's denial
/// redirects. Always answers 403 so API clients following the redirect see the
/// denial as an error status rather than a silent 200.
#[utoipa::path(
    get,
    path = "/portal/unauthorized",
    responses((status = 403, description = "Role lacks access to the requested area"))
)]
pub async fn unauthorized_page() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": "Your role does not grant access to the requested area."
        })),
    )
}

// --- Board Handlers ---

/// get_board_dashboard
///
/// [Board Route] Fundraising overview for the development committee: totals
/// raised and sponsored, counts, upcoming events, and the donor tier
/// distribution computed straight from the band table so the dashboard can never
/// drift from the classifier.
///
/// *RBAC*: Accessible to 'admin' and 'board_member'. The access middleware already
/// gates the /portal/board subtree; the handler re-checks as Defense-in-Depth.
#[utoipa::path(
    get,
    path = "/portal/board",
    responses((status = 200, description = "Board dashboard", body = BoardDashboardStats))
)]
pub async fn get_board_dashboard(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BoardDashboardStats>, StatusCode> {
    if role != "admin" && role != "board_member" {
        return Err(StatusCode::FORBIDDEN);
    }

    let donors = state.repo.get_all_donors().await;
    let sponsors = state.repo.get_all_sponsors().await;
    let upcoming = state.repo.get_upcoming_events().await;

    let total_raised: Decimal = donors.iter().map(|d| d.total_donated).sum();
    let total_sponsored: Decimal = sponsors.iter().map(|s| s.total_sponsored).sum();

    // One row per band, highest tier first, zero counts included.
    let donor_tiers = donation_bands()
        .iter()
        .map(|band| TierCount {
            tier: band.tier.as_str().to_string(),
            donors: donors
                .iter()
                .filter(|d| donation_tier(d.total_donated) == Some(band.tier))
                .count() as i64,
        })
        .collect();

    Ok(Json(BoardDashboardStats {
        total_raised,
        total_sponsored,
        donor_count: donors.len() as i64,
        sponsor_count: sponsors.len() as i64,
        upcoming_events: upcoming.len() as i64,
        donor_tiers,
    }))
}

// --- Admin Handlers ---

/// get_admin_dashboard
///
/// [Admin Route] Retrieves core application statistics for the dashboard.
///
/// *Authorization*: Explicitly checks that the `role` is "admin".
#[utoipa::path(
    get,
    path = "/portal/admin",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_dashboard(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardStats>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(Json(state.repo.get_admin_stats().await))
}

/// get_admin_donors
///
/// [Admin Route] Retrieves ALL donors, including anonymous ones that never appear
/// on the public wall.
#[utoipa::path(
    get,
    path = "/portal/admin/donors",
    responses((status = 200, description = "All donors", body = [models::Donor]))
)]
pub async fn get_admin_donors(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<models::Donor>>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(Json(state.repo.get_all_donors().await))
}

/// get_event_roster
///
/// [Admin Route] The volunteer roster for an event, including signups on
/// unpublished events (admins can see drafts).
#[utoipa::path(
    get,
    path = "/portal/admin/volunteers/{event_id}",
    params(("event_id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Roster", body = [User]),
        (status = 404, description = "Unknown event")
    )
)]
pub async fn get_event_roster(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<User>>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    if state.repo.get_event(event_id).await.is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(state.repo.get_event_volunteers(event_id).await))
}

/// create_event
///
/// [Admin Route] Creates a volunteer event. New events start unpublished.
#[utoipa::path(
    post,
    path = "/portal/admin/events",
    request_body = CreateEventRequest,
    responses((status = 200, description = "Created", body = Event))
)]
pub async fn create_event(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Json<models::Event>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    let event = state.repo.create_event(payload).await;
    Ok(Json(event))
}

/// update_event
///
/// [Admin Route] Partial update of event details.
#[utoipa::path(
    put,
    path = "/portal/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses((status = 200, description = "Updated", body = Event))
)]
pub async fn update_event(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<models::Event>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    match state.repo.update_event(id, payload).await {
        Some(event) => Ok(Json(event)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_event
///
/// [Admin Route] Removes an event and, via cascade, its signups.
#[utoipa::path(
    delete,
    path = "/portal/admin/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_event(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if role != "admin" {
        return StatusCode::FORBIDDEN;
    }
    if state.repo.delete_event(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// publish_event
///
/// [Admin Route] Endpoint for an administrator to publish or retract an event.
///
/// *RBAC*: Strict enforcement of the "admin" role before calling the repository.
#[utoipa::path(
    put,
    path = "/portal/admin/events/{id}/publish",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = bool,
    responses((status = 200, description = "Updated", body = Event))
)]
pub async fn publish_event(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(is_published): Json<bool>,
) -> Result<Json<models::Event>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    match state.repo.set_event_published(id, is_published).await {
        Some(event) => Ok(Json(event)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// create_sponsor
///
/// [Admin Route] Registers a sponsoring organization with a zero running total.
#[utoipa::path(
    post,
    path = "/portal/admin/sponsors",
    request_body = CreateSponsorRequest,
    responses((status = 200, description = "Created", body = models::Sponsor))
)]
pub async fn create_sponsor(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateSponsorRequest>,
) -> Result<Json<models::Sponsor>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    let sponsor = state.repo.create_sponsor(payload).await;
    Ok(Json(sponsor))
}

/// update_sponsor
///
/// [Admin Route] Partial update of sponsor details, including retiring a lapsed
/// sponsor from the wall via `is_active`.
#[utoipa::path(
    put,
    path = "/portal/admin/sponsors/{id}",
    params(("id" = Uuid, Path, description = "Sponsor ID")),
    request_body = UpdateSponsorRequest,
    responses((status = 200, description = "Updated", body = models::Sponsor))
)]
pub async fn update_sponsor(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSponsorRequest>,
) -> Result<Json<models::Sponsor>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    match state.repo.update_sponsor(id, payload).await {
        Some(sponsor) => Ok(Json(sponsor)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_sponsor
///
/// [Admin Route] Removes a sponsor record entirely. Retiring via `is_active=false`
/// is preferred when history should be kept.
#[utoipa::path(
    delete,
    path = "/portal/admin/sponsors/{id}",
    params(("id" = Uuid, Path, description = "Sponsor ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_sponsor(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if role != "admin" {
        return StatusCode::FORBIDDEN;
    }
    if state.repo.delete_sponsor(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// record_sponsorship
///
/// [Admin Route] Records a sponsorship payment against the organization's running
/// total. Negative amounts are out-of-domain, mirroring the donation webhook guard.
#[utoipa::path(
    post,
    path = "/portal/admin/sponsors/{id}/payments",
    params(("id" = Uuid, Path, description = "Sponsor ID")),
    request_body = RecordSponsorshipRequest,
    responses(
        (status = 200, description = "Recorded", body = models::Sponsor),
        (status = 400, description = "Out-of-domain amount"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn record_sponsorship(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordSponsorshipRequest>,
) -> Result<Json<models::Sponsor>, StatusCode> {
    if role != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }
    if payload.amount < Decimal::ZERO {
        return Err(StatusCode::BAD_REQUEST);
    }
    match state.repo.record_sponsorship(id, payload.amount).await {
        Some(sponsor) => Ok(Json(sponsor)),
        None => Err(StatusCode::NOT_FOUND),
    }
}
