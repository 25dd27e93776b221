use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::tiers::{DonationTier, SponsorTier};

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Represents the user's canonical identity record stored in the `public.profiles` table.
/// This structure includes the minimal required data resolved during authentication.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    // Primary Key, also the Foreign Key to the external auth.users table.
    pub id: Uuid,
    // The user's primary identifier.
    pub email: String,
    // The RBAC field: 'admin', 'board_member' or 'volunteer'.
    pub role: String,
}

/// Donor
///
/// A donor record from the `public.donors` table. `total_donated` is the
/// cumulative contribution total maintained by the donation recording flow;
/// the tier classifier reads it and never writes it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    // Cumulative total across all recorded donations. Non-negative.
    #[ts(type = "string")]
    pub total_donated: Decimal,

    // Anonymous donors keep their record but never appear on the public wall.
    pub is_public: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Donation
///
/// One recorded contribution in the append-only `public.donations` table.
/// Written by the webhook flow together with the donor total bump.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    #[ts(type = "string")]
    pub amount: Decimal,
    #[ts(type = "string")]
    pub received_at: DateTime<Utc>,
}

/// Sponsor
///
/// A sponsoring organization from the `public.sponsors` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Sponsor {
    pub id: Uuid,
    pub organization: String,
    pub website: Option<String>,

    #[ts(type = "string")]
    pub total_sponsored: Decimal,

    // Lapsed sponsors are retired from the wall without deleting their history.
    pub is_active: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Event
///
/// A volunteer event from the `public.events` table. Only published events are
/// visible outside the portal.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,

    #[ts(type = "string")]
    pub starts_at: DateTime<Utc>,

    // Maximum number of volunteer signups accepted.
    pub capacity: i32,
    pub is_published: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Signup
///
/// Internal structure representing a single volunteer signup in the
/// `public.event_signups` table. The composite primary key (event, user)
/// is what makes signups idempotent at the repository layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Signup {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// Note: The password is only passed through to the external Auth provider and never
/// persisted or logged internally by this application. Self-service signups always
/// receive the 'volunteer' role; elevated roles are granted out-of-band.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for the password-grant login endpoint (POST /login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// AuthTokenResponse
///
/// The subset of the external provider's token payload forwarded to the client
/// after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// DonationWebhookPayload
///
/// Input payload posted by the payment provider after a completed donation
/// (POST /api/webhooks/donations). The donor is upserted by email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DonationWebhookPayload {
    pub donor_name: String,
    pub donor_email: String,
    #[ts(type = "string")]
    pub amount: Decimal,
    /// Donors may opt out of wall recognition at payment time.
    #[serde(default)]
    pub anonymous: bool,
}

/// CreateEventRequest
///
/// Input payload for creating a volunteer event (POST /portal/admin/events).
/// New events start unpublished and must be published explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    #[ts(type = "string")]
    pub starts_at: DateTime<Utc>,
    pub capacity: i32,
}

/// UpdateEventRequest
///
/// Partial update payload for modifying an existing event (PUT /portal/admin/events/{id}).
///
/// *Optimization*: Uses `Option<T>` for all fields and `#[serde(skip_serializing_if = "Option::is_none")]`
/// to efficiently handle partial updates, ensuring only provided fields are included in the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub starts_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
}

/// CreateSponsorRequest
///
/// Input payload for registering a sponsoring organization (POST /portal/admin/sponsors).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateSponsorRequest {
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// UpdateSponsorRequest
///
/// Partial update payload for sponsor details (PUT /portal/admin/sponsors/{id}).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateSponsorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// RecordSponsorshipRequest
///
/// Input payload for recording a sponsorship payment
/// (POST /portal/admin/sponsors/{id}/payments). Adds to the cumulative total.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RecordSponsorshipRequest {
    #[ts(type = "string")]
    pub amount: Decimal,
}

// --- Wall & Dashboard Schemas (Output) ---

/// DonorWallEntry
///
/// Output schema for the public donor wall (GET /donors): the donor's display
/// name, running total and the recognition tier derived by the classifier.
/// Donors below the lowest band still appear, with no tier label.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DonorWallEntry {
    pub name: String,
    #[ts(type = "string")]
    pub total_donated: Decimal,
    pub tier: Option<DonationTier>,
}

/// SponsorWallEntry
///
/// Output schema for the public sponsor wall (GET /sponsors).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SponsorWallEntry {
    pub organization: String,
    pub website: Option<String>,
    #[ts(type = "string")]
    pub total_sponsored: Decimal,
    pub tier: Option<SponsorTier>,
}

/// AdminDashboardStats
///
/// Output schema for the administrative dashboard (GET /portal/admin).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_donors: i64,
    pub total_sponsors: i64,
    pub total_events: i64,
    pub total_signups: i64,
    #[ts(type = "string")]
    pub total_raised: Decimal,
}

/// TierCount
///
/// One row of the board dashboard's donor tier distribution.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TierCount {
    pub tier: String,
    pub donors: i64,
}

/// BoardDashboardStats
///
/// Output schema for the board dashboard (GET /portal/board): fundraising
/// totals plus the tier distribution the development committee reviews.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BoardDashboardStats {
    #[ts(type = "string")]
    pub total_raised: Decimal,
    #[ts(type = "string")]
    pub total_sponsored: Decimal,
    pub donor_count: i64,
    pub sponsor_count: i64,
    pub upcoming_events: i64,
    pub donor_tiers: Vec<TierCount>,
}

/// VolunteerDashboard
///
/// Output schema for the volunteer landing dashboard (GET /portal/volunteer).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VolunteerDashboard {
    pub upcoming_events: Vec<Event>,
    pub my_signups: Vec<Event>,
}

/// UserProfile
///
/// Output schema for the authenticated user's profile (GET /portal/me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}
