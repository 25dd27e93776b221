use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;
use wildhaven_portal::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    handlers,
    models::{
        AdminDashboardStats, CreateEventRequest, CreateSponsorRequest, Donation,
        DonationWebhookPayload, Donor, Event, RecordSponsorshipRequest, Signup, Sponsor,
        UpdateEventRequest, UpdateSponsorRequest, User,
    },
    repository::Repository,
    tiers::{DonationTier, SponsorTier},
};

// --- MOCK REPOSITORY IMPLEMENTATION ---

// This struct is the central control point for testing handler logic.
// Handlers rely on traits, so we mock the trait implementation.
pub struct MockRepoControl {
    pub donors_to_return: Vec<Donor>,
    pub sponsors_to_return: Vec<Sponsor>,
    pub events_to_return: Vec<Event>,
    pub event_to_return: Option<Event>,
    pub sponsor_to_return: Option<Sponsor>,
    pub donation_to_return: Option<Donation>,
    pub volunteers_to_return: Vec<User>,
    pub user_to_return: Option<User>,
    pub signup_result: bool,
    pub withdraw_result: bool,
    pub delete_result: bool,
    pub signup_count: i64,
    pub stats_to_return: AdminDashboardStats,
}

impl Default for MockRepoControl {
    fn default() -> Self {
        MockRepoControl {
            donors_to_return: vec![],
            sponsors_to_return: vec![],
            events_to_return: vec![],
            event_to_return: Some(Event::default()),
            sponsor_to_return: Some(Sponsor::default()),
            donation_to_return: Some(Donation::default()),
            volunteers_to_return: vec![],
            user_to_return: None,
            signup_result: true, // Default to success for simpler tests
            withdraw_result: true,
            delete_result: true,
            signup_count: 0,
            stats_to_return: AdminDashboardStats::default(),
        }
    }
}

#[async_trait]
impl Repository for MockRepoControl {
    async fn get_public_donors(&self) -> Vec<Donor> {
        self.donors_to_return.clone()
    }
    async fn get_all_donors(&self) -> Vec<Donor> {
        self.donors_to_return.clone()
    }
    async fn record_donation(&self, _payload: DonationWebhookPayload) -> Option<Donation> {
        self.donation_to_return.clone()
    }
    async fn get_active_sponsors(&self) -> Vec<Sponsor> {
        self.sponsors_to_return.clone()
    }
    async fn get_all_sponsors(&self) -> Vec<Sponsor> {
        self.sponsors_to_return.clone()
    }
    async fn create_sponsor(&self, _req: CreateSponsorRequest) -> Sponsor {
        Sponsor::default()
    }
    async fn update_sponsor(&self, _id: Uuid, _req: UpdateSponsorRequest) -> Option<Sponsor> {
        self.sponsor_to_return.clone()
    }
    async fn delete_sponsor(&self, _id: Uuid) -> bool {
        self.delete_result
    }
    async fn record_sponsorship(&self, _id: Uuid, _amount: Decimal) -> Option<Sponsor> {
        self.sponsor_to_return.clone()
    }
    async fn get_published_events(&self) -> Vec<Event> {
        self.events_to_return.clone()
    }
    async fn get_upcoming_events(&self) -> Vec<Event> {
        self.events_to_return.clone()
    }
    async fn get_event(&self, _id: Uuid) -> Option<Event> {
        self.event_to_return.clone()
    }
    async fn get_published_event(&self, _id: Uuid) -> Option<Event> {
        self.event_to_return.clone()
    }
    async fn create_event(&self, _req: CreateEventRequest) -> Event {
        Event::default()
    }
    async fn update_event(&self, _id: Uuid, _req: UpdateEventRequest) -> Option<Event> {
        self.event_to_return.clone()
    }
    async fn delete_event(&self, _id: Uuid) -> bool {
        self.delete_result
    }
    async fn set_event_published(&self, _id: Uuid, _is_published: bool) -> Option<Event> {
        self.event_to_return.clone()
    }
    async fn signup_for_event(&self, _signup: Signup) -> bool {
        self.signup_result
    }
    async fn withdraw_signup(&self, _signup: Signup) -> bool {
        self.withdraw_result
    }
    async fn get_my_signups(&self, _user_id: Uuid) -> Vec<Event> {
        self.events_to_return.clone()
    }
    async fn get_event_volunteers(&self, _event_id: Uuid) -> Vec<User> {
        self.volunteers_to_return.clone()
    }
    async fn count_signups(&self, _event_id: Uuid) -> i64 {
        self.signup_count
    }
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user_to_return.clone()
    }
    async fn create_user(&self, _user: User) -> User {
        User::default()
    }
    async fn get_admin_stats(&self) -> AdminDashboardStats {
        self.stats_to_return.clone()
    }
}

// --- TEST UTILITIES ---

const TEST_ID: Uuid = Uuid::from_u128(123);
const TEST_ADMIN_ID: Uuid = Uuid::from_u128(456);

// Creates an AppState using mock components
fn create_test_state(repo_control: MockRepoControl) -> AppState {
    AppState {
        repo: Arc::new(repo_control),
        config: AppConfig::default(),
    }
}

// Creates AuthUser values for handler calls
fn admin_user() -> AuthUser {
    AuthUser {
        id: TEST_ADMIN_ID,
        role: "admin".to_string(),
    }
}
fn board_user() -> AuthUser {
    AuthUser {
        id: TEST_ID,
        role: "board_member".to_string(),
    }
}
fn volunteer_user() -> AuthUser {
    AuthUser {
        id: TEST_ID,
        role: "volunteer".to_string(),
    }
}

fn donor(name: &str, total: i64, is_public: bool) -> Donor {
    Donor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.org", name),
        total_donated: Decimal::from(total),
        is_public,
        ..Donor::default()
    }
}

fn sponsor(org: &str, total: i64) -> Sponsor {
    Sponsor {
        id: Uuid::new_v4(),
        organization: org.to_string(),
        total_sponsored: Decimal::from(total),
        is_active: true,
        ..Sponsor::default()
    }
}

// --- WALL TESTS ---

#[test]
async fn test_donor_wall_attaches_tiers_and_preserves_order() {
    let state = create_test_state(MockRepoControl {
        donors_to_return: vec![
            donor("ada", 12_000, true),
            donor("grace", 999, true),
            donor("linus", 50, true),
        ],
        ..MockRepoControl::default()
    });

    let Json(wall) = handlers::get_donor_wall(State(state)).await;

    assert_eq!(wall.len(), 3);
    assert_eq!(wall[0].name, "ada");
    assert_eq!(wall[0].tier, Some(DonationTier::Eagle));
    assert_eq!(wall[1].tier, Some(DonationTier::Turtle));
    // Small donors stay on the wall, just without a tier label.
    assert_eq!(wall[2].tier, None);
}

#[test]
async fn test_sponsor_wall_uses_the_sponsorship_bands() {
    let state = create_test_state(MockRepoControl {
        sponsors_to_return: vec![sponsor("Acme", 60_000), sponsor("Initech", 12_000)],
        ..MockRepoControl::default()
    });

    let Json(wall) = handlers::get_sponsor_wall(State(state)).await;

    assert_eq!(wall[0].tier, Some(SponsorTier::Gold));
    assert_eq!(wall[1].tier, Some(SponsorTier::Bronze));
}

// --- DASHBOARD TESTS ---

#[test]
async fn test_admin_dashboard_forbidden_for_other_roles() {
    let state = create_test_state(MockRepoControl::default());
    let result = handlers::get_admin_dashboard(volunteer_user(), State(state.clone())).await;
    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);

    let result = handlers::get_admin_dashboard(board_user(), State(state)).await;
    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);
}

#[test]
async fn test_admin_dashboard_success() {
    let state = create_test_state(MockRepoControl {
        stats_to_return: AdminDashboardStats {
            total_donors: 7,
            ..AdminDashboardStats::default()
        },
        ..MockRepoControl::default()
    });

    let result = handlers::get_admin_dashboard(admin_user(), State(state)).await;
    let Json(stats) = result.unwrap();
    assert_eq!(stats.total_donors, 7);
}

#[test]
async fn test_board_dashboard_forbidden_for_volunteers() {
    let state = create_test_state(MockRepoControl::default());
    let result = handlers::get_board_dashboard(volunteer_user(), State(state)).await;
    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);
}

#[test]
async fn test_board_dashboard_aggregates_and_tier_distribution() {
    let state = create_test_state(MockRepoControl {
        donors_to_return: vec![
            donor("ada", 12_000, true),
            donor("grace", 999, true),
            donor("anon", 50, false),
        ],
        sponsors_to_return: vec![sponsor("Acme", 30_000)],
        events_to_return: vec![Event::default()],
        ..MockRepoControl::default()
    });

    let result = handlers::get_board_dashboard(board_user(), State(state)).await;
    let Json(stats) = result.unwrap();

    assert_eq!(stats.total_raised, Decimal::from(13_049));
    assert_eq!(stats.total_sponsored, Decimal::from(30_000));
    assert_eq!(stats.donor_count, 3);
    assert_eq!(stats.sponsor_count, 1);
    assert_eq!(stats.upcoming_events, 1);

    // One row per band, highest first, zero counts included; the sub-threshold
    // donor is counted nowhere.
    let tiers: Vec<(&str, i64)> = stats
        .donor_tiers
        .iter()
        .map(|t| (t.tier.as_str(), t.donors))
        .collect();
    assert_eq!(
        tiers,
        vec![("eagle", 1), ("bear", 0), ("wolf", 0), ("turtle", 1)]
    );
}

// --- SIGNUP TESTS ---

fn open_event(capacity: i32) -> Event {
    Event {
        capacity,
        is_published: true,
        ..Event::default()
    }
}

#[test]
async fn test_signup_success() {
    let state = create_test_state(MockRepoControl {
        event_to_return: Some(open_event(10)),
        signup_result: true,
        ..MockRepoControl::default()
    });

    let result = handlers::signup_for_event(volunteer_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(result.unwrap(), StatusCode::OK);
}

#[test]
async fn test_signup_duplicate_conflict() {
    let state = create_test_state(MockRepoControl {
        event_to_return: Some(open_event(10)),
        signup_result: false,
        ..MockRepoControl::default()
    });

    let result = handlers::signup_for_event(volunteer_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(result.unwrap_err(), StatusCode::CONFLICT);
}

#[test]
async fn test_signup_full_event_conflict() {
    let state = create_test_state(MockRepoControl {
        event_to_return: Some(open_event(5)),
        signup_count: 5,
        ..MockRepoControl::default()
    });

    let result = handlers::signup_for_event(volunteer_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(result.unwrap_err(), StatusCode::CONFLICT);
}

#[test]
async fn test_signup_unknown_or_unpublished_event() {
    let state = create_test_state(MockRepoControl {
        event_to_return: None,
        ..MockRepoControl::default()
    });

    let result = handlers::signup_for_event(volunteer_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_withdraw_signup() {
    let state = create_test_state(MockRepoControl {
        withdraw_result: true,
        ..MockRepoControl::default()
    });
    let status = handlers::withdraw_signup(volunteer_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let state = create_test_state(MockRepoControl {
        withdraw_result: false,
        ..MockRepoControl::default()
    });
    let status = handlers::withdraw_signup(volunteer_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- WEBHOOK TESTS ---

fn webhook_payload(amount: i64) -> DonationWebhookPayload {
    DonationWebhookPayload {
        donor_name: "Ada".to_string(),
        donor_email: "ada@example.org".to_string(),
        amount: Decimal::from(amount),
        anonymous: false,
    }
}

fn secret_headers(secret: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-webhook-secret", HeaderValue::from_str(secret).unwrap());
    headers
}

#[test]
async fn test_donation_webhook_rejects_bad_secret() {
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::donation_webhook(
        State(state.clone()),
        HeaderMap::new(),
        Json(webhook_payload(100)),
    )
    .await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);

    let result = handlers::donation_webhook(
        State(state),
        secret_headers("wrong"),
        Json(webhook_payload(100)),
    )
    .await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[test]
async fn test_donation_webhook_rejects_negative_amounts() {
    let state = create_test_state(MockRepoControl::default());
    let secret = state.config.webhook_secret.clone();

    let result = handlers::donation_webhook(
        State(state),
        secret_headers(&secret),
        Json(webhook_payload(-50)),
    )
    .await;
    assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
}

#[test]
async fn test_donation_webhook_records() {
    let state = create_test_state(MockRepoControl {
        donation_to_return: Some(Donation {
            amount: Decimal::from(250),
            ..Donation::default()
        }),
        ..MockRepoControl::default()
    });
    let secret = state.config.webhook_secret.clone();

    let (status, Json(donation)) = handlers::donation_webhook(
        State(state),
        secret_headers(&secret),
        Json(webhook_payload(250)),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(donation.amount, Decimal::from(250));
}

// --- ADMIN CRUD TESTS ---

#[test]
async fn test_publish_event_not_found() {
    let state = create_test_state(MockRepoControl {
        event_to_return: None,
        ..MockRepoControl::default()
    });

    let result =
        handlers::publish_event(admin_user(), State(state), Path(TEST_ID), Json(true)).await;
    assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_record_sponsorship_rejects_negative_amount() {
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::record_sponsorship(
        admin_user(),
        State(state),
        Path(TEST_ID),
        Json(RecordSponsorshipRequest {
            amount: Decimal::from(-100),
        }),
    )
    .await;
    assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
}

#[test]
async fn test_record_sponsorship_forbidden_for_board_members() {
    // Board members read dashboards; only admins touch records.
    let state = create_test_state(MockRepoControl::default());

    let result = handlers::record_sponsorship(
        board_user(),
        State(state),
        Path(TEST_ID),
        Json(RecordSponsorshipRequest {
            amount: Decimal::from(100),
        }),
    )
    .await;
    assert_eq!(result.unwrap_err(), StatusCode::FORBIDDEN);
}

#[test]
async fn test_delete_event_requires_admin() {
    let state = create_test_state(MockRepoControl::default());
    let status = handlers::delete_event(volunteer_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[test]
async fn test_get_event_roster_unknown_event() {
    let state = create_test_state(MockRepoControl {
        event_to_return: None,
        ..MockRepoControl::default()
    });
    let result = handlers::get_event_roster(admin_user(), State(state), Path(TEST_ID)).await;
    assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
}

// --- MISC ---

#[test]
async fn test_get_event_details_not_found() {
    let state = create_test_state(MockRepoControl {
        event_to_return: None,
        ..MockRepoControl::default()
    });
    let result = handlers::get_event_details(State(state), Path(TEST_ID)).await;
    assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_get_me_resolves_the_profile() {
    let state = create_test_state(MockRepoControl {
        user_to_return: Some(User {
            id: TEST_ID,
            email: "vol@example.org".to_string(),
            role: "volunteer".to_string(),
        }),
        ..MockRepoControl::default()
    });

    let Json(profile) = handlers::get_me(volunteer_user(), State(state)).await.unwrap();
    assert_eq!(profile.email, "vol@example.org");
    assert_eq!(profile.role, "volunteer");
}

#[test]
async fn test_unauthorized_page_is_a_403() {
    let (status, _body) = handlers::unauthorized_page().await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
