use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;
use wildhaven_portal::{
    AppState,
    auth::{AuthUser, Claims},
    config::Env,
    models::{
        AdminDashboardStats, CreateEventRequest, CreateSponsorRequest, Donation,
        DonationWebhookPayload, Donor, Event, Signup, Sponsor, UpdateEventRequest,
        UpdateSponsorRequest, User,
    },
    repository::Repository,
};

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user_to_return.clone()
    }

    // The extractor only ever calls get_user; the rest are inert placeholders.
    async fn get_public_donors(&self) -> Vec<Donor> {
        vec![]
    }
    async fn get_all_donors(&self) -> Vec<Donor> {
        vec![]
    }
    async fn record_donation(&self, _payload: DonationWebhookPayload) -> Option<Donation> {
        None
    }
    async fn get_active_sponsors(&self) -> Vec<Sponsor> {
        vec![]
    }
    async fn get_all_sponsors(&self) -> Vec<Sponsor> {
        vec![]
    }
    async fn create_sponsor(&self, _req: CreateSponsorRequest) -> Sponsor {
        Sponsor::default()
    }
    async fn update_sponsor(&self, _id: Uuid, _req: UpdateSponsorRequest) -> Option<Sponsor> {
        None
    }
    async fn delete_sponsor(&self, _id: Uuid) -> bool {
        false
    }
    async fn record_sponsorship(&self, _id: Uuid, _amount: Decimal) -> Option<Sponsor> {
        None
    }
    async fn get_published_events(&self) -> Vec<Event> {
        vec![]
    }
    async fn get_upcoming_events(&self) -> Vec<Event> {
        vec![]
    }
    async fn get_event(&self, _id: Uuid) -> Option<Event> {
        None
    }
    async fn get_published_event(&self, _id: Uuid) -> Option<Event> {
        None
    }
    async fn create_event(&self, _req: CreateEventRequest) -> Event {
        Event::default()
    }
    async fn update_event(&self, _id: Uuid, _req: UpdateEventRequest) -> Option<Event> {
        None
    }
    async fn delete_event(&self, _id: Uuid) -> bool {
        false
    }
    async fn set_event_published(&self, _id: Uuid, _is_published: bool) -> Option<Event> {
        None
    }
    async fn signup_for_event(&self, _signup: Signup) -> bool {
        false
    }
    async fn withdraw_signup(&self, _signup: Signup) -> bool {
        false
    }
    async fn get_my_signups(&self, _user_id: Uuid) -> Vec<Event> {
        vec![]
    }
    async fn get_event_volunteers(&self, _event_id: Uuid) -> Vec<User> {
        vec![]
    }
    async fn count_signups(&self, _event_id: Uuid) -> i64 {
        0
    }
    async fn create_user(&self, _user: User) -> User {
        User::default()
    }
    async fn get_admin_stats(&self) -> AdminDashboardStats {
        AdminDashboardStats::default()
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn create_token(user_id: Uuid, exp_offset: u64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize, // Token expires in exp_offset seconds
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: MockAuthRepo, jwt_secret: String) -> AppState {
    let mut config = wildhaven_portal::config::AppConfig::default();
    config.env = env;
    config.jwt_secret = jwt_secret;

    AppState {
        repo: Arc::new(repo),
        config,
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USER_ID, 3600);

    let mock_repo = MockAuthRepo {
        user_to_return: Some(User {
            id: TEST_USER_ID,
            email: "test@example.org".to_string(),
            role: "board_member".to_string(),
        }),
    };

    let app_state = create_app_state(Env::Production, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/portal/board".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, "board_member");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo::default(),
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/portal/me".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_garbage_token() {
    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo::default(),
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/portal/me".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Bearer not.a.jwt"),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_when_user_was_deleted() {
    // A structurally valid token whose subject no longer has a profile row
    // must be rejected: role revocation takes effect on the next request.
    let token = create_token(TEST_USER_ID, 3600);

    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo {
            user_to_return: None,
        },
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/portal/me".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_bypass_success() {
    let mock_user_id = Uuid::new_v4();
    let mock_repo = MockAuthRepo {
        user_to_return: Some(User {
            id: mock_user_id,
            email: "local@dev.org".to_string(),
            role: "admin".to_string(),
        }),
    };
    let app_state = create_app_state(Env::Local, mock_repo, TEST_JWT_SECRET.to_string());

    let mut parts = get_request_parts(Method::GET, "/portal/admin".parse().unwrap());
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_ok());
    let user = auth_user.unwrap();
    assert_eq!(user.id, mock_user_id);
    assert_eq!(user.role, "admin");
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mock_user_id = Uuid::new_v4();
    let app_state = create_app_state(
        Env::Production,
        MockAuthRepo::default(),
        TEST_JWT_SECRET.to_string(),
    );

    let mut parts = get_request_parts(Method::GET, "/portal/admin".parse().unwrap());
    // Provide ONLY the local bypass header
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&mock_user_id.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert!(auth_user.is_err());
    assert_eq!(auth_user.unwrap_err(), StatusCode::UNAUTHORIZED);
}
