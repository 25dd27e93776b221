use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    repository::RepositoryState,
};

/// Claims
///
/// Represents the standard payload structure expected inside a JSON Web Token (JWT).
/// These claims are signed by the external auth provider's secret and validated upon
/// every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user. This is the primary key used to fetch
    /// the user's details and role from the public.profiles table.
    pub sub: Uuid,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    /// This is crucial for preventing replay attacks and maintaining session freshness.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthUser Extractor Result
///
/// This struct represents the resolved identity of an authenticated request: the
/// "principal" every access decision is made against. Handlers use it to retrieve
/// the user's ID and role.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The unique identifier of the user, mapped to auth.users.id and public.profiles.id.
    pub id: Uuid,
    /// The user's role: 'admin', 'board_member' or 'volunteer'. Unknown role strings
    /// are carried verbatim; the access controller treats them as volunteers rather
    /// than rejecting them.
    pub role: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function argument
/// in any authenticated handler, and letting the access middleware resolve an *optional*
/// principal by simply discarding the rejection. Authentication (extractor) stays cleanly
/// separated from business logic (handlers) and from the pure access policy (`access::decide`).
///
/// The entire process involves:
/// 1. Dependency Resolution: Accessing Repository and AppConfig from the application state.
/// 2. Local Bypass: Allowing development-time access using the 'x-user-id' header.
/// 3. Token Validation: Standard Bearer token extraction and JWT decoding.
/// 4. DB Lookup: Fetching the user's current role and existence from PostgreSQL.
///
/// Rejection: Returns StatusCode::UNAUTHORIZED (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    // S must allow sending across threads and sharing.
    S: Send + Sync,
    // Allows the extractor to pull the Repository State from the app state.
    RepositoryState: FromRef<S>,
    // Allows the extractor to pull the AppConfig (for JWT secret and Env check).
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Local Development Bypass Check
        // If the application is running in Env::Local, we allow authentication by
        // providing a known, valid UUID in the 'x-user-id' header. Guarded by the
        // Env check so it can never activate in production.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        // The UUID must still map to an actual profile in the local
                        // database so that roles are correctly loaded.
                        if let Some(user) = repo.get_user(user_id).await {
                            return Ok(AuthUser {
                                id: user.id,
                                role: user.role,
                            });
                        }
                    }
                }
            }
        }
        // If Env is Production, or if the bypass failed (e.g., header was bad or user
        // not found), execution falls through to the standard JWT validation flow.

        // 3. Token Extraction
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // 4. JWT Decoding Setup
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;

        // 5. Decode and Validate the Token
        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            // Expired tokens are routine; anything else (bad signature, malformed
            // token) is worth a log line at debug for security triage.
            if !matches!(e.kind(), ErrorKind::ExpiredSignature) {
                tracing::debug!("JWT rejected: {:?}", e.kind());
            }
            StatusCode::UNAUTHORIZED
        })?;

        // 6. Database Lookup (Final Verification)
        // Check the database for the user's existence and retrieve their current role.
        // This prevents access if the user was deleted after the token was issued,
        // and guarantees role changes take effect on the very next request.
        let user = repo
            .get_user(token_data.claims.sub)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}
