/// Request authentication
///
/// Every resource endpoint requires an authenticated identity and nothing
/// more: there are no roles, scopes or per-object checks. A request is
/// authenticated when it carries `Authorization: Bearer <access token>`
/// whose subject is still a user in the database.
///
/// The API server runs [`authenticate`] in a middleware layer and stores the
/// resulting [`AuthContext`] in the request extensions.
///
/// ```no_run
/// use axum::Extension;
/// use dax_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::User;

/// Identity of the caller, inserted into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Why a request failed authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("{0}")]
    InvalidFormat(String),

    #[error(transparent)]
    InvalidToken(#[from] JwtError),

    /// Token is valid but its user has since been deleted
    #[error("Unknown user")]
    UnknownUser,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Pulls the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Authenticates a request from its headers.
///
/// Header and token checks run before any database access, so a request
/// without valid credentials never touches the pool.
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_access_token(token, secret)?;

    if !User::exists(pool, claims.sub).await? {
        tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
        return Err(AuthError::UnknownUser);
    }

    Ok(AuthContext::new(claims.sub))
}
