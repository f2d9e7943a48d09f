//! JWT authentication extractor
//!
//! `AuthUser` is normally placed in request extensions by
//! [`require_auth_middleware`](super::require_auth::require_auth_middleware);
//! when it is not, the extractor verifies the bearer token itself.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::StringUuid;
use crate::error::ErrorResponse;
use crate::jwt::{Claims, JwtManager};
use crate::state::HasServices;

/// Authenticated requester, taken from a verified token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: StringUuid,
    pub name: String,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;

        Ok(Self {
            user_id,
            name: claims.name,
        })
    }
}

/// Authentication errors. All of them surface as the same 401 body.
#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidHeader(String),
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(reason = ?self, "Authentication rejected");
        let status = StatusCode::UNAUTHORIZED;
        (
            status,
            Json(ErrorResponse::new(
                status,
                "unauthorized",
                "Authentication invalid",
            )),
        )
            .into_response()
    }
}

/// Extract the Bearer token from the Authorization header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AuthError::InvalidHeader("Authorization header must use Bearer scheme".to_string())
        })
}

/// Verify the request's bearer token and build the `AuthUser`
pub(crate) fn authenticate(headers: &HeaderMap, jwt: &JwtManager) -> Result<AuthUser, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = jwt
        .verify_token(token)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    AuthUser::from_claims(claims)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasServices + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        authenticate(&parts.headers, state.jwt_manager())
    }
}
