//! Registration and login endpoints

use crate::api::ApiJson;
use crate::domain::{LoginInput, RegisterInput, UserProfile};
use crate::error::Result;
use crate::service::AuthSession;
use crate::state::HasServices;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Returned by both register and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: UserProfile::from(&session.user),
            token: session.token,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterInput,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn register<S: HasServices>(
    State(state): State<S>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<impl IntoResponse> {
    let session = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing email or password", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login<S: HasServices>(
    State(state): State<S>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<AuthResponse>> {
    let session = state.auth_service().login(input).await?;
    Ok(Json(AuthResponse::from(session)))
}
