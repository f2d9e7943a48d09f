//! Authentication enforcement middleware
//!
//! Guards the job routes: a request without a valid bearer token never reaches
//! a handler, and a valid one carries its `AuthUser` in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::auth::authenticate;
use crate::jwt::JwtManager;

/// Shared state for authentication middleware
#[derive(Clone)]
pub struct AuthMiddlewareState {
    jwt_manager: JwtManager,
}

impl AuthMiddlewareState {
    pub fn new(jwt_manager: JwtManager) -> Self {
        Self { jwt_manager }
    }
}

pub async fn require_auth_middleware(
    State(auth_state): State<AuthMiddlewareState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &auth_state.jwt_manager) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
