//! REST API handlers and shared request/response types

pub mod auth;
pub mod health;
pub mod home;
pub mod job;
pub mod metrics;

use crate::error::{AppError, ErrorResponse};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

/// Message response (for delete, etc.)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `Json` extractor whose rejections use the API error body.
///
/// Deserialization problems are reported as 400 with the serde message; an
/// oversized body keeps its 413.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[derive(Debug)]
pub enum ApiJsonRejection {
    Json(JsonRejection),
}

impl IntoResponse for ApiJsonRejection {
    fn into_response(self) -> Response {
        match self {
            ApiJsonRejection::Json(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                let status = StatusCode::PAYLOAD_TOO_LARGE;
                (
                    status,
                    Json(ErrorResponse::new(
                        status,
                        "payload_too_large",
                        "Request body too large",
                    )),
                )
                    .into_response()
            }
            ApiJsonRejection::Json(e) => AppError::Validation(e.body_text()).into_response(),
        }
    }
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ApiJsonRejection::Json)?;
        Ok(ApiJson(value))
    }
}

/// `Query` extractor whose rejections use the API error body
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::Validation(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}
