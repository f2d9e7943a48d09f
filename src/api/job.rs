//! Job endpoints. Every handler works on the authenticated user's jobs only.

use crate::api::{ApiJson, ApiQuery, MessageResponse};
use crate::domain::{CreateJobInput, Job, JobListQuery, UpdateJobInput};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::state::HasServices;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    /// Jobs on this page
    pub count: usize,
    /// Jobs matching the filter
    pub total: i64,
    pub num_of_pages: i64,
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    tag = "Jobs",
    params(JobListQuery),
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Jobs of the current user", body = JobListResponse),
        (status = 400, description = "Invalid query", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication invalid", body = crate::error::ErrorResponse)
    )
)]
pub async fn list<S: HasServices>(
    State(state): State<S>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<JobListQuery>,
) -> Result<Json<JobListResponse>> {
    let page = state.job_service().list(auth.user_id, query).await?;
    Ok(Json(JobListResponse {
        count: page.jobs.len(),
        jobs: page.jobs,
        total: page.total,
        num_of_pages: page.num_of_pages,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    tag = "Jobs",
    request_body = CreateJobInput,
    security(("bearer_jwt" = [])),
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication invalid", body = crate::error::ErrorResponse)
    )
)]
pub async fn create<S: HasServices>(
    State(state): State<S>,
    auth: AuthUser,
    ApiJson(input): ApiJson<CreateJobInput>,
) -> Result<impl IntoResponse> {
    let job = state.job_service().create(auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(JobResponse { job })))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job ID")),
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Job", body = JobResponse),
        (status = 404, description = "No such job for this user", body = crate::error::ErrorResponse)
    )
)]
pub async fn get<S: HasServices>(
    State(state): State<S>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>> {
    let job = state.job_service().get(auth.user_id, &id).await?;
    Ok(Json(JobResponse { job }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job ID")),
    request_body = UpdateJobInput,
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "No such job for this user", body = crate::error::ErrorResponse)
    )
)]
pub async fn update<S: HasServices>(
    State(state): State<S>,
    auth: AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateJobInput>,
) -> Result<Json<JobResponse>> {
    let job = state.job_service().update(auth.user_id, &id, input).await?;
    Ok(Json(JobResponse { job }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    tag = "Jobs",
    params(("id" = String, Path, description = "Job ID")),
    security(("bearer_jwt" = [])),
    responses(
        (status = 200, description = "Job deleted", body = MessageResponse),
        (status = 404, description = "No such job for this user", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete<S: HasServices>(
    State(state): State<S>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.job_service().delete(auth.user_id, &id).await?;
    Ok(Json(MessageResponse::new("Job deleted")))
}
