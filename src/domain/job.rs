//! Job posting domain model

use super::common::StringUuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Maximum allowed `limit` for job listings
pub const MAX_JOBS_PER_PAGE: i64 = 100;
const DEFAULT_JOBS_PER_PAGE: i64 = 10;

/// Application status of a job posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Interview,
    Declined,
    #[default]
    Pending,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Interview => "interview",
            JobStatus::Declined => "declined",
            JobStatus::Pending => "pending",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interview" => Ok(JobStatus::Interview),
            "declined" => Ok(JobStatus::Declined),
            "pending" => Ok(JobStatus::Pending),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl sqlx::Type<sqlx::MySql> for JobStatus {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for JobStatus {
    fn decode(
        value: sqlx::mysql::MySqlValueRef<'r>,
    ) -> std::result::Result<Self, sqlx::error::BoxDynError> {
        let s: String = sqlx::Decode::<'r, sqlx::MySql>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for JobStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> std::result::Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Job posting entity. Always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Job {
    pub id: StringUuid,
    pub company: String,
    pub position: String,
    pub status: JobStatus,
    /// Owning user
    pub created_by: StringUuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Job {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: StringUuid::new_v4(),
            company: String::new(),
            position: String::new(),
            status: JobStatus::default(),
            created_by: StringUuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a job
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobInput {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    pub company: String,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub position: String,
    #[serde(default)]
    pub status: JobStatus,
}

/// Input for a partial job update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateJobInput {
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub position: Option<String>,
    pub status: Option<JobStatus>,
}

/// Sort order for job listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
pub enum JobSort {
    #[default]
    #[serde(rename = "latest")]
    Latest,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "a-z")]
    PositionAsc,
    #[serde(rename = "z-a")]
    PositionDesc,
}

/// Query parameters for `GET /api/v1/jobs`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobListQuery {
    /// `all` or one of the job statuses
    pub status: Option<String>,
    /// Case-insensitive substring of the position
    pub search: Option<String>,
    #[serde(default)]
    pub sort: JobSort,
    #[serde(default = "default_page", deserialize_with = "deserialize_page")]
    pub page: i64,
    #[serde(default = "default_limit", deserialize_with = "deserialize_limit")]
    pub limit: i64,
}

impl Default for JobListQuery {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            sort: JobSort::default(),
            page: default_page(),
            limit: default_limit(),
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_JOBS_PER_PAGE
}

/// Reject page values less than 1
fn deserialize_page<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    if value < 1 {
        return Err(serde::de::Error::custom(
            "page must be a positive integer (>= 1)",
        ));
    }
    Ok(value)
}

/// Reject limit values less than 1, clamp to MAX_JOBS_PER_PAGE
fn deserialize_limit<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    if value < 1 {
        return Err(serde::de::Error::custom(
            "limit must be a positive integer (>= 1)",
        ));
    }
    Ok(value.min(MAX_JOBS_PER_PAGE))
}

/// Owner-scoped listing criteria handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct JobFilter {
    pub owner: StringUuid,
    pub status: Option<JobStatus>,
    pub search: Option<String>,
    pub sort: JobSort,
    pub offset: i64,
    pub limit: i64,
}
