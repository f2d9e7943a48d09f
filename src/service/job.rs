//! Job business logic

use crate::domain::{
    CreateJobInput, Job, JobFilter, JobListQuery, JobStatus, StringUuid, UpdateJobInput,
};
use crate::error::{AppError, Result};
use crate::repository::JobRepository;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// One page of an owner's jobs
#[derive(Debug, Clone)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    /// Number of jobs matching the filter across all pages
    pub total: i64,
    pub num_of_pages: i64,
}

pub struct JobService<J: JobRepository> {
    job_repo: Arc<J>,
}

impl<J: JobRepository> JobService<J> {
    pub fn new(job_repo: Arc<J>) -> Self {
        Self { job_repo }
    }

    pub async fn list(&self, owner: StringUuid, query: JobListQuery) -> Result<JobPage> {
        let filter = build_filter(owner, query)?;

        let total = self.job_repo.count(&filter).await?;
        let jobs = self.job_repo.list(&filter).await?;

        Ok(JobPage {
            jobs,
            total,
            num_of_pages: page_count(total, filter.limit),
        })
    }

    pub async fn get(&self, owner: StringUuid, id: &str) -> Result<Job> {
        let job_id = parse_job_id(id)?;
        self.job_repo
            .find(owner, job_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, owner: StringUuid, input: CreateJobInput) -> Result<Job> {
        let input = CreateJobInput {
            company: input.company.trim().to_string(),
            position: input.position.trim().to_string(),
            status: input.status,
        };
        input.validate()?;

        let job = self.job_repo.create(owner, &input).await?;
        info!(job_id = %job.id, owner = %owner, "Job created");
        Ok(job)
    }

    pub async fn update(&self, owner: StringUuid, id: &str, input: UpdateJobInput) -> Result<Job> {
        let input = UpdateJobInput {
            company: input.company.map(|s| s.trim().to_string()),
            position: input.position.map(|s| s.trim().to_string()),
            status: input.status,
        };
        let blank = |field: &Option<String>| field.as_deref().is_some_and(str::is_empty);
        if blank(&input.company) || blank(&input.position) {
            return Err(AppError::BadRequest(
                "Company or Position fields cannot be empty".to_string(),
            ));
        }
        input.validate()?;

        let job_id = parse_job_id(id)?;
        self.job_repo
            .update(owner, job_id, &input)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, owner: StringUuid, id: &str) -> Result<()> {
        let job_id = parse_job_id(id)?;
        if !self.job_repo.delete(owner, job_id).await? {
            return Err(not_found(id));
        }
        info!(job_id = %job_id, owner = %owner, "Job deleted");
        Ok(())
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("No job with id {}", id))
}

/// A malformed id can never name a stored job, so it reports as not found
fn parse_job_id(id: &str) -> Result<StringUuid> {
    id.parse().map_err(|_| not_found(id))
}

fn build_filter(owner: StringUuid, query: JobListQuery) -> Result<JobFilter> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<JobStatus>()
                .map_err(|_| AppError::Validation(format!("status: unknown value '{}'", raw)))?,
        ),
    };
    let search = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(JobFilter {
        owner,
        status,
        search,
        sort: query.sort,
        offset: (query.page - 1).saturating_mul(query.limit),
        limit: query.limit,
    })
}

fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
