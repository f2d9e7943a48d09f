//! Job repository
//!
//! Every statement is constrained by `created_by`, so a job owned by another
//! user is indistinguishable from one that does not exist.

use crate::domain::{CreateJobInput, Job, JobFilter, JobSort, StringUuid, UpdateJobInput};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, owner: StringUuid, input: &CreateJobInput) -> Result<Job>;
    async fn find(&self, owner: StringUuid, id: StringUuid) -> Result<Option<Job>>;
    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>>;
    async fn count(&self, filter: &JobFilter) -> Result<i64>;
    /// Returns `None` when no job with this id belongs to `owner`
    async fn update(
        &self,
        owner: StringUuid,
        id: StringUuid,
        input: &UpdateJobInput,
    ) -> Result<Option<Job>>;
    /// Returns `false` when no job with this id belongs to `owner`
    async fn delete(&self, owner: StringUuid, id: StringUuid) -> Result<bool>;
}

pub struct JobRepositoryImpl {
    pool: MySqlPool,
}

impl JobRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const JOB_COLUMNS: &str = "id, company, position, status, created_by, created_at, updated_at";

/// Escape LIKE wildcards so user input is matched literally
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn order_clause(sort: JobSort) -> &'static str {
    match sort {
        JobSort::Latest => " ORDER BY created_at DESC, id",
        JobSort::Oldest => " ORDER BY created_at ASC, id",
        JobSort::PositionAsc => " ORDER BY position ASC, id",
        JobSort::PositionDesc => " ORDER BY position DESC, id",
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, MySql>, filter: &JobFilter) {
    qb.push(" WHERE created_by = ").push_bind(filter.owner);
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(search) = filter.search.as_deref() {
        qb.push(" AND LOWER(position) LIKE ")
            .push_bind(format!("%{}%", escape_like(&search.to_lowercase())));
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, owner: StringUuid, input: &CreateJobInput) -> Result<Job> {
        let id = StringUuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO jobs (id, company, position, status, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NOW(6), NOW(6))
            "#,
        )
        .bind(id)
        .bind(&input.company)
        .bind(&input.position)
        .bind(input.status)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        self.find(owner, id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create job")))
    }

    async fn find(&self, owner: StringUuid, id: StringUuid) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE id = ? AND created_by = ?",
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let mut qb = QueryBuilder::<MySql>::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
        push_filter(&mut qb, filter);
        qb.push(order_clause(filter.sort));
        qb.push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let jobs = qb.build_query_as::<Job>().fetch_all(&self.pool).await?;
        Ok(jobs)
    }

    async fn count(&self, filter: &JobFilter) -> Result<i64> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM jobs");
        push_filter(&mut qb, filter);

        let row: (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(row.0)
    }

    async fn update(
        &self,
        owner: StringUuid,
        id: StringUuid,
        input: &UpdateJobInput,
    ) -> Result<Option<Job>> {
        let Some(existing) = self.find(owner, id).await? else {
            return Ok(None);
        };

        let company = input.company.as_ref().unwrap_or(&existing.company);
        let position = input.position.as_ref().unwrap_or(&existing.position);
        let status = input.status.unwrap_or(existing.status);

        sqlx::query(
            r#"
            UPDATE jobs
            SET company = ?, position = ?, status = ?, updated_at = NOW(6)
            WHERE id = ? AND created_by = ?
            "#,
        )
        .bind(company)
        .bind(position)
        .bind(status)
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        self.find(owner, id).await
    }

    async fn delete(&self, owner: StringUuid, id: StringUuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ? AND created_by = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
