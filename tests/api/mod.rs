//! API integration tests infrastructure
//!
//! In-memory repositories implementing the production traits, plus shared
//! test configuration.


use async_trait::async_trait;
use chrono::Utc;
use jobboard_api::config::{
    Config, CorsConfig, DatabaseConfig, JwtConfig, RateLimitConfig, SecurityHeadersConfig,
    TelemetryConfig,
};
use jobboard_api::domain::{
    CreateJobInput, Job, JobFilter, JobSort, NewUser, StringUuid, UpdateJobInput, User,
};
use jobboard_api::error::{AppError, Result};
use jobboard_api::jwt::JwtManager;
use jobboard_api::repository::{JobRepository, UserRepository};
use tokio::sync::RwLock;

// ============================================================================
// Test Configuration
// ============================================================================

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-api-testing-purposes".to_string(),
        issuer: "jobboard-api-test".to_string(),
        lifetime_secs: 3600,
    }
}

pub fn create_test_jwt_manager() -> JwtManager {
    JwtManager::new(test_jwt_config())
}

pub fn create_test_config() -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 3000,
        database: DatabaseConfig {
            url: "mysql://localhost/jobboard_test".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: test_jwt_config(),
        rate_limit: RateLimitConfig::default(),
        cors: CorsConfig::default(),
        security_headers: SecurityHeadersConfig::default(),
        telemetry: TelemetryConfig::default(),
        body_limit_bytes: 100 * 1024,
        docs_enabled: true,
    }
}

// ============================================================================
// Test User Repository
// ============================================================================

pub struct TestUserRepository {
    users: RwLock<Vec<User>>,
}

impl TestUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(vec![]),
        }
    }

    pub async fn all(&self) -> Vec<User> {
        self.users.read().await.clone()
    }
}

impl Default for TestUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for TestUserRepository {
    async fn create(&self, input: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == input.email) {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: StringUuid::new_v4(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: StringUuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }
}

// ============================================================================
// Test Job Repository
// ============================================================================

/// Jobs are kept in insertion order so "latest" is stable when timestamps tie
pub struct TestJobRepository {
    jobs: RwLock<Vec<Job>>,
}

impl TestJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(vec![]),
        }
    }

    pub async fn all(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    fn matching(jobs: &[Job], filter: &JobFilter) -> Vec<Job> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        jobs.iter()
            .filter(|j| j.created_by == filter.owner)
            .filter(|j| filter.status.map_or(true, |s| j.status == s))
            .filter(|j| {
                needle
                    .as_ref()
                    .map_or(true, |n| j.position.to_lowercase().contains(n.as_str()))
            })
            .cloned()
            .collect()
    }
}

impl Default for TestJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobRepository for TestJobRepository {
    async fn create(&self, owner: StringUuid, input: &CreateJobInput) -> Result<Job> {
        let now = Utc::now();
        let job = Job {
            id: StringUuid::new_v4(),
            company: input.company.clone(),
            position: input.position.clone(),
            status: input.status,
            created_by: owner,
            created_at: now,
            updated_at: now,
        };
        self.jobs.write().await.push(job.clone());
        Ok(job)
    }

    async fn find(&self, owner: StringUuid, id: StringUuid) -> Result<Option<Job>> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .find(|j| j.id == id && j.created_by == owner)
            .cloned())
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let jobs = self.jobs.read().await;
        let mut matched = Self::matching(&jobs, filter);
        match filter.sort {
            JobSort::Latest => matched.reverse(),
            JobSort::Oldest => {}
            JobSort::PositionAsc => matched.sort_by(|a, b| a.position.cmp(&b.position)),
            JobSort::PositionDesc => matched.sort_by(|a, b| b.position.cmp(&a.position)),
        }
        Ok(matched
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, filter: &JobFilter) -> Result<i64> {
        let jobs = self.jobs.read().await;
        Ok(Self::matching(&jobs, filter).len() as i64)
    }

    async fn update(
        &self,
        owner: StringUuid,
        id: StringUuid,
        input: &UpdateJobInput,
    ) -> Result<Option<Job>> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs
            .iter_mut()
            .find(|j| j.id == id && j.created_by == owner)
        else {
            return Ok(None);
        };
        if let Some(company) = &input.company {
            job.company = company.clone();
        }
        if let Some(position) = &input.position {
            job.position = position.clone();
        }
        if let Some(status) = input.status {
            job.status = status;
        }
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn delete(&self, owner: StringUuid, id: StringUuid) -> Result<bool> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|j| !(j.id == id && j.created_by == owner));
        Ok(jobs.len() < before)
    }
}
