//! Application state trait for dependency injection
//!
//! Handlers and the router are generic over [`HasServices`], so the same code
//! runs against the MySQL-backed `AppState` and the in-memory test state.

use crate::config::Config;
use crate::jwt::JwtManager;
use crate::repository::{JobRepository, UserRepository};
use crate::service::{AuthService, JobService};
use metrics_exporter_prometheus::PrometheusHandle;

pub trait HasServices: Clone + Send + Sync + 'static {
    type UserRepo: UserRepository + 'static;
    type JobRepo: JobRepository + 'static;

    fn config(&self) -> &Config;

    fn auth_service(&self) -> &AuthService<Self::UserRepo>;

    fn job_service(&self) -> &JobService<Self::JobRepo>;

    fn jwt_manager(&self) -> &JwtManager;

    /// Prometheus handle when metrics are enabled
    fn prometheus_handle(&self) -> Option<&PrometheusHandle>;

    /// Whether the backing store answers
    fn check_ready(&self) -> impl std::future::Future<Output = bool> + Send;
}
