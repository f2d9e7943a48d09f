//! Business logic layer

pub mod auth;
pub mod job;

pub use auth::{AuthService, AuthSession};
pub use job::{JobPage, JobService};
