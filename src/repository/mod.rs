//! Data access layer (Repository pattern)

pub mod job;
pub mod user;

pub use job::{JobRepository, JobRepositoryImpl};
pub use user::{UserRepository, UserRepositoryImpl};
