//! Domain models for the job board API

pub mod common;
pub mod job;
pub mod user;

pub use common::StringUuid;
pub use job::*;
pub use user::*;
