//! HTTP plumbing shared by the desk and portal services

pub mod error;
pub mod health;

pub use error::{ApiError, ApiResult};
pub use health::HealthResponse;
