//! HTTP API handlers for gym-portal

pub mod auth;
pub mod health;
pub mod me;

pub use auth::{login, member_auth_middleware, MEMBER_CONTACT_HEADER, MEMBER_ID_HEADER};
pub use health::health_check;
pub use me::{my_payments, my_profile};
