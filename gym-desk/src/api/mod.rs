//! HTTP API handlers for gym-desk

pub mod catalog;
pub mod health;
pub mod members;

pub use catalog::{list_plans, list_trainers};
pub use health::health_check;
pub use members::{delete, list_members, register, renew};
