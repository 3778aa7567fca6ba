//! # Gym Common Library
//!
//! Shared code for the gym management services including:
//! - Domain model (plans, trainers, members, payments)
//! - Data cleaning rules and the CSV cleaning pipeline
//! - SQLite schema, bulk loader and repository
//! - Membership workflows (registration, renewal, deletion, member portal)
//! - Configuration loading and error types

pub mod api;
pub mod clean;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;
pub mod workflow;

pub use error::{Error, ErrorKind, Result};
pub use store::GymStore;
