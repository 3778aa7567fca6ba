//! gym-desk library - staff console service
//!
//! JSON endpoints for front-desk staff: plans and trainers for the forms,
//! the member list, registration, renewal and two-step deletion.

use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use gym_common::workflow::ActionContext;
use gym_common::GymStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GymStore>,
    /// Fixed calendar day for every request; `None` uses the local clock
    pub today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(store: Arc<dyn GymStore>) -> Self {
        Self { store, today: None }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Context for the request being handled
    pub fn action_context(&self) -> ActionContext {
        match self.today {
            Some(today) => ActionContext::new(today),
            None => ActionContext::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/plans", get(api::list_plans))
        .route("/api/trainers", get(api::list_trainers))
        .route("/api/members", get(api::list_members).post(api::register))
        .route("/api/members/delete", post(api::delete))
        .route("/api/members/:id/renew", post(api::renew))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
