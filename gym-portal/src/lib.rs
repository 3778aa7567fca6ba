//! gym-portal library - member self-service portal
//!
//! Members log in with their member id and contact number. The portal keeps
//! no server-side session: every `/api/me` request carries the same pair in
//! the `x-member-id` and `x-member-contact` headers and is verified again.

use axum::routing::{get, post};
use axum::{middleware, Router};
use gym_common::GymStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GymStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn GymStore>) -> Self {
        Self { store }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // Member routes (credentials checked per request)
    let member = Router::new()
        .route("/api/me", get(api::my_profile))
        .route("/api/me/payments", get(api::my_payments))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::member_auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/login", post(api::login));

    Router::new()
        .merge(member)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
