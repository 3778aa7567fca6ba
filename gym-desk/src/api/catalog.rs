//! Plans and trainers offered in the registration and renewal forms

use axum::extract::State;
use axum::Json;
use gym_common::api::ApiResult;
use gym_common::models::{MembershipPlan, Trainer};

use crate::AppState;

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<MembershipPlan>>> {
    Ok(Json(state.store.list_plans().await?))
}

/// GET /api/trainers
pub async fn list_trainers(State(state): State<AppState>) -> ApiResult<Json<Vec<Trainer>>> {
    Ok(Json(state.store.list_trainers().await?))
}
