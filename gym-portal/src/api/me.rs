//! Logged-in member views

use axum::extract::State;
use axum::{Extension, Json};
use gym_common::api::ApiResult;
use gym_common::models::{MemberProfile, PaymentRecord};
use gym_common::workflow::{self, MemberSession};

use crate::AppState;

/// GET /api/me
pub async fn my_profile(
    State(state): State<AppState>,
    Extension(session): Extension<MemberSession>,
) -> ApiResult<Json<MemberProfile>> {
    Ok(Json(workflow::profile(state.store.as_ref(), &session).await?))
}

/// GET /api/me/payments (newest first)
pub async fn my_payments(
    State(state): State<AppState>,
    Extension(session): Extension<MemberSession>,
) -> ApiResult<Json<Vec<PaymentRecord>>> {
    Ok(Json(workflow::payment_history(state.store.as_ref(), &session).await?))
}
