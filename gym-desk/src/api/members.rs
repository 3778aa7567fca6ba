//! Member endpoints
//!
//! - GET /api/members?plan=<name|All>
//! - POST /api/members (registration)
//! - POST /api/members/delete (two-step: preview, then confirmed delete)
//! - POST /api/members/:id/renew

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gym_common::api::{ApiError, ApiResult};
use gym_common::models::{MemberOverview, PaymentMode, PaymentStatus};
use gym_common::workflow::{
    ensure_not_registered, process_deletion, register_member, renew_membership, DeletionOutcome,
    DeletionRequest, RegistrationOutcome, RegistrationRequest, RenewalOutcome, RenewalRequest,
};
use gym_common::Error;
use serde::Deserialize;

use crate::AppState;

/// Query parameters for the member list
#[derive(Debug, Deserialize)]
pub struct MemberListQuery {
    /// Plan name; missing, blank or "All" lists every member
    pub plan: Option<String>,
}

/// GET /api/members
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> ApiResult<Json<Vec<MemberOverview>>> {
    let plan = query
        .plan
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("all"));

    Ok(Json(state.store.list_members(plan).await?))
}

/// POST /api/members
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> ApiResult<(StatusCode, Json<RegistrationOutcome>)> {
    let contact = request
        .contact
        .ok_or_else(|| ApiError::BadRequest("contact number is required".to_string()))?;
    ensure_not_registered(state.store.as_ref(), &request.name, contact).await?;

    let ctx = state.action_context();
    let outcome = register_member(state.store.as_ref(), &ctx, request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/members/delete
pub async fn delete(
    State(state): State<AppState>,
    Json(request): Json<DeletionRequest>,
) -> ApiResult<Json<DeletionOutcome>> {
    Ok(Json(process_deletion(state.store.as_ref(), request).await?))
}

/// Renewal form: amount and duration come from the chosen plan
#[derive(Debug, Deserialize)]
pub struct RenewBody {
    pub plan: String,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
}

/// POST /api/members/:id/renew
pub async fn renew(
    State(state): State<AppState>,
    Path(member_id): Path<i64>,
    Json(body): Json<RenewBody>,
) -> ApiResult<Json<RenewalOutcome>> {
    let plan = state
        .store
        .find_plan(&body.plan)
        .await?
        .ok_or_else(|| Error::PlanNotFound(body.plan.trim().to_string()))?;

    // No payment mode is recorded for an unpaid renewal
    let mode = match body.payment_status {
        PaymentStatus::Paid => body.payment_mode,
        PaymentStatus::Unpaid => None,
    };

    let request = RenewalRequest {
        member_id,
        plan: plan.name,
        amount: plan.price,
        mode,
        status: body.payment_status,
        duration_months: plan.validity_months,
    };

    let ctx = state.action_context();
    Ok(Json(renew_membership(state.store.as_ref(), &ctx, request).await?))
}
