//! Member login and per-request credential check

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Json,
};
use gym_common::api::{ApiError, ApiResult};
use gym_common::workflow::{self, MemberSession};
use serde::Deserialize;

use crate::AppState;

pub const MEMBER_ID_HEADER: &str = "x-member-id";
pub const MEMBER_CONTACT_HEADER: &str = "x-member-contact";

/// Login form; both fields are accepted as numbers or strings
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub member_id: serde_json::Value,
    pub contact: serde_json::Value,
}

fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<MemberSession>> {
    let session = workflow::login(
        state.store.as_ref(),
        &field_text(&request.member_id),
        &field_text(&request.contact),
    )
    .await?;
    Ok(Json(session))
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", name)))
}

/// Verifies the member credential headers and attaches the [`MemberSession`]
pub async fn member_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let member_id = header_text(request.headers(), MEMBER_ID_HEADER)?.to_string();
    let contact = header_text(request.headers(), MEMBER_CONTACT_HEADER)?.to_string();

    let session = workflow::login(state.store.as_ref(), &member_id, &contact).await?;
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
