//! Membership renewal
//!
//! Renewing records a payment dated today, then moves the member's
//! (plan, start, end) triple forward:
//!
//! - before expiry the new period starts the day after the current end date
//! - after expiry (lapsed) or without an end date it starts today
//!
//! The payment insert and the member update are separate writes. If the
//! update finds no member the payment stays recorded; the outcome reports
//! this through `member_updated = false`.

use super::ActionContext;
use crate::models::{membership_end, Payment, PaymentId, PaymentMode, PaymentStatus, PaymentSummary};
use crate::{Error, GymStore, Result};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RenewalRequest {
    pub member_id: i64,
    pub plan: String,
    pub amount: Decimal,
    pub mode: Option<PaymentMode>,
    pub status: PaymentStatus,
    pub duration_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenewalOutcome {
    pub payment_id: PaymentId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// False when no member row was updated
    pub member_updated: bool,
    /// Most recent payment as read back after the update
    pub last_payment: Option<PaymentSummary>,
}

/// Start of the renewed period
pub fn renewal_start(current_end: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate> {
    match current_end {
        Some(end) => end
            .checked_add_signed(Duration::days(1))
            .map(|next| next.max(today))
            .ok_or_else(|| Error::InvalidInput(format!("end date {} is out of range", end))),
        None => Ok(today),
    }
}

pub async fn renew_membership(
    store: &dyn GymStore,
    ctx: &ActionContext,
    request: RenewalRequest,
) -> Result<RenewalOutcome> {
    // Reject an out-of-range duration before anything is written
    membership_end(ctx.today, request.duration_months)?;

    let payment = Payment {
        payment_id: PaymentId::generate(),
        member_id: Some(request.member_id),
        amount: Some(request.amount),
        payment_date: Some(ctx.today),
        mode: request.mode,
        status: Some(request.status),
    };

    match store.insert_payment(&payment).await {
        Ok(()) => {}
        Err(e) if e.is_foreign_key_violation() => return Err(Error::MemberNotFound(request.member_id)),
        Err(e) => return Err(e),
    }

    let current_end = store.member_end_date(request.member_id).await?;
    let start_date = renewal_start(current_end, ctx.today)?;
    let end_date = membership_end(start_date, request.duration_months)?;

    let updated = store
        .update_member_plan(request.member_id, &request.plan, start_date, end_date)
        .await?;
    let member_updated = updated > 0;

    if member_updated {
        info!(
            "Renewed member {} on plan {}: {} to {} (payment {})",
            request.member_id, request.plan, start_date, end_date, payment.payment_id
        );
    } else {
        warn!(
            "Payment {} recorded for member {} but no membership was extended",
            payment.payment_id, request.member_id
        );
    }

    let last_payment = store.latest_payment(request.member_id).await?;

    Ok(RenewalOutcome {
        payment_id: payment.payment_id,
        start_date,
        end_date,
        member_updated,
        last_payment,
    })
}
