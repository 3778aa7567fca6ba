//! New member registration
//!
//! The membership starts on the day of registration and runs for the plan's
//! validity. A registration fee payment for the plan price is recorded
//! separately after the member row.

use super::ActionContext;
use crate::clean::rules::title_case;
use crate::models::{membership_end, NewMember, Payment, PaymentId, PaymentMode, PaymentStatus};
use crate::{Error, GymStore, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub contact: Option<i64>,
    pub plan: String,
    #[serde(default)]
    pub trainer_id: Option<i64>,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationOutcome {
    pub member_id: i64,
    pub payment_id: PaymentId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Duplicate pre-check run by the caller before [`register_member`]
pub async fn ensure_not_registered(store: &dyn GymStore, name: &str, contact: i64) -> Result<()> {
    match store
        .find_member_by_name_and_contact(&title_case(name.trim()), contact)
        .await?
    {
        Some(existing) => {
            info!(
                "Registration rejected: '{}' already registered as member {}",
                existing.name, existing.member_id
            );
            Err(Error::AlreadyRegistered)
        }
        None => Ok(()),
    }
}

pub async fn register_member(
    store: &dyn GymStore,
    ctx: &ActionContext,
    request: RegistrationRequest,
) -> Result<RegistrationOutcome> {
    let name = title_case(request.name.trim());
    if name.is_empty() {
        return Err(Error::InvalidInput("member name is required".to_string()));
    }

    let plan = store
        .find_plan(&request.plan)
        .await?
        .ok_or_else(|| Error::PlanNotFound(request.plan.trim().to_string()))?;

    let start_date = ctx.today;
    let end_date = membership_end(start_date, plan.validity_months)?;

    let gender = request
        .gender
        .as_deref()
        .and_then(|g| g.trim().chars().next())
        .map(|c| c.to_uppercase().collect::<String>());

    let member = NewMember {
        name,
        age: request.age,
        gender,
        contact: request.contact,
        plan: plan.name.clone(),
        start_date,
        end_date,
        trainer_id: request.trainer_id,
    };
    let member_id = match store.insert_member(&member).await {
        Ok(id) => id,
        Err(e) if e.is_foreign_key_violation() => {
            return Err(Error::InvalidInput(format!(
                "unknown trainer {}",
                request.trainer_id.map(|id| id.to_string()).unwrap_or_default()
            )));
        }
        Err(e) => return Err(e),
    };
    info!(
        "Registered member {} '{}' on plan {} ({} to {})",
        member_id, member.name, plan.name, start_date, end_date
    );

    let payment = Payment {
        payment_id: PaymentId::generate(),
        member_id: Some(member_id),
        amount: Some(plan.price),
        payment_date: Some(ctx.today),
        mode: request.payment_mode,
        status: Some(request.payment_status),
    };
    if let Err(e) = store.insert_payment(&payment).await {
        warn!(
            "Member {} registered but registration payment was not recorded: {}",
            member_id, e
        );
        return Err(e);
    }

    Ok(RegistrationOutcome {
        member_id,
        payment_id: payment.payment_id,
        start_date,
        end_date,
    })
}
