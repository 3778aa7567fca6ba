//! Member self-service
//!
//! A member identifies with the pair (member id, contact number). The
//! resulting [`MemberSession`] is passed back into each view.

use crate::models::{MemberProfile, PaymentRecord};
use crate::{Error, GymStore, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSession {
    pub member_id: i64,
    pub name: String,
}

fn parse_number(input: &str, field: &str) -> Result<i64> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be a number", field)))
}

/// Exact (member id, contact) match
pub async fn login(store: &dyn GymStore, member_id: &str, contact: &str) -> Result<MemberSession> {
    let member_id = parse_number(member_id, "member id")?;
    let contact = parse_number(contact, "contact number")?;

    let member = store
        .authenticate_member(member_id, contact)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    info!("Member {} logged in", member.member_id);
    Ok(MemberSession {
        member_id: member.member_id,
        name: member.name,
    })
}

pub async fn profile(store: &dyn GymStore, session: &MemberSession) -> Result<MemberProfile> {
    store
        .member_profile(session.member_id)
        .await?
        .ok_or(Error::MemberNotFound(session.member_id))
}

/// Own payments, newest first
pub async fn payment_history(store: &dyn GymStore, session: &MemberSession) -> Result<Vec<PaymentRecord>> {
    store.member_payments(session.member_id).await
}
