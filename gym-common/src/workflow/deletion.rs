//! Member deletion
//!
//! Staff first look a member up by id or name and see who matched; only a
//! confirmed request deletes. The member and its payments go in one
//! transaction.

use crate::models::MemberRef;
use crate::{Error, GymStore, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeletionRequest {
    /// Member id or full name
    pub query: String,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// Matched member awaiting confirmation; nothing deleted
    Pending { member: MemberRef },
    Deleted { member: MemberRef, payments_removed: u64 },
}

/// Delete a member and all of its payments
///
/// Fails with [`Error::DeletionFailed`] and changes nothing when the member
/// does not exist.
pub async fn delete_member(store: &dyn GymStore, member_id: i64) -> Result<u64> {
    store.delete_member_with_payments(member_id).await
}

/// Resolve the query to exactly one member, then preview or delete
pub async fn process_deletion(store: &dyn GymStore, request: DeletionRequest) -> Result<DeletionOutcome> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(Error::InvalidInput("member id or name is required".to_string()));
    }

    let mut matches = store.find_members_for_deletion(query).await?;
    let member = match matches.len() {
        0 => return Err(Error::NoMatchingMember(query.to_string())),
        1 => matches.remove(0),
        n => {
            return Err(Error::InvalidInput(format!(
                "{} members are named '{}'; delete by member id",
                n, query
            )));
        }
    };

    if !request.confirm {
        return Ok(DeletionOutcome::Pending { member });
    }

    let payments_removed = delete_member(store, member.member_id).await?;
    info!("Member {} '{}' deleted", member.member_id, member.name);
    Ok(DeletionOutcome::Deleted {
        member,
        payments_removed,
    })
}
