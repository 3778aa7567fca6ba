//! Repository interface used by the workflows
//!
//! Workflows only see typed operations; the SQL lives in [`crate::db`].

use crate::models::{
    MemberOverview, MemberProfile, MemberRef, MembershipPlan, NewMember, Payment, PaymentRecord,
    PaymentSummary, Trainer,
};
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait GymStore: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<MembershipPlan>>;

    /// Plan by name (case-insensitive)
    async fn find_plan(&self, name: &str) -> Result<Option<MembershipPlan>>;

    async fn list_trainers(&self) -> Result<Vec<Trainer>>;

    /// Members with trainer and current payment; `None` lists every plan
    async fn list_members(&self, plan_filter: Option<&str>) -> Result<Vec<MemberOverview>>;

    async fn find_member_by_name_and_contact(
        &self,
        name: &str,
        contact: i64,
    ) -> Result<Option<MemberRef>>;

    /// Numeric query matches the member id, anything else the name
    async fn find_members_for_deletion(&self, query: &str) -> Result<Vec<MemberRef>>;

    /// Returns the new member id
    async fn insert_member(&self, member: &NewMember) -> Result<i64>;

    async fn insert_payment(&self, payment: &Payment) -> Result<()>;

    /// `None` when the member does not exist or has no end date
    async fn member_end_date(&self, member_id: i64) -> Result<Option<NaiveDate>>;

    /// Returns the number of member rows updated
    async fn update_member_plan(
        &self,
        member_id: i64,
        plan: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<u64>;

    async fn latest_payment(&self, member_id: i64) -> Result<Option<PaymentSummary>>;

    /// Delete the member and all of its payments as one unit
    ///
    /// Returns the number of payments removed. Nothing is changed when the
    /// member does not exist.
    async fn delete_member_with_payments(&self, member_id: i64) -> Result<u64>;

    async fn authenticate_member(&self, member_id: i64, contact: i64) -> Result<Option<MemberRef>>;

    async fn member_profile(&self, member_id: i64) -> Result<Option<MemberProfile>>;

    /// Newest first
    async fn member_payments(&self, member_id: i64) -> Result<Vec<PaymentRecord>>;
}
