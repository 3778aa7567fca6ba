//! SQLite-backed [`GymStore`]

use super::{members, payments, plans, trainers};
use crate::models::{
    MemberOverview, MemberProfile, MemberRef, MembershipPlan, NewMember, Payment, PaymentRecord,
    PaymentSummary, Trainer,
};
use crate::{Error, GymStore, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn delete_in_transaction(&self, member_id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let removed_payments = payments::delete_payments_for_member(&mut *tx, member_id).await?;
        let removed_members = members::delete_member(&mut *tx, member_id).await?;

        if removed_members == 0 {
            tx.rollback().await?;
            warn!(
                "Deletion of member {} rolled back: no such member ({} payments restored)",
                member_id, removed_payments
            );
            return Err(Error::DeletionFailed {
                member_id,
                reason: "member not found".to_string(),
            });
        }

        tx.commit().await?;
        Ok(removed_payments)
    }
}

#[async_trait]
impl GymStore for SqliteStore {
    async fn list_plans(&self) -> Result<Vec<MembershipPlan>> {
        plans::list_plans(&self.pool).await
    }

    async fn find_plan(&self, name: &str) -> Result<Option<MembershipPlan>> {
        plans::find_plan(&self.pool, name).await
    }

    async fn list_trainers(&self) -> Result<Vec<Trainer>> {
        trainers::list_trainers(&self.pool).await
    }

    async fn list_members(&self, plan_filter: Option<&str>) -> Result<Vec<MemberOverview>> {
        members::list_members(&self.pool, plan_filter).await
    }

    async fn find_member_by_name_and_contact(
        &self,
        name: &str,
        contact: i64,
    ) -> Result<Option<MemberRef>> {
        members::find_by_name_and_contact(&self.pool, name, contact).await
    }

    async fn find_members_for_deletion(&self, query: &str) -> Result<Vec<MemberRef>> {
        members::find_for_deletion(&self.pool, query).await
    }

    async fn insert_member(&self, member: &NewMember) -> Result<i64> {
        members::insert_member(&self.pool, member).await
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        payments::insert_payment(&self.pool, payment).await
    }

    async fn member_end_date(&self, member_id: i64) -> Result<Option<NaiveDate>> {
        members::end_date(&self.pool, member_id).await
    }

    async fn update_member_plan(
        &self,
        member_id: i64,
        plan: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<u64> {
        members::update_plan(&self.pool, member_id, plan, start_date, end_date).await
    }

    async fn latest_payment(&self, member_id: i64) -> Result<Option<PaymentSummary>> {
        payments::latest_payment(&self.pool, member_id).await
    }

    async fn delete_member_with_payments(&self, member_id: i64) -> Result<u64> {
        match self.delete_in_transaction(member_id).await {
            Ok(removed) => {
                info!("Deleted member {} and {} payments", member_id, removed);
                Ok(removed)
            }
            Err(e @ Error::DeletionFailed { .. }) => Err(e),
            Err(e) => {
                // Transaction dropped without commit, so nothing was applied
                error!("Deletion of member {} failed: {}", member_id, e);
                Err(Error::DeletionFailed {
                    member_id,
                    reason: "database error".to_string(),
                })
            }
        }
    }

    async fn authenticate_member(&self, member_id: i64, contact: i64) -> Result<Option<MemberRef>> {
        members::authenticate(&self.pool, member_id, contact).await
    }

    async fn member_profile(&self, member_id: i64) -> Result<Option<MemberProfile>> {
        members::profile(&self.pool, member_id).await
    }

    async fn member_payments(&self, member_id: i64) -> Result<Vec<PaymentRecord>> {
        payments::payment_history(&self.pool, member_id).await
    }
}
