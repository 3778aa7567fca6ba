//! Bulk loader for cleaned batches
//!
//! Batches are appended parents first so every foreign key is satisfiable at
//! insert time. Each table's batch runs in its own transaction: a key
//! collision rolls back that table and stops the load, while tables already
//! committed stay committed. Existing rows are never overwritten.

use super::{members, payments, plans, trainers};
use crate::clean::CleanedBatches;
use crate::models::columns::{MEMBERS_TABLE, PAYMENTS_TABLE, PLANS_TABLE, TRAINERS_TABLE};
use crate::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Rows inserted per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub plans: u64,
    pub trainers: u64,
    pub members: u64,
    pub payments: u64,
}

impl LoadSummary {
    pub fn total(&self) -> u64 {
        self.plans + self.trainers + self.members + self.payments
    }
}

/// Append all four batches in referential order
pub async fn load_batches(pool: &SqlitePool, batches: &CleanedBatches) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    let mut tx = pool.begin().await?;
    for plan in &batches.plans {
        plans::insert_plan(&mut *tx, plan).await.inspect_err(|e| rollback_warning(PLANS_TABLE, e))?;
        summary.plans += 1;
    }
    tx.commit().await?;
    info!("Loaded {} rows into {}", summary.plans, PLANS_TABLE);

    let mut tx = pool.begin().await?;
    for trainer in &batches.trainers {
        trainers::insert_trainer(&mut *tx, trainer)
            .await
            .inspect_err(|e| rollback_warning(TRAINERS_TABLE, e))?;
        summary.trainers += 1;
    }
    tx.commit().await?;
    info!("Loaded {} rows into {}", summary.trainers, TRAINERS_TABLE);

    let mut tx = pool.begin().await?;
    for member in &batches.members {
        members::insert_member_row(&mut *tx, member)
            .await
            .inspect_err(|e| rollback_warning(MEMBERS_TABLE, e))?;
        summary.members += 1;
    }
    tx.commit().await?;
    info!("Loaded {} rows into {}", summary.members, MEMBERS_TABLE);

    let mut tx = pool.begin().await?;
    for payment in &batches.payments {
        payments::insert_payment(&mut *tx, payment)
            .await
            .inspect_err(|e| rollback_warning(PAYMENTS_TABLE, e))?;
        summary.payments += 1;
    }
    tx.commit().await?;
    info!("Loaded {} rows into {}", summary.payments, PAYMENTS_TABLE);

    Ok(summary)
}

fn rollback_warning(table: &str, error: &crate::Error) {
    warn!("Load of {} rolled back: {}", table, error);
}

/// Delete every row, children first
pub async fn truncate_all(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for table in [PAYMENTS_TABLE, MEMBERS_TABLE, TRAINERS_TABLE, PLANS_TABLE] {
        let result = sqlx::query(&format!("DELETE FROM {}", table)).execute(&mut *tx).await?;
        info!("Truncated {} ({} rows)", table, result.rows_affected());
    }
    tx.commit().await?;
    Ok(())
}
