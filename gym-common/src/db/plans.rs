//! Membership plan queries

use super::{decimal_from_real, real_from_decimal};
use crate::models::MembershipPlan;
use crate::Result;
use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::Row;

fn plan_from_row(row: &SqliteRow) -> Result<MembershipPlan> {
    let months: i64 = row.try_get("validity_months")?;
    Ok(MembershipPlan {
        name: row.try_get("membership_type")?,
        price: decimal_from_real(row.try_get("price")?).unwrap_or_default(),
        validity_months: u32::try_from(months).unwrap_or(0),
    })
}

pub async fn insert_plan<'e, E: SqliteExecutor<'e>>(executor: E, plan: &MembershipPlan) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO membership_types (membership_type, price, validity_months)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&plan.name)
    .bind(real_from_decimal(Some(plan.price)))
    .bind(i64::from(plan.validity_months))
    .execute(executor)
    .await?;

    Ok(())
}

/// All plans ordered by name
pub async fn list_plans<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<Vec<MembershipPlan>> {
    let rows = sqlx::query(
        "SELECT membership_type, price, validity_months FROM membership_types ORDER BY membership_type",
    )
    .fetch_all(executor)
    .await?;

    rows.iter().map(plan_from_row).collect()
}

/// Look up a plan by name, ignoring case
pub async fn find_plan<'e, E: SqliteExecutor<'e>>(executor: E, name: &str) -> Result<Option<MembershipPlan>> {
    let row = sqlx::query(
        r#"
        SELECT membership_type, price, validity_months
        FROM membership_types
        WHERE membership_type = ? COLLATE NOCASE
        "#,
    )
    .bind(name.trim())
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(plan_from_row).transpose()
}
