//! Payment queries
//!
//! "Most recent" means latest `payment_date`; payments on the same day are
//! ordered by descending payment id.

use super::{decimal_from_real, real_from_decimal};
use crate::models::{Payment, PaymentRecord, PaymentSummary};
use crate::Result;
use sqlx::sqlite::SqliteExecutor;
use sqlx::Row;

pub async fn insert_payment<'e, E: SqliteExecutor<'e>>(executor: E, payment: &Payment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (payment_id, member_id, amount, payment_date, mode, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payment.payment_id.as_str())
    .bind(payment.member_id)
    .bind(real_from_decimal(payment.amount))
    .bind(payment.payment_date)
    .bind(payment.mode.map(|m| m.as_str()))
    .bind(payment.status.map(|s| s.as_str()))
    .execute(executor)
    .await?;

    Ok(())
}

/// Amount and date of the member's most recent payment
pub async fn latest_payment<'e, E: SqliteExecutor<'e>>(
    executor: E,
    member_id: i64,
) -> Result<Option<PaymentSummary>> {
    let row = sqlx::query(
        r#"
        SELECT amount, payment_date
        FROM payments
        WHERE member_id = ?
        ORDER BY payment_date DESC, payment_id DESC
        LIMIT 1
        "#,
    )
    .bind(member_id)
    .fetch_optional(executor)
    .await?;

    match row {
        Some(row) => Ok(Some(PaymentSummary {
            amount: decimal_from_real(row.try_get("amount")?),
            payment_date: row.try_get("payment_date")?,
        })),
        None => Ok(None),
    }
}

/// Payment history, newest first
pub async fn payment_history<'e, E: SqliteExecutor<'e>>(
    executor: E,
    member_id: i64,
) -> Result<Vec<PaymentRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT payment_id, amount, payment_date, mode, status
        FROM payments
        WHERE member_id = ?
        ORDER BY payment_date DESC, payment_id DESC
        "#,
    )
    .bind(member_id)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PaymentRecord {
                payment_id: row.try_get("payment_id")?,
                amount: decimal_from_real(row.try_get("amount")?),
                payment_date: row.try_get("payment_date")?,
                mode: row.try_get("mode")?,
                status: row.try_get("status")?,
            })
        })
        .collect()
}

/// Delete every payment of a member; returns the number of rows removed
pub async fn delete_payments_for_member<'e, E: SqliteExecutor<'e>>(
    executor: E,
    member_id: i64,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM payments WHERE member_id = ?")
        .bind(member_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
