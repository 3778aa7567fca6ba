//! Member queries

use super::decimal_from_real;
use crate::models::{Member, MemberOverview, MemberProfile, MemberRef, NewMember};
use crate::Result;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::Row;

/// Member joined with the trainer and the most recent payment
const OVERVIEW_SELECT: &str = r#"
    SELECT m.member_id, m.name, m.age, m.gender, m.contact, m.membership_type,
           m.start_date, m.end_date,
           t.name AS trainer_name, t.specialization AS trainer_specialization,
           p.amount AS payment_amount, p.status AS payment_status, p.mode AS payment_mode
    FROM members m
    LEFT JOIN trainers t ON t.trainer_id = m.trainer_id
    LEFT JOIN (
        SELECT member_id, amount, status, mode,
               ROW_NUMBER() OVER (
                   PARTITION BY member_id
                   ORDER BY payment_date DESC, payment_id DESC
               ) AS rn
        FROM payments
    ) p ON p.member_id = m.member_id AND p.rn = 1
"#;

fn member_ref_from_row(row: &SqliteRow) -> Result<MemberRef> {
    Ok(MemberRef {
        member_id: row.try_get("member_id")?,
        name: row.try_get("name")?,
    })
}

fn overview_from_row(row: &SqliteRow) -> Result<MemberOverview> {
    Ok(MemberOverview {
        member_id: row.try_get("member_id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        contact: row.try_get("contact")?,
        plan: row.try_get("membership_type")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        trainer_name: row.try_get("trainer_name")?,
        trainer_specialization: row.try_get("trainer_specialization")?,
        payment_amount: decimal_from_real(row.try_get("payment_amount")?),
        payment_status: row.try_get("payment_status")?,
        payment_mode: row.try_get("payment_mode")?,
    })
}

/// Bulk-load insert with an explicit member id
pub async fn insert_member_row<'e, E: SqliteExecutor<'e>>(executor: E, member: &Member) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO members (
            member_id, name, age, gender, contact, membership_type,
            start_date, end_date, trainer_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(member.member_id)
    .bind(&member.name)
    .bind(member.age)
    .bind(&member.gender)
    .bind(member.contact)
    .bind(&member.plan)
    .bind(member.start_date)
    .bind(member.end_date)
    .bind(member.trainer_id)
    .execute(executor)
    .await?;

    Ok(())
}

/// Insert a new member; returns the assigned member id
pub async fn insert_member<'e, E: SqliteExecutor<'e>>(executor: E, member: &NewMember) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO members (
            name, age, gender, contact, membership_type,
            start_date, end_date, trainer_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&member.name)
    .bind(member.age)
    .bind(&member.gender)
    .bind(member.contact)
    .bind(&member.plan)
    .bind(member.start_date)
    .bind(member.end_date)
    .bind(member.trainer_id)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Member list, optionally restricted to one plan
pub async fn list_members<'e, E: SqliteExecutor<'e>>(
    executor: E,
    plan_filter: Option<&str>,
) -> Result<Vec<MemberOverview>> {
    let rows = match plan_filter {
        Some(plan) => {
            let sql = format!(
                "{} WHERE m.membership_type = ? COLLATE NOCASE ORDER BY m.member_id",
                OVERVIEW_SELECT
            );
            sqlx::query(&sql).bind(plan).fetch_all(executor).await?
        }
        None => {
            let sql = format!("{} ORDER BY m.member_id", OVERVIEW_SELECT);
            sqlx::query(&sql).fetch_all(executor).await?
        }
    };

    rows.iter().map(overview_from_row).collect()
}

/// Existing member with the same name (case-insensitive) and contact number
pub async fn find_by_name_and_contact<'e, E: SqliteExecutor<'e>>(
    executor: E,
    name: &str,
    contact: i64,
) -> Result<Option<MemberRef>> {
    let row = sqlx::query(
        "SELECT member_id, name FROM members WHERE name = ? COLLATE NOCASE AND contact = ? LIMIT 1",
    )
    .bind(name)
    .bind(contact)
    .fetch_optional(executor)
    .await?;

    row.as_ref().map(member_ref_from_row).transpose()
}

/// Members matching a deletion query: exact id when numeric, otherwise
/// case-insensitive name
pub async fn find_for_deletion<'e, E: SqliteExecutor<'e>>(
    executor: E,
    query: &str,
) -> Result<Vec<MemberRef>> {
    let query = query.trim();
    let rows = match query.parse::<i64>() {
        Ok(id) => {
            sqlx::query("SELECT member_id, name FROM members WHERE member_id = ?")
                .bind(id)
                .fetch_all(executor)
                .await?
        }
        Err(_) => {
            sqlx::query(
                "SELECT member_id, name FROM members WHERE name = ? COLLATE NOCASE ORDER BY member_id",
            )
            .bind(query)
            .fetch_all(executor)
            .await?
        }
    };

    rows.iter().map(member_ref_from_row).collect()
}

pub async fn end_date<'e, E: SqliteExecutor<'e>>(executor: E, member_id: i64) -> Result<Option<NaiveDate>> {
    let end: Option<Option<NaiveDate>> =
        sqlx::query_scalar("SELECT end_date FROM members WHERE member_id = ?")
            .bind(member_id)
            .fetch_optional(executor)
            .await?;

    Ok(end.flatten())
}

/// Set plan and dates; returns the number of rows updated
pub async fn update_plan<'e, E: SqliteExecutor<'e>>(
    executor: E,
    member_id: i64,
    plan: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE members
        SET membership_type = ?, start_date = ?, end_date = ?
        WHERE member_id = ?
        "#,
    )
    .bind(plan)
    .bind(start_date)
    .bind(end_date)
    .bind(member_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_member<'e, E: SqliteExecutor<'e>>(executor: E, member_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM members WHERE member_id = ?")
        .bind(member_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Exact (member id, contact) match
pub async fn authenticate<'e, E: SqliteExecutor<'e>>(
    executor: E,
    member_id: i64,
    contact: i64,
) -> Result<Option<MemberRef>> {
    let row = sqlx::query("SELECT member_id, name FROM members WHERE member_id = ? AND contact = ?")
        .bind(member_id)
        .bind(contact)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(member_ref_from_row).transpose()
}

pub async fn profile<'e, E: SqliteExecutor<'e>>(executor: E, member_id: i64) -> Result<Option<MemberProfile>> {
    let row = sqlx::query(
        r#"
        SELECT m.member_id, m.name, m.age, m.gender, m.contact, m.membership_type,
               m.start_date, m.end_date,
               t.name AS trainer_name, t.specialization AS trainer_specialization
        FROM members m
        LEFT JOIN trainers t ON t.trainer_id = m.trainer_id
        WHERE m.member_id = ?
        "#,
    )
    .bind(member_id)
    .fetch_optional(executor)
    .await?;

    match row {
        Some(row) => Ok(Some(MemberProfile {
            member_id: row.try_get("member_id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            gender: row.try_get("gender")?,
            contact: row.try_get("contact")?,
            plan: row.try_get("membership_type")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            trainer_name: row.try_get("trainer_name")?,
            trainer_specialization: row.try_get("trainer_specialization")?,
        })),
        None => Ok(None),
    }
}
