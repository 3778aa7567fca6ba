//! Declarative table schemas
//!
//! Each table is described once in code. The description drives both the
//! `CREATE TABLE IF NOT EXISTS` statement and a column sync that adds
//! columns missing from an older database file.

use crate::models::columns::*;
use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type (e.g. "TEXT", "INTEGER", "REAL", "DATE")
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            autoincrement: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// INTEGER PRIMARY KEY AUTOINCREMENT
    pub fn autoincrement(mut self) -> Self {
        self.primary_key = true;
        self.autoincrement = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.autoincrement {
            sql.push_str(" AUTOINCREMENT");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

/// Foreign key from one column to the primary key of another table
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub fn new(
        column: &'static str,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        Self {
            column,
            references_table,
            references_column,
        }
    }
}

/// Expected schema of one database table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Column definitions in creation order
    fn expected_columns() -> Vec<ColumnDefinition>;

    fn foreign_keys() -> Vec<ForeignKey> {
        Vec::new()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table
    fn create_table_sql() -> String {
        let mut parts: Vec<String> = Self::expected_columns().iter().map(|c| c.to_sql()).collect();
        parts.extend(Self::foreign_keys().iter().map(|fk| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                fk.column, fk.references_table, fk.references_column
            )
        }));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            Self::table_name(),
            parts.join(",\n    ")
        )
    }
}

pub struct MembershipTypesTableSchema;

impl TableSchema for MembershipTypesTableSchema {
    fn table_name() -> &'static str {
        PLANS_TABLE
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new(MEMBERSHIP_TYPE, "TEXT").primary_key(),
            ColumnDefinition::new(PRICE, "REAL").not_null(),
            ColumnDefinition::new(VALIDITY_MONTHS, "INTEGER").not_null(),
        ]
    }
}

pub struct TrainersTableSchema;

impl TableSchema for TrainersTableSchema {
    fn table_name() -> &'static str {
        TRAINERS_TABLE
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new(TRAINER_ID, "INTEGER").autoincrement(),
            ColumnDefinition::new(NAME, "TEXT").not_null(),
            ColumnDefinition::new(SPECIALIZATION, "TEXT"),
        ]
    }
}

pub struct MembersTableSchema;

impl TableSchema for MembersTableSchema {
    fn table_name() -> &'static str {
        MEMBERS_TABLE
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new(MEMBER_ID, "INTEGER").autoincrement(),
            ColumnDefinition::new(NAME, "TEXT").not_null(),
            ColumnDefinition::new(AGE, "INTEGER"),
            ColumnDefinition::new(GENDER, "TEXT"),
            ColumnDefinition::new(CONTACT, "INTEGER"),
            ColumnDefinition::new(MEMBERSHIP_TYPE, "TEXT"),
            ColumnDefinition::new(START_DATE, "DATE"),
            ColumnDefinition::new(END_DATE, "DATE"),
            ColumnDefinition::new(TRAINER_ID, "INTEGER"),
        ]
    }

    fn foreign_keys() -> Vec<ForeignKey> {
        vec![
            ForeignKey::new(MEMBERSHIP_TYPE, PLANS_TABLE, MEMBERSHIP_TYPE),
            ForeignKey::new(TRAINER_ID, TRAINERS_TABLE, TRAINER_ID),
        ]
    }
}

pub struct PaymentsTableSchema;

impl TableSchema for PaymentsTableSchema {
    fn table_name() -> &'static str {
        PAYMENTS_TABLE
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new(PAYMENT_ID, "TEXT").primary_key(),
            ColumnDefinition::new(MEMBER_ID, "INTEGER"),
            ColumnDefinition::new(AMOUNT, "REAL"),
            ColumnDefinition::new(PAYMENT_DATE, "DATE"),
            ColumnDefinition::new(MODE, "TEXT"),
            ColumnDefinition::new(STATUS, "TEXT"),
        ]
    }

    fn foreign_keys() -> Vec<ForeignKey> {
        vec![ForeignKey::new(MEMBER_ID, MEMBERS_TABLE, MEMBER_ID)]
    }
}

/// Schema introspection via `sqlite_master` and `PRAGMA table_info`
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Column names in table order
    pub async fn column_names(pool: &SqlitePool, table_name: &str) -> Result<Vec<String>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut columns: Vec<(i64, String)> = rows
            .iter()
            .map(|row| (row.get::<i64, _>("cid"), row.get::<String, _>("name")))
            .collect();
        columns.sort_by_key(|(cid, _)| *cid);

        Ok(columns.into_iter().map(|(_, name)| name).collect())
    }
}

/// Create the table if needed, then add any expected column it lacks
///
/// Added columns are nullable; constraints on existing columns are not
/// changed (SQLite would need a table rebuild).
pub async fn sync_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
    let table = T::table_name();
    sqlx::query(&T::create_table_sql()).execute(pool).await?;

    let actual = SchemaIntrospector::column_names(pool, table).await?;
    for column in T::expected_columns() {
        if actual.iter().any(|name| name == &column.name) {
            continue;
        }
        if column.primary_key {
            warn!(
                "Cannot add primary key column {}.{} to an existing table",
                table, column.name
            );
            continue;
        }

        let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column.name, column.sql_type);
        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => info!("Added column {}.{} ({})", table, column.name, column.sql_type),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Sync every table, parents before children
pub async fn sync_all_tables(pool: &SqlitePool) -> Result<()> {
    sync_table::<MembershipTypesTableSchema>(pool).await?;
    sync_table::<TrainersTableSchema>(pool).await?;
    sync_table::<MembersTableSchema>(pool).await?;
    sync_table::<PaymentsTableSchema>(pool).await?;
    Ok(())
}
