//! Cleaning pipeline
//!
//! Produces the four load-ready batches. Parents are cleaned before children
//! so that child rows can be filtered against the already-cleaned parent keys:
//!
//! 1. membership plans, trainers
//! 2. members (filtered against plans and trainers)
//! 3. payments (filtered against members)
//!
//! Per entity the rules run in a fixed order: whole-row dedupe, critical-field
//! drop, non-critical fill, string normalization, date normalization,
//! entity-specific coercions, a second critical-field check (coercion may
//! have nulled a critical value), key dedupe and finally referential filters.

use super::csv_source::{read_table, HeaderCase};
use super::rules::{
    coerce_decimal, coerce_int, coerce_positive_int, drop_duplicate_rows, drop_duplicates,
    drop_missing_critical, fill_non_critical, lowercase_headers, normalize_choice,
    normalize_dates, normalize_gender, normalize_strings, referential_filter,
};
use super::table::{Cell, Table, Value};
use crate::models::columns::*;
use crate::models::{Member, MembershipPlan, Payment, PaymentMode, PaymentStatus, Trainer};
use crate::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

const PLAN_CRITICAL: &[&str] = &[MEMBERSHIP_TYPE, PRICE, VALIDITY_MONTHS];
const TRAINER_CRITICAL: &[&str] = &[TRAINER_ID, NAME, SPECIALIZATION];
const MEMBER_CRITICAL: &[&str] = &[MEMBER_ID, NAME, MEMBERSHIP_TYPE, START_DATE];
const PAYMENT_CRITICAL: &[&str] = &[PAYMENT_ID];

/// One table per entity
#[derive(Debug, Clone, Default)]
pub struct EntityTables {
    pub plans: Table,
    pub trainers: Table,
    pub members: Table,
    pub payments: Table,
}

impl EntityTables {
    /// Read the four CSV files; trainer headers are lower-cased
    pub fn from_files(plans: &Path, trainers: &Path, members: &Path, payments: &Path) -> Result<Self> {
        Ok(Self {
            plans: read_table(plans, HeaderCase::Preserve)?,
            trainers: read_table(trainers, HeaderCase::Lower)?,
            members: read_table(members, HeaderCase::Preserve)?,
            payments: read_table(payments, HeaderCase::Preserve)?,
        })
    }
}

/// Row counts for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub entity: &'static str,
    pub raw_rows: usize,
    pub loaded_rows: usize,
}

impl EntityReport {
    pub fn dropped_rows(&self) -> usize {
        self.raw_rows.saturating_sub(self.loaded_rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub plans: EntityReport,
    pub trainers: EntityReport,
    pub members: EntityReport,
    pub payments: EntityReport,
}

impl CleaningReport {
    pub fn entities(&self) -> [&EntityReport; 4] {
        [&self.plans, &self.trainers, &self.members, &self.payments]
    }
}

/// Load-ready batches
#[derive(Debug, Clone)]
pub struct CleanedBatches {
    pub plans: Vec<MembershipPlan>,
    pub trainers: Vec<Trainer>,
    pub members: Vec<Member>,
    pub payments: Vec<Payment>,
    /// Cleaned tables the records were converted from, kept for previews
    pub tables: EntityTables,
    pub report: CleaningReport,
}

/// Clean all four inputs in dependency order
pub fn clean_all(raw: EntityTables) -> CleanedBatches {
    let raw_counts = (
        raw.plans.len(),
        raw.trainers.len(),
        raw.members.len(),
        raw.payments.len(),
    );

    let plans_table = clean_plans_table(raw.plans);
    let plans = plans_from_table(&plans_table);
    let trainers_table = clean_trainers_table(raw.trainers);
    let trainers = trainers_from_table(&trainers_table);

    let plan_names: HashSet<String> = plans.iter().map(|p| p.name.clone()).collect();
    let trainer_ids: HashSet<i64> = trainers.iter().map(|t| t.trainer_id).collect();
    let members_table = clean_members_table(raw.members, Some(&plan_names), Some(&trainer_ids));
    let members = members_from_table(&members_table);

    let member_ids: HashSet<i64> = members.iter().map(|m| m.member_id).collect();
    let payments_table = clean_payments_table(raw.payments, Some(&member_ids));
    let payments = payments_from_table(&payments_table);

    let report = CleaningReport {
        plans: EntityReport { entity: PLANS_TABLE, raw_rows: raw_counts.0, loaded_rows: plans.len() },
        trainers: EntityReport { entity: TRAINERS_TABLE, raw_rows: raw_counts.1, loaded_rows: trainers.len() },
        members: EntityReport { entity: MEMBERS_TABLE, raw_rows: raw_counts.2, loaded_rows: members.len() },
        payments: EntityReport { entity: PAYMENTS_TABLE, raw_rows: raw_counts.3, loaded_rows: payments.len() },
    };

    for entity in report.entities() {
        info!(
            "Cleaned {}: {} raw rows, {} kept, {} dropped",
            entity.entity,
            entity.raw_rows,
            entity.loaded_rows,
            entity.dropped_rows()
        );
    }

    CleanedBatches {
        plans,
        trainers,
        members,
        payments,
        tables: EntityTables {
            plans: plans_table,
            trainers: trainers_table,
            members: members_table,
            payments: payments_table,
        },
        report,
    }
}

/// Table-level cleaning of the membership plan input
pub fn clean_plans_table(table: Table) -> Table {
    let table = drop_duplicate_rows(table);
    let table = drop_missing_critical(table, PLAN_CRITICAL);
    let table = fill_non_critical(table, PLAN_CRITICAL);
    let table = normalize_strings(table);
    let table = coerce_decimal(table, PRICE);
    let table = coerce_positive_int(table, VALIDITY_MONTHS);
    let table = drop_missing_critical(table, PLAN_CRITICAL);
    drop_duplicates(table, &[MEMBERSHIP_TYPE])
}

pub fn clean_plans(table: Table) -> Vec<MembershipPlan> {
    plans_from_table(&clean_plans_table(table))
}

fn plans_from_table(table: &Table) -> Vec<MembershipPlan> {
    convert_rows(table, PLANS_TABLE, |row| {
        Some(MembershipPlan {
            name: table.get(row, MEMBERSHIP_TYPE)?.as_text()?.to_string(),
            price: table.get(row, PRICE)?.as_decimal()?,
            validity_months: u32::try_from(table.get(row, VALIDITY_MONTHS)?.as_int()?).ok()?,
        })
    })
}

/// Convert cleaned rows into records, dropping rows that do not convert
fn convert_rows<T, F>(table: &Table, entity: &str, convert: F) -> Vec<T>
where
    F: Fn(&[Cell]) -> Option<T>,
{
    table
        .rows
        .iter()
        .filter_map(|row| {
            let record = convert(row);
            if record.is_none() {
                debug!("Dropped unconvertible {} row {:?}", entity, row);
            }
            record
        })
        .collect()
}

/// Table-level cleaning of the trainer input
pub fn clean_trainers_table(table: Table) -> Table {
    let table = lowercase_headers(table);
    let table = drop_duplicate_rows(table);
    let table = coerce_int(table, TRAINER_ID);
    let table = drop_missing_critical(table, TRAINER_CRITICAL);
    let table = normalize_strings(table);
    let table = fill_non_critical(table, TRAINER_CRITICAL);
    let table = drop_missing_critical(table, TRAINER_CRITICAL);
    drop_duplicates(table, &[TRAINER_ID])
}

pub fn clean_trainers(table: Table) -> Vec<Trainer> {
    trainers_from_table(&clean_trainers_table(table))
}

fn trainers_from_table(table: &Table) -> Vec<Trainer> {
    convert_rows(table, TRAINERS_TABLE, |row| {
        Some(Trainer {
            trainer_id: table.get(row, TRAINER_ID)?.as_int()?,
            name: table.get(row, NAME)?.as_text()?.to_string(),
            specialization: table.get(row, SPECIALIZATION)?.as_text()?.to_string(),
        })
    })
}

/// Table-level cleaning of the member input
///
/// `valid_plans` / `valid_trainers` are the keys of the already-cleaned
/// parent batches; `None` skips that referential filter.
pub fn clean_members_table(
    table: Table,
    valid_plans: Option<&HashSet<String>>,
    valid_trainers: Option<&HashSet<i64>>,
) -> Table {
    let table = drop_duplicate_rows(table);

    let mut critical: Vec<&str> = MEMBER_CRITICAL.to_vec();
    if table.has_column(TRAINER_ID) {
        critical.push(TRAINER_ID);
    }

    let table = drop_missing_critical(table, &critical);
    let table = fill_non_critical(table, &critical);
    let table = normalize_strings(table);
    let table = normalize_dates(table, &[START_DATE, END_DATE]);
    let table = normalize_gender(table, GENDER);
    let table = coerce_int(table, CONTACT);
    let table = coerce_int(table, TRAINER_ID);
    let table = coerce_int(table, MEMBER_ID);
    let table = coerce_int(table, AGE);
    let table = drop_missing_critical(table, &critical);
    let mut table = drop_duplicates(table, &[MEMBER_ID]);

    if let Some(trainers) = valid_trainers {
        let allowed: HashSet<Value> = trainers.iter().map(|id| Value::Int(*id)).collect();
        table = referential_filter(table, TRAINER_ID, &allowed);
    }
    if let Some(plans) = valid_plans {
        let allowed: HashSet<Value> = plans.iter().map(|p| Value::Text(p.clone())).collect();
        table = referential_filter(table, MEMBERSHIP_TYPE, &allowed);
    }
    table
}

pub fn clean_members(
    table: Table,
    valid_plans: Option<&HashSet<String>>,
    valid_trainers: Option<&HashSet<i64>>,
) -> Vec<Member> {
    members_from_table(&clean_members_table(table, valid_plans, valid_trainers))
}

fn members_from_table(table: &Table) -> Vec<Member> {
    convert_rows(table, MEMBERS_TABLE, |row| {
        Some(Member {
            member_id: table.get(row, MEMBER_ID)?.as_int()?,
            name: table.get(row, NAME)?.as_text()?.to_string(),
            age: table.get(row, AGE).and_then(Value::as_int),
            gender: table.get(row, GENDER).and_then(Value::as_text).map(str::to_string),
            contact: table.get(row, CONTACT).and_then(Value::as_int),
            plan: table.get(row, MEMBERSHIP_TYPE)?.as_text()?.to_string(),
            start_date: table.get(row, START_DATE)?.as_date()?,
            end_date: table.get(row, END_DATE).and_then(Value::as_date),
            trainer_id: table.get(row, TRAINER_ID).and_then(Value::as_int),
        })
    })
}

/// Table-level cleaning of the payment input
pub fn clean_payments_table(table: Table, valid_members: Option<&HashSet<i64>>) -> Table {
    let table = drop_duplicate_rows(table);
    let table = drop_missing_critical(table, PAYMENT_CRITICAL);
    let table = fill_non_critical(table, PAYMENT_CRITICAL);
    let table = normalize_strings(table);
    let table = coerce_decimal(table, AMOUNT);
    let table = normalize_dates(table, &[PAYMENT_DATE]);
    let table = coerce_int(table, MEMBER_ID);
    let table = normalize_choice(table, MODE, |s| s.parse::<PaymentMode>().ok().map(|m| m.as_str()));
    let table = normalize_choice(table, STATUS, |s| {
        s.parse::<PaymentStatus>().ok().map(|m| m.as_str())
    });
    let table = drop_missing_critical(table, PAYMENT_CRITICAL);
    let mut table = drop_duplicates(table, &[PAYMENT_ID]);

    if let Some(members) = valid_members {
        let allowed: HashSet<Value> = members.iter().map(|id| Value::Int(*id)).collect();
        table = referential_filter(table, MEMBER_ID, &allowed);
    }
    table
}

pub fn clean_payments(table: Table, valid_members: Option<&HashSet<i64>>) -> Vec<Payment> {
    payments_from_table(&clean_payments_table(table, valid_members))
}

fn payments_from_table(table: &Table) -> Vec<Payment> {
    convert_rows(table, PAYMENTS_TABLE, |row| {
        let text = |col: &str| table.get(row, col).and_then(Value::as_text);
        Some(Payment {
            payment_id: text(PAYMENT_ID)?.into(),
            member_id: table.get(row, MEMBER_ID).and_then(Value::as_int),
            amount: table.get(row, AMOUNT).and_then(Value::as_decimal),
            payment_date: table.get(row, PAYMENT_DATE).and_then(Value::as_date),
            mode: text(MODE).and_then(|s| s.parse().ok()),
            status: text(STATUS).and_then(|s| s.parse().ok()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::csv_source::read_table_from_reader;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn csv(data: &str) -> Table {
        read_table_from_reader(data.as_bytes(), HeaderCase::Preserve).unwrap()
    }

    #[test]
    fn test_plans_cleaning() {
        let plans = clean_plans(csv(
            "membership_type,price,validity_months\n\
             gold,4999,6\n\
             gold,4999,6\n\
             GOLD,5999,12\n\
             silver,,3\n\
             basic,999,0\n\
             nan,100,1\n\
             platinum,abc,12\n\
             monthly,799.50,1\n",
        ));

        let names: Vec<&str> = plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gold", "Monthly"]);
        assert_eq!(plans[0].price, Decimal::from(4999));
        assert_eq!(plans[0].validity_months, 6);
        assert_eq!(plans[1].price, Decimal::new(79950, 2));
    }

    #[test]
    fn test_trainers_cleaning_lowercases_headers() {
        let trainers = clean_trainers(csv(
            "Trainer_ID,Name,Specialization\n\
             1,raj kumar,yoga\n\
             1,someone else,cardio\n\
             x,bad id,zumba\n\
             2,nan,cardio\n\
             3,meera,\n\
             4.0,anita,crossfit\n",
        ));

        assert_eq!(trainers.len(), 2);
        assert_eq!(trainers[0].trainer_id, 1);
        assert_eq!(trainers[0].name, "Raj Kumar");
        assert_eq!(trainers[0].specialization, "Yoga");
        assert_eq!(trainers[1].trainer_id, 4);
    }

    #[test]
    fn test_members_cleaning_and_referential_filter() {
        let plans: HashSet<String> = ["Gold".to_string()].into_iter().collect();
        let trainers: HashSet<i64> = [1].into_iter().collect();

        let members = clean_members(
            csv("member_id,name,age,gender,contact,membership_type,start_date,end_date,trainer_id\n\
                 1,amy lee,29,female,9876543210,gold,2024-01-01,2024-06-29,1\n\
                 1,amy dup,30,f,1,gold,2024-01-01,,1\n\
                 2,bob,40,male,not a number,silver,2024-02-01,,1\n\
                 3,carl,33,m,123,gold,2024-03-01,,9\n\
                 4,dina,,,,gold,someday,,1\n\
                 5,eve,25,F,555,gold,03/05/2024,,\n\
                 x6,fay,25,F,555,gold,2024-01-01,,1\n\
                 7,gus,41,Other,777,gold,2024-04-01,garbage,1\n"),
            Some(&plans),
            Some(&trainers),
        );

        let ids: Vec<i64> = members.iter().map(|m| m.member_id).collect();
        assert_eq!(ids, vec![1, 7]);

        let amy = &members[0];
        assert_eq!(amy.name, "Amy Lee");
        assert_eq!(amy.gender.as_deref(), Some("F"));
        assert_eq!(amy.contact, Some(9876543210));
        assert_eq!(amy.plan, "Gold");
        assert_eq!(amy.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(amy.end_date, NaiveDate::from_ymd_opt(2024, 6, 29));

        let gus = &members[1];
        assert_eq!(gus.gender.as_deref(), Some("O"));
        assert_eq!(gus.end_date, None);
    }

    #[test]
    fn test_members_with_two_digit_year_start_dropped() {
        let members = clean_members(
            csv("member_id,name,membership_type,start_date,end_date\n\
                 1,amy,gold,15-03-24,\n\
                 2,bob,gold,2024-03-15,03/15/24\n"),
            None,
            None,
        );

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member_id, 2);
        assert_eq!(members[0].end_date, None);
    }

    #[test]
    fn test_members_whitespace_fields() {
        let members = clean_members(
            csv("member_id,name,age,gender,membership_type,start_date\n\
                 1,   ,30,f,gold,2024-01-01\n\
                 2,bob,  ,  ,gold,2024-01-01\n"),
            None,
            None,
        );

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].member_id, 2);
        assert_eq!(members[0].age, None);
        assert_eq!(members[0].gender, None);
    }

    #[test]
    fn test_members_without_trainer_column_keep_rows() {
        let members = clean_members(
            csv("member_id,name,membership_type,start_date\n1,amy,gold,2024-01-01\n"),
            None,
            None,
        );
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].trainer_id, None);
    }

    #[test]
    fn test_payments_cleaning() {
        let members: HashSet<i64> = [1, 2].into_iter().collect();
        let payments = clean_payments(
            csv("payment_id,member_id,amount,payment_date,mode,status\n\
                 p1a2b3,1,4999,2024-01-01,cash,paid\n\
                 P1A2B3,2,100,2024-01-02,card,paid\n\
                 ,1,100,2024-01-02,card,paid\n\
                 pzz001,9,100,2024-01-02,card,paid\n\
                 pzz002,,abc,not a date,barter,maybe\n\
                 pzz003,2,250.75,2024-02-10,upi,unpaid\n"),
            Some(&members),
        );

        let ids: Vec<&str> = payments.iter().map(|p| p.payment_id.as_str()).collect();
        assert_eq!(ids, vec!["P1A2B3", "Pzz002", "Pzz003"]);

        assert_eq!(payments[0].mode, Some(PaymentMode::Cash));
        assert_eq!(payments[0].status, Some(PaymentStatus::Paid));

        let orphan = &payments[1];
        assert_eq!(orphan.member_id, None);
        assert_eq!(orphan.amount, None);
        assert_eq!(orphan.payment_date, None);
        assert_eq!(orphan.mode, None);
        assert_eq!(orphan.status, None);

        assert_eq!(payments[2].mode, Some(PaymentMode::Transfer));
        assert_eq!(payments[2].amount, Some(Decimal::new(25075, 2)));
    }

    #[test]
    fn test_clean_all_filters_children_against_cleaned_parents() {
        let raw = EntityTables {
            plans: csv("membership_type,price,validity_months\ngold,4999,6\nbroken,,6\n"),
            trainers: csv("trainer_id,name,specialization\n1,raj,yoga\n2,,cardio\n"),
            members: csv(
                "member_id,name,membership_type,start_date,trainer_id\n\
                 1,amy,gold,2024-01-01,1\n\
                 2,bob,broken,2024-01-01,1\n\
                 3,cy,gold,2024-01-01,2\n",
            ),
            payments: csv(
                "payment_id,member_id,amount,payment_date,mode,status\n\
                 pa,1,10,2024-01-01,cash,paid\n\
                 pb,2,10,2024-01-01,cash,paid\n\
                 pc,3,10,2024-01-01,cash,paid\n",
            ),
        };

        let batches = clean_all(raw);
        assert_eq!(batches.plans.len(), 1);
        assert_eq!(batches.trainers.len(), 1);
        assert_eq!(batches.members.len(), 1);
        assert_eq!(batches.payments.len(), 1);
        assert_eq!(batches.payments[0].payment_id.as_str(), "Pa");
        assert_eq!(batches.tables.members.len(), 1);

        assert_eq!(batches.report.members.raw_rows, 3);
        assert_eq!(batches.report.members.dropped_rows(), 2);
    }
}
