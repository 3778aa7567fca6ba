//! Domain models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Column and table names shared by the CSV inputs and the database
pub mod columns {
    pub const PLANS_TABLE: &str = "membership_types";
    pub const TRAINERS_TABLE: &str = "trainers";
    pub const MEMBERS_TABLE: &str = "members";
    pub const PAYMENTS_TABLE: &str = "payments";

    pub const MEMBERSHIP_TYPE: &str = "membership_type";
    pub const PRICE: &str = "price";
    pub const VALIDITY_MONTHS: &str = "validity_months";

    pub const TRAINER_ID: &str = "trainer_id";
    pub const NAME: &str = "name";
    pub const SPECIALIZATION: &str = "specialization";

    pub const MEMBER_ID: &str = "member_id";
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const CONTACT: &str = "contact";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";

    pub const PAYMENT_ID: &str = "payment_id";
    pub const AMOUNT: &str = "amount";
    pub const PAYMENT_DATE: &str = "payment_date";
    pub const MODE: &str = "mode";
    pub const STATUS: &str = "status";
}

/// Days credited per month of plan validity
pub const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub name: String,
    pub price: Decimal,
    pub validity_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trainer {
    pub trainer_id: i64,
    pub name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact: Option<i64>,
    pub plan: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub trainer_id: Option<i64>,
}

/// Member row to insert; the id is assigned by the database
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact: Option<i64>,
    pub plan: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub trainer_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub member_id: Option<i64>,
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub mode: Option<PaymentMode>,
    pub status: Option<PaymentStatus>,
}

/// Payment identifier: `P` followed by six uppercase hex characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Generate a fresh id from a random UUID
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("P{}", hex[..6].to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PaymentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PaymentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMode {
    Cash,
    Card,
    Transfer,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Card => "Card",
            PaymentMode::Transfer => "Transfer",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "card" | "credit card" | "debit card" => Ok(PaymentMode::Card),
            "transfer" | "bank transfer" | "upi" | "online" => Ok(PaymentMode::Transfer),
            other => Err(format!("unknown payment mode '{}'", other)),
        }
    }
}

impl TryFrom<String> for PaymentMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentMode> for String {
    fn from(value: PaymentMode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentStatus> for String {
    fn from(value: PaymentStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member list row: member, trainer and current payment joined together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberOverview {
    pub member_id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact: Option<i64>,
    pub plan: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trainer_name: Option<String>,
    pub trainer_specialization: Option<String>,
    pub payment_amount: Option<Decimal>,
    pub payment_status: Option<String>,
    pub payment_mode: Option<String>,
}

/// Single member details as shown in the member portal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberProfile {
    pub member_id: i64,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact: Option<i64>,
    pub plan: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trainer_name: Option<String>,
    pub trainer_specialization: Option<String>,
}

/// Payment history row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub mode: Option<String>,
    pub status: Option<String>,
}

/// Amount and date of a member's most recent payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
}

/// Minimal member identity (id and name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub member_id: i64,
    pub name: String,
}

/// End date of a membership that starts on `start` and lasts `months`
pub fn membership_end(start: NaiveDate, months: u32) -> crate::Result<NaiveDate> {
    start
        .checked_add_signed(chrono::Duration::days(DAYS_PER_MONTH * i64::from(months)))
        .ok_or_else(|| crate::Error::InvalidInput(format!("{} months is out of range", months)))
}
