//! SQLite persistence
//!
//! Free query functions per table, the bulk loader used by ingestion and
//! [`SqliteStore`], the [`GymStore`](crate::GymStore) implementation used by
//! the workflows.

pub mod init;
pub mod loader;
pub mod members;
pub mod payments;
pub mod plans;
pub mod schema;
pub mod store;
pub mod trainers;

pub use init::{init_database, init_memory_database};
pub use loader::{load_batches, truncate_all, LoadSummary};
pub use store::SqliteStore;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Money read back from a REAL column, rounded to cents
pub(crate) fn decimal_from_real(value: Option<f64>) -> Option<Decimal> {
    value.and_then(Decimal::from_f64).map(|d| d.round_dp(2))
}

/// Money written to a REAL column
pub(crate) fn real_from_decimal(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_conversion_rounds_to_cents() {
        assert_eq!(decimal_from_real(Some(4999.0)), Some(Decimal::from(4999)));
        assert_eq!(decimal_from_real(Some(10.005_000_1)), Some(Decimal::new(1001, 2)));
        assert_eq!(decimal_from_real(None), None);
        assert_eq!(real_from_decimal(Some(Decimal::new(25075, 2))), Some(250.75));
    }
}
